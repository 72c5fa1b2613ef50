use std::thread;
use std::time::Duration;

use log::trace;

/// A pause the front-end inserts so replies feel typed rather than instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delay {
    pub ms: u64,
}

impl Delay {
    /// Counterpart "typing" after a picked reply.
    pub const TYPING: Delay = Delay { ms: 1000 };
    /// Counterpart reading a typed reply.
    pub const READING: Delay = Delay { ms: 1500 };
    /// Comeback being "analyzed".
    pub const ANALYZING: Delay = Delay { ms: 1500 };
    /// Coach "thinking" before it answers.
    pub const THINKING: Delay = Delay { ms: 1000 };

    pub fn duration(self) -> Duration {
        Duration::from_millis(self.ms)
    }
}

/// Carries out [`Delay`]s. Swap in [`Skip`] to make runs instant.
pub trait Pacer {
    fn pause(&mut self, delay: Delay);
}

/// Blocks the thread for the full delay.
#[derive(Debug, Default)]
pub struct Sleep;

impl Pacer for Sleep {
    fn pause(&mut self, delay: Delay) {
        trace!("Pausing {}ms", delay.ms);
        thread::sleep(delay.duration());
    }
}

/// Ignores delays.
#[derive(Debug, Default)]
pub struct Skip;

impl Pacer for Skip {
    fn pause(&mut self, _delay: Delay) {}
}

/// Pick the pacer for a run.
pub fn pacer(fast: bool) -> Box<dyn Pacer> {
    if fast {
        Box::new(Skip)
    } else {
        Box::new(Sleep)
    }
}

#[cfg(test)]
pub mod testing {
    use super::{Delay, Pacer};

    /// Records requested delays instead of sleeping.
    #[derive(Debug, Default)]
    pub struct Recorder {
        pub delays: Vec<Delay>,
    }

    impl Pacer for Recorder {
        fn pause(&mut self, delay: Delay) {
            self.delays.push(delay);
        }
    }
}
