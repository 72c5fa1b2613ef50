use log::info;

/// XP needed per level.
pub const XP_PER_LEVEL: u32 = 1000;

/// Levels above this unlock the premium coach.
pub const PREMIUM_LEVEL: u32 = 10;

/// The player's experience points for the current run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    xp: u32,
}

impl Progress {
    pub fn new(xp: u32) -> Self {
        Self { xp }
    }

    pub fn xp(&self) -> u32 {
        self.xp
    }

    pub fn level(&self) -> u32 {
        self.xp / XP_PER_LEVEL + 1
    }

    pub fn is_premium(&self) -> bool {
        self.level() > PREMIUM_LEVEL
    }

    /// Add XP and return the new level.
    pub fn add_xp(&mut self, amount: u32) -> u32 {
        let before = self.level();
        self.xp = self.xp.saturating_add(amount);
        let after = self.level();
        if after > before {
            info!("Level up: {before} -> {after} ({} XP)", self.xp);
        }
        after
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels() {
        assert_eq!(Progress::default().level(), 1);
        assert_eq!(Progress::new(999).level(), 1);
        assert_eq!(Progress::new(2350).level(), 3);
    }

    #[test]
    fn test_add_xp_levels_up() {
        let mut progress = Progress::new(900);
        assert_eq!(progress.add_xp(150), 2);
        assert_eq!(progress.xp(), 1050);
    }

    #[test]
    fn test_premium_after_level_ten() {
        assert!(!Progress::new(9_999).is_premium());
        assert!(Progress::new(10_000).is_premium());
    }
}
