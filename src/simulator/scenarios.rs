use std::fmt;
use std::str::FromStr;

use crate::error::Result;
use crate::simulator::graph::{Graph, START_NODE_ID};
use crate::simulator::node::{DialogueNode, DialogueOption};

/// Where the simulated conversation takes place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioKind {
    /// First messages on a dating app match.
    Tinder,
    /// Follow-up chat with someone met the day before.
    Whatsapp,
    /// Opening a conversation in person at a café.
    Irl,
}

impl ScenarioKind {
    pub const ALL: [ScenarioKind; 3] = [Self::Tinder, Self::Whatsapp, Self::Irl];

    pub fn title(self) -> &'static str {
        match self {
            Self::Tinder => "Dating App Match",
            Self::Whatsapp => "Texting After Meeting",
            Self::Irl => "Café Encounter",
        }
    }

    fn pick(self, tinder: &str, whatsapp: &str, irl: &str) -> String {
        match self {
            Self::Tinder => tinder,
            Self::Whatsapp => whatsapp,
            Self::Irl => irl,
        }
        .to_string()
    }
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Tinder => "tinder",
            Self::Whatsapp => "whatsapp",
            Self::Irl => "irl",
        };
        f.write_str(name)
    }
}

impl FromStr for ScenarioKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "tinder" => Ok(Self::Tinder),
            "whatsapp" => Ok(Self::Whatsapp),
            "irl" => Ok(Self::Irl),
            other => {
                let known: Vec<String> = Self::ALL.iter().map(ToString::to_string).collect();
                anyhow::bail!(
                    "unknown scenario type '{other}' (expected one of {})",
                    known.join(", ")
                )
            }
        }
    }
}

/// The person on the other side of the conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub name: String,
    pub age: u32,
    pub bio: String,
    /// Topics a good reply can pick up on. Also the scorer's keyword set.
    pub interests: Vec<String>,
}

impl Profile {
    pub fn for_scenario(kind: ScenarioKind) -> Self {
        let name = match kind {
            ScenarioKind::Tinder => "Emma",
            ScenarioKind::Whatsapp => "Sophie",
            ScenarioKind::Irl => "Olivia",
        };
        let bio = kind.pick(
            "Travel enthusiast, yoga instructor, dog lover.\n\
             Looking for someone who can make me laugh and join me on adventures!",
            "Just a coffee lover with a photography obsession. \
             I enjoy hiking on weekends and trying new restaurants.",
            "Just a coffee lover with a photography obsession. \
             I enjoy hiking on weekends and trying new restaurants.",
        );
        Self {
            name: name.into(),
            age: 28,
            bio,
            interests: ["Photography", "Hiking", "Travel", "Coffee", "Reading"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }

    /// One line setting the scene before the first message.
    pub fn scene(&self, kind: ScenarioKind) -> String {
        match kind {
            ScenarioKind::Tinder => format!("{}, {}\n{}", self.name, self.age, self.bio),
            ScenarioKind::Whatsapp => format!("{} (last seen today at 3:42 PM)", self.name),
            ScenarioKind::Irl => format!(
                "You notice {} reading at a café. She seems absorbed in her book, \
                 but occasionally glances up at people walking by.",
                self.name
            ),
        }
    }
}

fn option(id: &str, text: String, next: &str, score: u32) -> DialogueOption {
    DialogueOption {
        id: id.into(),
        text,
        next_node_id: next.into(),
        quality_score: score,
    }
}

fn node(id: &str, message: String, options: Vec<DialogueOption>) -> DialogueNode {
    DialogueNode {
        id: id.into(),
        message,
        options,
    }
}

// ---------------------------------------------------------------------------
// Conversation scripts
// ---------------------------------------------------------------------------

/// Build the scripted conversation for one scenario kind. All three kinds
/// share the same shape; only the lines differ.
pub fn conversation_scenario(kind: ScenarioKind) -> Result<Graph> {
    let k = kind;
    let nodes = vec![
        node(
            START_NODE_ID,
            k.pick(
                "Hey! I like your profile. I'm also into photography. What kind of photos do you usually take?",
                "Hey! It was nice meeting you at the coffee shop yesterday. How's your day going?",
                "Hi there! I noticed you're reading one of my favorite books. How are you enjoying it so far?",
            ),
            vec![
                option(
                    "option1",
                    k.pick(
                        "I mostly do travel photography. I've been to 20 countries so far. What about you?",
                        "It's going well, thanks for asking! Just finished a busy day at work. How about you?",
                        "I'm really loving it! The character development is amazing. Are you a big reader?",
                    ),
                    "response1",
                    8,
                ),
                option(
                    "option2",
                    k.pick(
                        "Thanks! I'm not actually that into photography, that's just something I put on my profile.",
                        "Hey! Yeah, it was nice meeting you too. I'm good.",
                        "It's okay I guess. What other books do you like?",
                    ),
                    "response2",
                    4,
                ),
                option(
                    "option3",
                    k.pick(
                        "I love capturing moments of people in their natural environment. There's something powerful about candid emotions. What draws you to photography?",
                        "It's been a great day! Just got back from an amazing hiking trail with incredible views. The kind of scenery you'd probably capture beautifully with your camera!",
                        "I'm absolutely captivated by it! The way the author weaves themes of identity through the narrative is brilliant. What other authors do you enjoy in this genre?",
                    ),
                    "response3",
                    10,
                ),
            ],
        ),
        node(
            "response1",
            k.pick(
                "That's awesome! I've only been to a few countries, but I love capturing landscapes and cityscapes. I'd love to travel more. What's been your favorite destination so far?",
                "I've had a productive day too! Just finished a photography session at the park. So, I was wondering if you'd like to grab coffee again sometime this week?",
                "Yes, I read all the time! I particularly love fiction that explores complex characters. What other genres do you enjoy besides this one?",
            ),
            vec![
                option(
                    "option1-1",
                    k.pick(
                        "Definitely Japan. The contrast between traditional temples and futuristic cities is amazing for photography. Do you have a dream destination?",
                        "Coffee sounds great! How about Thursday evening after work? There's a new place I've been wanting to try.",
                        "I mostly read science fiction and historical fiction. I like books that transport me to different worlds or times. What are you reading currently?",
                    ),
                    "good",
                    9,
                ),
                option(
                    "option1-2",
                    k.pick(
                        "I've been to so many places it's hard to choose. I'm very well-traveled and have seen pretty much everything worth seeing.",
                        "Maybe. I'll have to check my schedule. I'm pretty busy usually.",
                        "I don't really have time to read much else. Life is pretty busy, you know?",
                    ),
                    "negative-turn",
                    3,
                ),
            ],
        ),
        node(
            "response2",
            k.pick(
                "Oh, I see. So what are you actually interested in then?",
                "Just good? Anything interesting happen today?",
                "I see. Well, I enjoy a range of genres from classic literature to contemporary fiction. Do you read often?",
            ),
            vec![
                option(
                    "option2-1",
                    k.pick(
                        "Actually, I'm really into hiking and outdoor adventures. I'd love to know more about your photography though - what inspired you to get into it?",
                        "Sorry for the short reply! I was in the middle of something. My day's been quite eventful actually - I just got promoted at work! How was your photography session?",
                        "You know what, I actually do read quite a bit but I've been in a bit of a slump lately. This book is helping me get back into it. What got you into reading?",
                    ),
                    "recovery",
                    8,
                ),
                option(
                    "option2-2",
                    k.pick(
                        "I'm mainly just here to meet people and see what happens.",
                        "Not really. Just another day.",
                        "Not really. I'm only reading this because a friend recommended it.",
                    ),
                    "dead-end",
                    2,
                ),
            ],
        ),
        node(
            "response3",
            k.pick(
                "I love how you described that! I'm drawn to photography for similar reasons. I find it's like freezing little moments of truth in time. I particularly love capturing the interplay of light and shadow in urban environments. Have you explored night photography at all?",
                "Wow, that sounds amazing! I'm a sucker for good hiking trails and beautiful views. Which trail was it? And yes, I would've definitely had my camera ready! Would you like to join me for a photography hike sometime? I know some great spots.",
                "I'm impressed by your analysis! I'm particularly fond of Ishiguro and Atwood in this space - authors who blend literary excellence with thought-provoking themes. I'm part of a book club that meets at the café around the corner. We're discussing this exact book next Saturday if you'd be interested in joining?",
            ),
            vec![
                option(
                    "option3-1",
                    k.pick(
                        "I've dabbled in night photography and it's fascinating! The city transforms after dark. I'd love to exchange some techniques sometime, maybe even during a photo walk? I know some great urban spots with amazing lighting.",
                        "It was Sunset Ridge - the views at golden hour are spectacular! A photography hike sounds perfect. I'd love to learn from your expertise and explore those spots you mentioned. How about this weekend if the weather's good?",
                        "That's such a kind invitation! I'd genuinely love to join. Discussing literature with passionate readers always brings new perspectives I wouldn't have considered. Ishiguro is actually one of my favorites too - 'Never Let Me Go' was transformative for me. What time does the club meet?",
                    ),
                    "excellent",
                    10,
                ),
                option(
                    "option3-2",
                    k.pick(
                        "I've tried night photography but it's technically challenging. I appreciate the artistic aspects you mentioned though. Maybe we could discuss more over coffee sometime?",
                        "It was at Meadow Park. I'm not an expert hiker but I enjoyed it. A photography hike sounds interesting - I'd be up for that sometime.",
                        "A book club could be fun. I haven't read anything by those authors you mentioned, but I'd be open to checking them out. What time does it start?",
                    ),
                    "good",
                    7,
                ),
            ],
        ),
        // --- Terminal: outcomes, also the free-text fallbacks ---
        DialogueNode::terminal(
            "excellent",
            k.pick(
                "That sounds absolutely perfect! I love how passionate you are about photography. I'm free this Saturday evening for that photo walk if you are? And maybe we could grab a bite after to discuss our shots. Here's my number - text me and we can coordinate the details. I'm really looking forward to this!",
                "This weekend works perfectly! Let's plan for Saturday at 3pm - the lighting should be gorgeous then. I know a trail at Cedar Valley that has this amazing waterfall surrounded by rock formations. Let's exchange some of our favorite photography spots over dinner after the hike? I know a cozy place nearby.",
                "The club meets at 6:30pm. It's such a pleasure to meet another Ishiguro fan! I'm really looking forward to hearing your thoughts at the club. Would you like to exchange numbers so I can send you the details? Maybe we could even grab coffee before the meeting?",
            ),
        ),
        DialogueNode::terminal(
            "good",
            k.pick(
                "That sounds like a plan! I'd enjoy getting coffee and talking more about photography and travel. Are you free sometime this weekend?",
                "Thursday evening works for me! The new place on Elm Street? I've heard good things about it. Looking forward to it!",
                "The book club starts at 6:30pm. It's a friendly group, very welcoming to new members. Would you be interested in joining us this Saturday?",
            ),
        ),
        DialogueNode::terminal(
            "recovery",
            k.pick(
                "No worries! I actually love hiking too. What's your favorite trail? And regarding photography, I got into it during a trip to Iceland - the landscapes there practically demanded to be captured!",
                "Congratulations on the promotion! That's fantastic news. My photography session was great - I was capturing some urban landscapes downtown. Would you be up for celebrating your promotion with a drink this weekend?",
                "I completely understand reading slumps - they happen to all of us! I actually got into reading through my grandmother. She had this amazing collection of classics. What types of books usually help you get out of a reading slump?",
            ),
        ),
        DialogueNode::terminal(
            "negative-turn",
            k.pick(
                "I see. Well, I hope you've enjoyed all your travels.",
                "Okay, just let me know if you want to meet up.",
                "I understand being busy. Life gets that way sometimes.",
            ),
        ),
        DialogueNode::terminal(
            "dead-end",
            k.pick(
                "Cool. Well, good luck with that.",
                "Alright then. Take care.",
                "I see. Well, enjoy the book then.",
            ),
        ),
    ];

    Graph::new(nodes, START_NODE_ID)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_scenario_validates() {
        for kind in ScenarioKind::ALL {
            let graph = conversation_scenario(kind).unwrap();
            assert_eq!(graph.node_count(), 9, "{kind}");
            assert_eq!(graph.max_steps(), 2);
            // option3 (10) then option3-1 (10)
            assert_eq!(graph.max_score(), 20);
        }
    }

    #[test]
    fn test_scenario_lines_differ_by_kind() {
        let tinder = conversation_scenario(ScenarioKind::Tinder).unwrap();
        let irl = conversation_scenario(ScenarioKind::Irl).unwrap();
        assert_ne!(
            tinder.node("intro").unwrap().message,
            irl.node("intro").unwrap().message
        );
    }

    #[test]
    fn test_parse_kind() {
        assert_eq!("WhatsApp".parse::<ScenarioKind>().unwrap(), ScenarioKind::Whatsapp);
        assert_eq!(ScenarioKind::Irl.to_string(), "irl");
        assert!("bumble".parse::<ScenarioKind>().is_err());
    }

    #[test]
    fn test_profile() {
        let profile = Profile::for_scenario(ScenarioKind::Irl);
        assert_eq!(profile.name, "Olivia");
        assert_eq!(profile.interests.len(), 5);
        assert!(profile.scene(ScenarioKind::Irl).contains("Olivia reading"));
    }
}
