use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Difficulty / experience level, totally ordered easy < medium < hard
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Easy,
    Medium,
    Hard,
}

impl Level {
    /// Ordinal value used by the compatibility rule
    pub fn ordinal(self) -> u8 {
        match self {
            Level::Easy => 0,
            Level::Medium => 1,
            Level::Hard => 2,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Level::Easy => "easy",
            Level::Medium => "medium",
            Level::Hard => "hard",
        };
        f.write_str(name)
    }
}

/// One candidate for today's pairing run
///
/// Snapshotted before the run starts; the engine never mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: String,
    /// Contact handle, opaque to the matching logic
    pub email: String,
    pub experience: Level,
    #[serde(rename = "pairingDifficulty")]
    pub pairing_difficulty: BTreeSet<Level>,
}

impl Participant {
    pub fn new(
        id: impl Into<String>,
        email: impl Into<String>,
        experience: Level,
        pairing_difficulty: impl IntoIterator<Item = Level>,
    ) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            experience,
            pairing_difficulty: pairing_difficulty.into_iter().collect(),
        }
    }

    /// Lowest level this participant is willing to pair on
    pub fn min_preference(&self) -> Option<Level> {
        self.pairing_difficulty.first().copied()
    }
}

/// Per-user configuration as edited through the config endpoint
///
/// Missing fields fall back to the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserConfig {
    pub comments: String,
    pub environment: String,
    pub experience: Level,
    #[serde(rename = "questionList")]
    pub question_list: String,
    pub topics: Vec<String>,
    #[serde(rename = "soloDays")]
    pub solo_days: Vec<String>,
    #[serde(rename = "soloDifficulty")]
    pub solo_difficulty: BTreeSet<Level>,
    #[serde(rename = "pairingDifficulty")]
    pub pairing_difficulty: BTreeSet<Level>,
    #[serde(rename = "manualQuestion")]
    pub manual_question: bool,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            comments: "N/A".to_string(),
            environment: "leetcode".to_string(),
            experience: Level::Medium,
            question_list: "topInterviewQuestions".to_string(),
            topics: vec![],
            solo_days: ["mon", "tue", "wed", "thu", "fri"]
                .iter()
                .map(|d| d.to_string())
                .collect(),
            solo_difficulty: [Level::Easy, Level::Medium].into_iter().collect(),
            pairing_difficulty: [Level::Easy, Level::Medium].into_iter().collect(),
            manual_question: false,
        }
    }
}

/// Stored profile for one user of the bot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(rename = "isSkippingTomorrow", default)]
    pub is_skipping_tomorrow: bool,
    #[serde(rename = "isPairingTomorrow", default)]
    pub is_pairing_tomorrow: bool,
    #[serde(default)]
    pub config: UserConfig,
}

impl Profile {
    pub fn new(id: impl Into<String>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            is_skipping_tomorrow: false,
            is_pairing_tomorrow: false,
            config: UserConfig::default(),
        }
    }

    /// Whether every field the bot relies on has been filled in
    pub fn is_configured(&self) -> bool {
        !self.config.environment.is_empty()
            && !self.config.question_list.is_empty()
            && !self.config.topics.is_empty()
            && !self.config.solo_difficulty.is_empty()
            && !self.config.pairing_difficulty.is_empty()
    }

    /// Whether the solo question should go out on the given weekday (`mon`..`sun`)
    pub fn is_solo_on(&self, weekday: &str) -> bool {
        !self.is_skipping_tomorrow && self.config.solo_days.iter().any(|d| d == weekday)
    }

    /// Snapshot this profile for a matching run
    ///
    /// Returns `None` for unconfigured profiles, which must never reach the engine.
    pub fn to_participant(&self) -> Option<Participant> {
        if !self.is_configured() {
            return None;
        }

        Some(Participant {
            id: self.id.clone(),
            email: self.email.clone(),
            experience: self.config.experience,
            pairing_difficulty: self.config.pairing_difficulty.clone(),
        })
    }
}

/// Two participants delivered together
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pair {
    pub first: Participant,
    pub second: Participant,
    /// Whether the compatibility rule accepted this pair; informational only
    pub compatible: bool,
}

/// Partitioned outcome of a matching run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pairing {
    pub pairs: Vec<Pair>,
    pub leftover: Option<Participant>,
}
