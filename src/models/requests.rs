use crate::models::domain::{Level, UserConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use validator::{Validate, ValidationError};

/// Request to update a participant's configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateConfigRequest {
    #[validate(length(min = 1, max = 100))]
    #[serde(default)]
    pub name: Option<String>,
    #[validate(email)]
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub comments: String,
    #[validate(length(min = 1))]
    pub environment: String,
    pub experience: Level,
    #[validate(length(min = 1))]
    #[serde(alias = "question_list", rename = "questionList")]
    pub question_list: String,
    #[validate(length(min = 1))]
    pub topics: Vec<String>,
    #[validate(custom(function = "validate_weekdays"))]
    #[serde(default, alias = "solo_days", rename = "soloDays")]
    pub solo_days: Vec<String>,
    #[validate(length(min = 1))]
    #[serde(alias = "solo_difficulty", rename = "soloDifficulty")]
    pub solo_difficulty: BTreeSet<Level>,
    #[validate(length(min = 1))]
    #[serde(alias = "pairing_difficulty", rename = "pairingDifficulty")]
    pub pairing_difficulty: BTreeSet<Level>,
    #[serde(default, alias = "manual_question", rename = "manualQuestion")]
    pub manual_question: bool,
}

impl UpdateConfigRequest {
    pub fn to_config(&self) -> UserConfig {
        UserConfig {
            comments: if self.comments.is_empty() {
                "N/A".to_string()
            } else {
                self.comments.clone()
            },
            environment: self.environment.clone(),
            experience: self.experience,
            question_list: self.question_list.clone(),
            topics: self.topics.clone(),
            solo_days: self.solo_days.clone(),
            solo_difficulty: self.solo_difficulty.clone(),
            pairing_difficulty: self.pairing_difficulty.clone(),
            manual_question: self.manual_question,
        }
    }
}

/// Request to opt in or out of tomorrow's activities
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateScheduleRequest {
    #[serde(default, alias = "is_pairing_tomorrow", rename = "isPairingTomorrow")]
    pub is_pairing_tomorrow: Option<bool>,
    #[serde(default, alias = "is_skipping_tomorrow", rename = "isSkippingTomorrow")]
    pub is_skipping_tomorrow: Option<bool>,
}

const WEEKDAYS: [&str; 7] = ["mon", "tue", "wed", "thu", "fri", "sat", "sun"];

fn validate_weekdays(days: &Vec<String>) -> Result<(), ValidationError> {
    if days.iter().all(|d| WEEKDAYS.contains(&d.as_str())) {
        Ok(())
    } else {
        Err(ValidationError::new("unknown_weekday"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> UpdateConfigRequest {
        UpdateConfigRequest {
            name: None,
            email: None,
            comments: String::new(),
            environment: "leetcode".to_string(),
            experience: Level::Medium,
            question_list: "topInterviewQuestions".to_string(),
            topics: vec!["arrays".to_string()],
            solo_days: vec!["mon".to_string(), "fri".to_string()],
            solo_difficulty: [Level::Easy].into_iter().collect(),
            pairing_difficulty: [Level::Medium].into_iter().collect(),
            manual_question: false,
        }
    }

    #[test]
    fn test_valid_request() {
        assert!(valid_request().validate().is_ok());
    }

    #[test]
    fn test_empty_pairing_difficulty_rejected() {
        let mut req = valid_request();
        req.pairing_difficulty.clear();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_unknown_weekday_rejected() {
        let mut req = valid_request();
        req.solo_days.push("someday".to_string());
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_to_config_fills_comments() {
        let config = valid_request().to_config();
        assert_eq!(config.comments, "N/A");
        assert_eq!(config.topics, vec!["arrays"]);
    }
}
