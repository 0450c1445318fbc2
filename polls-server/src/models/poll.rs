//! Poll creation input

use chrono::Duration;

use super::validation::check_length;
use super::ValidationError;

const QUESTION_MAX_LEN: usize = 140;
const CHOICE_MAX_LEN: usize = 40;
const MAX_CHOICES: usize = 6;
const MAX_DAYS: u32 = 7;
const MAX_HOURS: u32 = 23;

/// Validated poll question
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question(String);

impl Question {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let s = s.trim();
        check_length("question", s, 1, QUESTION_MAX_LEN)?;
        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Validated choice text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceText(String);

impl ChoiceText {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let s = s.trim();
        check_length("choice", s, 1, CHOICE_MAX_LEN)?;
        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// How long a poll stays open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollLength {
    days: u32,
    hours: u32,
}

impl PollLength {
    /// Days in `0..=7`, hours in `0..=23`, and the total must be non-zero so
    /// that expiration lands strictly after creation.
    pub fn new(days: i64, hours: i64) -> Result<Self, ValidationError> {
        if !(0..=i64::from(MAX_DAYS)).contains(&days) {
            return Err(ValidationError::OutOfRange {
                field: "pollLength.days",
                min: 0,
                max: i64::from(MAX_DAYS),
                value: days,
            });
        }
        if !(0..=i64::from(MAX_HOURS)).contains(&hours) {
            return Err(ValidationError::OutOfRange {
                field: "pollLength.hours",
                min: 0,
                max: i64::from(MAX_HOURS),
                value: hours,
            });
        }
        if days == 0 && hours == 0 {
            return Err(ValidationError::InvalidFormat {
                field: "pollLength",
                reason: "poll must stay open for at least one hour",
            });
        }

        Ok(Self {
            days: days as u32,
            hours: hours as u32,
        })
    }

    pub fn duration(&self) -> Duration {
        Duration::days(i64::from(self.days)) + Duration::hours(i64::from(self.hours))
    }
}

/// Fully validated poll creation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollDraft {
    pub question: Question,
    pub choices: Vec<ChoiceText>,
    pub length: PollLength,
}

impl PollDraft {
    pub fn new<'a>(
        question: &str,
        choices: impl IntoIterator<Item = &'a str>,
        days: i64,
        hours: i64,
    ) -> Result<Self, ValidationError> {
        let question = Question::new(question)?;
        let choices = choices
            .into_iter()
            .map(ChoiceText::new)
            .collect::<Result<Vec<_>, _>>()?;

        if choices.is_empty() {
            return Err(ValidationError::Empty { field: "choices" });
        }
        if choices.len() > MAX_CHOICES {
            return Err(ValidationError::OutOfRange {
                field: "choices",
                min: 1,
                max: MAX_CHOICES as i64,
                value: choices.len() as i64,
            });
        }

        Ok(Self {
            question,
            choices,
            length: PollLength::new(days, hours)?,
        })
    }
}
