use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// How much a subject matters relative to the others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// How demanding the material of a subject is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}' (expected one of: {expected})")]
pub struct ParseLevelError {
    kind: &'static str,
    value: String,
    expected: &'static str,
}

impl ParseLevelError {
    pub(crate) fn new(kind: &'static str, value: &str, expected: &'static str) -> Self {
        Self {
            kind,
            value: value.to_string(),
            expected,
        }
    }
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl FromStr for Priority {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(ParseLevelError::new("priority", s, "low, medium, high")),
        }
    }
}

impl FromStr for Difficulty {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(ParseLevelError::new("difficulty", s, "easy, medium, hard")),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A topic with an exam date. Subjects are never edited after creation; they
/// are only added or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: String,
    pub name: String,
    pub priority: Priority,
    pub difficulty: Difficulty,
    pub exam_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl Subject {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        priority: Priority,
        difficulty: Difficulty,
        exam_date: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            priority,
            difficulty,
            exam_date,
            created_at: Utc::now(),
        }
    }
}

/// Input for creating a subject; the planner assigns the id and timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubject {
    pub name: String,
    #[serde(default = "default_priority")]
    pub priority: Priority,
    #[serde(default = "default_difficulty")]
    pub difficulty: Difficulty,
    pub exam_date: NaiveDate,
}

fn default_priority() -> Priority {
    Priority::Medium
}

fn default_difficulty() -> Difficulty {
    Difficulty::Medium
}

impl NewSubject {
    pub fn new(
        name: impl Into<String>,
        priority: Priority,
        difficulty: Difficulty,
        exam_date: NaiveDate,
    ) -> Self {
        Self {
            name: name.into(),
            priority,
            difficulty,
            exam_date,
        }
    }
}
