use crate::subject::{Difficulty, ParseLevelError, Priority, Subject};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";
const RESCHEDULED_SUFFIX: &str = "rescheduled";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Pending,
    Working,
    Completed,
    Skipped,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Pending,
        TaskStatus::Working,
        TaskStatus::Completed,
        TaskStatus::Skipped,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Working => "working",
            TaskStatus::Completed => "completed",
            TaskStatus::Skipped => "skipped",
        }
    }
}

impl FromStr for TaskStatus {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(TaskStatus::Pending),
            "working" => Ok(TaskStatus::Working),
            "completed" => Ok(TaskStatus::Completed),
            "skipped" => Ok(TaskStatus::Skipped),
            _ => Err(ParseLevelError::new(
                "status",
                s,
                "pending, working, completed, skipped",
            )),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// One day's study session for a subject.
///
/// The subject's name, priority and difficulty are copied in so a task still
/// renders after its subject is gone; `subject_id` is only used for lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyTask {
    pub id: String,
    pub subject_id: String,
    pub subject_name: String,
    pub date: NaiveDate,
    pub hours: f64,
    pub status: TaskStatus,
    pub priority: Priority,
    pub difficulty: Difficulty,
    /// Date of the skipped session this task was carried forward from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_date: Option<NaiveDate>,
}

impl StudyTask {
    /// A pending session for `subject` on `date`.
    pub fn for_subject(subject: &Subject, date: NaiveDate, hours: f64) -> Self {
        Self {
            id: Self::session_id(&subject.id, date),
            subject_id: subject.id.clone(),
            subject_name: subject.name.clone(),
            date,
            hours: round_hours(hours),
            status: TaskStatus::Pending,
            priority: subject.priority,
            difficulty: subject.difficulty,
            original_date: None,
        }
    }

    /// `{subject_id}-{YYYY-MM-DD}`
    pub fn session_id(subject_id: &str, date: NaiveDate) -> String {
        format!("{}-{}", subject_id, date.format(DATE_FORMAT))
    }

    /// `{subject_id}-{YYYY-MM-DD}-rescheduled`
    pub fn rescheduled_id(subject_id: &str, date: NaiveDate) -> String {
        format!("{}-{}", Self::session_id(subject_id, date), RESCHEDULED_SUFFIX)
    }

    /// Copy of this task moved to `date`: pending again and remembering where
    /// it came from. The caller is responsible for making `id` unique.
    pub fn carried_to(&self, date: NaiveDate, id: String) -> Self {
        Self {
            id,
            date,
            status: TaskStatus::Pending,
            original_date: Some(self.date),
            ..self.clone()
        }
    }

    pub fn is_rescheduled(&self) -> bool {
        self.original_date.is_some()
    }
}

/// Round to one decimal place.
pub fn round_hours(hours: f64) -> f64 {
    (hours * 10.0).round() / 10.0
}
