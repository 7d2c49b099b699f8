use crate::plan::StudyPlan;
use crate::subject::Subject;
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub fn validate_subject(subject: &Subject) -> Result<(), ValidationError> {
    if subject.id.trim().is_empty() {
        return Err(ValidationError::new(format!(
            "subject '{}' has an empty id",
            subject.name
        )));
    }
    if subject.name.trim().is_empty() {
        return Err(ValidationError::new(format!(
            "subject {} has an empty name",
            subject.id
        )));
    }
    Ok(())
}

pub fn validate_subjects(subjects: &[Subject]) -> Result<(), ValidationError> {
    let mut seen_ids = HashSet::with_capacity(subjects.len());
    for subject in subjects {
        validate_subject(subject)?;
        if !seen_ids.insert(subject.id.as_str()) {
            return Err(ValidationError::new(format!(
                "duplicate subject id {}",
                subject.id
            )));
        }
    }
    Ok(())
}

/// Task ids are not required to be unique: older plans can hold several
/// carried copies under the same `-rescheduled` id.
pub fn validate_plan(plan: &StudyPlan) -> Result<(), ValidationError> {
    for (date, tasks) in plan.days() {
        for task in tasks {
            if task.date != *date {
                return Err(ValidationError::new(format!(
                    "task {} is dated {} but stored under {}",
                    task.id, task.date, date
                )));
            }
            if task.id.trim().is_empty() {
                return Err(ValidationError::new(format!(
                    "task on {} has an empty id",
                    date
                )));
            }
            if !task.hours.is_finite() || task.hours <= 0.0 {
                return Err(ValidationError::new(format!(
                    "task {} has invalid hours {} (must be positive)",
                    task.id, task.hours
                )));
            }
            if let Some(original) = task.original_date {
                if original >= task.date {
                    return Err(ValidationError::new(format!(
                        "task {} was rescheduled from {} which is not before {}",
                        task.id, original, task.date
                    )));
                }
            }
        }
    }
    Ok(())
}
