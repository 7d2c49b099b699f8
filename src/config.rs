use crate::subject::{Difficulty, Priority};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid config json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("config field {field} must be a positive number (got {value})")]
    NotPositive { field: &'static str, value: f64 },
}

/// Weight per priority level; multiplied into a subject's hour budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriorityWeights {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

/// Weight per difficulty level; multiplied into a subject's hour budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyWeights {
    pub easy: f64,
    pub medium: f64,
    pub hard: f64,
}

impl Default for PriorityWeights {
    fn default() -> Self {
        Self {
            low: 1.0,
            medium: 2.0,
            high: 3.0,
        }
    }
}

impl Default for DifficultyWeights {
    fn default() -> Self {
        Self {
            easy: 1.0,
            medium: 2.0,
            hard: 3.0,
        }
    }
}

impl PriorityWeights {
    pub fn weight(&self, priority: Priority) -> f64 {
        match priority {
            Priority::Low => self.low,
            Priority::Medium => self.medium,
            Priority::High => self.high,
        }
    }
}

impl DifficultyWeights {
    pub fn weight(&self, difficulty: Difficulty) -> f64 {
        match difficulty {
            Difficulty::Easy => self.easy,
            Difficulty::Medium => self.medium,
            Difficulty::Hard => self.hard,
        }
    }
}

/// Tunable constants of the planning heuristic. Every field falls back to the
/// stock value when missing from a config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// A day accepts a rescheduled session only while its hours are below this.
    pub daily_capacity_hours: f64,
    /// Total budget = difficulty weight * priority weight * this.
    pub base_hours_multiplier: f64,
    /// Floor for a single day's session length.
    pub min_session_hours: f64,
    pub priority_weights: PriorityWeights,
    pub difficulty_weights: DifficultyWeights,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            daily_capacity_hours: 8.0,
            base_hours_multiplier: 10.0,
            min_session_hours: 0.5,
            priority_weights: PriorityWeights::default(),
            difficulty_weights: DifficultyWeights::default(),
        }
    }
}

impl PlannerConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: PlannerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("daily_capacity_hours", self.daily_capacity_hours),
            ("base_hours_multiplier", self.base_hours_multiplier),
            ("min_session_hours", self.min_session_hours),
            ("priority_weights.low", self.priority_weights.low),
            ("priority_weights.medium", self.priority_weights.medium),
            ("priority_weights.high", self.priority_weights.high),
            ("difficulty_weights.easy", self.difficulty_weights.easy),
            ("difficulty_weights.medium", self.difficulty_weights.medium),
            ("difficulty_weights.hard", self.difficulty_weights.hard),
        ];
        for (field, value) in fields {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::NotPositive { field, value });
            }
        }
        Ok(())
    }

    /// Hour budget for a subject with the given levels.
    pub fn total_hours(&self, priority: Priority, difficulty: Difficulty) -> f64 {
        self.difficulty_weights.weight(difficulty)
            * self.priority_weights.weight(priority)
            * self.base_hours_multiplier
    }
}
