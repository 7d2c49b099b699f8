use crate::plan::StudyPlan;
use crate::subject::Subject;
use crate::validation::{self, ValidationError};
use serde_json::Error as SerdeJsonError;
use std::collections::HashMap;
use std::io;
use std::sync::Mutex;
use thiserror::Error;
use tracing::{debug, info};

pub const SUBJECTS_KEY: &str = "study-planner-subjects";
pub const PLAN_KEY: &str = "study-planner-plan";

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("serialization error: {0}")]
    Serialization(#[from] SerdeJsonError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid data: {0}")]
    InvalidData(String),
    #[error("store lock poisoned")]
    Lock,
}

impl From<ValidationError> for PersistenceError {
    fn from(value: ValidationError) -> Self {
        Self::InvalidData(value.to_string())
    }
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// String blobs under string keys. Writes replace the whole value.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> PersistenceResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> PersistenceResult<()>;
}

/// Boxed store, for callers that pick a backend at runtime.
pub type DynStore = Box<dyn KeyValueStore + Send + Sync>;

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get(&self, key: &str) -> PersistenceResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> PersistenceResult<()> {
        (**self).set(key, value)
    }
}

/// Typed access to the two collections the planner keeps. Loads validate the
/// decoded data; a missing key reads as an empty collection.
pub trait PlannerStore {
    fn load_subjects(&self) -> PersistenceResult<Vec<Subject>>;
    fn save_subjects(&self, subjects: &[Subject]) -> PersistenceResult<()>;
    fn load_plan(&self) -> PersistenceResult<StudyPlan>;
    fn save_plan(&self, plan: &StudyPlan) -> PersistenceResult<()>;
}

impl<S: KeyValueStore + ?Sized> PlannerStore for S {
    fn load_subjects(&self) -> PersistenceResult<Vec<Subject>> {
        let Some(json) = self.get(SUBJECTS_KEY)? else {
            debug!(key = SUBJECTS_KEY, "no stored subjects");
            return Ok(Vec::new());
        };
        let subjects: Vec<Subject> = serde_json::from_str(&json)?;
        validate_subjects(&subjects)?;
        Ok(subjects)
    }

    fn save_subjects(&self, subjects: &[Subject]) -> PersistenceResult<()> {
        validate_subjects(subjects)?;
        let json = serde_json::to_string(subjects)?;
        self.set(SUBJECTS_KEY, &json)?;
        info!(count = subjects.len(), "saved subjects");
        Ok(())
    }

    fn load_plan(&self) -> PersistenceResult<StudyPlan> {
        let Some(json) = self.get(PLAN_KEY)? else {
            debug!(key = PLAN_KEY, "no stored plan");
            return Ok(StudyPlan::new());
        };
        let plan: StudyPlan = serde_json::from_str(&json)?;
        validate_plan(&plan)?;
        Ok(plan)
    }

    fn save_plan(&self, plan: &StudyPlan) -> PersistenceResult<()> {
        validate_plan(plan)?;
        let json = serde_json::to_string(plan)?;
        self.set(PLAN_KEY, &json)?;
        info!(tasks = plan.task_count(), "saved plan");
        Ok(())
    }
}

pub fn validate_subjects(subjects: &[Subject]) -> PersistenceResult<()> {
    validation::validate_subjects(subjects).map_err(PersistenceError::from)
}

pub fn validate_plan(plan: &StudyPlan) -> PersistenceResult<()> {
    validation::validate_plan(plan).map_err(PersistenceError::from)
}

/// Process-local store, handy for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> PersistenceResult<Option<String>> {
        let entries = self.entries.lock().map_err(|_| PersistenceError::Lock)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> PersistenceResult<()> {
        let mut entries = self.entries.lock().map_err(|_| PersistenceError::Lock)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

pub mod file;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::{
    FileStore, PlannerSnapshot, export_plan_to_csv, import_plan_from_csv, load_state_from_json,
    save_state_to_json,
};
