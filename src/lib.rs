pub mod config;
pub mod frame;
pub mod generator;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod persistence;
pub mod plan;
pub mod planner;
pub mod range;
pub mod reschedule;
pub mod subject;
pub mod task;
pub mod validation;

pub use config::{ConfigError, DifficultyWeights, PlannerConfig, PriorityWeights};
pub use generator::{PlanGenerator, days_until_exam, generate_study_plan};
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqliteStore;
pub use persistence::{
    DynStore, FileStore, KeyValueStore, MemoryStore, PersistenceError, PlannerSnapshot, PlannerStore,
    export_plan_to_csv, import_plan_from_csv, load_state_from_json, save_state_to_json,
};
pub use plan::{ProgressSummary, StudyPlan};
pub use planner::{
    Clock, DayAgenda, FixedClock, PlannerError, StatusUpdate, StudyPlanner, SystemClock,
};
pub use range::{DateRange, Direction, ViewMode, navigate, resolve_range};
pub use reschedule::{RescheduleReport, Rescheduler, reschedule_skipped_tasks};
pub use subject::{Difficulty, NewSubject, ParseLevelError, Priority, Subject};
pub use task::{StudyTask, TaskStatus};
pub use validation::ValidationError;
