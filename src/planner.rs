use crate::config::{ConfigError, PlannerConfig};
use crate::generator::PlanGenerator;
use crate::persistence::{PersistenceError, PlannerStore};
use crate::plan::{ProgressSummary, StudyPlan};
use crate::range::{ViewMode, resolve_range};
use crate::reschedule::{RescheduleReport, Rescheduler};
use crate::subject::{NewSubject, Subject};
use crate::task::{StudyTask, TaskStatus};
use crate::validation::{self, ValidationError};
use chrono::{DateTime, Local, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type PlannerResult<T> = Result<T, PlannerError>;

/// Source of "today" and of creation timestamps.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
    fn now(&self) -> DateTime<Utc>;
}

/// Local calendar date, UTC timestamps.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

const NOON: NaiveTime = match NaiveTime::from_hms_opt(12, 0, 0) {
    Some(time) => time,
    None => panic!("12:00:00 is a valid time"),
};

/// Pinned to one day; timestamps fall at noon of that day.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    today: NaiveDate,
}

impl FixedClock {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.today
    }

    fn now(&self) -> DateTime<Utc> {
        self.today.and_time(NOON).and_utc()
    }
}

/// Result of a status change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub found: bool,
    /// Present when the change was to `skipped` and a reschedule pass ran.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rescheduled: Option<RescheduleReport>,
}

/// The tasks of one day inside a view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayAgenda {
    pub date: NaiveDate,
    pub tasks: Vec<StudyTask>,
    pub total_hours: f64,
    pub is_today: bool,
}

/// Subjects, their generated plan, and the store both are written through to.
pub struct StudyPlanner<S> {
    store: S,
    config: PlannerConfig,
    clock: Box<dyn Clock>,
    subjects: Vec<Subject>,
    plan: StudyPlan,
}

impl<S: PlannerStore> StudyPlanner<S> {
    /// Loads whatever the store holds; an empty store starts an empty planner.
    pub fn open(store: S, config: PlannerConfig, clock: impl Clock + 'static) -> PlannerResult<Self> {
        config.validate()?;
        let subjects = store.load_subjects()?;
        let plan = store.load_plan()?;
        info!(subjects = subjects.len(), tasks = plan.task_count(), "opened planner");
        Ok(Self {
            store,
            config,
            clock: Box::new(clock),
            subjects,
            plan,
        })
    }

    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    pub fn find_subject(&self, id: &str) -> Option<&Subject> {
        self.subjects.iter().find(|subject| subject.id == id)
    }

    pub fn plan(&self) -> &StudyPlan {
        &self.plan
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Adds a subject and rebuilds the whole plan.
    pub fn add_subject(&mut self, input: NewSubject) -> PlannerResult<Subject> {
        let today = self.today();
        let name = input.name.trim();
        if name.is_empty() {
            return Err(ValidationError::new("subject name must not be empty").into());
        }
        if input.exam_date < today {
            return Err(ValidationError::new(format!(
                "exam date {} is before today ({})",
                input.exam_date, today
            ))
            .into());
        }

        let subject = Subject {
            id: self.next_subject_id(),
            name: name.to_string(),
            priority: input.priority,
            difficulty: input.difficulty,
            exam_date: input.exam_date,
            created_at: self.clock.now(),
        };
        let mut subjects = self.subjects.clone();
        subjects.push(subject.clone());
        validation::validate_subjects(&subjects)?;

        self.commit_regenerated(subjects)?;
        info!(subject = %subject.id, name = %subject.name, "added subject");
        Ok(subject)
    }

    /// Removes a subject and rebuilds the plan from the remaining ones.
    /// Returns `false` when no subject has `id`.
    pub fn delete_subject(&mut self, id: &str) -> PlannerResult<bool> {
        let subjects: Vec<Subject> = self
            .subjects
            .iter()
            .filter(|subject| subject.id != id)
            .cloned()
            .collect();
        if subjects.len() == self.subjects.len() {
            return Ok(false);
        }
        self.commit_regenerated(subjects)?;
        info!(subject = %id, "deleted subject");
        Ok(true)
    }

    /// Replaces the plan with a fresh one built from the current subjects and
    /// persists both collections.
    pub fn regenerate(&mut self) -> PlannerResult<()> {
        self.commit_regenerated(self.subjects.clone())
    }

    /// Builds the plan for `subjects` and saves both; `self` only changes once
    /// both writes succeed.
    fn commit_regenerated(&mut self, subjects: Vec<Subject>) -> PlannerResult<()> {
        let plan = PlanGenerator::new(&self.config).generate(&subjects, self.today());
        self.store.save_subjects(&subjects)?;
        self.store.save_plan(&plan)?;
        self.subjects = subjects;
        self.plan = plan;
        Ok(())
    }

    /// Changes the status of a task. Skipping a task also carries every
    /// overdue skipped task forward.
    pub fn set_task_status(&mut self, task_id: &str, status: TaskStatus) -> PlannerResult<StatusUpdate> {
        let mut plan = self.plan.clone();
        if !plan.set_status(task_id, status) {
            return Ok(StatusUpdate::default());
        }

        let mut rescheduled = None;
        if status == TaskStatus::Skipped {
            let (next, report) = Rescheduler::new(&self.config).reschedule_with_report(
                &plan,
                &self.subjects,
                self.today(),
            );
            plan = next;
            rescheduled = Some(report);
        }

        self.store.save_plan(&plan)?;
        self.plan = plan;
        info!(task = %task_id, %status, "updated task status");
        Ok(StatusUpdate {
            found: true,
            rescheduled,
        })
    }

    /// Swaps in subjects and plan wholesale, e.g. from a snapshot file.
    pub fn replace_state(&mut self, subjects: Vec<Subject>, plan: StudyPlan) -> PlannerResult<()> {
        validation::validate_subjects(&subjects)?;
        validation::validate_plan(&plan)?;
        self.store.save_subjects(&subjects)?;
        self.store.save_plan(&plan)?;
        self.subjects = subjects;
        self.plan = plan;
        Ok(())
    }

    /// Swaps in a plan, keeping the subjects.
    pub fn replace_plan(&mut self, plan: StudyPlan) -> PlannerResult<()> {
        validation::validate_plan(&plan)?;
        self.store.save_plan(&plan)?;
        self.plan = plan;
        Ok(())
    }

    pub fn progress(&self) -> ProgressSummary {
        self.plan.progress()
    }

    /// Tasks per day for the view containing `reference`. Empty days are only
    /// listed in the daily view.
    pub fn agenda(&self, mode: ViewMode, reference: NaiveDate) -> Vec<DayAgenda> {
        let today = self.today();
        resolve_range(mode, reference)
            .days()
            .into_iter()
            .filter_map(|date| {
                let tasks = self.plan.tasks_on(date).to_vec();
                if tasks.is_empty() && mode != ViewMode::Daily {
                    return None;
                }
                let total_hours = tasks.iter().map(|task| task.hours).sum();
                Some(DayAgenda {
                    date,
                    tasks,
                    total_hours,
                    is_today: date == today,
                })
            })
            .collect()
    }

    /// Signed whole days until the subject's exam; negative once it has passed.
    pub fn days_until_exam(&self, subject: &Subject) -> i64 {
        subject.exam_date.signed_duration_since(self.today()).num_days()
    }

    fn next_subject_id(&self) -> String {
        let mut millis = self.clock.now().timestamp_millis();
        loop {
            let candidate = millis.to_string();
            if self.find_subject(&candidate).is_none() {
                return candidate;
            }
            millis += 1;
        }
    }
}
