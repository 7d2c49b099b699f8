use crate::config::PlannerConfig;
use crate::plan::StudyPlan;
use crate::subject::Subject;
use crate::task::StudyTask;
use chrono::{Duration, NaiveDate};
use tracing::{debug, info};

/// Remaining hours at or below this are treated as fully scheduled.
const HOURS_EPSILON: f64 = 1e-6;

/// Spreads each subject's hour budget evenly over the days left before its
/// exam.
pub struct PlanGenerator<'a> {
    config: &'a PlannerConfig,
}

impl<'a> PlanGenerator<'a> {
    pub fn new(config: &'a PlannerConfig) -> Self {
        Self { config }
    }

    /// Builds a fresh plan for `subjects` starting on `today`.
    pub fn generate(&self, subjects: &[Subject], today: NaiveDate) -> StudyPlan {
        let mut plan = StudyPlan::new();
        for subject in subjects {
            for task in self.sessions_for(subject, today) {
                plan.push(task);
            }
        }
        info!(
            subjects = subjects.len(),
            tasks = plan.task_count(),
            %today,
            "generated study plan"
        );
        plan
    }

    /// The sessions one subject contributes, in date order.
    pub fn sessions_for(&self, subject: &Subject, today: NaiveDate) -> Vec<StudyTask> {
        let days = days_until_exam(subject.exam_date, today);
        let total_hours = self.config.total_hours(subject.priority, subject.difficulty);
        let hours_per_day = (total_hours / days as f64).max(self.config.min_session_hours);

        let mut sessions = Vec::new();
        let mut remaining = total_hours;
        let mut current = today;
        while remaining > HOURS_EPSILON && current <= subject.exam_date {
            let session = hours_per_day.min(remaining);
            let task = StudyTask::for_subject(subject, current, session);
            // A remainder that rounds to 0.0h is not worth a session.
            if task.hours <= 0.0 {
                break;
            }
            sessions.push(task);
            remaining -= session;
            current = current + Duration::days(1);
        }

        debug!(
            subject = %subject.id,
            days_until_exam = days,
            total_hours,
            hours_per_day,
            sessions = sessions.len(),
            "allocated subject sessions"
        );
        sessions
    }
}

/// Whole calendar days from `today` to the exam, never less than one.
pub fn days_until_exam(exam_date: NaiveDate, today: NaiveDate) -> i64 {
    exam_date.signed_duration_since(today).num_days().max(1)
}

/// Generates a plan with the stock heuristic constants.
pub fn generate_study_plan(subjects: &[Subject], today: NaiveDate) -> StudyPlan {
    let config = PlannerConfig::default();
    PlanGenerator::new(&config).generate(subjects, today)
}
