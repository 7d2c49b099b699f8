use crate::task::{StudyTask, TaskStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map;

/// Tasks bucketed by calendar day. Buckets iterate in ascending date order and
/// serialize as an object keyed by `YYYY-MM-DD`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudyPlan {
    days: BTreeMap<NaiveDate, Vec<StudyTask>>,
}

/// Aggregate counts over every task in a plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressSummary {
    pub task_count: usize,
    pub completed: usize,
    pub working: usize,
    pub pending: usize,
    pub skipped: usize,
    pub total_hours: f64,
    pub completed_hours: f64,
}

impl ProgressSummary {
    /// Completed hours as a percentage of all planned hours.
    pub fn completion_percent(&self) -> f64 {
        if self.total_hours > 0.0 {
            self.completed_hours / self.total_hours * 100.0
        } else {
            0.0
        }
    }

    pub fn to_cli_summary(&self) -> String {
        format!(
            "progress={:.1}%, completed={}, working={}, pending={}, skipped={}, hours_done={:.1}/{:.1}",
            self.completion_percent(),
            self.completed,
            self.working,
            self.pending,
            self.skipped,
            self.completed_hours,
            self.total_hours
        )
    }
}

impl StudyPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `task` to the bucket for its own date.
    pub fn push(&mut self, task: StudyTask) {
        self.days.entry(task.date).or_default().push(task);
    }

    pub fn tasks_on(&self, date: NaiveDate) -> &[StudyTask] {
        self.days.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Sum of the hours already allocated on `date`.
    pub fn hours_on(&self, date: NaiveDate) -> f64 {
        self.tasks_on(date).iter().map(|task| task.hours).sum()
    }

    pub fn days(&self) -> btree_map::Iter<'_, NaiveDate, Vec<StudyTask>> {
        self.days.iter()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.days.keys().copied()
    }

    /// Every task, in date order then bucket order.
    pub fn tasks(&self) -> impl Iterator<Item = &StudyTask> {
        self.days.values().flatten()
    }

    pub fn task_count(&self) -> usize {
        self.days.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.task_count() == 0
    }

    pub fn contains_task(&self, task_id: &str) -> bool {
        self.tasks().any(|task| task.id == task_id)
    }

    pub fn find_task(&self, task_id: &str) -> Option<&StudyTask> {
        self.tasks().find(|task| task.id == task_id)
    }

    /// Set the status of every task with `task_id`. Returns whether any task
    /// matched.
    pub fn set_status(&mut self, task_id: &str, status: TaskStatus) -> bool {
        let mut found = false;
        for task in self.days.values_mut().flatten() {
            if task.id == task_id {
                task.status = status;
                found = true;
            }
        }
        found
    }

    pub fn total_hours(&self) -> f64 {
        self.tasks().map(|task| task.hours).sum()
    }

    pub fn progress(&self) -> ProgressSummary {
        let mut summary = ProgressSummary::default();
        for task in self.tasks() {
            summary.task_count += 1;
            summary.total_hours += task.hours;
            match task.status {
                TaskStatus::Completed => {
                    summary.completed += 1;
                    summary.completed_hours += task.hours;
                }
                TaskStatus::Working => summary.working += 1,
                TaskStatus::Pending => summary.pending += 1,
                TaskStatus::Skipped => summary.skipped += 1,
            }
        }
        summary
    }
}

impl FromIterator<StudyTask> for StudyPlan {
    fn from_iter<I: IntoIterator<Item = StudyTask>>(iter: I) -> Self {
        let mut plan = StudyPlan::new();
        for task in iter {
            plan.push(task);
        }
        plan
    }
}
