use crate::config::PlannerConfig;
use crate::plan::StudyPlan;
use crate::subject::Subject;
use crate::task::{StudyTask, TaskStatus};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// What happened to the overdue skipped tasks found in one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RescheduleReport {
    pub placed: usize,
    pub no_capacity: usize,
    pub orphaned: usize,
    pub already_carried: usize,
}

impl RescheduleReport {
    pub fn to_cli_summary(&self) -> String {
        let mut parts = vec![format!("rescheduled={}", self.placed)];
        if self.no_capacity > 0 {
            parts.push(format!("no_capacity={}", self.no_capacity));
        }
        if self.orphaned > 0 {
            parts.push(format!("orphaned={}", self.orphaned));
        }
        if self.already_carried > 0 {
            parts.push(format!("already_carried={}", self.already_carried));
        }
        parts.join(", ")
    }
}

/// Carries overdue skipped sessions forward to the first day with spare
/// capacity before the subject's exam. Originals are left where they are.
pub struct Rescheduler<'a> {
    config: &'a PlannerConfig,
}

impl<'a> Rescheduler<'a> {
    pub fn new(config: &'a PlannerConfig) -> Self {
        Self { config }
    }

    pub fn reschedule(&self, plan: &StudyPlan, subjects: &[Subject], today: NaiveDate) -> StudyPlan {
        self.reschedule_with_report(plan, subjects, today).0
    }

    pub fn reschedule_with_report(
        &self,
        plan: &StudyPlan,
        subjects: &[Subject],
        today: NaiveDate,
    ) -> (StudyPlan, RescheduleReport) {
        let mut plan = plan.clone();
        let mut report = RescheduleReport::default();

        // Placements always land on or after today, so the overdue set cannot
        // change while we add to the plan.
        let overdue: Vec<StudyTask> = plan
            .tasks()
            .filter(|task| task.status == TaskStatus::Skipped && task.date < today)
            .cloned()
            .collect();
        let mut carried = existing_carries(&plan);

        for skipped in overdue {
            let Some(subject) = subjects.iter().find(|s| s.id == skipped.subject_id) else {
                debug!(task = %skipped.id, "subject no longer exists; leaving skipped task in place");
                report.orphaned += 1;
                continue;
            };

            let key = (skipped.subject_id.clone(), skipped.date);
            if let Some(remaining) = carried.get_mut(&key).filter(|n| **n > 0) {
                *remaining -= 1;
                report.already_carried += 1;
                continue;
            }

            match self.first_open_day(&plan, today, subject.exam_date) {
                Some(date) => {
                    let id = unique_task_id(&plan, StudyTask::rescheduled_id(&skipped.subject_id, date));
                    debug!(task = %skipped.id, new_task = %id, %date, hours = skipped.hours, "carried skipped task forward");
                    plan.push(skipped.carried_to(date, id));
                    report.placed += 1;
                }
                None => {
                    warn!(
                        task = %skipped.id,
                        exam_date = %subject.exam_date,
                        "no day with spare capacity before exam; dropping reschedule"
                    );
                    report.no_capacity += 1;
                }
            }
        }

        info!(
            placed = report.placed,
            no_capacity = report.no_capacity,
            orphaned = report.orphaned,
            already_carried = report.already_carried,
            "rescheduled skipped tasks"
        );
        (plan, report)
    }

    fn first_open_day(&self, plan: &StudyPlan, today: NaiveDate, exam_date: NaiveDate) -> Option<NaiveDate> {
        let mut date = today;
        while date <= exam_date {
            if plan.hours_on(date) < self.config.daily_capacity_hours {
                return Some(date);
            }
            date = date + Duration::days(1);
        }
        None
    }
}

/// Carried-forward copies already in the plan, counted per (subject, original date).
fn existing_carries(plan: &StudyPlan) -> HashMap<(String, NaiveDate), usize> {
    let mut carried = HashMap::new();
    for task in plan.tasks() {
        if let Some(original) = task.original_date {
            *carried.entry((task.subject_id.clone(), original)).or_insert(0) += 1;
        }
    }
    carried
}

fn unique_task_id(plan: &StudyPlan, base: String) -> String {
    if !plan.contains_task(&base) {
        return base;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{base}-{n}");
        if !plan.contains_task(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// Reschedules with the stock heuristic constants.
pub fn reschedule_skipped_tasks(plan: &StudyPlan, subjects: &[Subject], today: NaiveDate) -> StudyPlan {
    let config = PlannerConfig::default();
    Rescheduler::new(&config).reschedule(plan, subjects, today)
}
