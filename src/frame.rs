//! Tabular views of a plan for rendering and ad-hoc analysis.

use crate::plan::StudyPlan;
use crate::task::{DATE_FORMAT, TaskStatus};
use polars::prelude::*;

/// One row per task in plan order.
pub fn plan_frame(plan: &StudyPlan) -> PolarsResult<DataFrame> {
    let mut dates = Vec::new();
    let mut ids = Vec::new();
    let mut subjects = Vec::new();
    let mut hours = Vec::new();
    let mut statuses = Vec::new();
    let mut priorities = Vec::new();
    let mut difficulties = Vec::new();
    let mut original_dates: Vec<Option<String>> = Vec::new();

    for task in plan.tasks() {
        dates.push(task.date.format(DATE_FORMAT).to_string());
        ids.push(task.id.clone());
        subjects.push(task.subject_name.clone());
        hours.push(task.hours);
        statuses.push(task.status.as_str());
        priorities.push(task.priority.as_str());
        difficulties.push(task.difficulty.as_str());
        original_dates.push(
            task.original_date
                .map(|d| d.format(DATE_FORMAT).to_string()),
        );
    }

    df!(
        "date" => dates,
        "task_id" => ids,
        "subject" => subjects,
        "hours" => hours,
        "status" => statuses,
        "priority" => priorities,
        "difficulty" => difficulties,
        "original_date" => original_dates,
    )
}

/// Hours and session counts per day, ascending by date.
pub fn daily_load(plan: &StudyPlan) -> PolarsResult<DataFrame> {
    plan_frame(plan)?
        .lazy()
        .group_by([col("date")])
        .agg([
            col("hours").sum().alias("total_hours"),
            col("task_id").count().alias("sessions"),
            col("hours")
                .filter(col("status").eq(lit(TaskStatus::Completed.as_str())))
                .sum()
                .alias("completed_hours"),
        ])
        .sort_by_exprs([col("date")], SortMultipleOptions::default())
        .collect()
}

/// Planned versus completed hours per subject, ascending by subject name.
pub fn subject_load(plan: &StudyPlan) -> PolarsResult<DataFrame> {
    plan_frame(plan)?
        .lazy()
        .group_by_stable([col("subject")])
        .agg([
            col("hours").sum().alias("planned_hours"),
            col("hours")
                .filter(col("status").eq(lit(TaskStatus::Completed.as_str())))
                .sum()
                .alias("completed_hours"),
            col("date").last().alias("last_session"),
        ])
        .sort_by_exprs([col("subject")], SortMultipleOptions::default())
        .collect()
}
