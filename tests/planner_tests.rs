use chrono::{Duration, NaiveDate, Timelike};
use study_planner::{
    ConfigError, Difficulty, FileStore, FixedClock, KeyValueStore, MemoryStore, NewSubject,
    PersistenceError, PlannerConfig, PlannerError, PlannerStore, Priority, StudyPlanner,
    TaskStatus, ViewMode,
};
use std::sync::atomic::{AtomicBool, Ordering};
use tempfile::tempdir;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn today() -> NaiveDate {
    d(2026, 3, 10)
}

fn memory_planner() -> StudyPlanner<MemoryStore> {
    StudyPlanner::open(MemoryStore::new(), PlannerConfig::default(), FixedClock::new(today()))
        .unwrap()
}

#[test]
fn adding_a_subject_generates_and_persists_the_plan() {
    let mut planner = memory_planner();

    let subject = planner
        .add_subject(NewSubject::new(
            "  Linear Algebra ",
            Priority::High,
            Difficulty::Hard,
            today() + Duration::days(9),
        ))
        .unwrap();

    assert_eq!(subject.name, "Linear Algebra");
    assert_eq!(subject.created_at.date_naive(), today());
    assert_eq!(subject.created_at.hour(), 12);
    assert_eq!(planner.plan().task_count(), 9);
    assert_eq!(planner.store().load_subjects().unwrap(), planner.subjects());
    assert_eq!(&planner.store().load_plan().unwrap(), planner.plan());
    assert_eq!(planner.days_until_exam(&subject), 9);
}

#[test]
fn subject_ids_are_unique_within_one_instant() {
    let mut planner = memory_planner();
    let exam = today() + Duration::days(5);

    let first = planner
        .add_subject(NewSubject::new("A", Priority::Low, Difficulty::Easy, exam))
        .unwrap();
    let second = planner
        .add_subject(NewSubject::new("B", Priority::Low, Difficulty::Easy, exam))
        .unwrap();

    assert_ne!(first.id, second.id);
    assert!(first.id.parse::<i64>().is_ok());
}

#[test]
fn invalid_subjects_are_rejected() {
    let mut planner = memory_planner();

    let blank = planner.add_subject(NewSubject::new(
        "   ",
        Priority::Low,
        Difficulty::Easy,
        today() + Duration::days(3),
    ));
    assert!(matches!(blank, Err(PlannerError::Validation(_))));

    let past = planner.add_subject(NewSubject::new(
        "Old",
        Priority::Low,
        Difficulty::Easy,
        today() - Duration::days(1),
    ));
    assert!(matches!(past, Err(PlannerError::Validation(_))));

    assert!(planner.subjects().is_empty());
    assert!(planner.plan().is_empty());
}

#[test]
fn exam_today_is_accepted() {
    let mut planner = memory_planner();
    planner
        .add_subject(NewSubject::new("Cram", Priority::Low, Difficulty::Easy, today()))
        .unwrap();
    assert_eq!(planner.plan().tasks_on(today()).len(), 1);
}

#[test]
fn deleting_a_subject_removes_its_tasks() {
    let mut planner = memory_planner();
    let exam = today() + Duration::days(6);
    let keep = planner
        .add_subject(NewSubject::new("Keep", Priority::Medium, Difficulty::Medium, exam))
        .unwrap();
    let dropped = planner
        .add_subject(NewSubject::new("Drop", Priority::High, Difficulty::Hard, exam))
        .unwrap();

    assert!(planner.delete_subject(&dropped.id).unwrap());
    assert!(!planner.delete_subject("missing").unwrap());

    assert!(planner.plan().tasks().all(|task| task.subject_id == keep.id));
    assert_eq!(planner.subjects().len(), 1);
    assert_eq!(planner.store().load_subjects().unwrap().len(), 1);
}

#[test]
fn regenerating_discards_status_changes() {
    let mut planner = memory_planner();
    let subject = planner
        .add_subject(NewSubject::new(
            "Chem",
            Priority::Medium,
            Difficulty::Medium,
            today() + Duration::days(4),
        ))
        .unwrap();
    let first_id = format!("{}-2026-03-10", subject.id);
    planner.set_task_status(&first_id, TaskStatus::Completed).unwrap();

    planner
        .add_subject(NewSubject::new(
            "Bio",
            Priority::Low,
            Difficulty::Easy,
            today() + Duration::days(4),
        ))
        .unwrap();

    let task = planner.plan().find_task(&first_id).unwrap();
    assert_eq!(task.status, TaskStatus::Pending);
}

#[test]
fn status_changes_are_saved_and_unknown_tasks_reported() {
    let mut planner = memory_planner();
    let subject = planner
        .add_subject(NewSubject::new(
            "Bio",
            Priority::Medium,
            Difficulty::Easy,
            today() + Duration::days(4),
        ))
        .unwrap();
    let id = format!("{}-2026-03-11", subject.id);

    let update = planner.set_task_status(&id, TaskStatus::Working).unwrap();
    assert!(update.found);
    assert!(update.rescheduled.is_none());
    let stored = planner.store().load_plan().unwrap();
    assert_eq!(stored.find_task(&id).unwrap().status, TaskStatus::Working);

    let missing = planner.set_task_status("nope", TaskStatus::Completed).unwrap();
    assert!(!missing.found);
}

#[test]
fn skipping_carries_overdue_work_to_the_first_open_day() {
    let dir = tempdir().unwrap();
    let day_one = today();
    let exam = day_one + Duration::days(9);

    let mut first = StudyPlanner::open(
        FileStore::new(dir.path()),
        PlannerConfig::default(),
        FixedClock::new(day_one),
    )
    .unwrap();
    let subject = first
        .add_subject(NewSubject::new("Calculus", Priority::High, Difficulty::Hard, exam))
        .unwrap();
    assert_eq!(first.plan().task_count(), 9);
    drop(first);

    // Next day: yesterday's session was not done.
    let day_two = day_one + Duration::days(1);
    let mut second = StudyPlanner::open(
        FileStore::new(dir.path()),
        PlannerConfig::default(),
        FixedClock::new(day_two),
    )
    .unwrap();
    let missed = format!("{}-2026-03-10", subject.id);
    let update = second.set_task_status(&missed, TaskStatus::Skipped).unwrap();

    let report = update.rescheduled.unwrap();
    assert_eq!(report.placed, 1);
    // Every day through 03-18 already holds 10h; the exam day is free.
    let carried = second
        .plan()
        .find_task(&format!("{}-2026-03-19-rescheduled", subject.id))
        .unwrap();
    assert_eq!(carried.date, exam);
    assert_eq!(carried.hours, 10.0);
    assert_eq!(carried.original_date, Some(day_one));
    assert_eq!(second.plan().task_count(), 10);

    // Skipping a session that is not yet overdue moves nothing new.
    let later = format!("{}-2026-03-12", subject.id);
    let update = second.set_task_status(&later, TaskStatus::Skipped).unwrap();
    let report = update.rescheduled.unwrap();
    assert_eq!(report.placed, 0);
    assert_eq!(report.already_carried, 1);
    assert_eq!(second.plan().task_count(), 10);

    let reopened = StudyPlanner::open(
        FileStore::new(dir.path()),
        PlannerConfig::default(),
        FixedClock::new(day_two),
    )
    .unwrap();
    assert_eq!(reopened.plan(), second.plan());
    assert_eq!(reopened.subjects(), second.subjects());
}

#[test]
fn progress_counts_hours_by_status() {
    let mut planner = memory_planner();
    let subject = planner
        .add_subject(NewSubject::new(
            "Art",
            Priority::Low,
            Difficulty::Easy,
            today() + Duration::days(4),
        ))
        .unwrap();
    planner
        .set_task_status(&format!("{}-2026-03-10", subject.id), TaskStatus::Completed)
        .unwrap();
    planner
        .set_task_status(&format!("{}-2026-03-11", subject.id), TaskStatus::Working)
        .unwrap();

    let progress = planner.progress();
    assert_eq!(progress.task_count, 4);
    assert_eq!(progress.completed, 1);
    assert_eq!(progress.working, 1);
    assert_eq!(progress.pending, 2);
    assert!((progress.total_hours - 10.0).abs() < 1e-9);
    assert!((progress.completed_hours - 2.5).abs() < 1e-9);
    assert!((progress.completion_percent() - 25.0).abs() < 1e-9);
}

#[test]
fn agenda_lists_empty_days_only_in_daily_view() {
    let mut planner = memory_planner();
    planner
        .add_subject(NewSubject::new(
            "Geo",
            Priority::Low,
            Difficulty::Easy,
            today() + Duration::days(2),
        ))
        .unwrap();

    let week = planner.agenda(ViewMode::Weekly, today());
    let dates: Vec<NaiveDate> = week.iter().map(|day| day.date).collect();
    assert_eq!(dates, vec![d(2026, 3, 10), d(2026, 3, 11)]);
    assert!(week[0].is_today);
    assert!((week[0].total_hours - 5.0).abs() < 1e-9);

    let empty_day = planner.agenda(ViewMode::Daily, d(2026, 3, 20));
    assert_eq!(empty_day.len(), 1);
    assert!(empty_day[0].tasks.is_empty());
    assert!(!empty_day[0].is_today);
}

#[test]
fn invalid_config_is_refused_on_open() {
    let config = PlannerConfig {
        daily_capacity_hours: 0.0,
        ..PlannerConfig::default()
    };
    let result = StudyPlanner::open(MemoryStore::new(), config, FixedClock::new(today()));
    assert!(matches!(
        result,
        Err(PlannerError::Config(ConfigError::NotPositive { .. }))
    ));
}

#[test]
fn corrupt_store_fails_to_open() {
    use study_planner::persistence::PLAN_KEY;

    let store = MemoryStore::new();
    store.set(PLAN_KEY, "[1, 2").unwrap();
    let result = StudyPlanner::open(store, PlannerConfig::default(), FixedClock::new(today()));
    assert!(matches!(result, Err(PlannerError::Persistence(_))));
}

/// Memory store whose writes can be switched off.
#[derive(Default)]
struct FlakyStore {
    inner: MemoryStore,
    failing: AtomicBool,
}

impl FlakyStore {
    fn fail_writes(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(PersistenceError::Io(std::io::Error::other("disk full")));
        }
        self.inner.set(key, value)
    }
}

#[test]
fn failed_save_leaves_planner_unchanged() {
    let mut planner = StudyPlanner::open(
        FlakyStore::default(),
        PlannerConfig::default(),
        FixedClock::new(today()),
    )
    .unwrap();
    let kept = planner
        .add_subject(NewSubject::new(
            "Physics",
            Priority::Medium,
            Difficulty::Medium,
            today() + Duration::days(5),
        ))
        .unwrap();
    let subjects_before = planner.subjects().to_vec();
    let plan_before = planner.plan().clone();

    planner.store().fail_writes();

    let added = planner.add_subject(NewSubject::new(
        "Biology",
        Priority::High,
        Difficulty::Hard,
        today() + Duration::days(9),
    ));
    assert!(matches!(added, Err(PlannerError::Persistence(_))));
    assert_eq!(planner.subjects(), subjects_before.as_slice());
    assert_eq!(planner.plan(), &plan_before);

    let deleted = planner.delete_subject(&kept.id);
    assert!(matches!(deleted, Err(PlannerError::Persistence(_))));
    assert_eq!(planner.subjects(), subjects_before.as_slice());
    assert_eq!(planner.plan(), &plan_before);

    assert!(planner.regenerate().is_err());
    assert_eq!(planner.plan(), &plan_before);
}
