use super::{KeyValueStore, PersistenceError, PersistenceResult};
use crate::plan::StudyPlan;
use crate::subject::{Difficulty, Priority, Subject};
use crate::task::{DATE_FORMAT, StudyTask, TaskStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

/// Keeps each key in its own `<key>.json` file inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PersistenceResult<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(PersistenceError::InvalidData(format!(
                "invalid store key '{key}'"
            )));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> PersistenceResult<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> PersistenceResult<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;
        // Readers never see a half-written value.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

/// Subjects and plan together in one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlannerSnapshot {
    pub subjects: Vec<Subject>,
    #[serde(default)]
    pub plan: StudyPlan,
}

impl PlannerSnapshot {
    pub fn new(subjects: Vec<Subject>, plan: StudyPlan) -> Self {
        Self { subjects, plan }
    }

    fn validate(&self) -> PersistenceResult<()> {
        super::validate_subjects(&self.subjects)?;
        super::validate_plan(&self.plan)
    }
}

pub fn save_state_to_json<P: AsRef<Path>>(
    snapshot: &PlannerSnapshot,
    path: P,
) -> PersistenceResult<()> {
    snapshot.validate()?;
    let file = File::create(path.as_ref())?;
    serde_json::to_writer_pretty(file, snapshot)?;
    info!(path = %path.as_ref().display(), "saved planner snapshot");
    Ok(())
}

pub fn load_state_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<PlannerSnapshot> {
    let file = File::open(path)?;
    let snapshot: PlannerSnapshot = serde_json::from_reader(file)?;
    snapshot.validate()?;
    Ok(snapshot)
}

#[derive(Default, Serialize, Deserialize)]
struct TaskCsvRecord {
    id: String,
    subject_id: String,
    subject_name: String,
    date: String,
    hours: f64,
    status: String,
    priority: String,
    difficulty: String,
    #[serde(default)]
    original_date: String,
}

impl From<&StudyTask> for TaskCsvRecord {
    fn from(task: &StudyTask) -> Self {
        Self {
            id: task.id.clone(),
            subject_id: task.subject_id.clone(),
            subject_name: task.subject_name.clone(),
            date: format_date(Some(task.date)),
            hours: task.hours,
            status: task.status.as_str().to_string(),
            priority: task.priority.as_str().to_string(),
            difficulty: task.difficulty.as_str().to_string(),
            original_date: format_date(task.original_date),
        }
    }
}

impl TaskCsvRecord {
    fn into_task(self) -> PersistenceResult<StudyTask> {
        let date = parse_date(&self.date)?.ok_or_else(|| {
            PersistenceError::InvalidData(format!("task {} is missing a date", self.id))
        })?;
        Ok(StudyTask {
            date,
            hours: self.hours,
            status: parse_level::<TaskStatus>(&self.status)?,
            priority: parse_level::<Priority>(&self.priority)?,
            difficulty: parse_level::<Difficulty>(&self.difficulty)?,
            original_date: parse_date(&self.original_date)?,
            id: self.id,
            subject_id: self.subject_id,
            subject_name: self.subject_name,
        })
    }
}

/// One row per task, in plan order.
pub fn export_plan_to_csv<P: AsRef<Path>>(plan: &StudyPlan, path: P) -> PersistenceResult<()> {
    super::validate_plan(plan)?;
    let file = File::create(path.as_ref())?;
    let mut writer = csv::Writer::from_writer(file);
    for task in plan.tasks() {
        writer.serialize(TaskCsvRecord::from(task))?;
    }
    writer.flush()?;
    info!(path = %path.as_ref().display(), tasks = plan.task_count(), "exported plan to csv");
    Ok(())
}

pub fn import_plan_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<StudyPlan> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let mut plan = StudyPlan::new();
    for record in reader.deserialize::<TaskCsvRecord>() {
        plan.push(record?.into_task()?);
    }
    super::validate_plan(&plan)?;
    Ok(plan)
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}

fn parse_date(input: &str) -> PersistenceResult<Option<NaiveDate>> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT)
        .map(Some)
        .map_err(|e| PersistenceError::InvalidData(format!("invalid date '{input}': {e}")))
}

fn parse_level<T>(input: &str) -> PersistenceResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    input
        .parse::<T>()
        .map_err(|e| PersistenceError::InvalidData(e.to_string()))
}
