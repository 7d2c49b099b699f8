use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, put},
};
use chrono::NaiveDate;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

use crate::{
    DateRange, DayAgenda, DynStore, NewSubject, PlannerError, ProgressSummary, StatusUpdate,
    StudyPlan, StudyPlanner, Subject, TaskStatus, ViewMode, resolve_range,
};

pub type SharedPlanner = Arc<RwLock<StudyPlanner<DynStore>>>;

#[derive(Clone)]
pub struct AppState {
    planner: SharedPlanner,
}

impl AppState {
    pub fn new(planner: StudyPlanner<DynStore>) -> Self {
        Self {
            planner: Arc::new(RwLock::new(planner)),
        }
    }

    pub fn with_shared(planner: SharedPlanner) -> Self {
        Self { planner }
    }

    fn planner(&self) -> SharedPlanner {
        self.planner.clone()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Invalid(String),
    Internal(String),
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }
}

impl From<PlannerError> for ApiError {
    fn from(value: PlannerError) -> Self {
        match value {
            PlannerError::Validation(err) => ApiError::Invalid(err.to_string()),
            other => {
                error!(error = %other, "planner operation failed");
                ApiError::Internal(other.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
            ApiError::Internal(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
            }
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct StatusPayload {
    status: TaskStatus,
}

#[derive(Debug, Deserialize)]
struct ViewQuery {
    #[serde(default)]
    mode: ViewMode,
    date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
struct ProgressBody {
    #[serde(flatten)]
    summary: ProgressSummary,
    completion_percent: f64,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/subjects", get(list_subjects).post(create_subject))
        .route("/subjects/:id", delete(delete_subject))
        .route("/plan", get(get_plan))
        .route("/tasks/:id/status", put(update_task_status))
        .route("/progress", get(get_progress))
        .route("/agenda", get(get_agenda))
        .route("/range", get(get_range))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, planner: StudyPlanner<DynStore>) -> std::io::Result<()> {
    let state = AppState::new(planner);
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn list_subjects(State(state): State<AppState>) -> Json<Vec<Subject>> {
    let planner = state.planner();
    let subjects = planner.read().subjects().to_vec();
    Json(subjects)
}

async fn create_subject(
    State(state): State<AppState>,
    Json(input): Json<NewSubject>,
) -> Result<(StatusCode, Json<Subject>), ApiError> {
    let planner = state.planner();
    let subject = planner.write().add_subject(input)?;
    Ok((StatusCode::CREATED, Json(subject)))
}

async fn delete_subject(
    State(state): State<AppState>,
    Path(subject_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let planner = state.planner();
    let removed = planner.write().delete_subject(&subject_id)?;
    if !removed {
        return Err(ApiError::not_found(format!("subject {subject_id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn get_plan(State(state): State<AppState>) -> Json<StudyPlan> {
    let planner = state.planner();
    let plan = planner.read().plan().clone();
    Json(plan)
}

async fn update_task_status(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    Json(payload): Json<StatusPayload>,
) -> Result<Json<StatusUpdate>, ApiError> {
    let planner = state.planner();
    let update = planner.write().set_task_status(&task_id, payload.status)?;
    if !update.found {
        return Err(ApiError::not_found(format!("task {task_id} not found")));
    }
    Ok(Json(update))
}

async fn get_progress(State(state): State<AppState>) -> Json<ProgressBody> {
    let planner = state.planner();
    let summary = planner.read().progress();
    Json(ProgressBody {
        completion_percent: summary.completion_percent(),
        summary,
    })
}

async fn get_agenda(
    State(state): State<AppState>,
    Query(query): Query<ViewQuery>,
) -> Json<Vec<DayAgenda>> {
    let planner = state.planner();
    let guard = planner.read();
    let reference = query.date.unwrap_or_else(|| guard.today());
    Json(guard.agenda(query.mode, reference))
}

async fn get_range(
    State(state): State<AppState>,
    Query(query): Query<ViewQuery>,
) -> Json<DateRange> {
    let reference = match query.date {
        Some(date) => date,
        None => state.planner().read().today(),
    };
    Json(resolve_range(query.mode, reference))
}
