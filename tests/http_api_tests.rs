#![cfg(feature = "http_api")]

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
};
use chrono::{Duration, NaiveDate};
use serde_json::{Value, json};
use study_planner::{
    DynStore, FixedClock, MemoryStore, PlannerConfig, StatusUpdate, StudyPlan, StudyPlanner,
    Subject, TaskStatus, http_api,
};
use tower::util::ServiceExt;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
}

fn new_router() -> axum::Router {
    let store: DynStore = Box::new(MemoryStore::new());
    let planner =
        StudyPlanner::open(store, PlannerConfig::default(), FixedClock::new(today())).unwrap();
    let state = http_api::AppState::new(planner);
    http_api::router(state)
}

fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn read_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn subject_lifecycle_via_http_api() {
    let app = new_router();
    let exam = today() + Duration::days(9);

    // Create subject
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/subjects",
            &json!({
                "name": "Organic Chemistry",
                "priority": "high",
                "difficulty": "hard",
                "examDate": exam.to_string(),
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let subject: Subject = read_json(response).await;
    assert_eq!(subject.name, "Organic Chemistry");

    // Plan holds nine 10h sessions
    let response = app.clone().oneshot(get("/plan")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let plan: StudyPlan = read_json(response).await;
    assert_eq!(plan.task_count(), 9);
    assert!(plan.tasks().all(|task| task.hours == 10.0));

    // Complete the first session
    let task_id = format!("{}-2026-03-10", subject.id);
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/tasks/{task_id}/status"),
            &json!({ "status": "completed" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let update: StatusUpdate = read_json(response).await;
    assert!(update.found);

    let response = app.clone().oneshot(get("/progress")).await.unwrap();
    let progress: Value = read_json(response).await;
    assert_eq!(progress["completed"], 1);
    assert_eq!(progress["pending"], 8);
    assert!((progress["completion_percent"].as_f64().unwrap() - 100.0 / 9.0).abs() < 1e-9);

    // Delete the subject
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/subjects/{}", subject.id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.clone().oneshot(get("/plan")).await.unwrap();
    let plan: StudyPlan = read_json(response).await;
    assert!(plan.is_empty());

    let response = app.oneshot(get("/subjects")).await.unwrap();
    let subjects: Vec<Subject> = read_json(response).await;
    assert!(subjects.is_empty());
}

#[tokio::test]
async fn invalid_subject_is_a_bad_request() {
    let app = new_router();
    let response = app
        .oneshot(json_request(
            "POST",
            "/subjects",
            &json!({ "name": "  ", "examDate": "2026-04-01" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = read_json(response).await;
    assert_eq!(body["error"], "invalid_request");
}

#[tokio::test]
async fn unknown_ids_are_not_found() {
    let app = new_router();

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/tasks/missing/status",
            &json!({ "status": "skipped" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = read_json(response).await;
    assert_eq!(body["error"], "not_found");

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/subjects/missing")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn agenda_and_range_follow_the_view_mode() {
    let app = new_router();
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/subjects",
            &json!({
                "name": "Geography",
                "priority": "low",
                "difficulty": "easy",
                "examDate": "2026-03-12",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(get("/agenda?mode=weekly&date=2026-03-11"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let agenda: Value = read_json(response).await;
    let days = agenda.as_array().unwrap();
    assert_eq!(days.len(), 2);
    assert_eq!(days[0]["date"], "2026-03-10");
    assert_eq!(days[0]["is_today"], true);
    assert_eq!(
        days[0]["tasks"][0]["status"],
        TaskStatus::Pending.as_str()
    );

    let response = app
        .oneshot(get("/range?mode=monthly&date=2026-02-14"))
        .await
        .unwrap();
    let range: Value = read_json(response).await;
    assert_eq!(range["start"], "2026-02-01T00:00:00");
    assert_eq!(range["end"], "2026-02-28T23:59:59.999");
}

#[tokio::test]
async fn health_reports_ok() {
    let app = new_router();
    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = read_json(response).await;
    assert_eq!(body["status"], "ok");
}
