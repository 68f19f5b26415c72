#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Multipart, Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};

use lms_client::{ApiClient, ClientConfig, MemoryTokenStore};

pub const EMAIL: &str = "student@example.com";
pub const PASSWORD: &str = "secret";
pub const TOKEN: &str = "token-abc";
/// Logging in as this user yields an empty access token.
pub const EMPTY_TOKEN_EMAIL: &str = "blank@example.com";

/// What the fake backend saw for one request.
#[derive(Debug, Clone, Default)]
pub struct Seen {
    pub method: String,
    pub path: String,
    pub query: HashMap<String, String>,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Option<Value>,
    pub form: HashMap<String, String>,
    pub file_name: Option<String>,
}

#[derive(Clone, Default)]
pub struct Backend {
    pub seen: Arc<Mutex<Vec<Seen>>>,
    pub fail_logout: Arc<Mutex<bool>>,
}

impl Backend {
    pub fn requests(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }

    pub fn last(&self, path: &str) -> Seen {
        self.requests()
            .into_iter()
            .rev()
            .find(|s| s.path == path)
            .unwrap_or_else(|| panic!("no request to {}", path))
    }

    pub fn set_fail_logout(&self, fail: bool) {
        *self.fail_logout.lock().unwrap() = fail;
    }

    fn record(&self, seen: Seen) {
        self.seen.lock().unwrap().push(seen);
    }
}

/// A running fake backend.
pub struct TestServer {
    pub addr: SocketAddr,
    pub backend: Backend,
}

impl TestServer {
    pub async fn start() -> Self {
        let backend = Backend::default();
        let app = router(backend.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("test server failed");
        });
        Self { addr, backend }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig::new(self.base_url())
    }

    pub async fn client(&self) -> ApiClient {
        self.client_with(MemoryTokenStore::new()).await
    }

    pub async fn client_with(&self, store: MemoryTokenStore) -> ApiClient {
        ApiClient::new(self.config(), Arc::new(store))
            .await
            .expect("Failed to build client")
    }
}

fn router(backend: Backend) -> Router {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/me", get(me))
        .route("/auth/logout", post(logout))
        .route("/courses/", get(list_courses))
        .route("/courses/my/enrollments", get(my_enrollments))
        .route("/courses/{id}", get(get_course))
        .route("/courses/{id}/enroll", post(enroll))
        .route("/assignments/", get(list_assignments).post(create_assignment))
        .route(
            "/assignments/{id}",
            get(get_assignment).put(update_assignment).delete(delete_assignment),
        )
        .route(
            "/assignments/{id}/submissions",
            get(list_submissions).post(create_submission),
        )
        .route(
            "/assignments/submissions/{id}",
            get(get_submission).put(update_submission),
        )
        .route("/slow", get(slow))
        .with_state(backend)
}

fn header_value(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}

fn seen(method: &str, path: String, headers: &HeaderMap) -> Seen {
    Seen {
        method: method.to_string(),
        path,
        authorization: header_value(headers, header::AUTHORIZATION),
        content_type: header_value(headers, header::CONTENT_TYPE),
        ..Default::default()
    }
}

fn is_authorized(headers: &HeaderMap) -> bool {
    header_value(headers, header::AUTHORIZATION).as_deref() == Some(format!("Bearer {}", TOKEN).as_str())
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

fn unauthorized() -> Response {
    detail(StatusCode::UNAUTHORIZED, "Could not validate credentials")
}

pub fn user_json() -> Value {
    json!({
        "id": 4,
        "email": EMAIL,
        "first_name": "Somchai",
        "last_name": "Dee",
        "role": "student",
        "is_active": true,
        "is_verified": false,
        "created_at": "2024-01-01T00:00:00Z",
        "full_name": "Somchai Dee"
    })
}

pub fn course_json(id: i64) -> Value {
    json!({
        "id": id,
        "title": format!("Course {}", id),
        "description": "All about it",
        "short_description": null,
        "thumbnail_url": null,
        "instructor_id": 2,
        "status": "published",
        "duration_hours": 10,
        "price": 0,
        "is_free": true,
        "created_at": "2024-01-01T00:00:00Z",
        "modules": [{
            "id": 1,
            "course_id": id,
            "title": "Getting started",
            "order_index": 0,
            "is_published": true,
            "created_at": "2024-01-01T00:00:00Z"
        }]
    })
}

pub fn assignment_json(id: i64, course_id: i64) -> Value {
    json!({
        "id": id,
        "course_id": course_id,
        "title": format!("Assignment {}", id),
        "description": null,
        "instructions": "Write it up",
        "max_score": 100,
        "due_date": "2024-06-01T00:00:00Z",
        "is_required": true,
        "created_at": "2024-01-01T00:00:00Z",
        "updated_at": null,
        "submissions_count": 0
    })
}

pub fn submission_json(id: i64, assignment_id: i64, status: &str) -> Value {
    json!({
        "id": id,
        "assignment_id": assignment_id,
        "student_id": 4,
        "file_url": null,
        "file_name": null,
        "content": "hello",
        "status": status,
        "score": null,
        "feedback": null,
        "submitted_at": "2024-05-02T08:00:00",
        "reviewed_at": null
    })
}

async fn login(State(backend): State<Backend>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    let mut s = seen("POST", "/auth/login".to_string(), &headers);
    s.body = Some(body.clone());
    backend.record(s);

    if body["email"] == EMPTY_TOKEN_EMAIL {
        Json(json!({ "access_token": "", "token_type": "bearer" })).into_response()
    } else if body["email"] == EMAIL && body["password"] == PASSWORD {
        Json(json!({ "access_token": TOKEN, "token_type": "bearer" })).into_response()
    } else {
        detail(StatusCode::UNAUTHORIZED, "Invalid credentials")
    }
}

async fn register(State(backend): State<Backend>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    let mut s = seen("POST", "/auth/register".to_string(), &headers);
    s.body = Some(body.clone());
    backend.record(s);

    if body["email"] == "taken@example.com" {
        return detail(StatusCode::BAD_REQUEST, "Email already registered");
    }
    let mut user = user_json();
    user["email"] = body["email"].clone();
    user["first_name"] = body["first_name"].clone();
    user["last_name"] = body["last_name"].clone();
    Json(user).into_response()
}

async fn me(State(backend): State<Backend>, headers: HeaderMap) -> Response {
    backend.record(seen("GET", "/auth/me".to_string(), &headers));
    if is_authorized(&headers) {
        Json(user_json()).into_response()
    } else {
        unauthorized()
    }
}

async fn logout(State(backend): State<Backend>, headers: HeaderMap) -> Response {
    backend.record(seen("POST", "/auth/logout".to_string(), &headers));
    if *backend.fail_logout.lock().unwrap() {
        (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response()
    } else {
        Json(json!({ "message": "Logout successful" })).into_response()
    }
}

async fn list_courses(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let mut s = seen("GET", "/courses/".to_string(), &headers);
    s.query = query;
    backend.record(s);
    Json(json!([course_json(1), course_json(2)])).into_response()
}

async fn my_enrollments(State(backend): State<Backend>, headers: HeaderMap) -> Response {
    backend.record(seen("GET", "/courses/my/enrollments".to_string(), &headers));
    if !is_authorized(&headers) {
        return unauthorized();
    }
    Json(json!([{
        "id": 11,
        "user_id": 4,
        "course_id": 1,
        "status": "active",
        "progress_percentage": 40,
        "enrolled_at": "2024-02-01T00:00:00Z",
        "course": course_json(1)
    }]))
    .into_response()
}

async fn get_course(State(backend): State<Backend>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    backend.record(seen("GET", format!("/courses/{}", id), &headers));
    if id == 404 {
        return detail(StatusCode::NOT_FOUND, "Course not found");
    }
    Json(course_json(id)).into_response()
}

async fn enroll(State(backend): State<Backend>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    backend.record(seen("POST", format!("/courses/{}/enroll", id), &headers));
    if !is_authorized(&headers) {
        return unauthorized();
    }
    Json(json!({
        "id": 12,
        "user_id": 4,
        "course_id": id,
        "status": "active",
        "progress_percentage": 0,
        "enrolled_at": "2024-02-01T00:00:00Z",
        "course": course_json(id)
    }))
    .into_response()
}

async fn list_assignments(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let course_id = query.get("course_id").and_then(|v| v.parse::<i64>().ok());
    let mut s = seen("GET", "/assignments/".to_string(), &headers);
    s.query = query;
    backend.record(s);

    if course_id == Some(500) {
        return (StatusCode::BAD_GATEWAY, "<html>bad gateway</html>").into_response();
    }
    let all = vec![assignment_json(1, 1), assignment_json(2, 1), assignment_json(3, 2)];
    let filtered: Vec<Value> = all
        .into_iter()
        .filter(|a| course_id.is_none_or(|id| a["course_id"] == id))
        .collect();
    Json(Value::Array(filtered)).into_response()
}

async fn create_assignment(State(backend): State<Backend>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    let mut s = seen("POST", "/assignments/".to_string(), &headers);
    s.body = Some(body.clone());
    backend.record(s);

    let mut created = assignment_json(7, body["course_id"].as_i64().unwrap_or_default());
    created["title"] = body["title"].clone();
    Json(created).into_response()
}

async fn get_assignment(State(backend): State<Backend>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    backend.record(seen("GET", format!("/assignments/{}", id), &headers));
    let mut detail = assignment_json(id, 1);
    detail["submissions"] = json!([submission_json(9, id, "submitted")]);
    Json(detail).into_response()
}

async fn update_assignment(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    let mut s = seen("PUT", format!("/assignments/{}", id), &headers);
    s.body = Some(body.clone());
    backend.record(s);

    let mut updated = assignment_json(id, 1);
    if let Some(title) = body.get("title") {
        updated["title"] = title.clone();
    }
    updated["updated_at"] = json!("2024-03-01T00:00:00Z");
    Json(updated).into_response()
}

async fn delete_assignment(State(backend): State<Backend>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    backend.record(seen("DELETE", format!("/assignments/{}", id), &headers));
    if !is_authorized(&headers) {
        return detail(StatusCode::FORBIDDEN, "Only trainers and admins can delete assignments");
    }
    if id == 99 {
        return StatusCode::NO_CONTENT.into_response();
    }
    Json(json!({ "message": "Assignment deleted successfully" })).into_response()
}

async fn list_submissions(State(backend): State<Backend>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    backend.record(seen("GET", format!("/assignments/{}/submissions", id), &headers));
    Json(json!([
        submission_json(9, id, "submitted"),
        submission_json(10, id, "approved")
    ]))
    .into_response()
}

async fn create_submission(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> Response {
    let mut s = seen("POST", format!("/assignments/{}/submissions", id), &headers);
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        if let Some(file_name) = field.file_name() {
            s.file_name = Some(file_name.to_string());
        }
        let text = field.text().await.unwrap_or_default();
        s.form.insert(name, text);
    }
    let form = s.form.clone();
    backend.record(s);

    if !form.contains_key("content") && !form.contains_key("file") {
        return detail(StatusCode::BAD_REQUEST, "Please provide either content or file");
    }
    let mut created = submission_json(20, id, "submitted");
    created["content"] = form.get("content").map(|c| json!(c)).unwrap_or(Value::Null);
    Json(created).into_response()
}

async fn get_submission(State(backend): State<Backend>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    backend.record(seen("GET", format!("/assignments/submissions/{}", id), &headers));
    Json(submission_json(id, 1, "reviewed")).into_response()
}

async fn update_submission(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    let mut s = seen("PUT", format!("/assignments/submissions/{}", id), &headers);
    s.body = Some(body.clone());
    backend.record(s);

    let status = body["status"].as_str().unwrap_or("reviewed").to_string();
    let mut updated = submission_json(id, 1, &status);
    updated["score"] = body["score"].clone();
    updated["feedback"] = body["feedback"].clone();
    updated["reviewed_at"] = json!("2024-05-03T08:00:00Z");
    Json(updated).into_response()
}

async fn slow(State(backend): State<Backend>, headers: HeaderMap) -> Response {
    backend.record(seen("GET", "/slow".to_string(), &headers));
    tokio::time::sleep(Duration::from_secs(5)).await;
    Json(json!({ "message": "finally" })).into_response()
}
