// ABOUTME: Shared test utilities for integration tests
// ABOUTME: Runs an in-process mock of the Garmin SSO and activity services on an ephemeral port
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Mock Garmin Connect service
//!
//! One server plays both the SSO origin and the API host. Sessions are a
//! cookie whose value changes whenever [`MockState::expire_sessions`] runs.

use axum::{
    body::Bytes,
    extract::{Multipart, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use garmin_mirror_core::{ActivitySummary, Credential, ServiceEndpoint};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::io::{Cursor, Write};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use tokio::net::TcpListener;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const MOCK_CSRF: &str = "mock-csrf-7f3a";
pub const MOCK_PASSWORD: &str = "correct horse";

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("warn")
            .with_test_writer()
            .try_init();
    });
}

/// Everything the mock records or serves
pub struct MockState {
    pub base_url: String,
    pub email: String,
    pub activities: Mutex<Vec<ActivitySummary>>,
    pub broken_downloads: Mutex<HashSet<i64>>,
    pub upload_status: Mutex<StatusCode>,
    pub uploads: Mutex<Vec<String>>,
    pub upload_headers: Mutex<Vec<HeaderMap>>,
    pub list_queries: Mutex<Vec<HashMap<String, String>>>,
    pub requests: AtomicUsize,
    pub signin_posts: AtomicUsize,
    pub profile_broken: AtomicBool,
    session_generation: AtomicUsize,
}

impl MockState {
    fn session_cookie_value(&self) -> String {
        format!(
            "mock-session-{}",
            self.session_generation.load(Ordering::SeqCst)
        )
    }

    fn has_session(&self, headers: &HeaderMap) -> bool {
        let expected = format!("SESSIONID={}", self.session_cookie_value());
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .any(|pair| pair.trim() == expected)
    }

    /// Invalidate every issued session cookie
    pub fn expire_sessions(&self) {
        self.session_generation.fetch_add(1, Ordering::SeqCst);
    }

    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn uploaded(&self) -> Vec<String> {
        self.uploads.lock().unwrap().clone()
    }
}

/// Handle to a running mock service
pub struct MockGarmin {
    pub state: Arc<MockState>,
}

impl MockGarmin {
    /// Start a mock for `email` holding `activities`, newest first
    pub async fn start(email: &str, activities: Vec<ActivitySummary>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let state = Arc::new(MockState {
            base_url,
            email: email.to_owned(),
            activities: Mutex::new(activities),
            broken_downloads: Mutex::new(HashSet::new()),
            upload_status: Mutex::new(StatusCode::CREATED),
            uploads: Mutex::new(Vec::new()),
            upload_headers: Mutex::new(Vec::new()),
            list_queries: Mutex::new(Vec::new()),
            requests: AtomicUsize::new(0),
            signin_posts: AtomicUsize::new(0),
            profile_broken: AtomicBool::new(false),
            session_generation: AtomicUsize::new(0),
        });

        let app = router(Arc::clone(&state));
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { state }
    }

    pub fn endpoint(&self) -> ServiceEndpoint {
        ServiceEndpoint::from_base_urls(&self.state.base_url, &self.state.base_url)
    }

    pub fn credential(&self) -> Credential {
        Credential::new(self.state.email.clone(), MOCK_PASSWORD)
    }

    pub fn break_download(&self, activity_id: i64) {
        self.state.broken_downloads.lock().unwrap().insert(activity_id);
    }

    /// Serve the post-login page with an unterminated profile assignment
    pub fn break_profile(&self) {
        self.state.profile_broken.store(true, Ordering::SeqCst);
    }

    pub fn set_upload_status(&self, status: StatusCode) {
        *self.state.upload_status.lock().unwrap() = status;
    }
}

/// Activity summary with distinct local and GMT start times
pub fn activity(activity_id: i64, local: &str, gmt: &str) -> ActivitySummary {
    ActivitySummary {
        activity_id,
        activity_name: Some(format!("Morning Run {activity_id}")),
        start_time_local: local.to_owned(),
        start_time_gmt: gmt.to_owned(),
    }
}

/// Single-entry stored ZIP as the download service returns it
pub fn fit_archive(file_name: &str, content: &[u8]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    writer.start_file(file_name, options).unwrap();
    writer.write_all(content).unwrap();
    writer.finish().unwrap().into_inner()
}

fn router(state: Arc<MockState>) -> Router {
    Router::new()
        .route("/sso/signin", get(signin_page).post(signin_submit))
        .route("/modern", get(ticket_landing))
        .route(
            "/proxy/activitylist-service/activities/search/activities",
            get(list_activities),
        )
        .route("/proxy/activity-service/activity/:id", get(activity_detail))
        .route(
            "/modern/proxy/download-service/files/activity/:id",
            get(download_activity),
        )
        .route(
            "/modern/proxy/upload-service/upload/.fit",
            post(upload_activity),
        )
        .with_state(state)
}

fn count(state: &MockState) {
    state.requests.fetch_add(1, Ordering::SeqCst);
}

async fn signin_page(State(state): State<Arc<MockState>>) -> impl IntoResponse {
    count(&state);
    (
        StatusCode::OK,
        format!(
            r#"<html><body><form method="post">
<input type="hidden" name="_csrf" value="{MOCK_CSRF}" />
</form></body></html>"#
        ),
    )
}

async fn signin_submit(
    State(state): State<Arc<MockState>>,
    Form(form): Form<HashMap<String, String>>,
) -> impl IntoResponse {
    count(&state);
    state.signin_posts.fetch_add(1, Ordering::SeqCst);

    let accepted = form.get("username") == Some(&state.email)
        && form.get("password").map(String::as_str) == Some(MOCK_PASSWORD)
        && form.get("_csrf").map(String::as_str) == Some(MOCK_CSRF)
        && form.get("embed").map(String::as_str) == Some("false");

    let body = if accepted {
        let escaped = state.base_url.replace('/', "\\/");
        format!(r#"<script>var response_url = "{escaped}\/modern?ticket=ST-0001-mock";</script>"#)
    } else {
        r#"<div id="status">Invalid sign in. Please try again.</div>"#.to_owned()
    };
    (StatusCode::OK, body)
}

async fn ticket_landing(
    State(state): State<Arc<MockState>>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    count(&state);
    if query.get("ticket").map(String::as_str) != Some("ST-0001-mock") {
        return (StatusCode::OK, "<html>no profile</html>").into_response();
    }
    if state.profile_broken.load(Ordering::SeqCst) {
        return (
            StatusCode::OK,
            r#"<script>window.VIEWER_SOCIAL_PROFILE = JSON.parse("{\"displayName\":\"mock\"</script>"#,
        )
            .into_response();
    }
    let cookie = format!("SESSIONID={}; Path=/", state.session_cookie_value());
    (
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        r#"<script>window.VIEWER_SOCIAL_PROFILE = JSON.parse("{\"displayName\":\"mock\",\"id\":7}");</script>"#,
    )
        .into_response()
}

async fn list_activities(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    count(&state);
    if !state.has_session(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let start: usize = query.get("start").and_then(|v| v.parse().ok()).unwrap_or(0);
    let limit: usize = query.get("limit").and_then(|v| v.parse().ok()).unwrap_or(20);
    state.list_queries.lock().unwrap().push(query);

    let page: Vec<Value> = state
        .activities
        .lock()
        .unwrap()
        .iter()
        .skip(start)
        .take(limit)
        .map(|a| {
            json!({
                "activityId": a.activity_id,
                "activityName": a.activity_name,
                "startTimeLocal": a.start_time_local,
                "startTimeGMT": a.start_time_gmt,
                "distance": 5012.3,
            })
        })
        .collect();
    Json(page).into_response()
}

async fn activity_detail(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    count(&state);
    if !state.has_session(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(json!({
        "activityId": id,
        "activityName": format!("Morning Run {id}"),
        "summaryDTO": { "distance": 5012.3, "duration": 1800.0 },
    }))
    .into_response()
}

async fn download_activity(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    count(&state);
    if !state.has_session(&headers) {
        return StatusCode::FORBIDDEN.into_response();
    }
    if state.broken_downloads.lock().unwrap().contains(&id) {
        return (StatusCode::NOT_FOUND, "not found").into_response();
    }
    let archive = fit_archive(&format!("{id}_ACTIVITY.fit"), &id.to_be_bytes());
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/x-zip-compressed")],
        Bytes::from(archive),
    )
        .into_response()
}

async fn upload_activity(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    count(&state);
    if !state.has_session(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let mut file_name = None;
    while let Some(field) = multipart.next_field().await.unwrap() {
        if field.name() == Some("file") {
            file_name = field.file_name().map(str::to_owned);
            let _ = field.bytes().await.unwrap();
        }
    }

    let status = *state.upload_status.lock().unwrap();
    if !status.is_success() {
        return (status, "rejected").into_response();
    }

    let Some(file_name) = file_name else {
        return (StatusCode::BAD_REQUEST, "missing file part").into_response();
    };
    state.uploads.lock().unwrap().push(file_name.clone());
    state.upload_headers.lock().unwrap().push(headers);
    (
        status,
        Json(json!({
            "detailedImportResult": {
                "uploadId": 1,
                "fileName": file_name,
                "successes": [],
                "failures": [],
            }
        })),
    )
        .into_response()
}
