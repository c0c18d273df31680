//! Common test utilities and fixtures for integration tests.
//!
//! Each TestContext gets its own lesson directory under the system temp
//! dir and an in-memory preference store, so tests can run in parallel.

pub mod fixtures;

use std::path::PathBuf;

use axum::Router;
use axum_test::TestServer;
use serde_json::{json, Value};
use uuid::Uuid;

use matchup_backend::config::ServerConfig;
use matchup_backend::models::Lesson;
use matchup_backend::{build_router, AppState};

/// Finish delay used by tests, short enough to wait out.
pub const TEST_FINISH_DELAY_MS: u64 = 50;

pub struct TestContext {
    pub state: AppState,
    lesson_dir: PathBuf,
    app: Router,
}

impl TestContext {
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Context whose config is adjusted by `configure` after the test defaults.
    pub async fn with_config(configure: impl FnOnce(&mut ServerConfig)) -> Self {
        let lesson_dir = std::env::temp_dir().join(format!("matchup-test-{}", Uuid::new_v4()));
        let mut config = ServerConfig {
            lesson_dir: lesson_dir.clone(),
            finish_delay_ms: TEST_FINISH_DELAY_MS,
            ..ServerConfig::default()
        };
        configure(&mut config);

        let state = AppState::new(config)
            .await
            .expect("Failed to open test lesson store");
        let app = build_router(state.clone());

        Self {
            state,
            lesson_dir,
            app,
        }
    }

    /// Scratch path inside this context's directory.
    pub fn scratch_path(&self, name: &str) -> PathBuf {
        self.lesson_dir.join(name)
    }

    /// Get the router for use with axum-test.
    pub fn router(&self) -> Router {
        self.app.clone()
    }

    pub fn server(&self) -> TestServer {
        TestServer::new(self.router()).expect("Failed to start test server")
    }

    /// Store a lesson directly, bypassing the API.
    pub async fn seed_lesson(&self, lesson: &Lesson) {
        self.state
            .lessons
            .save(lesson)
            .await
            .expect("Failed to seed lesson");
    }

    /// Start a session and return its id plus the full response body.
    pub async fn start_session(&self, server: &TestServer, body: Value) -> (String, Value) {
        let response = server.post("/api/sessions").json(&body).await;
        response.assert_status_ok();
        let body: Value = response.json();
        let id = body["session_id"].as_str().unwrap_or_default().to_string();
        (id, body)
    }

    /// Place an answer through the direct placement endpoint.
    pub async fn place(server: &TestServer, session_id: &str, answer: i64, slot: i64) -> Value {
        let response = server
            .post(&format!("/api/sessions/{}/place", session_id))
            .json(&json!({ "answer_id": answer, "slot_id": slot }))
            .await;
        response.assert_status_ok();
        response.json()
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.lesson_dir);
    }
}
