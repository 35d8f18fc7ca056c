//! HTTP API tests against a real server bound to an ephemeral port.

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use studydesk::chat::{GeminiBackend, GeminiConfig, StudyBuddy};
use studydesk::dashboard::{DashboardServer, start_server};
use studydesk::pomodoro::PomodoroHandle;
use studydesk::store::{AppState, Store};
use tokio::sync::oneshot;
use wiremock::matchers::{method, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct TestApp {
    base: String,
    client: Client,
    store: Arc<Store>,
    _shutdown: oneshot::Sender<()>,
    _chat: MockServer,
}

impl TestApp {
    async fn start() -> Self {
        let chat = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path_regex(r"^/v1beta/models/.+:generateContent$"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{ "content": { "parts": [{ "text": "Try *spaced* repetition." }] } }]
            })))
            .mount(&chat)
            .await;

        let store = Arc::new(Store::new(AppState::sample()));
        let pomodoro = PomodoroHandle::spawn(Default::default(), Duration::from_secs(1));
        let backend = GeminiBackend::new(GeminiConfig {
            base_url: chat.uri(),
            api_key: Some("test-key".into()),
            ..Default::default()
        })
        .unwrap();
        let buddy = Arc::new(StudyBuddy::new(Arc::new(backend)));

        let state = DashboardServer::new(store.clone(), pomodoro, buddy);
        let (shutdown, addr) = start_server(state, SocketAddr::from(([127, 0, 0, 1], 0)))
            .await
            .unwrap();

        Self {
            base: format!("http://{addr}"),
            client: Client::new(),
            store,
            _shutdown: shutdown,
            _chat: chat,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn get(&self, path: &str) -> (StatusCode, Value) {
        let response = self.client.get(self.url(path)).send().await.unwrap();
        let status = response.status();
        (status, response.json().await.unwrap_or(Value::Null))
    }

    async fn send(&self, method: reqwest::Method, path: &str, body: Value) -> (StatusCode, Value) {
        let response = self
            .client
            .request(method, self.url(path))
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = response.status();
        (status, response.json().await.unwrap_or(Value::Null))
    }

    async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        self.send(reqwest::Method::POST, path, body).await
    }

    async fn patch(&self, path: &str, body: Value) -> (StatusCode, Value) {
        self.send(reqwest::Method::PATCH, path, body).await
    }

    async fn delete(&self, path: &str) -> StatusCode {
        self.client
            .delete(self.url(path))
            .send()
            .await
            .unwrap()
            .status()
    }
}

mod board_api_tests {
    use super::*;

    #[tokio::test]
    async fn health_reports_version() {
        let app = TestApp::start().await;
        let (status, body) = app.get("/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn board_snapshot_lists_columns() {
        let app = TestApp::start().await;
        let (status, body) = app.get("/api/board").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["columnOrder"], json!(["todo", "in-progress", "completed"]));
        assert_eq!(
            body["columns"]["todo"]["taskIds"],
            json!(["task-2", "task-3", "task-7"])
        );
        assert_eq!(body["tasks"]["task-1"]["status"], "in-progress");
    }

    #[tokio::test]
    async fn create_update_and_delete_task() {
        let app = TestApp::start().await;
        let (status, created) = app
            .post(
                "/api/board/columns/todo/tasks",
                json!({ "title": "Outline essay", "priority": "high", "tags": ["writing"] }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["status"], "todo");
        let id = created["id"].as_str().unwrap().to_string();

        let (status, updated) = app
            .patch(
                &format!("/api/board/tasks/{id}"),
                json!({ "description": "Three sections", "dueDate": "2026-12-01" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["description"], "Three sections");
        assert_eq!(updated["priority"], "high");

        assert_eq!(
            app.delete(&format!("/api/board/tasks/{id}")).await,
            StatusCode::NO_CONTENT
        );
        // Deleting again is still fine
        assert_eq!(
            app.delete(&format!("/api/board/tasks/{id}")).await,
            StatusCode::NO_CONTENT
        );
        app.store.snapshot().board.verify_invariants().unwrap();
    }

    #[tokio::test]
    async fn update_of_missing_task_is_404() {
        let app = TestApp::start().await;
        let (status, body) = app
            .patch("/api/board/tasks/ghost", json!({ "title": "x" }))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "TASK_NOT_FOUND");
    }

    #[tokio::test]
    async fn validation_and_unknown_columns() {
        let app = TestApp::start().await;
        let (status, body) = app
            .post("/api/board/columns/todo/tasks", json!({ "title": "  " }))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "MISSING_REQUIRED_FIELD");
        assert_eq!(body["field"], "title");

        let (status, body) = app
            .post("/api/board/columns/someday/tasks", json!({ "title": "x" }))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "COLUMN_NOT_FOUND");
    }

    #[tokio::test]
    async fn move_across_columns() {
        let app = TestApp::start().await;
        let (status, board) = app
            .post(
                "/api/board/move",
                json!({
                    "taskId": "task-2",
                    "sourceColumn": "todo",
                    "destColumn": "completed",
                    "sourceIndex": 0,
                    "destIndex": 0
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(board["tasks"]["task-2"]["status"], "completed");
        assert_eq!(board["columns"]["completed"]["taskIds"][0], "task-2");

        // Same move again: task-2 is no longer at todo[0]
        let (status, body) = app
            .post(
                "/api/board/move",
                json!({
                    "taskId": "task-2",
                    "sourceColumn": "todo",
                    "destColumn": "completed",
                    "sourceIndex": 0,
                    "destIndex": 0
                }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_STATE");
    }
}

mod habit_api_tests {
    use super::*;

    #[tokio::test]
    async fn toggle_with_explicit_date_is_self_inverse() {
        let app = TestApp::start().await;
        let body = json!({ "date": "2024-07-20T10:00:00Z" });

        let (status, habit) = app.post("/api/habits/habit-1/toggle", body.clone()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            habit["completions"],
            json!(["2024-07-21T10:00:00Z", "2024-07-22T10:00:00Z"])
        );

        let (_, habit) = app.post("/api/habits/habit-1/toggle", body).await;
        assert_eq!(habit["completions"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn same_day_instants_share_one_entry() {
        let app = TestApp::start().await;

        let (status, habit) = app
            .post(
                "/api/habits/habit-4/toggle",
                json!({ "date": "2024-03-05T08:00:00Z" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(habit["completions"], json!(["2024-03-05T00:00:00.000Z"]));

        // A later instant on the same day toggles the existing entry off
        let (status, habit) = app
            .post(
                "/api/habits/habit-4/toggle",
                json!({ "date": "2024-03-05T20:00:00Z" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(habit["completions"], json!([]));

        let (_, habit) = app
            .post("/api/habits/habit-4/toggle", json!({ "date": "2024-03-05" }))
            .await;
        assert_eq!(habit["completions"], json!(["2024-03-05T00:00:00.000Z"]));
    }

    #[tokio::test]
    async fn future_and_malformed_dates_are_rejected() {
        let app = TestApp::start().await;
        let before = app.store.snapshot().habit("habit-4").cloned().unwrap();

        let (status, body) = app
            .post(
                "/api/habits/habit-4/toggle",
                json!({ "date": "2999-01-05T08:00:00Z" }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_FIELD_VALUE");
        assert_eq!(body["field"], "date");

        let (status, body) = app
            .post("/api/habits/habit-4/toggle", json!({ "date": "banana" }))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["field"], "date");

        assert_eq!(app.store.snapshot().habit("habit-4"), Some(&before));
        assert_eq!(app.store.revision(), 0);
    }

    #[tokio::test]
    async fn toggle_without_date_marks_today() {
        let app = TestApp::start().await;
        let (status, _) = app.post("/api/habits/habit-4/toggle", json!({})).await;
        assert_eq!(status, StatusCode::OK);

        let (_, dashboard) = app.get("/api/dashboard").await;
        let habit = dashboard["habits"]
            .as_array()
            .unwrap()
            .iter()
            .find(|h| h["id"] == "habit-4")
            .cloned()
            .unwrap();
        assert_eq!(habit["completedToday"], true);
    }

    #[tokio::test]
    async fn habit_lifecycle() {
        let app = TestApp::start().await;
        let (status, habit) = app
            .post(
                "/api/habits",
                json!({ "name": "Meditate", "color": "teal", "icon": "zap" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(habit["streak"], 0);
        let id = habit["id"].as_str().unwrap().to_string();

        let (status, updated) = app
            .patch(&format!("/api/habits/{id}"), json!({ "frequency": "weekly" }))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["frequency"], "weekly");

        assert_eq!(
            app.delete(&format!("/api/habits/{id}")).await,
            StatusCode::NO_CONTENT
        );
        let (status, _) = app
            .patch(&format!("/api/habits/{id}"), json!({ "name": "x" }))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = app.post(&format!("/api/habits/{id}/toggle"), json!({})).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}

mod settings_and_timer_tests {
    use super::*;

    #[tokio::test]
    async fn settings_update_reaches_pomodoro() {
        let app = TestApp::start().await;
        let (status, settings) = app
            .patch(
                "/api/settings",
                json!({ "theme": "light", "pomodoroSettings": { "work": 50, "shortBreak": 0 } }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(settings["theme"], "light");
        assert_eq!(settings["pomodoroSettings"]["work"], 50);
        assert_eq!(settings["pomodoroSettings"]["shortBreak"], 1);
        assert_eq!(settings["pomodoroSettings"]["longBreak"], 15);

        let (_, timer) = app.get("/api/pomodoro").await;
        assert_eq!(timer["remaining"], 50 * 60);
        assert_eq!(timer["clock"], "50:00");
    }

    #[tokio::test]
    async fn pomodoro_commands() {
        let app = TestApp::start().await;
        let (status, timer) = app.post("/api/pomodoro/start", json!({})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(timer["active"], true);

        let (_, timer) = app.post("/api/pomodoro/pause", json!({})).await;
        assert_eq!(timer["active"], false);

        let (_, timer) = app
            .post("/api/pomodoro/session", json!({ "sessionType": "long-break" }))
            .await;
        assert_eq!(timer["sessionType"], "long-break");
        assert_eq!(timer["label"], "Long Break");
        assert_eq!(timer["clock"], "15:00");

        let (_, timer) = app.post("/api/pomodoro/reset", json!({})).await;
        assert_eq!(timer["remaining"], 15 * 60);
    }

    #[tokio::test]
    async fn dashboard_summary_shape() {
        let app = TestApp::start().await;
        let (status, body) = app.get("/api/dashboard").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["greeting"].as_str().unwrap().starts_with("Good "));
        assert!(!body["quote"].as_str().unwrap().is_empty());
        assert_eq!(body["upcomingTasks"].as_array().unwrap().len(), 3);
        assert_eq!(body["habits"].as_array().unwrap().len(), 4);
        let reading = &body["habits"][0];
        assert_eq!(reading["colorClass"], "bg-blue-500");
        assert_eq!(reading["iconAsset"], "BookOpen");
        assert!(reading["derivedStreak"].is_u64());
        assert_eq!(body["weeklyStudyHours"][0], json!({ "day": "Mon", "hours": 4.0 }));
    }
}

mod chat_api_tests {
    use super::*;

    #[tokio::test]
    async fn conversation_round_trip() {
        let app = TestApp::start().await;
        let (_, view) = app.get("/api/chat").await;
        assert_eq!(view["messages"].as_array().unwrap().len(), 1);
        assert_eq!(view["pending"], false);

        let (status, view) = app
            .post("/api/chat/messages", json!({ "text": "How do I memorise faster?" }))
            .await;
        assert_eq!(status, StatusCode::OK);
        let messages = view["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1]["sender"], "user");
        assert_eq!(messages[2]["sender"], "bot");
        assert_eq!(messages[2]["html"], "Try <em>spaced</em> repetition.");

        let (status, view) = app.post("/api/chat/new", json!({})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["messages"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn blank_message_is_rejected() {
        let app = TestApp::start().await;
        let (status, body) = app.post("/api/chat/messages", json!({ "text": "" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["field"], "text");
    }
}
