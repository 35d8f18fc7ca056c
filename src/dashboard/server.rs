//! HTTP server for the dashboard API.
//!
//! JSON endpoints over the store, the pomodoro driver and the study buddy.
//! Store errors map to status codes through [`AppError::status_code`].

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, patch, post},
};
use chrono::{Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::oneshot;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::summary::DashboardSummary;
use crate::chat::{ConversationView, StudyBuddy};
use crate::error::{AppError, AppResult};
use crate::pomodoro::{PomodoroCommand, PomodoroHandle, PomodoroStatus, SessionType};
use crate::store::{Store, TaskMove, completion_day};
use crate::types::{
    Board, Habit, HabitPatch, NewHabit, NewTask, PomodoroSettings, PomodoroSettingsPatch, Task,
    TaskPatch, TaskStatus, Theme,
};

/// Server state shared across handlers.
#[derive(Clone)]
pub struct DashboardServer {
    store: Arc<Store>,
    pomodoro: PomodoroHandle,
    buddy: Arc<StudyBuddy>,
}

impl DashboardServer {
    pub fn new(store: Arc<Store>, pomodoro: PomodoroHandle, buddy: Arc<StudyBuddy>) -> Self {
        Self {
            store,
            pomodoro,
            buddy,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!(code = ?self.code, "{}", self.message);
        }
        (status, Json(self)).into_response()
    }
}

type ApiResult<T> = Result<T, AppError>;

fn parse_column(column: &str) -> AppResult<TaskStatus> {
    TaskStatus::parse(column).ok_or_else(|| AppError::column_not_found(column))
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Health check endpoint.
async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// API root - returns available endpoints.
async fn api_root() -> impl IntoResponse {
    Json(serde_json::json!({
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/api/health",
            "board": "/api/board",
            "habits": "/api/habits",
            "settings": "/api/settings",
            "dashboard": "/api/dashboard",
            "pomodoro": "/api/pomodoro",
            "chat": "/api/chat",
        }
    }))
}

// Board

async fn get_board(State(state): State<DashboardServer>) -> Json<Board> {
    Json(state.store.snapshot().board.clone())
}

async fn create_task(
    State(state): State<DashboardServer>,
    Path(column): Path<String>,
    Json(input): Json<NewTask>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let column = parse_column(&column)?;
    let task = state.store.create_task(column, input)?;
    info!(task_id = %task.id, %column, "Task created");
    Ok((StatusCode::CREATED, Json(task)))
}

async fn update_task(
    State(state): State<DashboardServer>,
    Path(task_id): Path<String>,
    Json(patch): Json<TaskPatch>,
) -> ApiResult<Json<Task>> {
    if !state.store.update_task(&task_id, patch)?.is_applied() {
        return Err(AppError::task_not_found(&task_id));
    }
    state
        .store
        .snapshot()
        .board
        .task(&task_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::task_not_found(&task_id))
}

async fn delete_task(
    State(state): State<DashboardServer>,
    Path(task_id): Path<String>,
) -> ApiResult<StatusCode> {
    state.store.delete_task(&task_id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn move_task(
    State(state): State<DashboardServer>,
    Json(mv): Json<TaskMove>,
) -> ApiResult<Json<Board>> {
    state.store.move_task(mv)?;
    Ok(Json(state.store.snapshot().board.clone()))
}

// Habits

async fn list_habits(State(state): State<DashboardServer>) -> Json<Vec<Habit>> {
    Json(state.store.snapshot().habits.clone())
}

async fn create_habit(
    State(state): State<DashboardServer>,
    Json(input): Json<NewHabit>,
) -> ApiResult<(StatusCode, Json<Habit>)> {
    let habit = state.store.add_habit(input)?;
    info!(habit_id = %habit.id, "Habit created");
    Ok((StatusCode::CREATED, Json(habit)))
}

fn current_habit(store: &Store, habit_id: &str) -> ApiResult<Json<Habit>> {
    store
        .snapshot()
        .habit(habit_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::habit_not_found(habit_id))
}

async fn update_habit(
    State(state): State<DashboardServer>,
    Path(habit_id): Path<String>,
    Json(patch): Json<HabitPatch>,
) -> ApiResult<Json<Habit>> {
    if !state.store.update_habit(&habit_id, patch)?.is_applied() {
        return Err(AppError::habit_not_found(&habit_id));
    }
    current_habit(&state.store, &habit_id)
}

async fn delete_habit(
    State(state): State<DashboardServer>,
    Path(habit_id): Path<String>,
) -> ApiResult<StatusCode> {
    state.store.delete_habit(&habit_id)?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Default, Deserialize)]
struct ToggleRequest {
    /// Day to toggle, as an instant or `YYYY-MM-DD`; defaults to today.
    #[serde(default)]
    date: Option<String>,
}

/// Calendar day named by a toggle request. Missing means today; future days
/// and unparseable input are rejected.
fn toggle_day(date: Option<&str>, today: NaiveDate) -> AppResult<NaiveDate> {
    let Some(raw) = date else {
        return Ok(today);
    };
    let day = completion_day(raw)
        .ok_or_else(|| AppError::invalid_value("date", &format!("Not a date: {raw}")))?;
    if day > today {
        return Err(AppError::invalid_value(
            "date",
            "Cannot complete a habit on a future day",
        ));
    }
    Ok(day)
}

async fn toggle_habit(
    State(state): State<DashboardServer>,
    Path(habit_id): Path<String>,
    Json(request): Json<ToggleRequest>,
) -> ApiResult<Json<Habit>> {
    let day = toggle_day(request.date.as_deref(), Utc::now().date_naive())?;
    let entry = state
        .store
        .snapshot()
        .habit(&habit_id)
        .map(|habit| habit.entry_for_day(day))
        .ok_or_else(|| AppError::habit_not_found(&habit_id))?;
    if !state
        .store
        .toggle_habit_completion(&habit_id, &entry)?
        .is_applied()
    {
        return Err(AppError::habit_not_found(&habit_id));
    }
    current_habit(&state.store, &habit_id)
}

// Settings

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SettingsResponse {
    theme: Theme,
    pomodoro_settings: PomodoroSettings,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsPatch {
    #[serde(default)]
    theme: Option<Theme>,
    #[serde(default)]
    pomodoro_settings: Option<PomodoroSettingsPatch>,
}

fn current_settings(store: &Store) -> SettingsResponse {
    let snapshot = store.snapshot();
    SettingsResponse {
        theme: snapshot.theme,
        pomodoro_settings: snapshot.pomodoro_settings,
    }
}

async fn get_settings(State(state): State<DashboardServer>) -> Json<SettingsResponse> {
    Json(current_settings(&state.store))
}

async fn update_settings(
    State(state): State<DashboardServer>,
    Json(patch): Json<SettingsPatch>,
) -> ApiResult<Json<SettingsResponse>> {
    if let Some(theme) = patch.theme {
        state.store.set_theme(theme)?;
    }
    if let Some(pomodoro) = patch.pomodoro_settings {
        let settings = state.store.update_pomodoro_settings(pomodoro)?;
        state
            .pomodoro
            .send(PomodoroCommand::ApplySettings(settings))
            .await?;
    }
    Ok(Json(current_settings(&state.store)))
}

// Dashboard

async fn get_dashboard(State(state): State<DashboardServer>) -> Json<DashboardSummary> {
    Json(DashboardSummary::build(&state.store.snapshot(), Local::now()))
}

// Pomodoro

async fn pomodoro_status(State(state): State<DashboardServer>) -> Json<PomodoroStatus> {
    Json(state.pomodoro.status())
}

async fn pomodoro_start(State(state): State<DashboardServer>) -> ApiResult<Json<PomodoroStatus>> {
    Ok(Json(state.pomodoro.send(PomodoroCommand::Start).await?))
}

async fn pomodoro_pause(State(state): State<DashboardServer>) -> ApiResult<Json<PomodoroStatus>> {
    Ok(Json(state.pomodoro.send(PomodoroCommand::Pause).await?))
}

async fn pomodoro_reset(State(state): State<DashboardServer>) -> ApiResult<Json<PomodoroStatus>> {
    Ok(Json(state.pomodoro.send(PomodoroCommand::Reset).await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionRequest {
    session_type: SessionType,
}

async fn pomodoro_session(
    State(state): State<DashboardServer>,
    Json(request): Json<SessionRequest>,
) -> ApiResult<Json<PomodoroStatus>> {
    Ok(Json(
        state
            .pomodoro
            .send(PomodoroCommand::Select(request.session_type))
            .await?,
    ))
}

// Study buddy

async fn get_chat(State(state): State<DashboardServer>) -> Json<ConversationView> {
    Json(state.buddy.view())
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    #[serde(default)]
    text: String,
}

async fn send_chat_message(
    State(state): State<DashboardServer>,
    Json(request): Json<ChatRequest>,
) -> ApiResult<Json<ConversationView>> {
    Ok(Json(state.buddy.send(&request.text).await?))
}

async fn new_chat(State(state): State<DashboardServer>) -> Json<ConversationView> {
    Json(state.buddy.new_chat())
}

/// Build the API router.
pub fn build_router(state: DashboardServer) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api", get(api_root))
        .route("/api/health", get(health))
        .route("/api/board", get(get_board))
        .route("/api/board/columns/{column}/tasks", post(create_task))
        .route(
            "/api/board/tasks/{task_id}",
            patch(update_task).delete(delete_task),
        )
        .route("/api/board/move", post(move_task))
        .route("/api/habits", get(list_habits).post(create_habit))
        .route(
            "/api/habits/{habit_id}",
            patch(update_habit).delete(delete_habit),
        )
        .route("/api/habits/{habit_id}/toggle", post(toggle_habit))
        .route("/api/settings", get(get_settings).patch(update_settings))
        .route("/api/dashboard", get(get_dashboard))
        .route("/api/pomodoro", get(pomodoro_status))
        .route("/api/pomodoro/start", post(pomodoro_start))
        .route("/api/pomodoro/pause", post(pomodoro_pause))
        .route("/api/pomodoro/reset", post(pomodoro_reset))
        .route("/api/pomodoro/session", post(pomodoro_session))
        .route("/api/chat", get(get_chat))
        .route("/api/chat/messages", post(send_chat_message))
        .route("/api/chat/new", post(new_chat))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Bind `addr` and serve the API on a background task.
///
/// Returns a shutdown sender and the bound address (useful with port 0).
pub async fn start_server(
    state: DashboardServer,
    addr: SocketAddr,
) -> anyhow::Result<(oneshot::Sender<()>, SocketAddr)> {
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    info!("API server listening on http://{}", bound_addr);

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                info!("API server shutting down");
            })
            .await
        {
            tracing::error!("API server error: {}", e);
        }
    });

    Ok((shutdown_tx, bound_addr))
}
