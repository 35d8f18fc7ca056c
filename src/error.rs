//! Structured error types for store operations and API responses.

use serde::Serialize;
use std::fmt;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors (4xx-like)
    MissingRequiredField,
    InvalidFieldValue,
    InvalidState,

    // Not found errors
    TaskNotFound,
    HabitNotFound,
    ColumnNotFound,

    // Conflict errors
    AlreadyExists,
    ReplyPending,

    // Internal errors
    InternalError,
}

/// Structured error returned by store operations and the HTTP API.
#[derive(Debug, Serialize)]
pub struct AppError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            field: None,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    // Convenience constructors

    pub fn missing_field(field: &str) -> Self {
        Self::new(
            ErrorCode::MissingRequiredField,
            format!("{} is required", field),
        )
        .with_field(field)
    }

    pub fn invalid_value(field: &str, reason: &str) -> Self {
        Self::new(ErrorCode::InvalidFieldValue, reason).with_field(field)
    }

    pub fn invalid_state(reason: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidState, reason)
    }

    pub fn task_not_found(task_id: &str) -> Self {
        Self::new(
            ErrorCode::TaskNotFound,
            format!("Task not found: {}", task_id),
        )
    }

    pub fn habit_not_found(habit_id: &str) -> Self {
        Self::new(
            ErrorCode::HabitNotFound,
            format!("Habit not found: {}", habit_id),
        )
    }

    pub fn column_not_found(column: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::ColumnNotFound,
            format!("Column not found: {}", column),
        )
    }

    pub fn already_exists(id: &str) -> Self {
        Self::new(ErrorCode::AlreadyExists, format!("Id already in use: {}", id))
    }

    pub fn reply_pending() -> Self {
        Self::new(
            ErrorCode::ReplyPending,
            "The study buddy is still answering the previous message",
        )
    }

    pub fn internal(err: impl fmt::Display) -> Self {
        Self::new(ErrorCode::InternalError, err.to_string())
    }

    /// HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self.code {
            ErrorCode::MissingRequiredField
            | ErrorCode::InvalidFieldValue
            | ErrorCode::InvalidState => 400,
            ErrorCode::TaskNotFound | ErrorCode::HabitNotFound | ErrorCode::ColumnNotFound => 404,
            ErrorCode::AlreadyExists | ErrorCode::ReplyPending => 409,
            ErrorCode::InternalError => 500,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

// Allow using ? with anyhow errors by converting them
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<AppError>() {
            Ok(app_err) => app_err,
            Err(err) => AppError::internal(err),
        }
    }
}

/// Result type for store and API operations.
pub type AppResult<T> = std::result::Result<T, AppError>;
