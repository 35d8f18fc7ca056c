//! studydesk library
//!
//! In-memory productivity service: kanban board, habit tracker, pomodoro
//! timer and a chat study buddy, served over a JSON HTTP API.

pub mod chat;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod logging;
pub mod pomodoro;
pub mod store;
pub mod timer;
pub mod types;
