//! Dashboard overview computed from a state snapshot.

use crate::store::AppState;
use crate::store::seed::MOTIVATIONAL_QUOTES;
use crate::types::{HabitColor, HabitIcon, Task, TaskStatus};
use chrono::{DateTime, Datelike, Local, Timelike, Utc};
use serde::Serialize;

/// Tasks shown in the "up next" list.
const UPCOMING_LIMIT: usize = 3;

/// Sample weekly study hours, Monday first.
pub const WEEKLY_STUDY_HOURS: [(&str, f32); 7] = [
    ("Mon", 4.0),
    ("Tue", 3.0),
    ("Wed", 5.0),
    ("Thu", 4.5),
    ("Fri", 6.0),
    ("Sat", 8.0),
    ("Sun", 2.0),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitOverview {
    pub id: String,
    pub name: String,
    pub color: HabitColor,
    pub icon: HabitIcon,
    /// Rendering lookups for `color` and `icon`.
    pub color_class: &'static str,
    pub icon_asset: &'static str,
    pub streak: u32,
    /// Run of completed periods ending today, from the completion history.
    pub derived_streak: u32,
    pub completed_today: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudyHours {
    pub day: &'static str,
    pub hours: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub greeting: &'static str,
    pub quote: &'static str,
    pub upcoming_tasks: Vec<Task>,
    pub habits: Vec<HabitOverview>,
    pub weekly_study_hours: Vec<StudyHours>,
}

/// Greeting for a local hour of day.
pub fn greeting(hour: u32) -> &'static str {
    match hour {
        0..12 => "Good morning",
        12..18 => "Good afternoon",
        _ => "Good evening",
    }
}

/// Quote of the day for a 1-based day of the year.
pub fn daily_quote(day_of_year: u32) -> &'static str {
    MOTIVATIONAL_QUOTES[day_of_year as usize % MOTIVATIONAL_QUOTES.len()]
}

impl DashboardSummary {
    /// Build the overview as seen at `now`. Greeting and quote follow local
    /// time; "completed today" uses the UTC day like completion entries do.
    pub fn build(state: &AppState, now: DateTime<Local>) -> Self {
        let today = now.with_timezone(&Utc).date_naive();

        let upcoming_tasks = state
            .board
            .ordered_tasks()
            .into_iter()
            .filter(|t| t.status != TaskStatus::Completed)
            .take(UPCOMING_LIMIT)
            .cloned()
            .collect();

        let habits = state
            .habits
            .iter()
            .map(|h| HabitOverview {
                id: h.id.clone(),
                name: h.name.clone(),
                color: h.color,
                icon: h.icon,
                color_class: h.color.css_class(),
                icon_asset: h.icon.asset_name(),
                streak: h.streak,
                derived_streak: h.derived_streak(today),
                completed_today: h.is_completed_on(today),
            })
            .collect();

        Self {
            greeting: greeting(now.hour()),
            quote: daily_quote(now.ordinal()),
            upcoming_tasks,
            habits,
            weekly_study_hours: WEEKLY_STUDY_HOURS
                .iter()
                .map(|&(day, hours)| StudyHours { day, hours })
                .collect(),
        }
    }
}
