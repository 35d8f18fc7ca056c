//! Core types for the studydesk store.
//!
//! Wire names follow the front end's JSON shape: camelCase fields and
//! kebab-case enum values (`in-progress`, `glass-water`).

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use uuid::Uuid;

/// Generate a fresh entity id.
pub fn new_id() -> String {
    Uuid::now_v7().to_string()
}

/// Deserialize a present field (including `null`) as `Some`, so that
/// `Option<Option<T>>` can tell "absent" from "cleared".
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// Kanban status. Doubles as the column id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Completed,
}

impl TaskStatus {
    /// All statuses in default left-to-right display order.
    pub const ALL: [TaskStatus; 3] = [
        TaskStatus::Todo,
        TaskStatus::InProgress,
        TaskStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Completed => "completed",
        }
    }

    /// Display title of the column holding this status.
    pub fn title(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "To Do",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Completed => "Completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "todo" => Some(TaskStatus::Todo),
            "in-progress" => Some(TaskStatus::InProgress),
            "completed" => Some(TaskStatus::Completed),
            _ => None,
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
            TaskPriority::Urgent => "urgent",
        }
    }
}

/// A checklist item inside a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subtask {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub is_completed: bool,
}

/// A task on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
}

/// Tags form a set: drop repeats, keeping first-seen order.
fn dedup_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.into_iter().filter(|t| seen.insert(t.clone())).collect()
}

/// Input for creating a task; the id and status are assigned on insert.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Build the task record with a caller-assigned id.
    pub fn into_task(self, id: String, status: TaskStatus) -> Task {
        Task {
            id,
            title: self.title,
            description: self.description,
            status,
            priority: self.priority,
            due_date: self.due_date,
            tags: dedup_tags(self.tags),
            subtasks: self.subtasks,
        }
    }
}

/// Partial task update. Absent fields are left alone; `null` clears the
/// optional ones. Status is changed only by moving the task.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_some",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    #[serde(
        default,
        deserialize_with = "deserialize_some",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtasks: Option<Vec<Subtask>>,
}

impl TaskPatch {
    /// Merge the supplied fields into `task`.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(ref title) = self.title {
            task.title = title.clone();
        }
        if let Some(ref description) = self.description {
            task.description = description.clone();
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(ref due_date) = self.due_date {
            task.due_date = due_date.clone();
        }
        if let Some(ref tags) = self.tags {
            task.tags = dedup_tags(tags.clone());
        }
        if let Some(ref subtasks) = self.subtasks {
            task.subtasks = subtasks.clone();
        }
    }
}

/// A kanban column: an ordered bucket of task ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: TaskStatus,
    pub title: String,
    pub task_ids: Vec<String>,
}

impl Column {
    pub fn empty(id: TaskStatus) -> Self {
        Self {
            id,
            title: id.title().to_string(),
            task_ids: Vec::new(),
        }
    }
}

/// The kanban board aggregate.
///
/// Fields are read-only outside the store; every mutation goes through the
/// methods in `store::board`, which keep the task map and the column lists
/// in agreement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub(crate) tasks: HashMap<String, Task>,
    pub(crate) columns: BTreeMap<TaskStatus, Column>,
    pub(crate) column_order: Vec<TaskStatus>,
}

impl Default for Board {
    fn default() -> Self {
        Self {
            tasks: HashMap::new(),
            columns: TaskStatus::ALL
                .into_iter()
                .map(|s| (s, Column::empty(s)))
                .collect(),
            column_order: TaskStatus::ALL.to_vec(),
        }
    }
}

impl Board {
    pub fn tasks(&self) -> &HashMap<String, Task> {
        &self.tasks
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.get(id)
    }

    pub fn column(&self, id: TaskStatus) -> Option<&Column> {
        self.columns.get(&id)
    }

    pub fn column_order(&self) -> &[TaskStatus] {
        &self.column_order
    }

    /// Tasks of a column in display order.
    pub fn column_tasks(&self, id: TaskStatus) -> Vec<&Task> {
        self.columns
            .get(&id)
            .map(|c| c.task_ids.iter().filter_map(|t| self.tasks.get(t)).collect())
            .unwrap_or_default()
    }

    /// Tasks in board order: columns left to right, top to bottom.
    pub fn ordered_tasks(&self) -> Vec<&Task> {
        self.column_order
            .iter()
            .flat_map(|c| self.column_tasks(*c))
            .collect()
    }
}

/// How often a habit is meant to be done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HabitFrequency {
    #[default]
    Daily,
    Weekly,
}

/// Habit colour tag. Closed set; `css_class` is the rendering lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HabitColor {
    Red,
    Orange,
    Yellow,
    Green,
    Teal,
    #[default]
    Blue,
    Indigo,
    Purple,
    Pink,
    Sky,
}

impl HabitColor {
    pub fn css_class(&self) -> &'static str {
        match self {
            HabitColor::Red => "bg-red-500",
            HabitColor::Orange => "bg-orange-500",
            HabitColor::Yellow => "bg-yellow-500",
            HabitColor::Green => "bg-green-500",
            HabitColor::Teal => "bg-teal-500",
            HabitColor::Blue => "bg-blue-500",
            HabitColor::Indigo => "bg-indigo-500",
            HabitColor::Purple => "bg-purple-500",
            HabitColor::Pink => "bg-pink-500",
            HabitColor::Sky => "bg-sky-400",
        }
    }
}

/// Habit icon tag. Closed set; `asset_name` is the rendering lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HabitIcon {
    #[default]
    BookOpen,
    Dumbbell,
    GlassWater,
    BrainCircuit,
    Zap,
    Timer,
}

impl HabitIcon {
    pub fn asset_name(&self) -> &'static str {
        match self {
            HabitIcon::BookOpen => "BookOpen",
            HabitIcon::Dumbbell => "Dumbbell",
            HabitIcon::GlassWater => "GlassWater",
            HabitIcon::BrainCircuit => "BrainCircuit",
            HabitIcon::Zap => "Zap",
            HabitIcon::Timer => "Timer",
        }
    }
}

/// A tracked recurring activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub frequency: HabitFrequency,
    #[serde(default)]
    pub color: HabitColor,
    #[serde(default)]
    pub icon: HabitIcon,
    #[serde(default)]
    pub streak: u32,
    /// ISO instants, one per completed day.
    #[serde(default)]
    pub completions: Vec<String>,
}

/// Input for creating a habit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHabit {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub frequency: HabitFrequency,
    #[serde(default)]
    pub color: HabitColor,
    #[serde(default)]
    pub icon: HabitIcon,
}

impl NewHabit {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Partial habit update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<HabitFrequency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<HabitColor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<HabitIcon>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub streak: Option<u32>,
}

impl HabitPatch {
    pub fn apply_to(&self, habit: &mut Habit) {
        if let Some(ref name) = self.name {
            habit.name = name.clone();
        }
        if let Some(frequency) = self.frequency {
            habit.frequency = frequency;
        }
        if let Some(color) = self.color {
            habit.color = color;
        }
        if let Some(icon) = self.icon {
            habit.icon = icon;
        }
        if let Some(streak) = self.streak {
            habit.streak = streak;
        }
    }
}

/// Colour scheme of the front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

/// Pomodoro durations in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PomodoroSettings {
    #[serde(default = "default_work_minutes")]
    pub work: u32,
    #[serde(default = "default_short_break_minutes")]
    pub short_break: u32,
    #[serde(default = "default_long_break_minutes")]
    pub long_break: u32,
}

impl Default for PomodoroSettings {
    fn default() -> Self {
        Self {
            work: default_work_minutes(),
            short_break: default_short_break_minutes(),
            long_break: default_long_break_minutes(),
        }
    }
}

fn default_work_minutes() -> u32 {
    25
}

fn default_short_break_minutes() -> u32 {
    5
}

fn default_long_break_minutes() -> u32 {
    15
}

/// Partial pomodoro settings update. Values below one minute are raised to one.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PomodoroSettingsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_break: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_break: Option<u32>,
}

impl PomodoroSettingsPatch {
    pub fn apply_to(&self, settings: &mut PomodoroSettings) {
        if let Some(work) = self.work {
            settings.work = work.max(1);
        }
        if let Some(short_break) = self.short_break {
            settings.short_break = short_break.max(1);
        }
        if let Some(long_break) = self.long_break {
            settings.long_break = long_break.max(1);
        }
    }
}
