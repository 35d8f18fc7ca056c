//! Application state container.
//!
//! The store holds one immutable [`AppState`] snapshot. Every mutation is an
//! [`Action`] run through [`reduce`], a pure function from the current
//! snapshot to the next one. [`Store::dispatch`] serialises writers, swaps
//! the new snapshot in atomically and bumps a revision counter that views can
//! watch to know when to re-render. Readers never block and never see a
//! half-applied mutation.

pub mod board;
pub mod habits;
pub mod seed;

pub use board::TaskMove;
pub use habits::{completion_day, completion_key};

use crate::error::{AppError, AppResult};
use crate::types::{
    Board, Habit, HabitPatch, NewHabit, NewTask, PomodoroSettings, PomodoroSettingsPatch, Task,
    TaskPatch, TaskStatus, Theme, new_id,
};
use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tracing::debug;

/// A complete snapshot of the application state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub board: Board,
    pub habits: Vec<Habit>,
    pub theme: Theme,
    pub pomodoro_settings: PomodoroSettings,
}

impl AppState {
    /// State pre-filled with the sample board and habits.
    pub fn sample() -> Self {
        Self {
            board: seed::sample_board(),
            habits: seed::sample_habits(),
            ..Default::default()
        }
    }

    pub fn habit(&self, id: &str) -> Option<&Habit> {
        self.habits.iter().find(|h| h.id == id)
    }
}

/// A state mutation.
#[derive(Debug, Clone)]
pub enum Action {
    MoveTask(TaskMove),
    AddTask { column: TaskStatus, task: Task },
    UpdateTask { task_id: String, patch: TaskPatch },
    DeleteTask { task_id: String },
    ToggleHabitCompletion { habit_id: String, date: String },
    AddHabit(Habit),
    UpdateHabit { habit_id: String, patch: HabitPatch },
    DeleteHabit { habit_id: String },
    SetTheme(Theme),
    UpdatePomodoroSettings(PomodoroSettingsPatch),
}

impl Action {
    fn name(&self) -> &'static str {
        match self {
            Action::MoveTask(_) => "move_task",
            Action::AddTask { .. } => "add_task",
            Action::UpdateTask { .. } => "update_task",
            Action::DeleteTask { .. } => "delete_task",
            Action::ToggleHabitCompletion { .. } => "toggle_habit_completion",
            Action::AddHabit(_) => "add_habit",
            Action::UpdateHabit { .. } => "update_habit",
            Action::DeleteHabit { .. } => "delete_habit",
            Action::SetTheme(_) => "set_theme",
            Action::UpdatePomodoroSettings(_) => "update_pomodoro_settings",
        }
    }
}

/// Compute the snapshot that follows `state` under `action`.
///
/// Returns `Ok(None)` when the action is a no-op (same-slot move, unknown
/// id on update/delete/toggle). Validation failures leave `state` untouched.
pub fn reduce(state: &AppState, action: &Action) -> AppResult<Option<AppState>> {
    let mut next = state.clone();
    let applied = match action {
        Action::MoveTask(mv) => next.board.move_task(mv)?,
        Action::AddTask { column, task } => {
            next.board.add_task(*column, task.clone())?;
            true
        }
        Action::UpdateTask { task_id, patch } => next.board.update_task(task_id, patch)?,
        Action::DeleteTask { task_id } => next.board.delete_task(task_id),
        Action::ToggleHabitCompletion { habit_id, date } => {
            habits::toggle_completion(&mut next.habits, habit_id, date)
        }
        Action::AddHabit(habit) => {
            habits::add_habit(&mut next.habits, habit.clone())?;
            true
        }
        Action::UpdateHabit { habit_id, patch } => {
            habits::update_habit(&mut next.habits, habit_id, patch)?
        }
        Action::DeleteHabit { habit_id } => habits::delete_habit(&mut next.habits, habit_id),
        Action::SetTheme(theme) => {
            next.theme = *theme;
            true
        }
        Action::UpdatePomodoroSettings(patch) => {
            patch.apply_to(&mut next.pomodoro_settings);
            true
        }
    };
    Ok(applied.then_some(next))
}

/// Result of a dispatched action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A new snapshot was published under this revision.
    Applied { revision: u64 },
    /// Nothing changed.
    NoOp,
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied { .. })
    }
}

/// Shared state container.
pub struct Store {
    current: ArcSwap<AppState>,
    writer: Mutex<()>,
    revision: watch::Sender<u64>,
}

impl Store {
    pub fn new(initial: AppState) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            current: ArcSwap::from_pointee(initial),
            writer: Mutex::new(()),
            revision,
        }
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Arc<AppState> {
        self.current.load_full()
    }

    /// Revision of the current snapshot; starts at 0.
    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    /// Receiver notified whenever a new snapshot is published.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// Apply an action and publish the resulting snapshot.
    pub fn dispatch(&self, action: Action) -> AppResult<Outcome> {
        let _guard = self.writer.lock().unwrap_or_else(|e| e.into_inner());
        let current = self.current.load();
        match reduce(&current, &action)? {
            Some(next) => {
                self.current.store(Arc::new(next));
                let mut revision = 0;
                self.revision.send_modify(|r| {
                    *r += 1;
                    revision = *r;
                });
                debug!(action = action.name(), revision, "State updated");
                Ok(Outcome::Applied { revision })
            }
            None => {
                debug!(action = action.name(), "Action was a no-op");
                Ok(Outcome::NoOp)
            }
        }
    }

    // Convenience wrappers used by the API and CLI.

    pub fn move_task(&self, mv: TaskMove) -> AppResult<Outcome> {
        self.dispatch(Action::MoveTask(mv))
    }

    /// Create a task with a fresh id at the end of `column`.
    pub fn create_task(&self, column: TaskStatus, input: NewTask) -> AppResult<Task> {
        let id = new_id();
        self.add_task(column, input.into_task(id.clone(), column))?;
        self.snapshot()
            .board
            .task(&id)
            .cloned()
            .ok_or_else(|| AppError::internal(format!("Task {} vanished after insert", id)))
    }

    pub fn add_task(&self, column: TaskStatus, task: Task) -> AppResult<Outcome> {
        self.dispatch(Action::AddTask { column, task })
    }

    pub fn update_task(&self, task_id: &str, patch: TaskPatch) -> AppResult<Outcome> {
        self.dispatch(Action::UpdateTask {
            task_id: task_id.to_string(),
            patch,
        })
    }

    pub fn delete_task(&self, task_id: &str) -> AppResult<Outcome> {
        self.dispatch(Action::DeleteTask {
            task_id: task_id.to_string(),
        })
    }

    pub fn toggle_habit_completion(&self, habit_id: &str, date: &str) -> AppResult<Outcome> {
        self.dispatch(Action::ToggleHabitCompletion {
            habit_id: habit_id.to_string(),
            date: date.to_string(),
        })
    }

    /// Create a habit with a fresh id, zero streak and no completions.
    pub fn add_habit(&self, input: NewHabit) -> AppResult<Habit> {
        let habit = Habit::create(input)?;
        self.dispatch(Action::AddHabit(habit.clone()))?;
        Ok(habit)
    }

    pub fn update_habit(&self, habit_id: &str, patch: HabitPatch) -> AppResult<Outcome> {
        self.dispatch(Action::UpdateHabit {
            habit_id: habit_id.to_string(),
            patch,
        })
    }

    pub fn delete_habit(&self, habit_id: &str) -> AppResult<Outcome> {
        self.dispatch(Action::DeleteHabit {
            habit_id: habit_id.to_string(),
        })
    }

    pub fn set_theme(&self, theme: Theme) -> AppResult<Outcome> {
        self.dispatch(Action::SetTheme(theme))
    }

    pub fn update_pomodoro_settings(
        &self,
        patch: PomodoroSettingsPatch,
    ) -> AppResult<PomodoroSettings> {
        self.dispatch(Action::UpdatePomodoroSettings(patch))?;
        Ok(self.snapshot().pomodoro_settings)
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new(AppState::default())
    }
}
