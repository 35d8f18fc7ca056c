//! Board mutations.
//!
//! The task map and the column id lists are only ever changed here. Every
//! method either applies completely or returns an error before touching
//! anything, and the board invariant holds after each call: the ids across
//! all column lists are exactly the task map keys, each appearing once, and
//! every task's status names the column that lists it.

use crate::error::{AppError, AppResult};
use crate::types::{Board, Task, TaskPatch, TaskStatus};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A drag-and-drop move of one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskMove {
    pub task_id: String,
    pub source_column: TaskStatus,
    pub dest_column: TaskStatus,
    pub source_index: usize,
    pub dest_index: usize,
}

impl TaskMove {
    pub fn new(
        task_id: impl Into<String>,
        source_column: TaskStatus,
        dest_column: TaskStatus,
        source_index: usize,
        dest_index: usize,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            source_column,
            dest_column,
            source_index,
            dest_index,
        }
    }

    fn is_noop(&self) -> bool {
        self.source_column == self.dest_column && self.source_index == self.dest_index
    }
}

pub(crate) fn validate_title(title: &str) -> AppResult<()> {
    if title.trim().is_empty() {
        return Err(AppError::missing_field("title"));
    }
    Ok(())
}

impl Board {
    /// Move a task between (or within) columns.
    ///
    /// Returns `Ok(false)` when source and destination coincide. The task id
    /// must sit at `source_index` of the source column. A destination index
    /// past the end of the list appends.
    pub(crate) fn move_task(&mut self, mv: &TaskMove) -> AppResult<bool> {
        if mv.is_noop() {
            return Ok(false);
        }
        if !self.columns.contains_key(&mv.dest_column) {
            return Err(AppError::column_not_found(mv.dest_column));
        }

        let source = self
            .columns
            .get_mut(&mv.source_column)
            .ok_or_else(|| AppError::column_not_found(mv.source_column))?;
        if source.task_ids.get(mv.source_index) != Some(&mv.task_id) {
            return Err(AppError::invalid_state(format!(
                "Task {} is not at index {} of column {}",
                mv.task_id, mv.source_index, mv.source_column
            ))
            .with_field("sourceIndex"));
        }
        source.task_ids.remove(mv.source_index);

        if let Some(dest) = self.columns.get_mut(&mv.dest_column) {
            let at = mv.dest_index.min(dest.task_ids.len());
            dest.task_ids.insert(at, mv.task_id.clone());
        }

        if mv.source_column != mv.dest_column {
            if let Some(task) = self.tasks.get_mut(&mv.task_id) {
                task.status = mv.dest_column;
            }
        }
        Ok(true)
    }

    /// Append a task to the end of `column`. The task's status is set to the
    /// column so the two never disagree.
    pub(crate) fn add_task(&mut self, column: TaskStatus, mut task: Task) -> AppResult<()> {
        validate_title(&task.title)?;
        if task.id.trim().is_empty() {
            return Err(AppError::missing_field("id"));
        }
        if self.tasks.contains_key(&task.id) {
            return Err(AppError::already_exists(&task.id));
        }
        let col = self
            .columns
            .get_mut(&column)
            .ok_or_else(|| AppError::column_not_found(column))?;

        task.status = column;
        col.task_ids.push(task.id.clone());
        self.tasks.insert(task.id.clone(), task);
        Ok(())
    }

    /// Merge `patch` into the task. Unknown ids are a no-op (`Ok(false)`).
    pub(crate) fn update_task(&mut self, task_id: &str, patch: &TaskPatch) -> AppResult<bool> {
        if let Some(ref title) = patch.title {
            validate_title(title)?;
        }
        match self.tasks.get_mut(task_id) {
            Some(task) => {
                patch.apply_to(task);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Remove a task from its column and from the task map. Unknown ids are
    /// a no-op, so deleting twice is harmless.
    pub(crate) fn delete_task(&mut self, task_id: &str) -> bool {
        let Some(task) = self.tasks.remove(task_id) else {
            return false;
        };
        if let Some(column) = self.columns.get_mut(&task.status) {
            column.task_ids.retain(|id| id != task_id);
        }
        true
    }

    /// Check the cross-structure invariant.
    pub fn verify_invariants(&self) -> AppResult<()> {
        let mut seen: HashSet<&str> = HashSet::new();
        for status in &self.column_order {
            let column = self
                .columns
                .get(status)
                .ok_or_else(|| AppError::column_not_found(*status))?;
            if column.id != *status {
                return Err(AppError::invalid_state(format!(
                    "Column keyed {} has id {}",
                    status, column.id
                )));
            }
            for id in &column.task_ids {
                if !seen.insert(id.as_str()) {
                    return Err(AppError::invalid_state(format!(
                        "Task {} is listed more than once",
                        id
                    )));
                }
                let task = self.tasks.get(id).ok_or_else(|| {
                    AppError::invalid_state(format!("Column {} lists unknown task {}", status, id))
                })?;
                if task.status != *status {
                    return Err(AppError::invalid_state(format!(
                        "Task {} has status {} but sits in column {}",
                        id, task.status, status
                    )));
                }
            }
        }
        if seen.len() != self.tasks.len() {
            return Err(AppError::invalid_state(format!(
                "{} task(s) are not in any column",
                self.tasks.len() - seen.len()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::types::NewTask;

    fn board_with(todo: &[&str]) -> Board {
        let mut board = Board::default();
        for id in todo {
            board
                .add_task(
                    TaskStatus::Todo,
                    NewTask::new(format!("task {id}")).into_task(id.to_string(), TaskStatus::Todo),
                )
                .unwrap();
        }
        board
    }

    fn ids(board: &Board, column: TaskStatus) -> Vec<String> {
        board.column(column).unwrap().task_ids.clone()
    }

    #[test]
    fn move_across_columns_updates_status() {
        let mut board = board_with(&["t1", "t2"]);
        let moved = board
            .move_task(&TaskMove::new("t1", TaskStatus::Todo, TaskStatus::Completed, 0, 0))
            .unwrap();

        assert!(moved);
        assert_eq!(ids(&board, TaskStatus::Todo), vec!["t2"]);
        assert_eq!(ids(&board, TaskStatus::Completed), vec!["t1"]);
        assert_eq!(board.task("t1").unwrap().status, TaskStatus::Completed);
        board.verify_invariants().unwrap();
    }

    #[test]
    fn move_within_column_reorders_without_touching_status() {
        let mut board = board_with(&["t1", "t2", "t3"]);
        board
            .move_task(&TaskMove::new("t1", TaskStatus::Todo, TaskStatus::Todo, 0, 2))
            .unwrap();

        assert_eq!(ids(&board, TaskStatus::Todo), vec!["t2", "t3", "t1"]);
        assert_eq!(board.task("t1").unwrap().status, TaskStatus::Todo);
        board.verify_invariants().unwrap();
    }

    #[test]
    fn move_to_same_slot_is_noop() {
        let mut board = board_with(&["t1", "t2"]);
        let before = board.clone();
        let moved = board
            .move_task(&TaskMove::new("t2", TaskStatus::Todo, TaskStatus::Todo, 1, 1))
            .unwrap();
        assert!(!moved);
        assert_eq!(board, before);
    }

    #[test]
    fn move_past_end_appends() {
        let mut board = board_with(&["t1", "t2"]);
        board
            .add_task(
                TaskStatus::Completed,
                NewTask::new("done").into_task("d1".into(), TaskStatus::Completed),
            )
            .unwrap();
        board
            .move_task(&TaskMove::new("t1", TaskStatus::Todo, TaskStatus::Completed, 0, 99))
            .unwrap();
        assert_eq!(ids(&board, TaskStatus::Completed), vec!["d1", "t1"]);
    }

    #[test]
    fn move_rejects_stale_source_index() {
        let mut board = board_with(&["t1", "t2"]);
        let before = board.clone();
        let err = board
            .move_task(&TaskMove::new("t1", TaskStatus::Todo, TaskStatus::Completed, 1, 0))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidState);
        assert_eq!(board, before);
    }

    #[test]
    fn add_task_forces_status_and_rejects_duplicates() {
        let mut board = Board::default();
        board
            .add_task(
                TaskStatus::InProgress,
                NewTask::new("a").into_task("a".into(), TaskStatus::Todo),
            )
            .unwrap();
        assert_eq!(board.task("a").unwrap().status, TaskStatus::InProgress);

        let err = board
            .add_task(
                TaskStatus::Todo,
                NewTask::new("again").into_task("a".into(), TaskStatus::Todo),
            )
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::AlreadyExists);
        board.verify_invariants().unwrap();
    }

    #[test]
    fn add_task_rejects_blank_title() {
        let mut board = Board::default();
        let err = board
            .add_task(
                TaskStatus::Todo,
                NewTask::new("   ").into_task("a".into(), TaskStatus::Todo),
            )
            .unwrap_err();
        assert_eq!(err.field.as_deref(), Some("title"));
        assert!(board.tasks().is_empty());
    }

    #[test]
    fn update_unknown_task_is_noop() {
        let mut board = board_with(&["t1"]);
        let patch = TaskPatch {
            title: Some("renamed".into()),
            ..Default::default()
        };
        assert!(!board.update_task("nope", &patch).unwrap());
        assert!(board.update_task("t1", &patch).unwrap());
        assert_eq!(board.task("t1").unwrap().title, "renamed");
    }

    #[test]
    fn delete_is_idempotent() {
        let mut board = board_with(&["t1", "t2"]);
        assert!(board.delete_task("t1"));
        assert!(!board.delete_task("t1"));
        assert_eq!(ids(&board, TaskStatus::Todo), vec!["t2"]);
        assert!(board.task("t1").is_none());
        board.verify_invariants().unwrap();
    }
}
