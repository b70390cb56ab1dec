use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The currently selected epic/task/subtask (persisted to `current.json`).
///
/// Transitions here only change fields; persistence and the `updated`
/// timestamp are handled by `io::focus_io::FocusManager`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusContext {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub epic_key: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub epic_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub task_key: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub task_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub subtask_key: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub subtask_id: String,
    #[serde(default)]
    pub updated: DateTime<Utc>,
}

/// Which levels of the hierarchy are focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusState {
    Empty,
    Epic,
    EpicAndTask,
    EpicAndTaskAndSubtask,
    /// Orphan task: no owning epic
    TaskOnly,
    TaskAndSubtask,
    /// A subtask is focused without the task that owns it
    SubtaskWithoutTask,
}

impl FocusContext {
    /// Focus an epic. Any finer focus belonged to the previous epic and is cleared.
    pub fn set_epic(&mut self, key: &str, id: &str) {
        self.epic_key = key.to_string();
        self.epic_id = id.to_string();
        self.clear_task();
        self.clear_subtask();
    }

    /// Focus a task (or spike) under whatever epic is focused.
    pub fn set_task(&mut self, key: &str, id: &str) {
        self.task_key = key.to_string();
        self.task_id = id.to_string();
        self.clear_subtask();
    }

    pub fn set_subtask(&mut self, key: &str, id: &str) {
        self.subtask_key = key.to_string();
        self.subtask_id = id.to_string();
    }

    /// Set epic and task in one step, without the epic cascade wiping the task.
    pub fn set_epic_and_task(&mut self, epic_key: &str, epic_id: &str, task_key: &str, task_id: &str) {
        self.epic_key = epic_key.to_string();
        self.epic_id = epic_id.to_string();
        self.task_key = task_key.to_string();
        self.task_id = task_id.to_string();
        self.clear_subtask();
    }

    /// Set all three levels directly. Ids are unknown on this path and cleared.
    pub fn set_full(&mut self, epic_key: &str, task_key: &str, subtask_key: &str) {
        self.epic_key = epic_key.to_string();
        self.epic_id.clear();
        self.task_key = task_key.to_string();
        self.task_id.clear();
        self.subtask_key = subtask_key.to_string();
        self.subtask_id.clear();
    }

    pub fn clear(&mut self) {
        self.epic_key.clear();
        self.epic_id.clear();
        self.clear_task();
        self.clear_subtask();
    }

    fn clear_task(&mut self) {
        self.task_key.clear();
        self.task_id.clear();
    }

    fn clear_subtask(&mut self) {
        self.subtask_key.clear();
        self.subtask_id.clear();
    }

    pub fn has_epic(&self) -> bool {
        !self.epic_key.is_empty()
    }

    pub fn has_task(&self) -> bool {
        !self.task_key.is_empty()
    }

    pub fn has_subtask(&self) -> bool {
        !self.subtask_key.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        !self.has_epic() && !self.has_task() && !self.has_subtask()
    }

    pub fn state(&self) -> FocusState {
        match (self.has_epic(), self.has_task(), self.has_subtask()) {
            (false, false, false) => FocusState::Empty,
            (true, false, false) => FocusState::Epic,
            (true, true, false) => FocusState::EpicAndTask,
            (true, true, true) => FocusState::EpicAndTaskAndSubtask,
            (false, true, false) => FocusState::TaskOnly,
            (false, true, true) => FocusState::TaskAndSubtask,
            (_, false, true) => FocusState::SubtaskWithoutTask,
        }
    }
}

impl fmt::Display for FocusContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let levels: Vec<String> = [
            ("Epic", &self.epic_key),
            ("Task", &self.task_key),
            ("Subtask", &self.subtask_key),
        ]
        .into_iter()
        .filter(|(_, key)| !key.is_empty())
        .map(|(label, key)| format!("{}: {}", label, key))
        .collect();

        if levels.is_empty() {
            f.write_str("No context set")
        } else {
            f.write_str(&levels.join(" → "))
        }
    }
}
