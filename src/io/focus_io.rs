use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::debug;

use crate::io::atomic::atomic_write;
use crate::io::layout::DataLayout;
use crate::model::focus::FocusContext;

/// Error type for focus persistence
#[derive(Debug, thiserror::Error)]
pub enum FocusError {
    #[error("could not read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("focus file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("could not write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("could not encode focus: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Owns the focus context and writes it back after every transition
#[derive(Debug)]
pub struct FocusManager {
    path: PathBuf,
    context: FocusContext,
}

impl FocusManager {
    pub fn open(layout: &DataLayout) -> Result<Self, FocusError> {
        Self::load(layout.focus_path())
    }

    /// Load focus from `path`; a missing file starts empty, stamped now.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, FocusError> {
        let path = path.into();
        let context = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).map_err(|e| FocusError::Corrupt {
                path: path.clone(),
                source: e,
            })?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => FocusContext {
                updated: Utc::now(),
                ..FocusContext::default()
            },
            Err(e) => {
                return Err(FocusError::Read {
                    path: path.clone(),
                    source: e,
                });
            }
        };
        Ok(FocusManager { path, context })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn context(&self) -> &FocusContext {
        &self.context
    }

    pub fn set_epic(&mut self, key: &str, id: &str) -> Result<(), FocusError> {
        self.update(|ctx| ctx.set_epic(key, id))
    }

    pub fn set_task(&mut self, key: &str, id: &str) -> Result<(), FocusError> {
        self.update(|ctx| ctx.set_task(key, id))
    }

    pub fn set_subtask(&mut self, key: &str, id: &str) -> Result<(), FocusError> {
        self.update(|ctx| ctx.set_subtask(key, id))
    }

    pub fn set_epic_and_task(
        &mut self,
        epic_key: &str,
        epic_id: &str,
        task_key: &str,
        task_id: &str,
    ) -> Result<(), FocusError> {
        self.update(|ctx| ctx.set_epic_and_task(epic_key, epic_id, task_key, task_id))
    }

    pub fn set_full(
        &mut self,
        epic_key: &str,
        task_key: &str,
        subtask_key: &str,
    ) -> Result<(), FocusError> {
        self.update(|ctx| ctx.set_full(epic_key, task_key, subtask_key))
    }

    pub fn clear(&mut self) -> Result<(), FocusError> {
        self.update(FocusContext::clear)
    }

    /// Apply `transition` to a copy and keep it only once it is on disk.
    fn update(&mut self, transition: impl FnOnce(&mut FocusContext)) -> Result<(), FocusError> {
        let mut next = self.context.clone();
        transition(&mut next);
        self.write(&mut next)?;
        self.context = next;
        Ok(())
    }

    /// Stamp `updated` and write the context to disk
    fn write(&self, context: &mut FocusContext) -> Result<(), FocusError> {
        context.updated = Utc::now();
        let content = serde_json::to_string_pretty(context)?;
        atomic_write(&self.path, content.as_bytes()).map_err(|e| FocusError::Write {
            path: self.path.clone(),
            source: e,
        })?;
        debug!(path = %self.path.display(), focus = %context, "focus saved");
        Ok(())
    }
}
