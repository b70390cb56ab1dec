use std::path::{Path, PathBuf};

use crate::io::config_io::{ConfigError, home_dir};
use crate::model::config::Config;

pub const TICKETS_DIR: &str = "tickets";
pub const TEMPLATES_DIR: &str = "templates";
pub const FOCUS_FILE: &str = "current.json";
pub const INBOX_FILE: &str = "inbox.md";

/// File extensions treated as ticket documents
pub const DOCUMENT_EXTENSIONS: &[&str] = &["md", "markdown"];

/// Where everything lives under the data directory.
///
/// ```text
/// <root>/current.json
/// <root>/tickets/<KEY>.md
/// <root>/tickets/inbox.md
/// <root>/templates/
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DataLayout { root: root.into() }
    }

    /// Pick the data directory: explicit override, then `general.data_dir`,
    /// then `~/.local/share/jai`.
    pub fn resolve(data_dir: Option<&Path>, config: &Config) -> Result<Self, ConfigError> {
        if let Some(dir) = data_dir {
            return Ok(DataLayout::new(dir));
        }
        if let Some(dir) = &config.general.data_dir {
            return Ok(DataLayout::new(expand_home(dir)?));
        }
        Ok(DataLayout::new(home_dir()?.join(".local").join("share").join("jai")))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn tickets_dir(&self) -> PathBuf {
        self.root.join(TICKETS_DIR)
    }

    pub fn templates_dir(&self) -> PathBuf {
        self.root.join(TEMPLATES_DIR)
    }

    pub fn focus_path(&self) -> PathBuf {
        self.root.join(FOCUS_FILE)
    }

    /// Document for drafts that have no key yet
    pub fn inbox_path(&self) -> PathBuf {
        self.tickets_dir().join(INBOX_FILE)
    }

    /// Canonical document for a ticket key; the inbox when the key is empty.
    pub fn document_path(&self, key: &str) -> PathBuf {
        if key.is_empty() {
            self.inbox_path()
        } else {
            self.tickets_dir().join(format!("{}.md", key))
        }
    }

    pub fn is_inbox(&self, path: &Path) -> bool {
        path == self.inbox_path()
    }
}

/// Whether a path has a ticket document extension
pub fn is_document(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| DOCUMENT_EXTENSIONS.contains(&ext))
}

/// Expand a leading `~/` against `$HOME`
fn expand_home(path: &Path) -> Result<PathBuf, ConfigError> {
    match path.strip_prefix("~") {
        Ok(rest) => Ok(home_dir()?.join(rest)),
        Err(_) => Ok(path.to_path_buf()),
    }
}
