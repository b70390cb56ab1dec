use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// The kind of node a ticket is in the epic → task/spike → subtask hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketType {
    Epic,
    Task,
    Subtask,
    Spike,
}

impl TicketType {
    /// Nesting depth: 1 for epics, 2 for tasks and spikes, 3 for subtasks
    pub fn depth(self) -> usize {
        match self {
            TicketType::Epic => 1,
            TicketType::Task | TicketType::Spike => 2,
            TicketType::Subtask => 3,
        }
    }

    /// Tasks and spikes share the middle level of the hierarchy
    pub fn is_task_like(self) -> bool {
        matches!(self, TicketType::Task | TicketType::Spike)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TicketType::Epic => "epic",
            TicketType::Task => "task",
            TicketType::Subtask => "subtask",
            TicketType::Spike => "spike",
        }
    }

    /// Capitalized name used in human-readable listings
    pub fn label(self) -> &'static str {
        match self {
            TicketType::Epic => "Epic",
            TicketType::Task => "Task",
            TicketType::Subtask => "Subtask",
            TicketType::Spike => "Spike",
        }
    }

    pub fn parse_type(s: &str) -> Option<TicketType> {
        match s.trim().to_ascii_lowercase().as_str() {
            "epic" => Some(TicketType::Epic),
            "task" => Some(TicketType::Task),
            "subtask" | "sub-task" => Some(TicketType::Subtask),
            "spike" => Some(TicketType::Spike),
            _ => None,
        }
    }
}

impl fmt::Display for TicketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One node in the ticket hierarchy.
///
/// String fields use the empty string for "not set", mirroring the upstream
/// ticketing service where most fields are optional text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    /// Upstream key (e.g. `SRE-123`); empty until the ticket is created upstream
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub key: String,
    /// Upstream numeric/opaque id, when known
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(rename = "type")]
    pub ticket_type: TicketType,
    /// Display title. Never contains the bracketed key.
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// User-authored body text
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub raw_content: String,
    /// Body text produced by the enrichment collaborator
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub enriched_content: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub status: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub priority: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    /// Owning task/spike key (subtasks only)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub parent_key: String,
    /// Owning epic key; empty on a task means it is an orphan
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub epic_key: String,
    /// 1-based line of the header in the source document (diagnostics only)
    #[serde(skip)]
    pub line_number: usize,
}

impl Ticket {
    pub fn new(ticket_type: TicketType, title: impl Into<String>) -> Self {
        Ticket {
            key: String::new(),
            id: String::new(),
            ticket_type,
            title: title.into(),
            description: String::new(),
            raw_content: String::new(),
            enriched_content: String::new(),
            status: String::new(),
            priority: String::new(),
            labels: Vec::new(),
            parent_key: String::new(),
            epic_key: String::new(),
            line_number: 0,
        }
    }

    pub fn has_key(&self) -> bool {
        !self.key.is_empty()
    }

    /// A task or spike with no owning epic
    pub fn is_orphan(&self) -> bool {
        self.ticket_type.is_task_like() && self.epic_key.is_empty()
    }

    /// The reference that ties this ticket to its parent level, if any:
    /// the epic for tasks/spikes, the owning task for subtasks.
    pub fn parent_ref(&self) -> Option<&str> {
        let r = match self.ticket_type {
            TicketType::Epic => return None,
            TicketType::Task | TicketType::Spike => &self.epic_key,
            TicketType::Subtask => &self.parent_key,
        };
        if r.is_empty() { None } else { Some(r.as_str()) }
    }

    /// Add a label unless an equal one is already present
    pub fn add_label(&mut self, label: &str) {
        let label = label.trim();
        if !label.is_empty() && !self.labels.iter().any(|l| l == label) {
            self.labels.push(label.to_string());
        }
    }
}

/// Equality ignores the source line, which is diagnostic only.
impl PartialEq for Ticket {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
            && self.id == other.id
            && self.ticket_type == other.ticket_type
            && self.title == other.title
            && self.description == other.description
            && self.raw_content == other.raw_content
            && self.enriched_content == other.enriched_content
            && self.status == other.status
            && self.priority == other.priority
            && self.labels == other.labels
            && self.parent_key == other.parent_key
            && self.epic_key == other.epic_key
    }
}

impl Eq for Ticket {}

/// A parsed ticket document: the tickets in order of appearance plus the
/// path they were loaded from (or will be written to).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketDocument {
    pub path: PathBuf,
    pub tickets: Vec<Ticket>,
}

impl TicketDocument {
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        TicketDocument {
            path: path.into(),
            tickets: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }
}
