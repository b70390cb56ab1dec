use std::path::Path;

use serde::Serialize;

use crate::model::config::{Config, mask_secret};
use crate::model::focus::FocusContext;
use crate::model::ticket::{Ticket, TicketType};
use crate::ops::tree::{EpicNode, FocusTree, TaskNode, TicketTree};

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TicketJson {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub key: String,
    #[serde(rename = "type")]
    pub ticket_type: TicketType,
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub status: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub priority: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub epic_key: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub parent_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enriched: Option<String>,
}

#[derive(Serialize)]
pub struct FocusJson {
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub epic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtask: Option<String>,
    pub display: String,
}

#[derive(Serialize)]
pub struct DraftJson {
    #[serde(flatten)]
    pub ticket: TicketJson,
    pub path: String,
}

#[derive(Serialize)]
pub struct OpenJson {
    #[serde(rename = "type")]
    pub ticket_type: TicketType,
    pub key: String,
    pub url: String,
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() { None } else { Some(s.to_string()) }
}

/// JSON form of a ticket; bodies only when `detail` is set
pub fn ticket_to_json(ticket: &Ticket, detail: bool) -> TicketJson {
    TicketJson {
        key: ticket.key.clone(),
        ticket_type: ticket.ticket_type,
        title: ticket.title.clone(),
        status: ticket.status.clone(),
        priority: ticket.priority.clone(),
        labels: ticket.labels.clone(),
        epic_key: ticket.epic_key.clone(),
        parent_key: ticket.parent_key.clone(),
        content: detail.then(|| non_empty(&ticket.raw_content)).flatten(),
        enriched: detail.then(|| non_empty(&ticket.enriched_content)).flatten(),
    }
}

pub fn focus_to_json(focus: &FocusContext) -> FocusJson {
    FocusJson {
        state: format!("{:?}", focus.state()),
        epic: non_empty(&focus.epic_key),
        task: non_empty(&focus.task_key),
        subtask: non_empty(&focus.subtask_key),
        display: focus.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Text formatting
// ---------------------------------------------------------------------------

fn key_or_draft(ticket: &Ticket) -> &str {
    if ticket.has_key() { &ticket.key } else { "(draft)" }
}

/// One-line summary: `KEY  Type  Title  [status]`
pub fn format_ticket_line(ticket: &Ticket) -> String {
    let mut line = format!(
        "{:<10} {:<8} {}",
        key_or_draft(ticket),
        ticket.ticket_type.label(),
        ticket.title
    );
    if !ticket.status.is_empty() {
        line.push_str(&format!("  [{}]", ticket.status));
    }
    line
}

/// Full detail block for `show`
pub fn format_ticket_detail(ticket: &Ticket) -> Vec<String> {
    let mut lines = vec![format!(
        "{} {}: {}",
        key_or_draft(ticket),
        ticket.ticket_type.label(),
        ticket.title
    )];

    let mut field = |name: &str, value: &str| {
        if !value.is_empty() {
            lines.push(format!("  {}: {}", name, value));
        }
    };
    field("status", &ticket.status);
    field("priority", &ticket.priority);
    field("labels", &ticket.labels.join(", "));
    field("epic", &ticket.epic_key);
    if ticket.ticket_type == TicketType::Subtask {
        field("task", &ticket.parent_key);
    }

    for (heading, body) in [
        ("content", &ticket.raw_content),
        ("enriched", &ticket.enriched_content),
    ] {
        if !body.is_empty() {
            lines.push(String::new());
            lines.push(format!("  {}:", heading));
            lines.extend(body.lines().map(|l| format!("    {}", l)));
        }
    }
    lines
}

fn format_task_node(node: &TaskNode, indent: usize, out: &mut Vec<String>) {
    let pad = "  ".repeat(indent);
    out.push(format!("{}{}", pad, format_ticket_line(node.task)));
    for sub in &node.subtasks {
        out.push(format!("{}  {}", pad, format_ticket_line(sub)));
    }
}

fn format_epic_node(node: &EpicNode, out: &mut Vec<String>) {
    out.push(format_ticket_line(node.epic));
    for task in &node.tasks {
        format_task_node(task, 1, out);
    }
}

pub fn format_tree(tree: &TicketTree) -> Vec<String> {
    let mut out = Vec::new();
    for epic in &tree.epics {
        format_epic_node(epic, &mut out);
    }
    if !tree.orphans.is_empty() {
        if !out.is_empty() {
            out.push(String::new());
        }
        out.push("No epic:".to_string());
        for task in &tree.orphans {
            format_task_node(task, 1, &mut out);
        }
    }
    if !tree.loose_subtasks.is_empty() {
        if !out.is_empty() {
            out.push(String::new());
        }
        out.push("No local task:".to_string());
        for sub in &tree.loose_subtasks {
            out.push(format!("  {}", format_ticket_line(sub)));
        }
    }
    out
}

pub fn format_focus_tree(tree: &FocusTree) -> Vec<String> {
    let mut out = Vec::new();
    match tree {
        FocusTree::Epic(node) => format_epic_node(node, &mut out),
        FocusTree::Task(node) => format_task_node(node, 0, &mut out),
    }
    out
}

/// Configuration with secrets masked
pub fn format_config(config: &Config, path: &Path, data_dir: &Path) -> Vec<String> {
    let token = |t: Option<String>| match t {
        Some(t) => mask_secret(&t),
        None => "(not set)".to_string(),
    };
    vec![
        format!("config:   {}", path.display()),
        format!("data dir: {}", data_dir.display()),
        String::new(),
        "[jira]".to_string(),
        format!("  url:             {}", config.jira.url),
        format!("  username:        {}", config.jira.username),
        format!("  project:         {}", config.jira.project),
        format!("  epic_link_field: {}", config.jira.epic_link_field),
        format!("  token:           {}", token(Config::jira_token())),
        "[ai]".to_string(),
        format!("  provider:        {}", config.ai.provider),
        format!("  model:           {}", config.ai.model),
        format!("  max_tokens:      {}", config.ai.max_tokens),
        format!("  token:           {}", token(Config::ai_token())),
        "[general]".to_string(),
        format!("  review_before_create: {}", config.general.review_before_create),
        format!("  default_editor:       {}", config.general.default_editor),
    ]
}
