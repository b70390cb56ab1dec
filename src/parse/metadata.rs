use crate::model::ticket::{Ticket, TicketType};

/// Horizontal rule that precedes the metadata and enriched sections
pub const RULE: &str = "---";
pub const METADATA_MARKER: &str = "*Metadata:*";
pub const ENRICHED_MARKER: &str = "*Enriched:*";

/// The ticket field a metadata line writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataField {
    Key,
    Status,
    Priority,
    Labels,
    /// `Ticket::epic_key`
    EpicRef,
    /// `Ticket::parent_key`
    ParentTaskRef,
}

/// Resolve a metadata field name for a ticket of type `owner`.
///
/// `ParentKey` is overloaded: it names the epic for tasks and spikes but the
/// owning task for subtasks. Unknown names resolve to `None`.
pub fn resolve_field(name: &str, owner: TicketType) -> Option<MetadataField> {
    use MetadataField::*;
    use TicketType::*;

    match (name, owner) {
        ("Key", _) => Some(Key),
        ("Status", _) => Some(Status),
        ("Priority", _) => Some(Priority),
        ("Labels", _) => Some(Labels),
        ("EpicKey" | "ParentEpic", _) => Some(EpicRef),
        ("ParentKey", Task | Spike) => Some(EpicRef),
        ("ParentKey", Subtask) => Some(ParentTaskRef),
        ("ParentKey", Epic) => None,
        ("TaskKey", Subtask) => Some(ParentTaskRef),
        ("TaskKey", _) => None,
        ("ParentTask", _) => Some(ParentTaskRef),
        _ => None,
    }
}

/// Split a `- Field: value` line into its name and trimmed value
pub fn parse_field_line(line: &str) -> Option<(&str, &str)> {
    let rest = line.trim().strip_prefix("- ")?;
    let (name, value) = rest.split_once(':')?;
    let name = name.trim();
    if name.is_empty() || name.contains(char::is_whitespace) {
        return None;
    }
    Some((name, value.trim()))
}

pub fn apply_field(ticket: &mut Ticket, field: MetadataField, value: &str) {
    match field {
        MetadataField::Key => ticket.key = value.to_string(),
        MetadataField::Status => ticket.status = value.to_string(),
        MetadataField::Priority => ticket.priority = value.to_string(),
        MetadataField::Labels => {
            for label in value.split(',') {
                ticket.add_label(label);
            }
        }
        MetadataField::EpicRef => ticket.epic_key = value.to_string(),
        MetadataField::ParentTaskRef => ticket.parent_key = value.to_string(),
    }
}

/// Emit the metadata block for a ticket: rule, marker, non-empty fields,
/// then a blank line.
pub fn format_metadata(ticket: &Ticket) -> Vec<String> {
    let mut lines = vec![RULE.to_string(), METADATA_MARKER.to_string()];

    let mut push = |name: &str, value: &str| {
        if !value.is_empty() {
            lines.push(format!("- {}: {}", name, value));
        }
    };

    push("Key", &ticket.key);
    push("Status", &ticket.status);
    push("Priority", &ticket.priority);
    push("Labels", &ticket.labels.join(", "));

    match ticket.ticket_type {
        TicketType::Epic => push("EpicKey", &ticket.epic_key),
        TicketType::Task | TicketType::Spike => push("ParentKey", &ticket.epic_key),
        TicketType::Subtask => {
            push("TaskKey", &ticket.parent_key);
            push("EpicKey", &ticket.epic_key);
        }
    }

    lines.push(String::new());
    lines
}
