use crate::model::ticket::TicketType;
use crate::parse::key::{extract_key, remove_key};

/// Legacy marker written by older imports for spikes
const LEGACY_SPIKE_MARKER: &str = "#### spike:";

/// A recognized ticket header line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub ticket_type: TicketType,
    /// Title as written, key still in place
    pub title: String,
    pub key: Option<String>,
}

/// The header marker for a ticket type
pub fn marker(ticket_type: TicketType) -> &'static str {
    match ticket_type {
        TicketType::Epic => "# epic:",
        TicketType::Task => "## task:",
        TicketType::Spike => "## spike:",
        TicketType::Subtask => "### subtask:",
    }
}

/// Recognize a header line, returning its type, title and key.
///
/// Markers are matched exactly after trimming; `#### spike:` is accepted as
/// an alias for the spike marker.
pub fn parse_header(line: &str) -> Option<Header> {
    let trimmed = line.trim();

    let (ticket_type, rest) = [
        TicketType::Epic,
        TicketType::Task,
        TicketType::Spike,
        TicketType::Subtask,
    ]
    .into_iter()
    .find_map(|t| trimmed.strip_prefix(marker(t)).map(|rest| (t, rest)))
    .or_else(|| {
        trimmed
            .strip_prefix(LEGACY_SPIKE_MARKER)
            .map(|rest| (TicketType::Spike, rest))
    })?;

    let title = rest.trim().to_string();
    let key = extract_key(&title).map(str::to_string);
    Some(Header {
        ticket_type,
        title,
        key,
    })
}

/// Produce the header line for a ticket.
///
/// Key-shaped words are stripped from the title even when `key` is empty:
/// the parser reads any bare `ABC-123` in a header as the ticket's key, so
/// leaving one in a keyless title would give the draft a bogus key on the
/// next load.
pub fn format_header(ticket_type: TicketType, title: &str, key: &str) -> String {
    let title = remove_key(title);
    if key.is_empty() {
        format!("{} {}", marker(ticket_type), title)
    } else {
        format!("{} {} [{}]", marker(ticket_type), title, key)
    }
}
