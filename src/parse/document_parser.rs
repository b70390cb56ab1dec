use tracing::debug;

use crate::model::ticket::Ticket;
use crate::parse::header::{Header, parse_header};
use crate::parse::key::remove_key;
use crate::parse::metadata::{
    ENRICHED_MARKER, METADATA_MARKER, RULE, apply_field, parse_field_line, resolve_field,
};

/// Where lines inside a ticket block are currently going
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Body,
    Enriched,
    Metadata,
}

/// A ticket whose block is still being read
struct OpenTicket {
    ticket: Ticket,
    body: Vec<String>,
    enriched: Vec<String>,
    section: Section,
}

impl OpenTicket {
    fn from_header(header: Header, line_number: usize) -> Self {
        let mut ticket = Ticket::new(header.ticket_type, remove_key(&header.title));
        ticket.key = header.key.unwrap_or_default();
        ticket.line_number = line_number;
        OpenTicket {
            ticket,
            body: Vec::new(),
            enriched: Vec::new(),
            section: Section::Body,
        }
    }

    fn finish(mut self) -> Ticket {
        self.ticket.raw_content = self.body.join("\n").trim().to_string();
        self.ticket.enriched_content = self.enriched.join("\n").trim().to_string();
        self.ticket
    }
}

/// Parse a ticket document into its tickets, in order of appearance.
///
/// Never fails: lines that are not recognized as headers, section markers or
/// metadata fields become body text of the enclosing ticket. Lines before
/// the first header belong to no ticket and are dropped.
pub fn parse_document(source: &str) -> Vec<Ticket> {
    let lines: Vec<&str> = source.lines().collect();
    let mut tickets = Vec::new();
    let mut current: Option<OpenTicket> = None;
    let mut idx = 0;

    while idx < lines.len() {
        let line = lines[idx];

        if let Some(header) = parse_header(line) {
            if let Some(open) = current.take() {
                tickets.push(open.finish());
            }
            current = Some(OpenTicket::from_header(header, idx + 1));
            idx += 1;
            continue;
        }

        let Some(open) = current.as_mut() else {
            if !line.trim().is_empty() {
                debug!(line = idx + 1, "ignoring content before first ticket header");
            }
            idx += 1;
            continue;
        };

        let trimmed = line.trim();

        // A rule only opens a section when the very next line is a marker.
        // Otherwise it is ordinary content and the next line is read normally.
        if trimmed == RULE {
            match lines.get(idx + 1).map(|l| l.trim()) {
                Some(METADATA_MARKER) => {
                    open.section = Section::Metadata;
                    idx += 2;
                    continue;
                }
                Some(ENRICHED_MARKER) if open.section == Section::Body => {
                    open.section = Section::Enriched;
                    idx += 2;
                    continue;
                }
                _ => {}
            }
        }

        match open.section {
            Section::Metadata => {
                if trimmed.is_empty() {
                    open.section = Section::Body;
                } else if let Some((name, value)) = parse_field_line(line) {
                    match resolve_field(name, open.ticket.ticket_type) {
                        Some(field) => apply_field(&mut open.ticket, field, value),
                        None => debug!(
                            field = name,
                            line = idx + 1,
                            ticket_type = %open.ticket.ticket_type,
                            "dropping unrecognized metadata field"
                        ),
                    }
                } else {
                    open.section = Section::Body;
                    open.body.push(line.to_string());
                }
            }
            Section::Enriched => open.enriched.push(line.to_string()),
            Section::Body => open.body.push(line.to_string()),
        }
        idx += 1;
    }

    if let Some(open) = current.take() {
        tickets.push(open.finish());
    }

    tickets
}
