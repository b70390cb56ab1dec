use crate::model::ticket::Ticket;
use crate::parse::header::format_header;
use crate::parse::metadata::{ENRICHED_MARKER, RULE, format_metadata};

/// Serialize tickets back to document text.
///
/// Each ticket is written as header, raw body, optional enriched section and
/// metadata block, followed by two blank lines.
pub fn serialize_document(tickets: &[Ticket]) -> String {
    let mut lines: Vec<String> = Vec::new();

    for ticket in tickets {
        lines.push(format_header(
            ticket.ticket_type,
            &ticket.title,
            &ticket.key,
        ));

        if !ticket.raw_content.is_empty() {
            lines.push(ticket.raw_content.clone());
        }

        if !ticket.enriched_content.is_empty() {
            lines.push(String::new());
            lines.push(RULE.to_string());
            lines.push(ENRICHED_MARKER.to_string());
            lines.push(ticket.enriched_content.clone());
        }

        lines.push(String::new());
        lines.extend(format_metadata(ticket));
        lines.push(String::new());
        lines.push(String::new());
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ticket::TicketType;
    use crate::parse::document_parser::parse_document;
    use pretty_assertions::assert_eq;

    fn sample() -> Vec<Ticket> {
        let mut epic = Ticket::new(TicketType::Epic, "Observability Refactor");
        epic.key = "OBS-1".into();
        epic.raw_content = "Improve tracing coverage.".into();

        let mut task = Ticket::new(TicketType::Task, "Add Jaeger exporter [OBS-2]");
        task.key = "OBS-2".into();
        task.epic_key = "OBS-1".into();
        task.status = "To Do".into();
        task.raw_content = "Wire up the exporter.\n---\nKeep it small.".into();
        task.enriched_content = "Add an OTLP/Jaeger exporter.".into();

        let mut sub = Ticket::new(TicketType::Subtask, "Config flag");
        sub.parent_key = "OBS-2".into();
        sub.epic_key = "OBS-1".into();
        sub.priority = "Low".into();

        let mut spike = Ticket::new(TicketType::Spike, "Compare collectors");
        spike.labels = vec!["research".into()];

        vec![epic, task, sub, spike]
    }

    #[test]
    fn writes_exact_layout() {
        let mut task = Ticket::new(TicketType::Task, "Add exporter");
        task.key = "OBS-2".into();
        task.epic_key = "OBS-1".into();
        task.raw_content = "Wire it up.".into();
        task.enriched_content = "Polished.".into();

        let expected = "\
## task: Add exporter [OBS-2]
Wire it up.

---
*Enriched:*
Polished.

---
*Metadata:*
- Key: OBS-2
- ParentKey: OBS-1


";
        assert_eq!(serialize_document(&[task]), expected);
    }

    #[test]
    fn keyless_draft_has_no_brackets() {
        let draft = Ticket::new(TicketType::Epic, "Draft");
        let text = serialize_document(&[draft]);
        assert!(text.starts_with("# epic: Draft\n"));
    }

    #[test]
    fn keyless_draft_stays_keyless_after_reload() {
        let mut draft = Ticket::new(TicketType::Task, "Fix UTF-8 decoding");
        draft.raw_content = "Fix UTF-8 decoding in the log shipper.".into();

        let text = serialize_document(&[draft]);
        assert!(text.starts_with("## task: Fix decoding\n"));

        let reparsed = parse_document(&text);
        assert_eq!(reparsed.len(), 1);
        assert!(!reparsed[0].has_key());
        assert_eq!(reparsed[0].title, "Fix decoding");
        assert_eq!(reparsed[0].raw_content, "Fix UTF-8 decoding in the log shipper.");
    }

    #[test]
    fn round_trip_preserves_tickets() {
        let tickets = sample();
        let reparsed = parse_document(&serialize_document(&tickets));

        assert_eq!(reparsed.len(), tickets.len());
        for (before, after) in tickets.iter().zip(&reparsed) {
            assert_eq!(after.ticket_type, before.ticket_type);
            assert_eq!(after.key, before.key);
            assert_eq!(after.title, crate::parse::key::remove_key(&before.title));
            assert_eq!(after.status, before.status);
            assert_eq!(after.priority, before.priority);
            assert_eq!(after.raw_content, before.raw_content);
            assert_eq!(after.enriched_content, before.enriched_content);
            assert_eq!(after.parent_ref(), before.parent_ref());
            assert_eq!(after.labels, before.labels);
        }
    }

    #[test]
    fn serialize_is_stable_after_one_pass() {
        let once = serialize_document(&sample());
        let twice = serialize_document(&parse_document(&once));
        assert_eq!(twice, once);
    }
}
