use std::fmt;
use std::str::FromStr;

use crate::model::ticket::{Ticket, TicketDocument, TicketType};

/// Which tickets `list` shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListFilter {
    #[default]
    All,
    Epic,
    Task,
    Subtask,
    Spike,
    /// Tasks and spikes with no epic
    Orphan,
}

impl FromStr for ListFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(ListFilter::All),
            "epic" | "epics" => Ok(ListFilter::Epic),
            "task" | "tasks" => Ok(ListFilter::Task),
            "subtask" | "subtasks" => Ok(ListFilter::Subtask),
            "spike" | "spikes" => Ok(ListFilter::Spike),
            "orphan" | "orphans" => Ok(ListFilter::Orphan),
            other => Err(format!(
                "unknown filter '{}' (expected all, epic, task, subtask, spike, orphan)",
                other
            )),
        }
    }
}

impl fmt::Display for ListFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ListFilter::All => "all",
            ListFilter::Epic => "epic",
            ListFilter::Task => "task",
            ListFilter::Subtask => "subtask",
            ListFilter::Spike => "spike",
            ListFilter::Orphan => "orphan",
        })
    }
}

/// Key comparison used for hierarchy links: whitespace and case are ignored.
pub fn keys_match(a: &str, b: &str) -> bool {
    let (a, b) = (a.trim(), b.trim());
    !a.is_empty() && a.eq_ignore_ascii_case(b)
}

pub fn find_by_key<'a>(tickets: &'a [Ticket], key: &str) -> Option<&'a Ticket> {
    tickets.iter().find(|t| keys_match(&t.key, key))
}

/// Tickets whose title contains `query`, case-insensitively, in document order
pub fn search_by_title<'a>(tickets: &'a [Ticket], query: &str) -> Vec<&'a Ticket> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    tickets
        .iter()
        .filter(|t| t.title.to_lowercase().contains(&needle))
        .collect()
}

pub fn epics(tickets: &[Ticket]) -> Vec<&Ticket> {
    of_type(tickets, TicketType::Epic)
}

/// Tasks and spikes owned by an epic
pub fn tasks_for_epic<'a>(tickets: &'a [Ticket], epic_key: &str) -> Vec<&'a Ticket> {
    tickets
        .iter()
        .filter(|t| t.ticket_type.is_task_like() && keys_match(&t.epic_key, epic_key))
        .collect()
}

pub fn subtasks_for_task<'a>(tickets: &'a [Ticket], task_key: &str) -> Vec<&'a Ticket> {
    tickets
        .iter()
        .filter(|t| t.ticket_type == TicketType::Subtask && keys_match(&t.parent_key, task_key))
        .collect()
}

pub fn orphan_tasks(tickets: &[Ticket]) -> Vec<&Ticket> {
    tickets.iter().filter(|t| t.is_orphan()).collect()
}

fn of_type(tickets: &[Ticket], ticket_type: TicketType) -> Vec<&Ticket> {
    tickets.iter().filter(|t| t.ticket_type == ticket_type).collect()
}

pub fn filter_tickets(tickets: &[Ticket], filter: ListFilter) -> Vec<&Ticket> {
    match filter {
        ListFilter::All => tickets.iter().collect(),
        ListFilter::Epic => epics(tickets),
        ListFilter::Task => of_type(tickets, TicketType::Task),
        ListFilter::Subtask => of_type(tickets, TicketType::Subtask),
        ListFilter::Spike => of_type(tickets, TicketType::Spike),
        ListFilter::Orphan => orphan_tasks(tickets),
    }
}

/// The document holding the ticket with `key`, and the ticket's index in it
pub fn locate<'a>(docs: &'a [TicketDocument], key: &str) -> Option<(&'a TicketDocument, usize)> {
    docs.iter().find_map(|doc| {
        doc.tickets
            .iter()
            .position(|t| keys_match(&t.key, key))
            .map(|idx| (doc, idx))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticket(ticket_type: TicketType, key: &str, title: &str) -> Ticket {
        let mut t = Ticket::new(ticket_type, title);
        t.key = key.to_string();
        t
    }

    fn sample() -> Vec<Ticket> {
        let epic = ticket(TicketType::Epic, "OBS-1", "Observability Refactor");
        let mut task = ticket(TicketType::Task, "OBS-2", "Add Jaeger exporter");
        task.epic_key = "OBS-1".into();
        let mut spike = ticket(TicketType::Spike, "OBS-4", "Compare collectors");
        spike.epic_key = "obs-1 ".into();
        let mut sub = ticket(TicketType::Subtask, "OBS-3", "Exporter config flag");
        sub.parent_key = "OBS-2".into();
        let orphan = ticket(TicketType::Task, "OPS-9", "Rotate exporter certs");
        vec![epic, task, spike, sub, orphan]
    }

    fn keys(tickets: &[&Ticket]) -> Vec<String> {
        tickets.iter().map(|t| t.key.clone()).collect()
    }

    #[test]
    fn key_lookup_normalizes() {
        let tickets = sample();
        assert_eq!(find_by_key(&tickets, " obs-2").unwrap().title, "Add Jaeger exporter");
        assert!(find_by_key(&tickets, "OBS-99").is_none());
        assert!(find_by_key(&tickets, "").is_none());
    }

    #[test]
    fn title_search_is_substring_in_order() {
        let tickets = sample();
        let hits = search_by_title(&tickets, "EXPORTER");
        assert_eq!(keys(&hits), vec!["OBS-2", "OBS-3", "OPS-9"]);
        assert!(search_by_title(&tickets, "   ").is_empty());
        assert!(search_by_title(&tickets, "jaegr").is_empty());
    }

    #[test]
    fn hierarchy_queries() {
        let tickets = sample();
        assert_eq!(keys(&epics(&tickets)), vec!["OBS-1"]);
        assert_eq!(keys(&tasks_for_epic(&tickets, "OBS-1")), vec!["OBS-2", "OBS-4"]);
        assert_eq!(keys(&subtasks_for_task(&tickets, "OBS-2")), vec!["OBS-3"]);
        assert_eq!(keys(&orphan_tasks(&tickets)), vec!["OPS-9"]);
    }

    #[test]
    fn list_filters() {
        let tickets = sample();
        assert_eq!(filter_tickets(&tickets, ListFilter::All).len(), 5);
        assert_eq!(keys(&filter_tickets(&tickets, ListFilter::Epic)), vec!["OBS-1"]);
        assert_eq!(keys(&filter_tickets(&tickets, ListFilter::Task)), vec!["OBS-2", "OPS-9"]);
        assert_eq!(keys(&filter_tickets(&tickets, ListFilter::Spike)), vec!["OBS-4"]);
        assert_eq!(keys(&filter_tickets(&tickets, ListFilter::Orphan)), vec!["OPS-9"]);
        assert_eq!("Subtasks".parse::<ListFilter>(), Ok(ListFilter::Subtask));
        assert!("stories".parse::<ListFilter>().is_err());
    }

    #[test]
    fn locate_finds_document_and_index() {
        let docs = vec![
            TicketDocument {
                path: "/t/A-1.md".into(),
                tickets: vec![ticket(TicketType::Epic, "A-1", "A")],
            },
            TicketDocument {
                path: "/t/B-1.md".into(),
                tickets: vec![
                    ticket(TicketType::Epic, "B-1", "B"),
                    ticket(TicketType::Task, "B-2", "B child"),
                ],
            },
        ];
        let (doc, idx) = locate(&docs, "B-2").unwrap();
        assert_eq!(doc.path, std::path::PathBuf::from("/t/B-1.md"));
        assert_eq!(idx, 1);
        assert!(locate(&docs, "C-1").is_none());
    }
}
