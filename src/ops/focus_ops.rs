use tracing::info;

use crate::io::focus_io::FocusManager;
use crate::model::focus::FocusContext;
use crate::io::store::TicketStore;
use crate::model::ticket::{Ticket, TicketType};
use crate::ops::search::{find_by_key, search_by_title};
use crate::ops::ticket_ops::TicketError;
use crate::parse::key::is_ticket_key;

/// What a focus query resolved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FocusTarget {
    /// A ticket found in the local documents
    Local(Ticket),
    /// A key with no local ticket; focused as a task
    Remote(String),
}

/// Focus a ticket, re-establishing its ancestors in one step.
pub fn focus_ticket(focus: &mut FocusManager, ticket: &Ticket) -> Result<(), TicketError> {
    if !ticket.has_key() {
        return Err(TicketError::NoKey(ticket.title.clone()));
    }

    match ticket.ticket_type {
        TicketType::Epic => focus.set_epic(&ticket.key, &ticket.id)?,
        // An orphan clears any epic focus so the state reads task-only.
        TicketType::Task | TicketType::Spike => {
            focus.set_epic_and_task(&ticket.epic_key, "", &ticket.key, &ticket.id)?
        }
        TicketType::Subtask => {
            focus.set_full(&ticket.epic_key, &ticket.parent_key, &ticket.key)?;
            if !ticket.id.is_empty() {
                focus.set_subtask(&ticket.key, &ticket.id)?;
            }
        }
    }
    Ok(())
}

/// Focus by key or title.
///
/// Something shaped like a key focuses that ticket, or, if it is not known
/// locally, is taken as the task focus. Anything else is a case-insensitive
/// title substring search; the first match in document order wins.
pub fn focus_by_query(
    store: &dyn TicketStore,
    focus: &mut FocusManager,
    query: &str,
) -> Result<FocusTarget, TicketError> {
    let query = query.trim();
    let tickets = store.load_all()?;

    if is_ticket_key(query) {
        if let Some(ticket) = find_by_key(&tickets, query) {
            focus_ticket(focus, ticket)?;
            return Ok(FocusTarget::Local(ticket.clone()));
        }
        focus.set_task(query, "")?;
        info!(key = query, "focused key not found locally");
        return Ok(FocusTarget::Remote(query.to_string()));
    }

    let ticket = search_by_title(&tickets, query)
        .into_iter()
        .next()
        .ok_or_else(|| TicketError::NotFound(query.to_string()))?;
    focus_ticket(focus, ticket)?;
    Ok(FocusTarget::Local(ticket.clone()))
}

/// The focused key at `level`, or at the deepest focused level when no
/// level is given. Spikes share the task level.
pub fn focused_key(
    focus: &FocusContext,
    level: Option<TicketType>,
) -> Result<(TicketType, String), TicketError> {
    if focus.is_empty() {
        return Err(TicketError::NoFocus);
    }
    let level = match level {
        Some(TicketType::Spike) => TicketType::Task,
        Some(level) => level,
        None if focus.has_subtask() => TicketType::Subtask,
        None if focus.has_task() => TicketType::Task,
        None => TicketType::Epic,
    };
    let key = match level {
        TicketType::Epic => &focus.epic_key,
        TicketType::Task | TicketType::Spike => &focus.task_key,
        TicketType::Subtask => &focus.subtask_key,
    };
    if key.is_empty() {
        return Err(TicketError::NotFocused(level));
    }
    Ok((level, key.clone()))
}

/// Browse URL for a key on the ticketing service at `base_url`
pub fn browse_url(base_url: &str, key: &str) -> Result<String, TicketError> {
    let base = base_url.trim().trim_end_matches('/');
    if base.is_empty() {
        return Err(TicketError::NoServiceUrl);
    }
    Ok(format!("{}/browse/{}", base, key))
}
