use std::path::PathBuf;

use tracing::{debug, info};

use crate::io::focus_io::FocusError;
use crate::io::layout::DataLayout;
use crate::io::store::{StoreError, TicketStore};
use crate::model::enrichment::{EnrichmentRequest, EnrichmentResponse, RemoteTicket};
use crate::model::focus::FocusContext;
use crate::model::ticket::{Ticket, TicketDocument, TicketType};
use crate::ops::search::locate;
use crate::parse::key::{is_ticket_key, remove_key};

/// Longest title derived from draft text, including the ellipsis
const MAX_TITLE_CHARS: usize = 100;
const UNTITLED: &str = "Untitled Task";

/// Error returned by the enrichment and ticketing collaborators
pub type CollaboratorError = Box<dyn std::error::Error + Send + Sync>;

/// Error type for ticket operations
#[derive(Debug, thiserror::Error)]
pub enum TicketError {
    #[error("no ticket matches '{0}'")]
    NotFound(String),
    #[error("ticket '{0}' has no key yet; assign one first")]
    NoKey(String),
    #[error("no draft without a key matches '{0}'")]
    NoDraft(String),
    #[error("'{0}' is not a ticket key (expected e.g. ABC-123)")]
    InvalidKey(String),
    #[error("key {0} is already used by another ticket")]
    KeyInUse(String),
    #[error("cannot create {0} here: focus a task first")]
    NoFocusedTask(TicketType),
    #[error("{path} already exists")]
    Collision { path: PathBuf },
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Focus(#[from] FocusError),
    #[error("no focus set; run `jai focus` first")]
    NoFocus,
    #[error("no {0} in the current focus")]
    NotFocused(TicketType),
    #[error("jira.url is not configured")]
    NoServiceUrl,
    #[error("collaborator failed: {0}")]
    Collaborator(CollaboratorError),
}

/// Produces a polished title/description from a raw draft
pub trait Enricher {
    fn enrich(&self, request: &EnrichmentRequest) -> Result<EnrichmentResponse, CollaboratorError>;
}

/// Creates tickets in the upstream ticketing service
pub trait TicketingClient {
    fn create_ticket(&self, ticket: &Ticket) -> Result<RemoteTicket, CollaboratorError>;
}

// ---------------------------------------------------------------------------
// Drafting
// ---------------------------------------------------------------------------

/// Derive a title from draft text: the first non-empty line that is not a
/// heading or list item, cut to 100 characters.
pub fn extract_title_from_content(content: &str) -> String {
    let Some(line) = content
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty() && !l.starts_with('#') && !l.starts_with('-'))
    else {
        return UNTITLED.to_string();
    };

    if line.chars().count() > MAX_TITLE_CHARS {
        let head: String = line.chars().take(MAX_TITLE_CHARS - 3).collect();
        format!("{}...", head)
    } else {
        line.to_string()
    }
}

/// What `new` drafts under the current focus
pub fn default_draft_type(focus: &FocusContext) -> TicketType {
    if focus.has_task() {
        TicketType::Subtask
    } else {
        TicketType::Task
    }
}

/// Build a keyless draft attached to the current focus.
///
/// Tasks and spikes take the focused epic (or become orphans); subtasks
/// need a focused task.
pub fn draft_ticket(
    ticket_type: TicketType,
    content: &str,
    focus: &FocusContext,
) -> Result<Ticket, TicketError> {
    let mut ticket = Ticket::new(ticket_type, extract_title_from_content(content));
    ticket.raw_content = content.trim().to_string();

    match ticket_type {
        TicketType::Epic => {}
        TicketType::Task | TicketType::Spike => {
            ticket.epic_key = focus.epic_key.clone();
        }
        TicketType::Subtask => {
            if !focus.has_task() {
                return Err(TicketError::NoFocusedTask(ticket_type));
            }
            ticket.parent_key = focus.task_key.clone();
            ticket.epic_key = focus.epic_key.clone();
        }
    }
    Ok(ticket)
}

fn document_with_key<'a>(docs: &'a [TicketDocument], key: &str) -> Option<&'a TicketDocument> {
    locate(docs, key).map(|(doc, _)| doc)
}

/// Document a ticket belongs in: the one already holding its parent, else
/// its own `<KEY>.md`, else the inbox.
pub fn target_document(docs: &[TicketDocument], layout: &DataLayout, ticket: &Ticket) -> PathBuf {
    let parent_doc = match ticket.ticket_type {
        TicketType::Epic => None,
        TicketType::Task | TicketType::Spike => document_with_key(docs, &ticket.epic_key),
        TicketType::Subtask => document_with_key(docs, &ticket.parent_key)
            .or_else(|| document_with_key(docs, &ticket.epic_key)),
    };
    match parent_doc {
        Some(doc) => doc.path.clone(),
        None => layout.document_path(&ticket.key),
    }
}

/// Draft a ticket under the current focus and append it to its document.
pub fn create_draft(
    store: &dyn TicketStore,
    layout: &DataLayout,
    focus: &FocusContext,
    ticket_type: TicketType,
    content: &str,
) -> Result<(Ticket, PathBuf), TicketError> {
    let ticket = draft_ticket(ticket_type, content, focus)?;
    let docs = store.load_documents()?;
    let path = target_document(&docs, layout, &ticket);
    store.append(&path, ticket.clone())?;
    info!(
        ticket_type = %ticket.ticket_type,
        title = %ticket.title,
        path = %path.display(),
        "draft created"
    );
    Ok((ticket, path))
}

// ---------------------------------------------------------------------------
// Key assignment
// ---------------------------------------------------------------------------

/// Whether a ticket starts its own document once keyed
fn is_root(ticket: &Ticket) -> bool {
    ticket.ticket_type == TicketType::Epic || ticket.is_orphan()
}

/// Find the first keyless ticket whose title contains `query` and update it.
///
/// A root ticket (epic or orphan task) sitting in the inbox moves to its own
/// `<KEY>.md`; anything else is updated in place. Returns the updated ticket
/// and the document it now lives in.
fn assign_with(
    store: &dyn TicketStore,
    layout: &DataLayout,
    query: &str,
    key: &str,
    update: impl FnOnce(&mut Ticket),
) -> Result<(Ticket, PathBuf), TicketError> {
    if !is_ticket_key(key) {
        return Err(TicketError::InvalidKey(key.to_string()));
    }

    let mut docs = store.load_documents()?;
    if document_with_key(&docs, key).is_some() {
        return Err(TicketError::KeyInUse(key.to_string()));
    }

    let needle = query.trim().to_lowercase();
    let (doc_idx, ticket_idx) = docs
        .iter()
        .enumerate()
        .find_map(|(d, doc)| {
            doc.tickets
                .iter()
                .position(|t| !t.has_key() && t.title.to_lowercase().contains(&needle))
                .map(|t| (d, t))
        })
        .filter(|_| !needle.is_empty())
        .ok_or_else(|| TicketError::NoDraft(query.to_string()))?;

    let doc = &mut docs[doc_idx];
    let ticket = &mut doc.tickets[ticket_idx];
    ticket.key = key.to_string();
    update(ticket);

    if layout.is_inbox(&doc.path) && is_root(ticket) {
        let ticket = doc.tickets.remove(ticket_idx);
        let target = TicketDocument {
            path: layout.document_path(key),
            tickets: vec![ticket.clone()],
        };
        store.create(&target).map_err(|e| match e {
            StoreError::AlreadyExists { path } => TicketError::Collision { path },
            other => TicketError::Store(other),
        })?;
        store.save(doc)?;
        info!(key, path = %target.path.display(), "draft promoted out of inbox");
        return Ok((ticket, target.path));
    }

    let ticket = ticket.clone();
    store.save(doc)?;
    debug!(key, path = %doc.path.display(), "key assigned in place");
    Ok((ticket, doc.path.clone()))
}

/// Give a keyless draft its upstream key.
pub fn assign_key(
    store: &dyn TicketStore,
    layout: &DataLayout,
    query: &str,
    key: &str,
) -> Result<(Ticket, PathBuf), TicketError> {
    assign_with(store, layout, query, key, |_| {})
}

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

/// Write an enrichment result into a ticket. Empty response fields leave the
/// ticket's values alone.
pub fn apply_enrichment(ticket: &mut Ticket, response: &EnrichmentResponse) {
    let title = remove_key(&response.title);
    if !title.is_empty() {
        ticket.title = title;
    }
    if !response.description.is_empty() {
        ticket.description = response.description.clone();
        ticket.enriched_content = response.description.trim().to_string();
    }
    for label in &response.labels {
        ticket.add_label(label);
    }
    if !response.priority.is_empty() {
        ticket.priority = response.priority.clone();
    }
}

/// Ask the enricher to polish a ticket drafted under `focus`
pub fn enrich_ticket(
    enricher: &dyn Enricher,
    ticket: &mut Ticket,
    focus: &FocusContext,
) -> Result<(), TicketError> {
    let request = EnrichmentRequest {
        raw_content: ticket.raw_content.clone(),
        ticket_type: ticket.ticket_type,
        context: focus.clone(),
    };
    let response = enricher
        .enrich(&request)
        .map_err(TicketError::Collaborator)?;
    apply_enrichment(ticket, &response);
    Ok(())
}

/// Create a keyless draft upstream and record the key, id and status the
/// ticketing service hands back.
pub fn publish_ticket(
    client: &dyn TicketingClient,
    store: &dyn TicketStore,
    layout: &DataLayout,
    query: &str,
) -> Result<(Ticket, PathBuf), TicketError> {
    let needle = query.trim().to_lowercase();
    let draft = store
        .load_all()?
        .into_iter()
        .find(|t| !needle.is_empty() && !t.has_key() && t.title.to_lowercase().contains(&needle))
        .ok_or_else(|| TicketError::NoDraft(query.to_string()))?;

    let remote = client
        .create_ticket(&draft)
        .map_err(TicketError::Collaborator)?;
    info!(key = %remote.key, title = %draft.title, "ticket created upstream");

    assign_with(store, layout, query, &remote.key, |t| {
        t.id = remote.id.clone();
        t.status = remote.status.clone();
    })
}
