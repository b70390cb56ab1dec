pub mod config;
pub mod enrichment;
pub mod focus;
pub mod ticket;

pub use config::Config;
pub use enrichment::{EnrichmentRequest, EnrichmentResponse, RemoteTicket};
pub use focus::{FocusContext, FocusState};
pub use ticket::{Ticket, TicketDocument, TicketType};
