use serde::{Deserialize, Serialize};

use super::focus::FocusContext;
use super::ticket::TicketType;

/// What the enrichment collaborator is given: the user's draft, the kind of
/// ticket being drafted, and where in the hierarchy it will land.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentRequest {
    pub raw_content: String,
    #[serde(rename = "type")]
    pub ticket_type: TicketType,
    #[serde(default)]
    pub context: FocusContext,
}

/// Prompt used when no custom `ai.prompt_template` is configured
pub const DEFAULT_PROMPT_TEMPLATE: &str = "\
Rewrite the following {type} draft as a ticket.
Return a concise title, a clear description, up to five labels and a priority.

Current focus: {context}

Draft:
{content}
";

impl EnrichmentRequest {
    /// Fill `{type}`, `{context}` and `{content}` in a prompt template
    pub fn render_prompt(&self, template: &str) -> String {
        template
            .replace("{type}", self.ticket_type.as_str())
            .replace("{context}", &self.context.to_string())
            .replace("{content}", self.raw_content.trim())
    }
}

/// Structured result returned by the enrichment collaborator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentResponse {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub priority: String,
}

/// What the ticketing collaborator returns after creating or fetching a ticket
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteTicket {
    pub key: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub status: String,
}
