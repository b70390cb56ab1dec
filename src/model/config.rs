use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Environment variable holding the ticketing-service API token
pub const JIRA_TOKEN_ENV: &str = "JAI_JIRA_TOKEN";
/// Environment variable holding the enrichment-service API key
pub const AI_TOKEN_ENV: &str = "JAI_AI_TOKEN";

/// Configuration from `config.toml`.
///
/// Built once at startup and passed by value/reference to whatever needs it;
/// secrets are read from the environment and never stored here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub jira: JiraConfig,
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JiraConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub username: String,
    /// Default project key new tickets are created in
    #[serde(default)]
    pub project: String,
    /// Custom field id used to link tasks to epics
    #[serde(default)]
    pub epic_link_field: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Path to a custom enrichment prompt template
    #[serde(default)]
    pub prompt_template: String,
}

impl Default for AiConfig {
    fn default() -> Self {
        AiConfig {
            provider: default_provider(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            prompt_template: String::new(),
        }
    }
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_max_tokens() -> u32 {
    500
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Overrides the default data directory (`~/.local/share/jai`)
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    #[serde(default)]
    pub review_before_create: bool,
    #[serde(default)]
    pub default_editor: String,
}

impl Config {
    pub fn jira_token() -> Option<String> {
        non_empty_env(JIRA_TOKEN_ENV)
    }

    pub fn ai_token() -> Option<String> {
        non_empty_env(AI_TOKEN_ENV)
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Mask a secret for display: first four characters, then `****`.
pub fn mask_secret(s: &str) -> String {
    if s.is_empty() {
        return String::new();
    }
    if s.chars().count() <= 4 {
        return "****".to_string();
    }
    let head: String = s.chars().take(4).collect();
    format!("{}****", head)
}
