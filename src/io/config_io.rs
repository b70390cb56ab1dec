use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::io::atomic::atomic_write;
use crate::io::layout::DataLayout;
use crate::model::config::Config;
use crate::model::enrichment::DEFAULT_PROMPT_TEMPLATE;

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "JAI_CONFIG";

/// Error type for configuration loading and editing
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("could not parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("could not parse {path}: {source}")]
    Edit {
        path: PathBuf,
        source: toml_edit::TomlError,
    },
    #[error("could not write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("unknown config key: {0}")]
    UnknownKey(String),
    #[error("invalid value for {key}: expected {expected}")]
    InvalidValue { key: String, expected: &'static str },
    #[error("cannot locate home directory: HOME is not set")]
    NoHome,
}

/// The type a settable config key holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    Integer,
    Bool,
}

/// Every key `config set` accepts
pub const SETTABLE_KEYS: &[(&str, ValueKind)] = &[
    ("jira.url", ValueKind::Text),
    ("jira.username", ValueKind::Text),
    ("jira.project", ValueKind::Text),
    ("jira.epic_link_field", ValueKind::Text),
    ("ai.provider", ValueKind::Text),
    ("ai.model", ValueKind::Text),
    ("ai.max_tokens", ValueKind::Integer),
    ("ai.prompt_template", ValueKind::Text),
    ("general.data_dir", ValueKind::Text),
    ("general.review_before_create", ValueKind::Bool),
    ("general.default_editor", ValueKind::Text),
];

const DEFAULT_CONFIG: &str = r#"# jai configuration
#
# Secrets are read from the environment, never from this file:
#   JAI_JIRA_TOKEN  ticketing service API token
#   JAI_AI_TOKEN    enrichment service API key

[jira]
url = ""
username = ""
project = ""
# Custom field used to link tasks to their epic
epic_link_field = ""

[ai]
provider = "openai"
model = "gpt-3.5-turbo"
max_tokens = 500

[general]
# data_dir = "~/.local/share/jai"
review_before_create = false
default_editor = ""
"#;

/// Commented config written by `jai init`
pub fn default_config_text() -> &'static str {
    DEFAULT_CONFIG
}

pub fn home_dir() -> Result<PathBuf, ConfigError> {
    std::env::var("HOME")
        .ok()
        .filter(|h| !h.is_empty())
        .map(PathBuf::from)
        .ok_or(ConfigError::NoHome)
}

/// Config file location: explicit path, then `$JAI_CONFIG`, then
/// `~/.jai/config.toml`.
pub fn config_path(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    if let Ok(path) = std::env::var(CONFIG_ENV)
        && !path.is_empty()
    {
        return Ok(PathBuf::from(path));
    }
    Ok(home_dir()?.join(".jai").join("config.toml"))
}

/// Load the config file. A missing file gives the defaults.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }
        Err(e) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };
    toml::from_str(&text).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Read the config as a toml_edit document for format-preserving edits.
/// A missing file gives an empty document.
pub fn read_config_document(path: &Path) -> Result<toml_edit::DocumentMut, ConfigError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
        Err(e) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };
    text.parse().map_err(|e| ConfigError::Edit {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Write the config document back to disk, preserving formatting.
pub fn write_config(path: &Path, doc: &toml_edit::DocumentMut) -> Result<(), ConfigError> {
    atomic_write(path, doc.to_string().as_bytes()).map_err(|e| ConfigError::Write {
        path: path.to_path_buf(),
        source: e,
    })
}

/// File name of the user-editable prompt under `templates/`
pub const PROMPT_TEMPLATE_FILE: &str = "enrich_prompt.md";

/// The enrichment prompt: `ai.prompt_template` if set, else the one in the
/// templates directory, else the built-in default.
pub fn load_prompt_template(config: &Config, layout: &DataLayout) -> Result<String, ConfigError> {
    let path = if config.ai.prompt_template.is_empty() {
        layout.templates_dir().join(PROMPT_TEMPLATE_FILE)
    } else {
        PathBuf::from(&config.ai.prompt_template)
    };
    match fs::read_to_string(&path) {
        Ok(text) => Ok(text),
        Err(e) if e.kind() == io::ErrorKind::NotFound && config.ai.prompt_template.is_empty() => {
            Ok(DEFAULT_PROMPT_TEMPLATE.to_string())
        }
        Err(e) => Err(ConfigError::Read { path, source: e }),
    }
}

/// Set `section.key` to `value`, converted to the key's declared type.
pub fn set_config_value(
    doc: &mut toml_edit::DocumentMut,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    let kind = SETTABLE_KEYS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, kind)| *kind)
        .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
    let (section, field) = key
        .split_once('.')
        .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;

    let item = match kind {
        ValueKind::Text => toml_edit::value(value),
        ValueKind::Integer => {
            let n: i64 = value.parse().map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                expected: "an integer",
            })?;
            toml_edit::value(n)
        }
        ValueKind::Bool => {
            let b: bool = value.parse().map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                expected: "true or false",
            })?;
            toml_edit::value(b)
        }
    };

    if !doc.contains_key(section) {
        doc[section] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    doc[section][field] = item;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_gives_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join("config.toml")).unwrap();
        assert_eq!(config.ai.max_tokens, 500);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[jira\nurl = ").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn default_text_parses() {
        let config: Config = toml::from_str(default_config_text()).unwrap();
        assert_eq!(config.ai.provider, "openai");
        assert!(config.general.data_dir.is_none());
    }

    #[test]
    fn explicit_path_wins() {
        let path = config_path(Some(Path::new("/etc/jai.toml"))).unwrap();
        assert_eq!(path, PathBuf::from("/etc/jai.toml"));
    }

    #[test]
    fn set_preserves_comments() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, default_config_text()).unwrap();

        let mut doc = read_config_document(&path).unwrap();
        set_config_value(&mut doc, "jira.project", "OBS").unwrap();
        set_config_value(&mut doc, "ai.max_tokens", "800").unwrap();
        write_config(&path, &doc).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("# Custom field used to link tasks to their epic"));
        let config = load_config(&path).unwrap();
        assert_eq!(config.jira.project, "OBS");
        assert_eq!(config.ai.max_tokens, 800);
    }

    #[test]
    fn set_creates_missing_section() {
        let mut doc = toml_edit::DocumentMut::new();
        set_config_value(&mut doc, "general.review_before_create", "true").unwrap();
        let config: Config = toml::from_str(&doc.to_string()).unwrap();
        assert!(config.general.review_before_create);
    }

    #[test]
    fn prompt_template_lookup() {
        let tmp = TempDir::new().unwrap();
        let layout = DataLayout::new(tmp.path());
        let mut config = Config::default();

        assert_eq!(load_prompt_template(&config, &layout).unwrap(), DEFAULT_PROMPT_TEMPLATE);

        fs::create_dir_all(layout.templates_dir()).unwrap();
        fs::write(layout.templates_dir().join(PROMPT_TEMPLATE_FILE), "local {content}").unwrap();
        assert_eq!(load_prompt_template(&config, &layout).unwrap(), "local {content}");

        config.ai.prompt_template = tmp.path().join("missing.md").display().to_string();
        assert!(matches!(
            load_prompt_template(&config, &layout),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn set_rejects_unknown_and_mistyped() {
        let mut doc = toml_edit::DocumentMut::new();
        assert!(matches!(
            set_config_value(&mut doc, "jira.token", "secret"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(
            set_config_value(&mut doc, "ai.max_tokens", "lots"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            set_config_value(&mut doc, "general.review_before_create", "yes"),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
