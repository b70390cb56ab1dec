use std::fs;

use crate::cli::commands::InitArgs;
use crate::cli::handlers::Session;
use crate::io::atomic::atomic_write;
use crate::io::config_io::{PROMPT_TEMPLATE_FILE, default_config_text};
use crate::io::store::{FsTicketStore, TicketStore};
use crate::model::enrichment::DEFAULT_PROMPT_TEMPLATE;

const DRAFT_TEMPLATE: &str = "\
Describe the work in a sentence or two. The first plain line becomes the title.

Context:

Acceptance criteria:
-
";

/// Write `content` to `templates/<name>` unless it is already there.
fn write_template(session: &Session, name: &str, content: &str) -> std::io::Result<bool> {
    let path = session.layout.templates_dir().join(name);
    if path.exists() {
        return Ok(false);
    }
    atomic_write(&path, content.as_bytes())?;
    Ok(true)
}

pub fn cmd_init(session: &Session, args: InitArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = &session.config_path;
    if config_path.exists() && !args.force {
        println!("Config already exists at {} (use --force to overwrite)", config_path.display());
    } else {
        atomic_write(config_path, default_config_text().as_bytes())
            .map_err(|e| format!("could not write {}: {}", config_path.display(), e))?;
        println!("Wrote config to {}", config_path.display());
    }

    let layout = &session.layout;
    fs::create_dir_all(layout.tickets_dir())?;
    fs::create_dir_all(layout.templates_dir())?;
    FsTicketStore::new(layout.tickets_dir()).ensure_exists(&layout.inbox_path())?;

    for (name, content) in [
        ("draft.md", DRAFT_TEMPLATE),
        (PROMPT_TEMPLATE_FILE, DEFAULT_PROMPT_TEMPLATE),
    ] {
        if write_template(session, name, content)? {
            println!("Created template {}", name);
        }
    }

    println!("Data directory ready at {}", layout.root().display());
    Ok(())
}
