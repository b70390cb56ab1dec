use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::ops::search::ListFilter;

#[derive(Parser)]
#[command(name = "jai", about = concat!("jai v", env!("CARGO_PKG_VERSION"), " - tickets as plain text, focus on one at a time"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Use a different data directory
    #[arg(short = 'D', long = "data-dir", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Use a different config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the config file and data directories
    Init(InitArgs),
    /// Show or edit configuration
    Config(ConfigArgs),
    /// Focus an epic, task or subtask by key or title
    Focus(FocusArgs),
    /// Clear the current focus
    Unfocus,
    /// Show the current focus and the tickets around it
    Status(StatusArgs),
    /// List tickets
    List(ListArgs),
    /// Show a ticket
    Show(ShowArgs),
    /// Draft an epic
    Epic(DraftArgs),
    /// Draft a task under the focused epic
    Task(DraftArgs),
    /// Draft a subtask under the focused task
    Subtask(DraftArgs),
    /// Draft a subtask if a task is focused, else a task
    New(DraftArgs),
    /// Give a draft its ticket key
    Assign(AssignArgs),
    /// Open the focused ticket in the browser
    Open(OpenArgs),
}

#[derive(Args)]
pub struct InitArgs {
    /// Overwrite an existing config file
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration (default)
    Show,
    /// Print the config file path
    Path,
    /// Set a value, e.g. `jai config set jira.project OBS`
    Set {
        /// Key as section.name
        key: String,
        value: String,
    },
}

#[derive(Args)]
pub struct FocusArgs {
    /// Ticket key or part of a title (omit to show the current focus)
    pub query: Vec<String>,
}

#[derive(Args)]
pub struct StatusArgs {
    /// Also show configuration
    #[arg(long = "show-config")]
    pub show_config: bool,
}

#[derive(Args)]
pub struct ListArgs {
    /// all, epic, task, subtask, spike or orphan
    #[arg(default_value = "all")]
    pub filter: ListFilter,

    /// Show as a hierarchy instead of a flat list
    #[arg(long)]
    pub tree: bool,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Ticket key
    pub key: String,
}

#[derive(Args)]
pub struct DraftArgs {
    /// Draft text; the first plain line becomes the title
    #[arg(required = true)]
    pub text: Vec<String>,
}

#[derive(Args)]
pub struct AssignArgs {
    /// Part of the draft's title
    pub query: String,
    /// Ticket key, e.g. OBS-12
    pub key: String,
}

#[derive(Args)]
pub struct OpenArgs {
    /// epic, task or subtask (default: the deepest focused level)
    pub level: Option<String>,

    /// Print the URL instead of launching a browser
    #[arg(long)]
    pub print: bool,
}
