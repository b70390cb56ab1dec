mod init;
pub use init::cmd_init;

use std::path::PathBuf;
use std::process::Command;

use serde::Serialize;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io;
use crate::io::focus_io::FocusManager;
use crate::io::layout::DataLayout;
use crate::io::store::{FsTicketStore, TicketStore};
use crate::model::config::Config;
use crate::model::ticket::{Ticket, TicketType};
use crate::ops::focus_ops::{self, FocusTarget};
use crate::ops::search::{self, ListFilter};
use crate::ops::ticket_ops;
use crate::ops::tree::{self, FocusTree};

type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Resolved configuration for one invocation
pub struct Session {
    pub config_path: PathBuf,
    pub config: Config,
    pub layout: DataLayout,
    pub json: bool,
}

impl Session {
    pub fn open(cli: &Cli) -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = config_io::config_path(cli.config.as_deref())?;
        let config = config_io::load_config(&config_path)?;
        let layout = DataLayout::resolve(cli.data_dir.as_deref(), &config)?;
        Ok(Session {
            config_path,
            config,
            layout,
            json: cli.json,
        })
    }

    fn store(&self) -> FsTicketStore {
        FsTicketStore::new(self.layout.tickets_dir())
    }

    fn focus(&self) -> Result<FocusManager, Box<dyn std::error::Error>> {
        Ok(FocusManager::open(&self.layout)?)
    }
}

fn print_json<T: Serialize>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let session = Session::open(&cli)?;

    match cli.command {
        None => cmd_status(&session, StatusArgs { show_config: false }),
        Some(cmd) => match cmd {
            Commands::Init(args) => cmd_init(&session, args),
            Commands::Config(args) => cmd_config(&session, args),

            // Focus
            Commands::Focus(args) => cmd_focus(&session, args),
            Commands::Unfocus => cmd_unfocus(&session),
            Commands::Status(args) => cmd_status(&session, args),

            // Read commands
            Commands::List(args) => cmd_list(&session, args),
            Commands::Show(args) => cmd_show(&session, args),

            // Drafting
            Commands::Epic(args) => cmd_draft(&session, Some(TicketType::Epic), args),
            Commands::Task(args) => cmd_draft(&session, Some(TicketType::Task), args),
            Commands::Subtask(args) => cmd_draft(&session, Some(TicketType::Subtask), args),
            Commands::New(args) => cmd_draft(&session, None, args),
            Commands::Assign(args) => cmd_assign(&session, args),
            Commands::Open(args) => cmd_open(&session, args),
        },
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn cmd_config(session: &Session, args: ConfigArgs) -> CmdResult {
    match args.action.unwrap_or(ConfigAction::Show) {
        ConfigAction::Show => {
            if session.json {
                return print_json(&session.config);
            }
            print_lines(&format_config(
                &session.config,
                &session.config_path,
                session.layout.root(),
            ));
        }
        ConfigAction::Path => println!("{}", session.config_path.display()),
        ConfigAction::Set { key, value } => {
            let mut doc = config_io::read_config_document(&session.config_path)?;
            config_io::set_config_value(&mut doc, &key, &value)?;
            config_io::write_config(&session.config_path, &doc)?;
            println!("{} = {}", key, value);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Focus
// ---------------------------------------------------------------------------

fn cmd_focus(session: &Session, args: FocusArgs) -> CmdResult {
    let mut focus = session.focus()?;
    let query = args.query.join(" ");

    if query.trim().is_empty() {
        if session.json {
            return print_json(&focus_to_json(focus.context()));
        }
        println!("{}", focus.context());
        return Ok(());
    }

    let target = focus_ops::focus_by_query(&session.store(), &mut focus, &query)?;
    if session.json {
        return print_json(&focus_to_json(focus.context()));
    }
    match target {
        FocusTarget::Local(ticket) => {
            println!("Focused {}: {}", ticket.ticket_type, format_ticket_line(&ticket))
        }
        FocusTarget::Remote(key) => println!("Focused {} (not in local documents)", key),
    }
    println!("{}", focus.context());
    Ok(())
}

fn cmd_unfocus(session: &Session) -> CmdResult {
    let mut focus = session.focus()?;
    focus.clear()?;
    if session.json {
        return print_json(&focus_to_json(focus.context()));
    }
    println!("Focus cleared");
    Ok(())
}

#[derive(Serialize)]
struct StatusJson {
    focus: FocusJson,
    tickets: Vec<TicketJson>,
}

fn push_task<'a>(node: &tree::TaskNode<'a>, out: &mut Vec<&'a Ticket>) {
    out.push(node.task);
    out.extend(node.subtasks.iter().copied());
}

/// Focus subtree flattened in display order
fn focus_tree_tickets<'a>(tree: &FocusTree<'a>) -> Vec<&'a Ticket> {
    let mut out = Vec::new();
    match tree {
        FocusTree::Epic(node) => {
            out.push(node.epic);
            for task in &node.tasks {
                push_task(task, &mut out);
            }
        }
        FocusTree::Task(node) => push_task(node, &mut out),
    }
    out
}

fn cmd_status(session: &Session, args: StatusArgs) -> CmdResult {
    let focus = session.focus()?;
    let tickets = session.store().load_all()?;
    let subtree = tree::focus_tree(&tickets, focus.context());

    if session.json {
        let listed = subtree.as_ref().map(focus_tree_tickets).unwrap_or_default();
        return print_json(&StatusJson {
            focus: focus_to_json(focus.context()),
            tickets: listed.into_iter().map(|t| ticket_to_json(t, false)).collect(),
        });
    }

    println!("Focus: {}", focus.context());
    if let Some(subtree) = &subtree {
        println!();
        print_lines(&format_focus_tree(subtree));
    }

    let drafts = tickets.iter().filter(|t| !t.has_key()).count();
    if drafts > 0 {
        println!();
        println!("{} draft(s) without a key", drafts);
    }

    if args.show_config {
        println!();
        print_lines(&format_config(
            &session.config,
            &session.config_path,
            session.layout.root(),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_list(session: &Session, args: ListArgs) -> CmdResult {
    let tickets = session.store().load_all()?;

    if args.tree && args.filter == ListFilter::All && !session.json {
        print_lines(&format_tree(&tree::build_tree(&tickets)));
        return Ok(());
    }

    let listed = search::filter_tickets(&tickets, args.filter);
    if session.json {
        let out: Vec<TicketJson> = listed.iter().map(|t| ticket_to_json(t, false)).collect();
        return print_json(&out);
    }
    if listed.is_empty() {
        match args.filter {
            ListFilter::All => println!("No tickets"),
            filter => println!("No {} tickets", filter),
        }
        return Ok(());
    }
    for ticket in listed {
        println!("{}", format_ticket_line(ticket));
    }
    Ok(())
}

fn cmd_show(session: &Session, args: ShowArgs) -> CmdResult {
    let tickets = session.store().load_all()?;
    let ticket = search::find_by_key(&tickets, &args.key)
        .ok_or_else(|| ticket_ops::TicketError::NotFound(args.key.clone()))?;

    if session.json {
        return print_json(&ticket_to_json(ticket, true));
    }
    print_lines(&format_ticket_detail(ticket));
    Ok(())
}

// ---------------------------------------------------------------------------
// Drafting
// ---------------------------------------------------------------------------

fn cmd_draft(session: &Session, ticket_type: Option<TicketType>, args: DraftArgs) -> CmdResult {
    let content = args.text.join(" ");
    let focus = session.focus()?;
    let ticket_type =
        ticket_type.unwrap_or_else(|| ticket_ops::default_draft_type(focus.context()));

    let store = session.store();
    let (ticket, path) = ticket_ops::create_draft(
        &store,
        &session.layout,
        focus.context(),
        ticket_type,
        &content,
    )?;

    if session.json {
        return print_json(&DraftJson {
            ticket: ticket_to_json(&ticket, true),
            path: path.display().to_string(),
        });
    }
    println!(
        "Drafted {} \"{}\" in {}",
        ticket.ticket_type,
        ticket.title,
        path.display()
    );
    Ok(())
}

fn cmd_assign(session: &Session, args: AssignArgs) -> CmdResult {
    let store = session.store();
    let (ticket, path) =
        ticket_ops::assign_key(&store, &session.layout, &args.query, &args.key)?;

    if session.json {
        return print_json(&DraftJson {
            ticket: ticket_to_json(&ticket, false),
            path: path.display().to_string(),
        });
    }
    println!("{} \"{}\" -> {}", ticket.key, ticket.title, path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Browser
// ---------------------------------------------------------------------------

fn browser_command(url: &str) -> Command {
    let mut cmd = if cfg!(target_os = "macos") {
        Command::new("open")
    } else if cfg!(windows) {
        let mut cmd = Command::new("rundll32");
        cmd.arg("url.dll,FileProtocolHandler");
        cmd
    } else {
        Command::new("xdg-open")
    };
    cmd.arg(url);
    cmd
}

fn cmd_open(session: &Session, args: OpenArgs) -> CmdResult {
    let level = match &args.level {
        Some(level) => Some(TicketType::parse_type(level).ok_or_else(|| {
            format!("invalid level '{}' (expected epic, task or subtask)", level)
        })?),
        None => None,
    };
    let focus = session.focus()?;
    let (ticket_type, key) = focus_ops::focused_key(focus.context(), level)?;
    let url = focus_ops::browse_url(&session.config.jira.url, &key)?;

    if session.json {
        return print_json(&OpenJson {
            ticket_type,
            key,
            url,
        });
    }
    if args.print {
        println!("{}", url);
        return Ok(());
    }
    println!("Opening {} {} in browser: {}", ticket_type, key, url);
    browser_command(&url)
        .spawn()
        .map_err(|e| format!("could not launch browser: {}", e))?;
    Ok(())
}
