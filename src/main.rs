mod config;
mod error;
mod executor;
mod grid;
mod instance;
mod matcher;
mod model;
mod persist;
mod sources;
mod state;
mod store;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use crate::config::{Config, load_config};
use crate::instance::{InstanceRequest, InstanceServer};
use crate::matcher::Placed;
use crate::model::Entry;
use crate::state::{AppState, Input};
use crate::store::EntryStore;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding config.toml and the user entries
    #[arg(short, long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Print the user entries, or the system entries with --system
    List {
        #[arg(long)]
        system: bool,
    },
    /// Show what the grid would contain for a query
    Query { text: String },
    /// Run an entry shown for a query, the first one by default
    Launch {
        text: String,
        /// Move the selection this many entries forward
        #[arg(long, default_value_t = 0)]
        index: i32,
        /// Pick the entry bound to this shortcut key instead
        #[arg(long)]
        shortcut: Option<String>,
    },
    /// Pin a .desktop or .qsrun entry to the next free grid cell
    Add { reference: String },
    /// Delete the user entry backed by a file
    Remove { path: PathBuf },
    /// Ask a running instance to raise its window
    Raise,
    /// Accept raise requests from other instances
    Listen,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    // 1. Load Config
    let config = load_config(args.config_dir.as_deref())?;

    match args.command {
        Cmd::Raise => instance::send_raise(&config.general.socket_path)
            .with_context(|| format!("no instance listening on {}", config.general.socket_path.display())),
        Cmd::Listen => listen(&config.general.socket_path, config.general.single_instance),
        command => run(command, config),
    }
}

fn run(command: Cmd, config: Config) -> Result<()> {
    // 2. Scan entries
    let mut store = EntryStore::new(config.clone());
    store.reload()?;

    match command {
        Cmd::List { system } => {
            let entries = if system { store.system_entries() } else { store.user_entries() };
            for entry in entries {
                print_entry(entry);
            }
        }
        Cmd::Query { text } => {
            let mut state = AppState::new(store);
            let input = state.update_query(&text)?;
            print_outcome(&input, &state.visible);
        }
        Cmd::Launch { text, index, shortcut } => {
            let mut state = AppState::new(store);
            let input = state.update_query(&text)?;
            if !matches!(input, Input::Filter(_)) {
                print_outcome(&input, &state.visible);
                return Ok(());
            }
            state.move_selection(index);
            let chosen = match &shortcut {
                Some(key) => state.entry_for_shortcut(key),
                None => state.get_selected(),
            };
            match chosen {
                Some(entry) => executor::execute(entry, &config)?,
                None => bail!("nothing to launch for {:?}", text),
            }
        }
        Cmd::Add { reference } => {
            let entry = store.add_favorite(&reference)?;
            println!("{} ({}, {})", entry.entry_path.display(), entry.row, entry.col);
        }
        Cmd::Remove { path } => {
            let entry = store
                .find_user_entry(&path)
                .cloned()
                .with_context(|| format!("{} is not a user entry", path.display()))?;
            store.delete_user_entry(&entry)?;
        }
        Cmd::Raise | Cmd::Listen => {}
    }

    Ok(())
}

fn listen(socket_path: &std::path::Path, single_instance: bool) -> Result<()> {
    if !single_instance {
        bail!("single_instance is disabled in the configuration");
    }
    let server = InstanceServer::bind(socket_path)
        .with_context(|| format!("binding {}", socket_path.display()))?;
    loop {
        match server.next_request() {
            Ok(InstanceRequest::Raise) => log::info!("Raise requested"),
            Ok(InstanceRequest::Unknown(_)) => {}
            Err(e) => log::warn!("Instance request failed: {}", e),
        }
    }
}

fn print_entry(entry: &Entry) {
    println!(
        "{}\t{}\t{}\t{:?}\t{}",
        entry.name,
        entry.command,
        entry.arguments.join(" "),
        entry.entry_type,
        entry.entry_path.display()
    );
}

fn print_outcome(input: &Input, visible: &[Placed]) {
    match input {
        Input::Calculation(expr) => println!("calculate: {}", expr),
        Input::FileSearch(query) => println!("file search: {}", query),
        Input::ContentSearch(query) => println!("content search: {}", query),
        Input::Reload | Input::Filter(_) => {
            for placed in visible {
                println!(
                    "{}\t{}\t{}\t{}",
                    placed.row,
                    placed.col,
                    placed.shortcut.as_deref().unwrap_or("-"),
                    placed.entry.name
                );
            }
        }
    }
}
