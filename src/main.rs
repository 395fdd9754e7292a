mod app;
mod error;
mod model;
mod persist;
mod presenter;
mod record_editor;
mod terminal;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, Command, value_parser};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::app::App;
use crate::terminal::TerminalPrompter;

fn main() -> Result<()> {
    // Parse CLI arguments
    let matches = Command::new("notification-editor")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Editor for DayZ Expansion notification schedule files")
        .arg(
            Arg::new("file")
                .value_name("FILE")
                .help("Notification JSON file to open at startup")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Log debug output to stderr")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    init_logging(matches.get_flag("verbose"))?;

    let mut app = App::new(TerminalPrompter::default());
    if let Some(path) = matches.get_one::<PathBuf>("file") {
        app.open_path(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
    }

    app.run().context("Editor session failed")?;
    info!(unsaved = app.session().is_dirty(), "session ended");
    Ok(())
}

/// Stderr logging; `RUST_LOG` wins over the default level.
fn init_logging(verbose: bool) -> Result<()> {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialise logging: {}", e))
}
