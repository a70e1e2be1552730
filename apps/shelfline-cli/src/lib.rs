//! # Shelfline CLI Library
//!
//! Command line front end for the outlet forms: item submissions, the
//! action tracking dashboard, and customer feedback.
//!
//! ## Module Organization
//! ```text
//! shelfline_cli/
//! ├── lib.rs          ◄─── You are here (argument parsing & dispatch)
//! ├── config.rs       ◄─── ShelflineConfig (TOML + SHELFLINE_* env)
//! ├── state/
//! │   ├── mod.rs      ◄─── Session assembly from config
//! │   └── session.rs  ◄─── Session: catalog, buffer, tables, snapshot
//! ├── commands/
//! │   ├── mod.rs      ◄─── Output (text / JSON)
//! │   ├── entry.rs    ◄─── lookup, submit
//! │   ├── tracking.rs ◄─── actions list / set / options
//! │   ├── feedback.rs ◄─── feedback
//! │   └── config.rs   ◄─── config show / init
//! └── error.rs        ◄─── AppError and exit codes
//! ```
//!
//! ## Usage
//! ```text
//! shelfline lookup 6291003
//! shelfline submit entries.json
//! shelfline actions list --expiry 7 --where "Outlet=Marina"
//! shelfline actions set 5=Ordered 9=Completed
//! shelfline feedback --name Omar --rating 4 --message "Clean aisles"
//! shelfline --json actions list --expiry expired
//! ```

pub mod commands;
pub mod config;
pub mod error;
pub mod state;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use commands::feedback::FeedbackArgs;
use commands::tracking::{ListArgs, SetArgs};
use commands::Output;
use config::ShelflineConfig;
use error::AppResult;

/// Outlet item, action tracking and feedback forms.
#[derive(Debug, Parser)]
#[command(name = "shelfline", version, about)]
pub struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(short, long, global = true, env = "SHELFLINE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Look a barcode up in the catalog
    Lookup {
        barcode: String,
    },

    /// Submit item form entries from a JSON file ("-" for stdin)
    Submit {
        file: String,

        /// Validate only, write nothing
        #[arg(long)]
        dry_run: bool,
    },

    /// Action tracking dashboard
    #[command(subcommand)]
    Actions(ActionsCommand),

    /// Submit customer feedback
    Feedback(FeedbackArgs),

    /// Configuration helpers
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Debug, Subcommand)]
pub enum ActionsCommand {
    /// List Items rows
    List(ListArgs),

    /// Set "Action Took" for rows
    Set(SetArgs),

    /// Show the allowed "Action Took" values
    Options,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,

    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Runs one CLI invocation.
///
/// ## Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  1. Load config ── defaults → shelfline.toml → SHELFLINE_* env         │
/// │  2. Open session ── catalog file, Items / Feedback tables              │
/// │  3. Dispatch the subcommand                                             │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run(cli: Cli) -> AppResult<()> {
    let mut out = Output::stdout(cli.json);

    if let Command::Config(ConfigCommand::Init { force }) = &cli.command {
        return commands::config::init(cli.config.clone(), *force, &mut out);
    }

    let config = ShelflineConfig::load(cli.config.clone())?;
    if let Command::Config(ConfigCommand::Show) = &cli.command {
        return commands::config::show(&config, &mut out);
    }

    let mut session = state::open_session(&config).await?;
    info!(session = %session.id(), offline = session.is_offline(), "Session ready");

    match &cli.command {
        Command::Lookup { barcode } => commands::entry::lookup(&session, &mut out, barcode),
        Command::Submit { file, dry_run } => {
            let input = commands::read_input(file).await?;
            commands::entry::submit(&mut session, &mut out, &input, *dry_run).await
        }
        Command::Actions(ActionsCommand::List(args)) => {
            commands::tracking::list(&mut session, &mut out, args, commands::today()).await
        }
        Command::Actions(ActionsCommand::Set(args)) => {
            commands::tracking::set(&mut session, &mut out, args).await
        }
        Command::Actions(ActionsCommand::Options) => commands::tracking::options(&session, &mut out),
        Command::Feedback(args) => commands::feedback::submit(&mut session, &mut out, args).await,
        Command::Config(_) => Ok(()),
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=shelfline_sheets=trace` - Trace the store layer only
/// - Default: INFO, debug for the shelfline crates
///
/// Logs go to stderr so `--json` output stays parseable.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,shelfline=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_actions_list() {
        let cli = Cli::try_parse_from([
            "shelfline",
            "--json",
            "actions",
            "list",
            "--expiry",
            "30",
            "--where",
            "Outlet=Marina",
            "--from",
            "2025-03-01",
        ])
        .unwrap();

        assert!(cli.json);
        let Command::Actions(ActionsCommand::List(args)) = cli.command else {
            panic!("expected actions list");
        };
        assert_eq!(args.expiry, shelfline_core::ExpiryWindow::Within(30));
        assert_eq!(args.categories.len(), 1);
        assert!(args.from.is_some());
    }

    #[test]
    fn test_parse_rejects_bad_edit() {
        assert!(Cli::try_parse_from(["shelfline", "actions", "set", "x=Ordered"]).is_err());
        assert!(Cli::try_parse_from(["shelfline", "actions", "set"]).is_err());
    }
}
