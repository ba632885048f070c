//! Command line interface for curating a Zotero library.
//!
//! This crate wraps the `curator` library in subcommands for the common
//! maintenance chores of a reference library:
//! - Health checks and audits (duplicates, missing PDFs, bad identifiers)
//! - Tag and collection housekeeping
//! - Item mutations (merge, copy, convert, trash)
//! - Import from identifiers or BibTeX/JSON files, export to JSON/CSV/BibTeX
//! - Attachment transfer and PDF text extraction
//!
//! # Usage
//!
//! ```bash
//! # Check the connection and summarize the library
//! curator status
//!
//! # Run every audit
//! curator audit
//!
//! # Import a paper by DOI
//! curator import 10.1145/1327452.1327492
//!
//! # Export a collection as BibTeX
//! curator export bibtex --collection ABCD1234
//! ```
//!
//! All deletions are soft: items land in the trash, and destructive
//! commands ask for confirmation unless `--yes` is passed. Verbosity
//! scales with `-v` up to `-vvv`.

#![warn(missing_docs, clippy::missing_docs_in_private_items)]

use std::path::PathBuf;

use clap::{builder::ArgAction, Args, Parser, Subcommand};
use console::style;
use curator::{client::Library, configuration::Config};
use tracing_subscriber::EnvFilter;

pub mod commands;
pub mod error;
pub mod interaction;

use crate::{commands::*, error::*, interaction::*};

/// Command line interface configuration and argument parsing
#[derive(Parser)]
#[command(author, version, about = "Audit and curate a Zotero library over the local API")]
pub struct Cli {
  /// Verbose mode (-v, -vv, -vvv) for different levels of logging detail
  #[arg(
        short,
        long,
        action = ArgAction::Count,
        global = true,
        help = "Increase logging verbosity"
    )]
  verbose: u8,

  /// Path to a TOML configuration file. If not specified, uses the
  /// platform config directory, falling back to the stock local API
  /// endpoint.
  #[arg(long, short, global = true)]
  config: Option<PathBuf>,

  /// The subcommand to execute
  #[command(subcommand)]
  command: Commands,

  /// Skip all prompts and accept defaults (mostly for testing)
  #[arg(long, hide = true, global = true)]
  accept_defaults: bool,
}

/// Configures the logging system based on the verbosity level
///
/// The verbosity levels are:
/// - 0: error (default)
/// - 1: warn
/// - 2: info
/// - 3: debug
/// - 4+: trace
fn setup_logging(verbosity: u8) {
  let filter = match verbosity {
    0 => "error",
    1 => "warn",
    2 => "info",
    3 => "debug",
    _ => "trace",
  };

  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_file(true)
    .with_line_number(true)
    .with_target(true)
    .init();
}

/// Entry point for the curator CLI application
///
/// Parses arguments, sets up logging, opens the library connection from
/// configuration, and dispatches to the requested command.
#[tokio::main]
async fn main() -> Result<()> {
  let cli = Cli::parse();
  setup_logging(cli.verbose);

  let config = match &cli.config {
    Some(path) => Config::from_file(path),
    None => Config::load(),
  };
  let config = match config {
    Ok(config) => config,
    Err(e) => {
      eprintln!("{} Failed to load configuration: {e}", style(ERROR_PREFIX).red());
      return Err(CuratordError::from(e));
    },
  };

  let mut library = Library::new(config)?;
  let interaction = ConsoleInteraction::new(cli.accept_defaults);

  match cli.command {
    Commands::Status => status(&interaction, &mut library).await,
    Commands::Audit(args) => audit(&interaction, &mut library, args).await,
    Commands::Search(args) => search(&interaction, &mut library, args).await,
    Commands::Stats(args) => stats(&interaction, &mut library, args).await,
    Commands::Tag { cmd } => tag(&interaction, &mut library, cmd).await,
    Commands::Collection { cmd } => collection(&interaction, &mut library, cmd).await,
    Commands::Item { cmd } => item(&interaction, &mut library, cmd).await,
    Commands::Note { cmd } => note(&interaction, &mut library, cmd).await,
    Commands::Import(args) => import(&interaction, &mut library, args).await,
    Commands::Export(args) => export(&interaction, &mut library, args).await,
    Commands::Attach(args) => attach(&interaction, &mut library, args).await,
    Commands::FetchFile(args) => fetch_file(&interaction, &mut library, args).await,
    Commands::ExtractText(args) => extract_text(&interaction, &mut library, args).await,
  }
}
