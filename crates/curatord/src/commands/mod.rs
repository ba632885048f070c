//! Subcommand implementations.
//!
//! Each module holds one subcommand: its clap `Args` struct and an async
//! function taking the interaction handle, the library client, and the
//! parsed arguments. Commands stay thin; the logic lives in `curator`.

use clap::{Args, Subcommand, ValueEnum};
use curator::{client::Library, item::Item};
use tracing::debug;

use crate::{
  error::{CuratordError, Result},
  interaction::{ResponseContent, UserInteraction},
};

pub mod attach;
pub mod audit;
pub mod collection;
pub mod export;
pub mod import;
pub mod item;
pub mod note;
pub mod search;
pub mod stats;
pub mod status;
pub mod tag;

pub use attach::{attach, extract_text, fetch_file, AttachArgs, ExtractTextArgs, FetchFileArgs};
pub use audit::{audit, AuditArgs};
pub use collection::{collection, CollectionCommands};
pub use export::{export, ExportArgs};
pub use import::{import, ImportArgs};
pub use item::{item, ItemCommands};
pub use note::{note, NoteCommands};
pub use search::{search, SearchArgs};
pub use stats::{stats, StatsArgs};
pub use status::status;
pub use tag::{tag, TagCommands};

/// Available commands for the CLI
#[derive(Subcommand)]
pub enum Commands {
  /// Check connectivity and summarize the library
  Status,

  /// Run library health checks (duplicates, missing PDFs, bad identifiers, …)
  Audit(AuditArgs),

  /// Search items by title, creator, year, tag, or collection
  Search(SearchArgs),

  /// Show library statistics
  Stats(StatsArgs),

  /// Tag housekeeping
  Tag {
    /// Tag operation to run
    #[command(subcommand)]
    cmd: TagCommands,
  },

  /// Collection housekeeping
  Collection {
    /// Collection operation to run
    #[command(subcommand)]
    cmd: CollectionCommands,
  },

  /// Item mutations
  Item {
    /// Item operation to run
    #[command(subcommand)]
    cmd: ItemCommands,
  },

  /// Note management
  Note {
    /// Note operation to run
    #[command(subcommand)]
    cmd: NoteCommands,
  },

  /// Import items by identifier or from a BibTeX/JSON file
  Import(ImportArgs),

  /// Export the library or a collection as JSON, CSV, or BibTeX
  Export(ExportArgs),

  /// Attach a PDF file or a link to an item
  Attach(AttachArgs),

  /// Download an attachment file
  FetchFile(FetchFileArgs),

  /// Extract text from a PDF attachment
  ExtractText(ExtractTextArgs),
}

/// Asks before a destructive operation, honoring `--yes`.
fn confirm_destructive<I: UserInteraction>(
  interaction: &I,
  yes: bool,
  message: &str,
) -> Result<bool> {
  if yes {
    return Ok(true);
  }
  interaction.confirm(message)
}
