//! Library curation toolkit for a locally running Zotero instance.
//!
//! `curator` is a library of composable operations against the Zotero local
//! API (`http://localhost:23119/api`), providing:
//!
//! - Read-side queries: pagination, filtering, duplicate detection, and
//!   validation of identifiers (DOI, ISBN, ISSN)
//! - Write-side mutations: tag, collection, and field edits, merges, and
//!   item-type conversions
//! - Import/export: JSON, CSV, and BibTeX conversion plus metadata fetch
//!   from CrossRef, arXiv, and OpenLibrary
//! - Attachment transfer: PDF upload, download, replacement, and text
//!   extraction
//!
//! These are one-shot building blocks meant to be read and composed, not an
//! automation system. There is no retry policy and no transactional
//! guarantee beyond the last-write-wins behavior of the underlying API.
//!
//! # Getting Started
//!
//! ```no_run
//! use curator::{client::Library, configuration::Config, prelude::*};
//!
//! #[tokio::main]
//! async fn main() -> core::result::Result<(), Box<dyn std::error::Error>> {
//!   // Connect to the local API with defaults (localhost:23119, user library)
//!   let mut library = Library::new(Config::default())?;
//!
//!   // Find items that still need a PDF
//!   let missing = library.items_without_pdf().await?;
//!   println!("{} items without a PDF", missing.len());
//!
//!   // Merge a stray tag into its canonical spelling
//!   let outcome = library.merge_tags(&["machine-learning".into()], "ml").await?;
//!   println!("retagged {} items", outcome.succeeded.len());
//!   Ok(())
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`client`]: the local-API client, pagination, and the snapshot cache
//! - [`item`] / [`collection`]: wire types for library resources
//! - [`audit`]: read-side quality checks and searches
//! - [`identifier`]: DOI/ISBN/ISSN/URL validation and normalization
//! - [`stats`]: library summaries and counts
//! - [`export`] / [`bibtex`]: JSON, CSV, and BibTeX conversion
//! - [`remote`]: CrossRef, arXiv, and OpenLibrary metadata fetch
//! - [`pdf`]: PDF text and metadata extraction
//!
//! # Requirements
//!
//! Zotero 7+ must be running with the local API enabled:
//! Edit → Settings → Advanced → "Allow other applications to communicate
//! with Zotero".

#![warn(missing_docs, clippy::missing_docs_in_private_items)]

pub mod audit;
pub mod bibtex;
pub mod client;
pub mod collection;
pub mod configuration;
pub mod error;
pub mod export;
pub mod identifier;
pub mod item;
pub mod pdf;
pub mod remote;
pub mod stats;

/// Common traits and types for ergonomic imports.
///
/// ```no_run
/// use curator::{client::Library, configuration::Config, prelude::*};
///
/// async fn example() -> Result<()> {
///   let mut library = Library::new(Config::default())?;
///   let summary = library.library_summary().await?;
///   println!("{} items", summary.total_items);
///   Ok(())
/// }
/// ```
pub mod prelude {
  pub use crate::{
    error::{CuratorError, Result},
    remote::MetadataSource,
  };
}
