//! Error types for the curator library.
//!
//! This module provides a comprehensive error type that encompasses all
//! possible failure modes when working against the local API, including:
//! - Network and API errors
//! - Identifier validation
//! - Format conversion (JSON/CSV/BibTeX)
//! - File system and PDF handling
//!
//! # Examples
//!
//! ```
//! use curator::error::CuratorError;
//!
//! fn classify(err: &CuratorError) -> &'static str {
//!   match err {
//!     CuratorError::Network(_) => "is Zotero running?",
//!     CuratorError::NotFound { .. } => "no such resource",
//!     _ => "something else went wrong",
//!   }
//! }
//! ```

use thiserror::Error;

/// Error type alias used for the [`curator`](crate) crate.
pub type Result<T> = core::result::Result<T, CuratorError>;

/// Errors that can occur when working with the curator library.
///
/// Most variants wrap an underlying error transparently; the domain-specific
/// variants carry enough context to identify the resource or input that
/// caused the failure.
#[derive(Error, Debug)]
pub enum CuratorError {
  /// A network request failed.
  ///
  /// Against the local API this almost always means Zotero is not running
  /// or the local API is not enabled in its settings.
  #[error(transparent)]
  Network(#[from] reqwest::Error),

  /// JSON (de)serialization failed.
  #[error(transparent)]
  Serde(#[from] serde_json::Error),

  /// A file system operation failed.
  #[error(transparent)]
  Io(#[from] std::io::Error),

  /// A TOML configuration file couldn't be parsed.
  #[error(transparent)]
  TomlDe(#[from] toml::de::Error),

  /// CSV writing failed.
  #[error(transparent)]
  Csv(#[from] csv::Error),

  /// PDF parsing failed.
  #[error(transparent)]
  Pdf(#[from] lopdf::Error),

  /// The API returned a non-success status code.
  ///
  /// The message is the response body, which the local API uses for
  /// human-readable diagnostics.
  #[error("API error ({status}): {message}")]
  Api {
    /// HTTP status code of the response.
    status:  u16,
    /// Response body.
    message: String,
  },

  /// The requested resource doesn't exist in the library.
  #[error("{kind} not found: {key}")]
  NotFound {
    /// Resource kind ("item", "collection", "attachment", "note").
    kind: &'static str,
    /// The key that was looked up.
    key:  String,
  },

  /// An item turned out to be of a different type than the operation needs,
  /// e.g. calling a note operation on a regular item.
  #[error("item {key} is a {actual}, expected {expected}")]
  WrongItemType {
    /// Key of the offending item.
    key:      String,
    /// Item type the operation requires.
    expected: &'static str,
    /// Item type actually found.
    actual:   String,
  },

  /// The provided identifier doesn't match any supported format
  /// (DOI, ISBN, arXiv id).
  #[error("Invalid identifier: {0}")]
  InvalidIdentifier(String),

  /// Multiple metadata sources matched the same identifier.
  #[error("Identifier matched multiple sources: {0:?}")]
  AmbiguousIdentifier(Vec<String>),

  /// A file handed to an attachment operation can't be used as requested,
  /// e.g. uploading a non-PDF where a PDF is required.
  #[error("unusable attachment file: {0}")]
  File(String),

  /// BibTeX content couldn't be parsed.
  #[error("BibTeX parse error: {0}")]
  Bibtex(String),

  /// Configuration is missing or invalid.
  #[error("{0}")]
  Config(String),
}
