//! Error types for the CLI layer.

use thiserror::Error;

/// Errors a CLI command can surface.
#[derive(Error, Debug)]
pub enum CuratordError {
  /// Anything bubbling up from the library.
  #[error(transparent)]
  Curator(#[from] curator::error::CuratorError),

  /// A prompt or confirmation failed.
  #[error(transparent)]
  Dialoguer(#[from] dialoguer::Error),

  /// Filesystem trouble reading or writing command input/output.
  #[error(transparent)]
  Io(#[from] std::io::Error),

  /// Bad command-line input not caught by clap.
  #[error("{0}")]
  Usage(String),
}

/// Crate-wide result type.
pub type Result<T> = core::result::Result<T, CuratordError>;
