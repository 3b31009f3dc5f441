//! # Error Module
//!
//! Typed errors for the header engine and the tree walker. Every variant maps
//! to a distinct process exit code through [`LicenserError::exit_code`], so
//! the CLI can report failures without inspecting messages.

use std::io;
use std::path::PathBuf;

/// Exit code used for errors that don't carry a [`LicenserError`].
pub const EXIT_UNKNOWN_ERROR: i32 = 255;

/// Errors produced while checking or rewriting license headers.
#[derive(Debug, thiserror::Error)]
pub enum LicenserError {
  /// The replacement header is shorter than two bytes. No I/O is attempted.
  #[error("header is too short")]
  HeaderTooShort,

  #[error("failed to stat {}: {source}", .path.display())]
  FileStatFailed { path: PathBuf, source: io::Error },

  #[error("failed to read {}: {source}", .path.display())]
  FileReadFailed { path: PathBuf, source: io::Error },

  #[error("failed to write {}: {source}", .path.display())]
  FileWriteFailed { path: PathBuf, source: io::Error },

  /// The tree walker could not enumerate an entry.
  #[error("failed to walk {}: {source}", .path.display())]
  PathWalkFailed { path: PathBuf, source: walkdir::Error },

  /// At least one file failed verification in dry mode. Not a crash: the
  /// offending paths were already printed.
  #[error("one or more files are missing the license header")]
  VerificationMismatch,

  /// The root of the walk does not exist or cannot be inspected.
  #[error("failed to stat {}: {source}", .path.display())]
  TreeStatFailed { path: PathBuf, source: io::Error },

  #[error("failed to open {}: {source}", .path.display())]
  OpenWalkFileFailed { path: PathBuf, source: io::Error },

  /// Rewriting a nonconforming file failed.
  #[error("failed rewriting {}: {source}", .path.display())]
  RewriteFailed {
    path: PathBuf,
    #[source]
    source: Box<LicenserError>,
  },

  #[error("unknown license: {0}")]
  UnknownLicense(String),

  #[error("failed to open {}: {source}", .path.display())]
  OpenFileFailed { path: PathBuf, source: io::Error },

  /// The report sink rejected a write.
  #[error("failed to write output: {0}")]
  OutputFailed(#[source] io::Error),

  #[error("failed generating the notice: {0}")]
  NoticeFailed(#[from] crate::notice::NoticeError),
}

impl LicenserError {
  /// Process exit code for this error kind.
  pub const fn exit_code(&self) -> i32 {
    match self {
      LicenserError::VerificationMismatch => 1,
      LicenserError::TreeStatFailed { .. } => 2,
      LicenserError::FileStatFailed { .. } => 3,
      LicenserError::PathWalkFailed { .. } => 4,
      LicenserError::OpenWalkFileFailed { .. } => 5,
      LicenserError::RewriteFailed { .. }
      | LicenserError::HeaderTooShort
      | LicenserError::FileReadFailed { .. }
      | LicenserError::FileWriteFailed { .. } => 6,
      LicenserError::UnknownLicense(_) => 7,
      LicenserError::OpenFileFailed { .. } => 8,
      LicenserError::NoticeFailed(_) => 9,
      LicenserError::OutputFailed(_) => EXIT_UNKNOWN_ERROR,
    }
  }

  /// Whether this is the dry-run sentinel rather than a real failure.
  pub const fn is_verification_mismatch(&self) -> bool {
    matches!(self, LicenserError::VerificationMismatch)
  }
}

/// Maps any error chain to an exit code.
///
/// Configuration errors get their own code; anything that is neither a
/// [`LicenserError`] nor a [`ConfigError`](crate::config::ConfigError) maps to
/// [`EXIT_UNKNOWN_ERROR`].
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
  if let Some(e) = err.downcast_ref::<LicenserError>() {
    return e.exit_code();
  }
  if err.downcast_ref::<crate::config::ConfigError>().is_some() {
    return crate::config::CONFIG_ERROR_EXIT_CODE;
  }
  EXIT_UNKNOWN_ERROR
}
