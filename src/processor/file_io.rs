//! # File I/O Module
//!
//! This module provides file reading and writing utilities for the processor.
//! It encapsulates synchronous file operations and maps each failure to its
//! own [`LicenserError`] kind.

use std::fs::{self, File, Permissions};
use std::io::BufReader;
use std::path::Path;

use tracing::trace;

use super::content_transformer::ContentTransformer;
use crate::error::LicenserError;

/// File I/O operations for the processor.
///
/// This struct provides static methods for reading and writing files.
pub struct FileIO;

impl FileIO {
  /// Opens a file for header detection.
  pub fn open_for_check(path: &Path) -> Result<BufReader<File>, LicenserError> {
    let file = File::open(path).map_err(|source| LicenserError::OpenWalkFileFailed {
      path: path.to_path_buf(),
      source,
    })?;
    Ok(BufReader::new(file))
  }

  /// Reads the permission bits of a file.
  pub fn permissions(path: &Path) -> Result<Permissions, LicenserError> {
    fs::metadata(path)
      .map(|metadata| metadata.permissions())
      .map_err(|source| LicenserError::FileStatFailed {
        path: path.to_path_buf(),
        source,
      })
  }

  /// Reads the full file content.
  pub fn read_full_content(path: &Path) -> Result<Vec<u8>, LicenserError> {
    fs::read(path).map_err(|source| LicenserError::FileReadFailed {
      path: path.to_path_buf(),
      source,
    })
  }

  /// Writes `content` to `path` and restores `permissions` on it.
  pub fn write_file(path: &Path, content: &[u8], permissions: Permissions) -> Result<(), LicenserError> {
    let write_failed = |source| LicenserError::FileWriteFailed {
      path: path.to_path_buf(),
      source,
    };
    fs::write(path, content).map_err(write_failed)?;
    fs::set_permissions(path, permissions).map_err(write_failed)
  }
}

/// Rewrites the file at `path` so that it starts with `header`.
///
/// The file is stat'ed and read in full before anything is written, so a
/// failed read never truncates it. No backup is kept.
///
/// # Errors
///
/// - [`LicenserError::HeaderTooShort`] if `header` is under two bytes; the
///   file is not touched
/// - [`LicenserError::FileStatFailed`], [`LicenserError::FileReadFailed`] or
///   [`LicenserError::FileWriteFailed`] wrapping the underlying I/O error
pub fn rewrite_file_with_header(path: &Path, header: &[u8]) -> Result<(), LicenserError> {
  rewrite_file(path, &ContentTransformer::new(header)?)
}

/// Rewrites the file at `path` with an already validated transformer.
pub fn rewrite_file(path: &Path, transformer: &ContentTransformer) -> Result<(), LicenserError> {
  let permissions = FileIO::permissions(path)?;
  let original = FileIO::read_full_content(path)?;
  let rewritten = transformer.rewrite(&original);
  trace!(
    "Rewriting {} ({} -> {} bytes)",
    path.display(),
    original.len(),
    rewritten.len()
  );
  FileIO::write_file(path, &rewritten, permissions)
}
