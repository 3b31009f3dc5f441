//! # File Filter Module
//!
//! This module contains components for filtering walked entries based on
//! exclusion patterns, well-known directories and file extensions.

use crate::processor::path_matcher::needs_exclusion;
use crate::verbose_log;

/// Directories that are never descended into.
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &["vendor", ".git"];

/// A walked file or directory, as seen by the filters.
#[derive(Debug, Clone, Copy)]
pub struct WalkEntry<'a> {
  /// Path relative to the walk root, without a leading separator
  pub relative: &'a str,
  /// Final path component
  pub name: &'a str,
  pub is_dir: bool,
}

/// Result of a file filtering operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterResult {
  /// Whether the entry should be processed
  pub should_process: bool,
  /// Reason why the entry should not be processed (if any)
  pub reason: Option<String>,
}

impl FilterResult {
  /// Creates a new FilterResult indicating the entry should be processed.
  pub const fn process() -> Self {
    Self {
      should_process: true,
      reason: None,
    }
  }

  /// Creates a new FilterResult indicating the entry should be skipped.
  pub fn skip(reason: impl Into<String>) -> Self {
    Self {
      should_process: false,
      reason: Some(reason.into()),
    }
  }
}

/// Trait for components that filter walked entries.
pub trait FileFilter: Send + Sync {
  /// Determines whether an entry should be processed.
  fn should_process(&self, entry: &WalkEntry<'_>) -> FilterResult;
}

/// Filter that skips excluded paths and the default excluded directories.
///
/// A skipped directory is pruned with everything below it.
pub struct ExclusionFilter {
  patterns: Vec<String>,
  excluded_dirs: Vec<String>,
}

impl ExclusionFilter {
  /// Creates a filter for `patterns` plus [`DEFAULT_EXCLUDED_DIRS`].
  pub fn new(patterns: Vec<String>) -> Self {
    Self {
      patterns,
      excluded_dirs: DEFAULT_EXCLUDED_DIRS.iter().map(|d| d.to_string()).collect(),
    }
  }
}

impl FileFilter for ExclusionFilter {
  fn should_process(&self, entry: &WalkEntry<'_>) -> FilterResult {
    if entry.is_dir && self.excluded_dirs.iter().any(|d| d == entry.name) {
      verbose_log!("Skipping: {} (excluded directory)", entry.relative);
      return FilterResult::skip("Excluded directory");
    }
    if needs_exclusion(entry.relative, &self.patterns) {
      verbose_log!("Skipping: {} (matches exclusion)", entry.relative);
      return FilterResult::skip("Matches exclusion pattern");
    }
    FilterResult::process()
  }
}

/// Filter that only lets through files with one extension.
///
/// Directories always pass, so the walk can descend into them.
pub struct ExtensionFilter {
  /// Extension including the leading dot, e.g. `.go`
  ext: String,
}

impl ExtensionFilter {
  pub fn new(ext: impl Into<String>) -> Self {
    Self { ext: ext.into() }
  }
}

/// Extension of a file name: everything from the last dot, dot included.
///
/// Dotfiles count as having an extension (`.go` has extension `.go`), and a
/// name without a dot has an empty one.
pub fn file_extension(name: &str) -> &str {
  name.rfind('.').map_or("", |idx| &name[idx..])
}

impl FileFilter for ExtensionFilter {
  fn should_process(&self, entry: &WalkEntry<'_>) -> FilterResult {
    if entry.is_dir || file_extension(entry.name) == self.ext {
      FilterResult::process()
    } else {
      FilterResult::skip(format!("Extension is not {}", self.ext))
    }
  }
}
