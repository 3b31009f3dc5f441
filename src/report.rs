//! # Report Module
//!
//! This module records what happened to each file during a run and rolls the
//! records up into a [`ProcessingSummary`].

use std::path::PathBuf;
use std::time::Duration;

/// What the processor did with a single file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
  /// The file already starts with the expected header
  Conforms,
  /// The header is missing and the run is verification-only
  Reported,
  /// The header was missing or stale and has been rewritten
  Rewritten,
  /// Processing the file failed; the error was recorded separately
  Failed,
}

/// Information about a processed file.
#[derive(Debug, Clone)]
pub struct FileReport {
  /// Path to the file, as walked
  pub path: PathBuf,
  pub outcome: FileOutcome,
  /// Whether header lines were found somewhere other than the top of the file
  pub misplaced_header: bool,
}

impl FileReport {
  pub const fn new(path: PathBuf, outcome: FileOutcome) -> Self {
    Self {
      path,
      outcome,
      misplaced_header: false,
    }
  }
}

/// Totals for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessingSummary {
  /// Files whose header was checked
  pub checked: usize,
  pub conforming: usize,
  pub reported: usize,
  pub rewritten: usize,
  pub failed: usize,
  /// Files and directories skipped by exclusion rules
  pub excluded: usize,
  pub elapsed: Duration,
}

impl ProcessingSummary {
  /// Builds a summary from per-file reports.
  pub fn from_reports(reports: &[FileReport], excluded: usize, elapsed: Duration) -> Self {
    let count = |outcome: FileOutcome| reports.iter().filter(|r| r.outcome == outcome).count();

    Self {
      checked: reports.len(),
      conforming: count(FileOutcome::Conforms),
      reported: count(FileOutcome::Reported),
      rewritten: count(FileOutcome::Rewritten),
      failed: count(FileOutcome::Failed),
      excluded,
      elapsed,
    }
  }

  /// Whether every checked file conforms.
  pub const fn all_conform(&self) -> bool {
    self.reported == 0 && self.rewritten == 0 && self.failed == 0
  }
}
