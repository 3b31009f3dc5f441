//! # Processor Module
//!
//! This module walks a source tree, checks every matching file for the
//! expected license header and either reports or rewrites the files that
//! don't have it.
//!
//! The module is organized into several submodules:
//! - [`path_matcher`] - Exclusion patterns and path prefix/suffix cleaning
//! - [`content_transformer`] - Header block extraction and replacement
//! - [`file_io`] - File reading and writing operations
//!
//! The [`Processor`] struct is the main entry point, orchestrating the
//! submodules and the filters in [`crate::file_filter`].

pub mod content_transformer;
pub mod file_io;
pub mod path_matcher;

use std::fs;
use std::io::{Seek as _, SeekFrom, Write};
use std::path::{MAIN_SEPARATOR_STR, Path};
use std::time::Instant;

pub use content_transformer::{ContentTransformer, header_region, locate_header_region, rewrite_with_header};
pub use file_io::{FileIO, rewrite_file, rewrite_file_with_header};
pub use path_matcher::{clean_prefixes, clean_suffixes, needs_exclusion};
use tracing::{debug, info, trace};
use walkdir::{DirEntry, WalkDir};

use crate::error::LicenserError;
use crate::file_filter::{ExclusionFilter, ExtensionFilter, FileFilter, WalkEntry};
use crate::license_detection::{DEFAULT_MAX_LINE_LEN, HeaderDetector, LicenseDetector};
use crate::report::{FileOutcome, FileReport, ProcessingSummary};
use crate::templates::RenderedHeader;
use crate::verbose_log;

/// Line printed for every nonconforming file in dry mode.
pub const MISSING_HEADER_SUFFIX: &str = ": is missing the license header";

/// Default extension of the files to scan.
pub const DEFAULT_EXTENSION: &str = ".go";

/// Configuration for creating a Processor instance.
pub struct ProcessorConfig {
  /// Header the files must start with
  pub header: RenderedHeader,
  /// Exclusion patterns, matched against tree-relative paths
  pub exclude: Vec<String>,
  /// Extension of the files to scan, including the dot
  pub ext: String,
  /// Report nonconforming files instead of rewriting them
  pub dry_run: bool,
  /// Longest line the detector reads before treating a file as nonconforming
  pub max_line_len: usize,
  /// Replaces the strict line-by-line detector
  pub license_detector: Option<Box<dyn LicenseDetector>>,
}

impl ProcessorConfig {
  /// Creates a new ProcessorConfig with required fields and sensible defaults.
  ///
  /// Use struct update syntax to override specific fields:
  /// ```ignore
  /// ProcessorConfig {
  ///     dry_run: true,
  ///     ..ProcessorConfig::new(header)
  /// }
  /// ```
  pub fn new(header: RenderedHeader) -> Self {
    Self {
      header,
      exclude: vec![],
      ext: DEFAULT_EXTENSION.to_string(),
      dry_run: false,
      max_line_len: DEFAULT_MAX_LINE_LEN,
      license_detector: None,
    }
  }
}

/// Processor for checking and rewriting license headers in a tree.
///
/// Files are handled one at a time in lexical walk order. A failure on one
/// file is recorded and the walk goes on; the last recorded failure is what
/// [`Processor::process`] returns.
pub struct Processor {
  /// Decides whether a file starts with the header
  detector: Box<dyn LicenseDetector>,

  /// Writes the header into nonconforming files
  transformer: ContentTransformer,

  /// Skips excluded paths and well-known directories
  exclusion: ExclusionFilter,

  /// Keeps only files with the configured extension
  extension: ExtensionFilter,

  /// Whether to only check without modifying files
  dry_run: bool,
}

/// A completed walk: its totals and the last per-file failure, if any.
#[derive(Debug)]
pub struct ProcessRun {
  pub summary: ProcessingSummary,
  pub error: Option<LicenserError>,
}

impl ProcessRun {
  /// The summary, or the recorded failure when there is one.
  pub fn into_result(self) -> Result<ProcessingSummary, LicenserError> {
    match self.error {
      Some(err) => Err(err),
      None => Ok(self.summary),
    }
  }
}

/// What happened during one walk, before it is summarized.
#[derive(Default)]
struct WalkState {
  reports: Vec<FileReport>,
  excluded: usize,
  last_error: Option<LicenserError>,
}

impl Processor {
  /// Creates a new processor with the specified configuration.
  ///
  /// # Errors
  ///
  /// Returns [`LicenserError::HeaderTooShort`] if the rendered header is under
  /// two bytes long.
  pub fn new(config: ProcessorConfig) -> Result<Self, LicenserError> {
    let transformer = ContentTransformer::new(&config.header.to_bytes())?;
    let detector = config
      .license_detector
      .unwrap_or_else(|| Box::new(HeaderDetector::new(config.header.lines().to_vec(), config.max_line_len)));

    Ok(Self {
      detector,
      transformer,
      exclusion: ExclusionFilter::new(config.exclude),
      extension: ExtensionFilter::new(config.ext),
      dry_run: config.dry_run,
    })
  }

  /// Walks `root` and checks or rewrites every matching file.
  ///
  /// In dry mode every nonconforming file is reported to `out` as
  /// `<path>: is missing the license header`.
  ///
  /// # Parameters
  ///
  /// * `root` - Directory (or single file) to walk
  /// * `out` - Sink for the missing-header report lines
  ///
  /// # Returns
  ///
  /// A [`ProcessingSummary`] when every file conforms or was rewritten.
  ///
  /// # Errors
  ///
  /// - [`LicenserError::TreeStatFailed`] if `root` can't be stat'ed
  /// - [`LicenserError::PathWalkFailed`] if the walk itself fails; the walk
  ///   stops there
  /// - otherwise the last per-file failure, e.g.
  ///   [`LicenserError::VerificationMismatch`] in dry mode
  pub fn process(&self, root: &Path, out: &mut dyn Write) -> Result<ProcessingSummary, LicenserError> {
    self.run(root, out)?.into_result()
  }

  /// Like [`process`](Self::process), but keeps the summary when files
  /// failed or were reported.
  ///
  /// # Errors
  ///
  /// Only the failures that stop the walk: [`LicenserError::TreeStatFailed`]
  /// and [`LicenserError::PathWalkFailed`]. Per-file failures end up in
  /// [`ProcessRun::error`].
  pub fn run(&self, root: &Path, out: &mut dyn Write) -> Result<ProcessRun, LicenserError> {
    let start = Instant::now();
    fs::metadata(root).map_err(|source| LicenserError::TreeStatFailed {
      path: root.to_path_buf(),
      source,
    })?;

    let state = self.walk(root, out)?;
    let summary = ProcessingSummary::from_reports(&state.reports, state.excluded, start.elapsed());
    info!(
      "Checked {} files: {} conforming, {} reported, {} rewritten, {} failed, {} excluded in {:?}",
      summary.checked,
      summary.conforming,
      summary.reported,
      summary.rewritten,
      summary.failed,
      summary.excluded,
      summary.elapsed
    );

    Ok(ProcessRun {
      summary,
      error: state.last_error,
    })
  }

  fn walk(&self, root: &Path, out: &mut dyn Write) -> Result<WalkState, LicenserError> {
    let mut state = WalkState::default();
    let mut entries = WalkDir::new(root).sort_by_file_name().into_iter();

    while let Some(entry) = entries.next() {
      let entry = entry.map_err(|source| LicenserError::PathWalkFailed {
        path: source.path().unwrap_or(root).to_path_buf(),
        source,
      })?;

      let relative = relative_path(root, entry.path());
      let name = entry.file_name().to_string_lossy();
      let is_dir = entry.file_type().is_dir();
      let walk_entry = WalkEntry {
        relative: &relative,
        name: &name,
        is_dir,
      };

      if !self.exclusion.should_process(&walk_entry).should_process {
        state.excluded += 1;
        if is_dir {
          entries.skip_current_dir();
        }
        continue;
      }
      if is_dir || !self.extension.should_process(&walk_entry).should_process {
        continue;
      }

      let report = match self.process_file(&entry, out) {
        Ok(report) => report,
        Err(err) => {
          debug!("{}: {}", entry.path().display(), err);
          state.last_error = Some(err);
          FileReport::new(entry.path().to_path_buf(), FileOutcome::Failed)
        }
      };
      if report.outcome == FileOutcome::Reported {
        state.last_error = Some(LicenserError::VerificationMismatch);
      }
      state.reports.push(report);
    }

    Ok(state)
  }

  /// Checks a single file and reports or rewrites it when needed.
  fn process_file(&self, entry: &DirEntry, out: &mut dyn Write) -> Result<FileReport, LicenserError> {
    let path = entry.path();
    let mut reader = FileIO::open_for_check(path)?;

    if self.detector.has_license(&mut reader) {
      trace!("{} conforms", path.display());
      return Ok(FileReport::new(path.to_path_buf(), FileOutcome::Conforms));
    }

    // The strict check failed; look for the header lines anywhere in the file.
    let misplaced = reader.seek(SeekFrom::Start(0)).is_ok() && self.detector.has_license_lines(&mut reader);
    if misplaced {
      debug!("{} contains header lines out of position", path.display());
    }
    drop(reader);

    let outcome = if self.dry_run {
      writeln!(out, "{}{}", display_path(path), MISSING_HEADER_SUFFIX).map_err(LicenserError::OutputFailed)?;
      FileOutcome::Reported
    } else {
      rewrite_file(path, &self.transformer).map_err(|source| LicenserError::RewriteFailed {
        path: path.to_path_buf(),
        source: Box::new(source),
      })?;
      verbose_log!("Rewrote header in: {}", display_path(path));
      FileOutcome::Rewritten
    };

    Ok(FileReport {
      misplaced_header: misplaced,
      ..FileReport::new(path.to_path_buf(), outcome)
    })
  }
}

/// Path of `path` relative to the walk `root`, without a leading separator.
fn relative_path(root: &Path, path: &Path) -> String {
  let relative = pathdiff::diff_paths(path, root).unwrap_or_else(|| path.to_path_buf());
  clean_prefixes(&relative.to_string_lossy(), &[MAIN_SEPARATOR_STR, "/"]).to_string()
}

/// Path as shown to the user: the walked path without leading `./`.
pub fn display_path(path: &Path) -> String {
  let full = path.to_string_lossy();
  let mut shown: &str = &full;
  while let Some(rest) = shown.strip_prefix("./") {
    shown = rest;
  }
  shown.to_string()
}
