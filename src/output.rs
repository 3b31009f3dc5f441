//! # Output Module
//!
//! This module centralizes the user-facing output of the licenser binary
//! that isn't part of the report itself.
//!
//! stdout only ever carries the missing-header lines, the notice dump and
//! `--list-licenses`; everything here that is informational goes to stderr.

use std::io::{self, Write};

use owo_colors::{OwoColorize, Stream};

use crate::logging::is_verbose;
use crate::report::ProcessingSummary;
use crate::templates::HeaderRegistry;

/// Symbols used in output
pub mod symbols {
  /// Every file conforms
  pub const SUCCESS: &str = "\u{2713}"; // ✓
  /// Something is missing or failed
  pub const FAILURE: &str = "\u{2717}"; // ✗
}

/// Writes the known license labels, one per line, marking the default.
pub fn print_license_list(registry: &HeaderRegistry, default_label: &str, out: &mut dyn Write) -> io::Result<()> {
  for label in registry.labels() {
    if label == default_label {
      writeln!(out, "{label} (default)")?;
    } else {
      writeln!(out, "{label}")?;
    }
  }
  Ok(())
}

/// Formats the one-line run summary.
///
/// Format: "Summary: X OK, Y missing, Z rewritten, W failed, V excluded"
pub fn format_summary(summary: &ProcessingSummary) -> String {
  let missing = if summary.reported > 0 {
    summary
      .reported
      .if_supports_color(Stream::Stderr, |s| s.red())
      .to_string()
  } else {
    summary.reported.to_string()
  };

  format!(
    "Summary: {} OK, {} missing, {} rewritten, {} failed, {} excluded ({:.2}s)",
    summary.conforming.if_supports_color(Stream::Stderr, |s| s.cyan()),
    missing,
    summary.rewritten,
    summary.failed,
    summary.excluded.if_supports_color(Stream::Stderr, |s| s.dimmed()),
    summary.elapsed.as_secs_f64()
  )
}

/// Prints the run summary to stderr in verbose mode.
pub fn print_summary(summary: &ProcessingSummary) {
  if !is_verbose() {
    return;
  }

  let symbol = if summary.all_conform() && summary.checked > 0 {
    symbols::SUCCESS.if_supports_color(Stream::Stderr, |s| s.green()).to_string()
  } else if summary.failed > 0 || summary.reported > 0 {
    symbols::FAILURE.if_supports_color(Stream::Stderr, |s| s.red()).to_string()
  } else {
    symbols::SUCCESS.to_string()
  };
  eprintln!("{} {}", symbol, format_summary(summary));
}

/// Prints a fatal error to stderr. Shown even in quiet mode.
pub fn print_error(message: &str) {
  eprintln!("{} {}", "error:".if_supports_color(Stream::Stderr, |s| s.red()), message);
}
