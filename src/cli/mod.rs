//! # CLI Module
//!
//! This module contains the command-line interface implementation.
//! It uses clap for argument parsing.

mod check;

use std::sync::LazyLock;

pub use check::{CheckArgs, Settings, run_check};
use clap::Parser;
use clap::builder::styling::{AnsiColor, Color, Style, Styles};

const CUSTOM_STYLES: Styles = Styles::styled()
  .header(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))).bold())
  .usage(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))).bold())
  .literal(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Blue))).bold())
  .placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Cyan))))
  .error(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Red))).bold())
  .valid(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))))
  .invalid(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Yellow))));

/// Version with the commit it was built from, when `build.rs` could tell.
static VERSION: LazyLock<String> = LazyLock::new(|| {
  let hash = option_env!("GIT_HASH").unwrap_or_default();
  let date = option_env!("GIT_DATE").unwrap_or_default();
  match (hash.is_empty(), date.is_empty()) {
    (true, _) => env!("CARGO_PKG_VERSION").to_string(),
    (false, true) => format!("{} ({hash})", env!("CARGO_PKG_VERSION")),
    (false, false) => format!("{} ({hash} {date})", env!("CARGO_PKG_VERSION")),
  }
});

/// Top-level CLI arguments
#[derive(Parser, Debug)]
#[command(
  name = "licenser",
  version = VERSION.as_str(),
  about,
  long_about = "Walks PATH recursively and rewrites the license header of every file whose \
header doesn't match the selected license.

With --notice, a NOTICE file listing the project's dependencies and their licenses is \
compiled from go.mod. The dependencies must already be downloaded to the module cache.",
  styles = CUSTOM_STYLES,
  after_help = "Examples:
  # Report files without the Apache 2.0 header, exiting with 1 if any
  licenser -d .

  # Rewrite headers using the Elastic license
  licenser --license Elastic --exclude x-pack --exclude testdata .

  # Rewrite headers and regenerate NOTICE
  licenser --notice --notice-year 2018 .

  # Print the notice instead of writing it
  licenser -d --notice .
",
  help_template = "{before-help}{name} v{version}
{about-section}
{usage-heading} {usage}

{all-args}{after-help}
"
)]
pub struct Cli {
  #[command(flatten)]
  pub args: CheckArgs,
}

impl Cli {
  /// Parse CLI arguments and return the Cli struct
  pub fn parse_args() -> Self {
    Self::parse()
  }
}

#[cfg(test)]
mod tests {
  use clap::CommandFactory;

  use super::*;

  #[test]
  fn test_cli_definition_is_valid() {
    Cli::command().debug_assert();
  }

  #[test]
  fn test_version_starts_with_package_version() {
    assert!(VERSION.starts_with(env!("CARGO_PKG_VERSION")));
  }
}
