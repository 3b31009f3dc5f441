//! # Check Command
//!
//! This module implements the header check/rewrite run and the optional
//! notice generation that follows it.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use tracing::debug;

use crate::config::{Config, ConfigError, load_config, validate_extension};
use crate::error::LicenserError;
use crate::info_log;
use crate::logging::{ColorMode, init_tracing, set_quiet, set_verbose};
use crate::notice::{LicenseFileAnalyzer, NoticeOptions, run_notice};
use crate::output::{print_license_list, print_summary};
use crate::processor::{DEFAULT_EXTENSION, Processor, ProcessorConfig};
use crate::templates::{DEFAULT_LICENSE, DEFAULT_LICENSOR, HeaderRegistry};

/// Path scanned when none is given.
const DEFAULT_PATH: &str = ".";

/// Arguments for the check command
#[derive(Args, Debug, Default)]
pub struct CheckArgs {
  /// Directory (or file) to walk recursively
  #[arg(value_name = "PATH")]
  pub path: Option<PathBuf>,

  /// Skip rewriting files and exit with 1 if any discrepancies are found
  #[arg(short = 'd', long = "dry")]
  pub dry: bool,

  /// Path to exclude (repeatable); trailing `/` and `*` are ignored
  #[arg(long, value_name = "PATH")]
  pub exclude: Vec<String>,

  /// File extension to scan for [default: .go]
  #[arg(long, value_name = "EXT")]
  pub ext: Option<String>,

  /// License type to check, see --list-licenses [default: ASL2]
  #[arg(long)]
  pub license: Option<String>,

  /// Name of the licensor [default: Elasticsearch B.V.]
  #[arg(long)]
  pub licensor: Option<String>,

  /// Generate a NOTICE file in PATH (printed instead with -d)
  #[arg(long)]
  pub notice: bool,

  /// Start year of the project, reflected in the notice
  #[arg(long, value_name = "YEAR")]
  pub notice_year: Option<String>,

  /// File where to write the notice [default: NOTICE]
  #[arg(long, value_name = "FILE")]
  pub notice_file: Option<String>,

  /// Notice header template; supports {{project}}, {{project_years}} and
  /// {{licensor}}
  #[arg(long, value_name = "TEMPLATE")]
  pub notice_header: Option<String>,

  /// Project name at the top of the notice (defaults to the folder name)
  #[arg(long, value_name = "NAME")]
  pub notice_project_name: Option<String>,

  /// Path to config file (default: .licenser.toml in PATH)
  #[arg(long, value_name = "FILE")]
  pub config: Option<PathBuf>,

  /// Ignore config file even if present
  #[arg(long)]
  pub no_config: bool,

  /// Print the known license types and exit
  #[arg(long)]
  pub list_licenses: bool,

  /// Increase verbosity (-v info, -vv debug, -vvv trace)
  #[arg(short, long, action = clap::ArgAction::Count)]
  pub verbose: u8,

  /// Suppress all output except errors and the report
  #[arg(short, long, conflicts_with = "verbose")]
  pub quiet: bool,

  /// Control when to use colored output (auto, never, always)
  #[arg(
    long,
    value_name = "WHEN",
    num_args = 0..=1,
    default_value_t = ColorMode::Auto,
    default_missing_value = "always",
    value_enum
  )]
  pub colors: ColorMode,
}

/// Effective settings after merging flags, config file and defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
  pub root: PathBuf,
  pub license: String,
  pub licensor: String,
  pub ext: String,
  /// Command-line exclusions followed by configured ones
  pub exclude: Vec<String>,
  pub dry_run: bool,
  pub notice: bool,
  pub notice_file: Option<String>,
  pub notice_year: Option<String>,
  pub notice_header: Option<String>,
  pub notice_project: Option<String>,
}

impl Settings {
  /// Merges `args` over `config` over the built-in defaults.
  ///
  /// # Errors
  ///
  /// Returns [`ConfigError::InvalidExtension`] for a malformed extension,
  /// whichever source it came from.
  pub fn resolve(args: &CheckArgs, config: Option<&Config>) -> Result<Self, ConfigError> {
    let config = config.cloned().unwrap_or_default();
    let pick = |flag: &Option<String>, configured: Option<String>, default: &str| {
      flag.clone().or(configured).unwrap_or_else(|| default.to_string())
    };

    let ext = pick(&args.ext, config.ext, DEFAULT_EXTENSION);
    validate_extension(&ext)?;

    let mut exclude = args.exclude.clone();
    exclude.extend(config.exclude);

    Ok(Self {
      root: args.path.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_PATH)),
      license: pick(&args.license, config.license, DEFAULT_LICENSE),
      licensor: pick(&args.licensor, config.licensor, DEFAULT_LICENSOR),
      ext,
      exclude,
      dry_run: args.dry,
      notice: args.notice,
      notice_file: args.notice_file.clone().or(config.notice.file),
      notice_year: args.notice_year.clone().or(config.notice.year),
      notice_header: args.notice_header.clone().or(config.notice.header),
      notice_project: args.notice_project_name.clone().or(config.notice.project),
    })
  }

  fn notice_options(&self) -> NoticeOptions {
    let mut options = NoticeOptions::new(self.licensor.clone());
    if let Some(file) = &self.notice_file {
      options.file = file.clone();
    }
    options.project = self.notice_project.clone();
    options.year = self.notice_year.clone();
    options.header = self.notice_header.clone();
    options
  }
}

fn config_root(args: &CheckArgs) -> &Path {
  args.path.as_deref().unwrap_or_else(|| Path::new(DEFAULT_PATH))
}

/// Run the check command with the given arguments.
///
/// Missing-header lines and the dry-run notice go to `out`.
///
/// # Errors
///
/// Any failure, as a [`LicenserError`] or [`ConfigError`] inside the
/// [`anyhow::Error`], so the caller can pick the exit code. A dry run that
/// found nonconforming files fails with
/// [`LicenserError::VerificationMismatch`].
pub fn run_check(args: CheckArgs, out: &mut dyn Write) -> Result<()> {
  args.colors.apply();
  init_tracing(args.quiet, args.verbose, args.colors);

  if args.verbose > 0 {
    set_verbose();
  } else if args.quiet {
    set_quiet();
  }

  let config = load_config(args.config.as_deref(), config_root(&args), args.no_config)
    .context("Failed to load configuration")?;

  let mut registry = HeaderRegistry::builtin();
  if let Some(config) = &config {
    config.apply_headers(&mut registry);
  }

  if args.list_licenses {
    print_license_list(&registry, DEFAULT_LICENSE, out).context("Failed to print licenses")?;
    return Ok(());
  }

  let settings = Settings::resolve(&args, config.as_ref()).context("Invalid settings")?;
  debug!("Resolved settings: {:?}", settings);

  let header = registry.get(&settings.license)?.render(&settings.licensor);
  let processor = Processor::new(ProcessorConfig {
    exclude: settings.exclude.clone(),
    ext: settings.ext.clone(),
    dry_run: settings.dry_run,
    max_line_len: registry.max_header_len(),
    ..ProcessorConfig::new(header)
  })?;

  let walk_error = match processor.run(&settings.root, out) {
    Ok(run) => {
      print_summary(&run.summary);
      run.error
    }
    Err(err @ LicenserError::TreeStatFailed { .. }) => return Err(err.into()),
    Err(err) => Some(err),
  };

  if settings.notice {
    let notice = run_notice(
      &settings.root,
      &settings.notice_options(),
      &LicenseFileAnalyzer,
      settings.dry_run,
      out,
    )?;
    info_log!("Notice lists {} dependencies", notice.dependencies.len());
  }

  match walk_error {
    Some(err) => Err(err.into()),
    None => Ok(()),
  }
}

#[cfg(test)]
mod tests {
  use clap::Parser;

  use super::*;

  #[derive(Parser)]
  struct TestCli {
    #[command(flatten)]
    args: CheckArgs,
  }

  fn parse(argv: &[&str]) -> CheckArgs {
    TestCli::parse_from(std::iter::once("licenser").chain(argv.iter().copied())).args
  }

  #[test]
  fn test_defaults() {
    let settings = Settings::resolve(&parse(&[]), None).unwrap();
    assert_eq!(settings.root, PathBuf::from("."));
    assert_eq!(settings.license, "ASL2");
    assert_eq!(settings.licensor, "Elasticsearch B.V.");
    assert_eq!(settings.ext, ".go");
    assert!(settings.exclude.is_empty());
    assert!(!settings.dry_run);
    assert_eq!(settings.notice_options().file, "NOTICE");
  }

  #[test]
  fn test_flags_override_config() {
    let config: Config = toml::from_str(concat!(
      "license = \"Elastic\"\n",
      "licensor = \"Config Corp\"\n",
      "exclude = [\"testdata\"]\n",
      "[notice]\n",
      "file = \"NOTICE.txt\"\n",
      "project = \"configured\"\n",
    ))
    .unwrap();

    let args = parse(&["-d", "--licensor", "Flag Corp", "--exclude", "x-pack", "src"]);
    let settings = Settings::resolve(&args, Some(&config)).unwrap();

    assert_eq!(settings.root, PathBuf::from("src"));
    assert_eq!(settings.license, "Elastic");
    assert_eq!(settings.licensor, "Flag Corp");
    assert_eq!(settings.exclude, vec!["x-pack", "testdata"]);
    assert!(settings.dry_run);

    let options = settings.notice_options();
    assert_eq!(options.file, "NOTICE.txt");
    assert_eq!(options.project.as_deref(), Some("configured"));
    assert_eq!(options.licensor, "Flag Corp");
  }

  #[test]
  fn test_bad_extension_flag() {
    let err = Settings::resolve(&parse(&["--ext", "go"]), None).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidExtension { .. }));
  }

  #[test]
  fn test_repeatable_flags() {
    let args = parse(&["--exclude", "a", "--exclude", "b/*", "-vv"]);
    assert_eq!(args.exclude, vec!["a", "b/*"]);
    assert_eq!(args.verbose, 2);
  }
}
