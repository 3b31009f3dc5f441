//! # Notice Module
//!
//! Generates a NOTICE file listing a Go project's third-party dependencies
//! and their licenses.
//!
//! - [`gomod`] - Reads the `go.mod` manifest and locates downloaded modules
//! - [`analyzer`] - Detects the license of each downloaded module
//!
//! [`generate_notice`] builds the [`Notice`] and renders it; [`run_notice`]
//! is the driver used by the CLI, which also works out the project's start
//! year and where the output goes.

pub mod analyzer;
pub mod gomod;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

pub use analyzer::{AnalysisResult, LicenseAnalyzer, LicenseFileAnalyzer};
use chrono::{DateTime, Datelike, Local};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::LicenserError;

/// Default NOTICE header.
pub const DEFAULT_NOTICE_HEADER: &str = "{{project}}
Copyright {{project_years}} {{licensor}}

This product includes software developed at {{licensor}} and
third-party software developed by the licenses listed below.
";

/// Default name of the generated file.
pub const DEFAULT_NOTICE_FILE: &str = "NOTICE";

/// Separator line around the dependency table.
const NOTICE_RULE: &str = "=========================================================================";

/// Minimum gap between the name and license columns.
const COLUMN_PADDING: usize = 4;

/// Errors produced while generating a notice.
#[derive(Debug, thiserror::Error)]
pub enum NoticeError {
  /// Every problem found in the parameters, in declaration order.
  #[error("{}", .0.join("; "))]
  InvalidParams(Vec<String>),

  #[error("failed to read {}: {source}", .path.display())]
  ReadModFile { path: PathBuf, source: io::Error },

  #[error("{}:{line}: {message}", .path.display())]
  ParseModFile { path: PathBuf, line: usize, message: String },

  #[error("modfile has no dependencies to generate notice")]
  NoDependencies,

  #[error("invalid notice year: {0}")]
  InvalidYear(String),

  #[error("failed to discover the project start year: {0}")]
  StartYear(#[source] walkdir::Error),

  #[error("failed to write the notice: {0}")]
  Write(#[source] io::Error),
}

/// A generated notice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Notice {
  /// Owner of the source code
  pub licensor: String,
  pub project: String,
  /// `start-current`, or just `current` for a single-year project
  pub project_years: String,
  /// Dependencies, sorted by license
  pub dependencies: Vec<Dependency>,
  /// The dependency table with aligned columns; only filled when the notice
  /// is written out
  pub dependency_blob: String,
}

/// A dependency and its license.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
  pub name: String,
  pub license: String,
}

impl Dependency {
  pub fn new(name: impl Into<String>, license: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      license: license.into(),
    }
  }
}

/// Parameters for [`generate_notice`].
pub struct GenerateNoticeParams<'a> {
  /// Location of the `go.mod` file; empty means missing
  pub go_mod_file: PathBuf,
  pub licensor: String,
  pub project: String,
  /// Year the project started; `0` means this year
  pub start_year: i32,
  /// Overrides [`DEFAULT_NOTICE_HEADER`]
  pub notice_header: Option<String>,
  pub analyzer: Option<&'a dyn LicenseAnalyzer>,
  /// Directory holding downloaded modules, see [`gomod::module_cache_dir`]
  pub module_cache: PathBuf,
  /// Overrides the current year, for reproducible output
  pub current_year: Option<i32>,
}

impl<'a> GenerateNoticeParams<'a> {
  /// Creates parameters with the module cache taken from the environment.
  pub fn new(go_mod_file: impl Into<PathBuf>, project: impl Into<String>, analyzer: &'a dyn LicenseAnalyzer) -> Self {
    Self {
      go_mod_file: go_mod_file.into(),
      licensor: String::new(),
      project: project.into(),
      start_year: 0,
      notice_header: None,
      analyzer: Some(analyzer),
      module_cache: gomod::module_cache_dir(),
      current_year: None,
    }
  }

  /// Checks that the parameters are usable, reporting every problem at once.
  pub fn validate(&self) -> Result<(), NoticeError> {
    let mut problems = Vec::new();
    if self.go_mod_file.as_os_str().is_empty() {
      problems.push("notice: missing file path".to_string());
    }
    if self.analyzer.is_none() {
      problems.push("notice: missing license analyzer".to_string());
    }
    if self.project.is_empty() {
      problems.push("notice: missing project name".to_string());
    }

    if problems.is_empty() {
      Ok(())
    } else {
      Err(NoticeError::InvalidParams(problems))
    }
  }

  fn header(&self) -> &str {
    self.notice_header.as_deref().unwrap_or(DEFAULT_NOTICE_HEADER)
  }
}

/// Years the project has been running.
pub fn project_years(start_year: i32, current_year: i32) -> String {
  if start_year == current_year || start_year == 0 {
    current_year.to_string()
  } else {
    format!("{start_year}-{current_year}")
  }
}

/// Builds the dependency-less part of a notice.
pub fn build_notice(params: &GenerateNoticeParams<'_>) -> Notice {
  let current_year = params.current_year.unwrap_or_else(|| Local::now().year());
  Notice {
    licensor: params.licensor.clone(),
    project: params.project.clone(),
    project_years: project_years(params.start_year, current_year),
    ..Notice::default()
  }
}

/// Generates the notice for the manifest in `params`.
///
/// When `writer` is given the rendered notice is written to it and
/// [`Notice::dependency_blob`] is filled.
///
/// # Errors
///
/// - [`NoticeError::InvalidParams`] listing every missing parameter
/// - [`NoticeError::ReadModFile`] / [`NoticeError::ParseModFile`] for an
///   unreadable or malformed manifest
/// - [`NoticeError::NoDependencies`] when nothing is required
/// - [`NoticeError::Write`] when the writer fails
pub fn generate_notice(
  params: &GenerateNoticeParams<'_>,
  writer: Option<&mut dyn Write>,
) -> Result<Notice, NoticeError> {
  params.validate()?;
  let Some(analyzer) = params.analyzer else {
    return Err(NoticeError::InvalidParams(vec![
      "notice: missing license analyzer".to_string(),
    ]));
  };

  let mut notice = build_notice(params);
  let paths = gomod::read_go_mod(&params.go_mod_file)?.module_paths(&params.module_cache)?;
  debug!("Analysing {} dependencies", paths.len());
  notice.dependencies = get_licenses(analyzer, &paths, &params.module_cache);

  if let Some(writer) = writer {
    write_template(&mut notice, params.header(), writer)?;
  }
  Ok(notice)
}

/// Analyses `paths` and turns the results into dependencies sorted by
/// license, case-insensitively. The sort is stable.
///
/// Names lose the module cache prefix, the `@version` suffix and the `!`
/// escapes. A dependency without a detected license gets the analysis error
/// as its license.
pub fn get_licenses(analyzer: &dyn LicenseAnalyzer, paths: &[PathBuf], module_cache: &Path) -> Vec<Dependency> {
  let cache_prefix = format!("{}/", module_cache.to_string_lossy());

  let mut dependencies: Vec<Dependency> = analyzer
    .analyse(paths)
    .into_iter()
    .map(|result| {
      let mut name = result.arg.replace(&cache_prefix, "");
      if let Some(at) = name.find('@') {
        name.truncate(at);
      }

      let license = match result.matches.into_iter().next() {
        Some(license) => license,
        None => result
          .error
          .unwrap_or_default()
          .replacen('\n', "", 1)
          .replace(&cache_prefix, ""),
      };

      Dependency::new(name.replace('!', ""), license)
    })
    .collect();

  dependencies.sort_by_key(|dep| dep.license.to_lowercase());
  dependencies
}

/// Aligns dependencies into two columns: each name is padded to the widest
/// name plus [`COLUMN_PADDING`].
pub fn dependency_blob(dependencies: &[Dependency]) -> String {
  let width = dependencies
    .iter()
    .map(|dep| dep.name.chars().count())
    .max()
    .unwrap_or(0)
    + COLUMN_PADDING;

  dependencies
    .iter()
    .map(|dep| format!("{:<width$}{}\n", dep.name, dep.license))
    .collect()
}

/// Fills the notice placeholders in `header`.
fn render_header(header: &str, notice: &Notice) -> String {
  [
    ("{{project}}", notice.project.as_str()),
    ("{{project_years}}", notice.project_years.as_str()),
    ("{{licensor}}", notice.licensor.as_str()),
  ]
  .into_iter()
  .fold(header.to_string(), |acc, (placeholder, value)| acc.replace(placeholder, value))
}

/// Renders `notice` under `header` into `writer`, filling
/// [`Notice::dependency_blob`].
pub fn write_template(notice: &mut Notice, header: &str, writer: &mut dyn Write) -> Result<(), NoticeError> {
  notice.dependency_blob = dependency_blob(&notice.dependencies);
  let rendered = format!(
    "{}\n{NOTICE_RULE}\n\n{}\n{NOTICE_RULE}\n",
    render_header(header, notice),
    notice.dependency_blob
  );
  writer.write_all(rendered.as_bytes()).map_err(NoticeError::Write)
}

/// Options for [`run_notice`].
#[derive(Debug, Clone)]
pub struct NoticeOptions {
  /// File name, relative to the scanned root
  pub file: String,
  /// Project name; defaults to the base name of the scanned root
  pub project: Option<String>,
  /// Start year; discovered from file times when unset
  pub year: Option<String>,
  /// Header template; defaults to [`DEFAULT_NOTICE_HEADER`]
  pub header: Option<String>,
  pub licensor: String,
}

impl NoticeOptions {
  pub fn new(licensor: impl Into<String>) -> Self {
    Self {
      file: DEFAULT_NOTICE_FILE.to_string(),
      project: None,
      year: None,
      header: None,
      licensor: licensor.into(),
    }
  }
}

/// Year of the oldest modification time among the files under `root`.
///
/// Paths containing `.git` are skipped. With no files, the current year is
/// returned.
pub fn discover_start_year(root: &Path) -> Result<i32, NoticeError> {
  let mut oldest = SystemTime::now();
  for entry in WalkDir::new(root) {
    let entry = entry.map_err(NoticeError::StartYear)?;
    if entry.file_type().is_dir() || entry.path().to_string_lossy().contains(".git") {
      continue;
    }
    let modified = entry
      .metadata()
      .map_err(NoticeError::StartYear)?
      .modified()
      .unwrap_or(oldest);
    if modified < oldest {
      oldest = modified;
    }
  }
  Ok(DateTime::<Local>::from(oldest).year())
}

fn parse_year(year: &str) -> Result<i32, NoticeError> {
  year
    .trim()
    .parse::<i32>()
    .ok()
    .filter(|y| (0..=9999).contains(y))
    .ok_or_else(|| NoticeError::InvalidYear(year.to_string()))
}

/// Project name derived from the scanned root: the base name of its absolute
/// path.
pub fn default_project_name(root: &Path) -> String {
  let absolute = std::path::absolute(root).unwrap_or_else(|_| root.to_path_buf());
  absolute
    .components()
    .next_back()
    .map(|c| c.as_os_str().to_string_lossy().into_owned())
    .unwrap_or_default()
}

/// Generates the notice for the project at `root`.
///
/// In dry mode the notice is dumped to `out`; otherwise it replaces
/// `<root>/<file>`. Either way a status line goes to `out` first.
///
/// # Errors
///
/// - [`LicenserError::OpenFileFailed`] if the notice file can't be created
/// - [`LicenserError::NoticeFailed`] for everything else
pub fn run_notice(
  root: &Path,
  options: &NoticeOptions,
  analyzer: &dyn LicenseAnalyzer,
  dry_run: bool,
  out: &mut dyn Write,
) -> Result<Notice, LicenserError> {
  let start_year = match options.year.as_deref() {
    Some(year) if !year.is_empty() => parse_year(year)?,
    _ => discover_start_year(root)?,
  };

  let params = GenerateNoticeParams {
    licensor: options.licensor.clone(),
    start_year,
    notice_header: options.header.clone(),
    ..GenerateNoticeParams::new(
      root.join("go.mod"),
      options
        .project
        .clone()
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| default_project_name(root)),
      analyzer,
    )
  };

  if dry_run {
    out
      .write_all(b"Dumping NOTICE to output...\n\n")
      .map_err(LicenserError::OutputFailed)?;
    return Ok(generate_notice(&params, Some(out))?);
  }

  let path = root.join(&options.file);
  let file = File::create(&path).map_err(|source| LicenserError::OpenFileFailed {
    path: path.clone(),
    source,
  })?;
  out
    .write_all(b"Generating NOTICE file...\n\n")
    .map_err(LicenserError::OutputFailed)?;

  let mut writer = BufWriter::new(file);
  let notice = generate_notice(&params, Some(&mut writer))?;
  writer.flush().map_err(NoticeError::Write)?;
  info!(
    "Wrote {} with {} dependencies",
    path.display(),
    notice.dependencies.len()
  );
  Ok(notice)
}

#[cfg(test)]
mod tests {
  use std::fs;

  use tempfile::tempdir;

  use super::*;

  struct FixedAnalyzer(Vec<AnalysisResult>);

  impl LicenseAnalyzer for FixedAnalyzer {
    fn analyse(&self, _paths: &[PathBuf]) -> Vec<AnalysisResult> {
      self.0.clone()
    }
  }

  const TWO_DEPS: &str = "module github.com/elastic/go-licenser\n\nrequire (\n\tgithub.com/hashicorp/multierror-go v1.0.0\n\tgopkg.in/src-d/go-license-detector.v2 v2.0.1\n)\n";

  const FOO_COMPANY_OUT: &str = "somedeps
Copyright 2012-2019 FooCompany L.T.D.

This product includes software developed at FooCompany L.T.D. and
third-party software developed by the licenses listed below.

=========================================================================

gopkg.in/src-d/go-license-detector.v2    Apache-2.0
github.com/hashicorp/multierror-go       MPL-2.0

=========================================================================
";

  fn two_deps_analyzer() -> FixedAnalyzer {
    FixedAnalyzer(vec![
      AnalysisResult::matched("github.com/hashicorp/multierror-go", "MPL-2.0"),
      AnalysisResult::matched("gopkg.in/src-d/go-license-detector.v2", "Apache-2.0"),
    ])
  }

  #[test]
  fn test_generate_notice_with_writer() {
    let dir = tempdir().unwrap();
    let go_mod = dir.path().join("twodeps.mod");
    fs::write(&go_mod, TWO_DEPS).unwrap();
    let analyzer = two_deps_analyzer();

    let params = GenerateNoticeParams {
      licensor: "FooCompany L.T.D.".to_string(),
      start_year: 2012,
      current_year: Some(2019),
      ..GenerateNoticeParams::new(&go_mod, "somedeps", &analyzer)
    };
    let mut out = Vec::new();
    let notice = generate_notice(&params, Some(&mut out)).unwrap();

    assert_eq!(String::from_utf8(out).unwrap(), FOO_COMPANY_OUT);
    assert_eq!(notice.project_years, "2012-2019");
    assert_eq!(
      notice.dependencies,
      vec![
        Dependency::new("gopkg.in/src-d/go-license-detector.v2", "Apache-2.0"),
        Dependency::new("github.com/hashicorp/multierror-go", "MPL-2.0"),
      ]
    );
    assert_eq!(
      notice.dependency_blob,
      "gopkg.in/src-d/go-license-detector.v2    Apache-2.0\ngithub.com/hashicorp/multierror-go       MPL-2.0\n"
    );
  }

  #[test]
  fn test_generate_notice_without_writer_skips_blob() {
    let dir = tempdir().unwrap();
    let go_mod = dir.path().join("go.mod");
    fs::write(&go_mod, TWO_DEPS).unwrap();
    let analyzer = FixedAnalyzer(vec![
      AnalysisResult::failed("github.com/hashicorp/multierror-go", "no license file was found"),
      AnalysisResult::matched("gopkg.in/src-d/go-license-detector.v2", "Apache-2.0"),
    ]);

    let params = GenerateNoticeParams {
      current_year: Some(2019),
      ..GenerateNoticeParams::new(&go_mod, "somedeps", &analyzer)
    };
    let notice = generate_notice(&params, None).unwrap();

    assert_eq!(notice.project_years, "2019");
    assert!(notice.dependency_blob.is_empty());
    assert_eq!(
      notice.dependencies,
      vec![
        Dependency::new("gopkg.in/src-d/go-license-detector.v2", "Apache-2.0"),
        Dependency::new("github.com/hashicorp/multierror-go", "no license file was found"),
      ]
    );
  }

  #[test]
  fn test_invalid_params_lists_every_problem() {
    let params = GenerateNoticeParams {
      go_mod_file: PathBuf::new(),
      licensor: String::new(),
      project: String::new(),
      start_year: 0,
      notice_header: None,
      analyzer: None,
      module_cache: PathBuf::from("/gopath/pkg/mod"),
      current_year: None,
    };
    let err = generate_notice(&params, None).unwrap_err();
    let NoticeError::InvalidParams(problems) = err else {
      panic!("expected invalid params, got {err}");
    };
    assert_eq!(
      problems,
      vec![
        "notice: missing file path",
        "notice: missing license analyzer",
        "notice: missing project name",
      ]
    );
  }

  #[test]
  fn test_malformed_and_empty_manifests() {
    let dir = tempdir().unwrap();
    let analyzer = FixedAnalyzer(vec![]);

    let source = dir.path().join("notice.rs");
    fs::write(&source, "use std::fs;\n").unwrap();
    let err = generate_notice(&GenerateNoticeParams::new(&source, "some", &analyzer), None).unwrap_err();
    assert!(matches!(err, NoticeError::ParseModFile { line: 1, .. }));

    let nodeps = dir.path().join("nodeps.mod");
    fs::write(&nodeps, "module nodeps\n").unwrap();
    let err = generate_notice(&GenerateNoticeParams::new(&nodeps, "nodeps", &analyzer), None).unwrap_err();
    assert_eq!(err.to_string(), "modfile has no dependencies to generate notice");
  }

  #[test]
  fn test_get_licenses_cleans_names() {
    let cache = Path::new("/gopath/pkg/mod");
    let analyzer = FixedAnalyzer(vec![
      AnalysisResult::matched("/gopath/pkg/mod/github.com/!burnt!sushi/toml@v0.3.1", "MIT"),
      AnalysisResult::failed(
        "/gopath/pkg/mod/github.com/x/y@v1.0.0",
        "/gopath/pkg/mod/github.com/x/y@v1.0.0: no license file was found\n",
      ),
      AnalysisResult::matched("github.com/a/b@v2.0.0", "apache-2.0"),
    ]);

    let deps = get_licenses(&analyzer, &[], cache);
    assert_eq!(
      deps,
      vec![
        Dependency::new("github.com/a/b", "apache-2.0"),
        Dependency::new("github.com/x/y", "github.com/x/y@v1.0.0: no license file was found"),
        Dependency::new("github.com/burntsushi/toml", "MIT"),
      ]
    );
  }

  #[test]
  fn test_project_years() {
    assert_eq!(project_years(2012, 2019), "2012-2019");
    assert_eq!(project_years(2019, 2019), "2019");
    assert_eq!(project_years(0, 2019), "2019");
  }

  #[test]
  fn test_empty_blob() {
    assert_eq!(dependency_blob(&[]), "");
  }

  #[test]
  fn test_parse_year() {
    assert_eq!(parse_year("2019").unwrap(), 2019);
    assert!(matches!(parse_year("twenty"), Err(NoticeError::InvalidYear(_))));
  }

  #[test]
  fn test_default_project_name() {
    let dir = tempdir().unwrap();
    let project = dir.path().join("myproject");
    fs::create_dir(&project).unwrap();
    assert_eq!(default_project_name(&project), "myproject");
  }
}
