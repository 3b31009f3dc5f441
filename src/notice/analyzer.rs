//! # License Analyzer
//!
//! Classifies the license of a downloaded dependency from the license file
//! at the root of its module directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, trace};

/// Error reported when a module directory has no license file.
pub const NO_LICENSE_FILE: &str = "no license file was found";

/// Error reported when a license file matches none of the known licenses.
pub const LICENSE_NOT_RECOGNIZED: &str = "license not recognized";

/// File name prefixes, compared case-insensitively, that mark a license file.
const LICENSE_FILE_PREFIXES: &[&str] = &["license", "licence", "copying"];

/// Result of analysing one dependency directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisResult {
  /// The analysed path, as passed in
  pub arg: String,
  /// Detected license identifiers, best match first
  pub matches: Vec<String>,
  /// Why nothing matched, when `matches` is empty
  pub error: Option<String>,
}

impl AnalysisResult {
  pub fn matched(arg: impl Into<String>, license: impl Into<String>) -> Self {
    Self {
      arg: arg.into(),
      matches: vec![license.into()],
      error: None,
    }
  }

  pub fn failed(arg: impl Into<String>, error: impl Into<String>) -> Self {
    Self {
      arg: arg.into(),
      matches: vec![],
      error: Some(error.into()),
    }
  }
}

/// Trait for license analyzers.
///
/// Implementations return one result per path, in the same order.
pub trait LicenseAnalyzer: Send + Sync {
  fn analyse(&self, paths: &[PathBuf]) -> Vec<AnalysisResult>;
}

/// Ordered keyword rules. More specific licenses come before the ones whose
/// text they contain.
static LICENSE_RULES: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
  [
    ("AGPL-3.0", r"(?i)GNU AFFERO GENERAL PUBLIC LICENSE Version 3"),
    ("LGPL-3.0", r"(?i)GNU LESSER GENERAL PUBLIC LICENSE Version 3"),
    ("GPL-3.0", r"(?i)GNU GENERAL PUBLIC LICENSE Version 3"),
    ("Apache-2.0", r"(?i)Apache License,? Version 2\.0"),
    ("MPL-2.0", r"(?i)Mozilla Public License,? (?:Version|v\.) ?2\.0"),
    ("BSD-3-Clause", r"(?i)Redistribution and use in source and binary forms.*Neither the name"),
    ("BSD-2-Clause", r"(?i)Redistribution and use in source and binary forms"),
    ("MIT", r"(?i)Permission is hereby granted, free of charge"),
    (
      "ISC",
      r"(?i)Permission to use, copy, modify, and(?:/or)? distribute this software for any purpose",
    ),
    (
      "Unlicense",
      r"(?i)This is free and unencumbered software released into the public domain",
    ),
  ]
  .into_iter()
  .map(|(id, pattern)| (id, Regex::new(pattern).expect("license rule must compile")))
  .collect()
});

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("whitespace regex must compile"));

/// Classifies license text, returning the SPDX identifier of the first rule
/// that matches.
pub fn classify_license_text(text: &str) -> Option<&'static str> {
  let normalized = WHITESPACE.replace_all(text, " ");
  LICENSE_RULES
    .iter()
    .find(|(_, rule)| rule.is_match(&normalized))
    .map(|(id, _)| *id)
}

/// Analyzer that reads `LICENSE*`, `LICENCE*` or `COPYING*` files.
#[derive(Debug, Default, Clone, Copy)]
pub struct LicenseFileAnalyzer;

impl LicenseFileAnalyzer {
  /// Finds the license files directly inside `dir`, sorted by name.
  fn license_files(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
      return vec![];
    };

    let mut files: Vec<PathBuf> = entries
      .filter_map(Result::ok)
      .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
      .filter(|entry| {
        let name = entry.file_name().to_string_lossy().to_lowercase();
        LICENSE_FILE_PREFIXES.iter().any(|prefix| name.starts_with(prefix))
      })
      .map(|entry| entry.path())
      .collect();
    files.sort();
    files
  }

  fn analyse_one(path: &Path) -> AnalysisResult {
    let arg = path.to_string_lossy().into_owned();
    let files = Self::license_files(path);
    if files.is_empty() {
      debug!("No license file in {}", path.display());
      return AnalysisResult::failed(arg, NO_LICENSE_FILE);
    }

    for file in &files {
      let Ok(text) = fs::read_to_string(file) else {
        trace!("Skipping unreadable license file {}", file.display());
        continue;
      };
      if let Some(id) = classify_license_text(&text) {
        trace!("{} looks like {}", file.display(), id);
        return AnalysisResult::matched(arg, id);
      }
    }

    AnalysisResult::failed(arg, LICENSE_NOT_RECOGNIZED)
  }
}

impl LicenseAnalyzer for LicenseFileAnalyzer {
  fn analyse(&self, paths: &[PathBuf]) -> Vec<AnalysisResult> {
    paths.iter().map(|path| Self::analyse_one(path)).collect()
  }
}
