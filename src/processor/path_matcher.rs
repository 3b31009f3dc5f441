//! # Path Matcher Module
//!
//! This module decides whether a tree-relative path is excluded from
//! processing, and provides the small string helpers used to normalize paths
//! and patterns before they are compared.
//!
//! Decisions depend only on the path string, never on file content.

use std::path::MAIN_SEPARATOR_STR;

/// Wildcard marker accepted at the end of an exclusion pattern.
pub const WILDCARD: &str = "*";

/// Suffixes stripped from exclusion patterns before matching.
const PATTERN_SUFFIXES: &[&str] = &[WILDCARD, "/", MAIN_SEPARATOR_STR];

/// Checks whether `path` is excluded by any of `exclude`.
///
/// Each pattern has its trailing separators and wildcards removed with
/// [`clean_suffixes`]. The path is excluded when it equals a cleaned pattern,
/// continues it with a separator, or has it as a literal prefix. So `apath`,
/// `apath/sub`, `apath/sub/` and `apath/sub/*` all exclude
/// `apath/sub/file.go`.
///
/// An empty pattern list never excludes anything.
pub fn needs_exclusion(path: &str, exclude: &[String]) -> bool {
  exclude.iter().any(|pattern| {
    let pattern = clean_suffixes(pattern, PATTERN_SUFFIXES);
    path.starts_with(pattern)
  })
}

/// Repeatedly strips any of `suffixes` from the end of `s` until none match.
///
/// Mixed runs are handled, so `"a/b////***"` with `["*", "/"]` becomes
/// `"a/b"`. Empty suffixes are ignored. The result is a subslice of `s`.
pub fn clean_suffixes<'a>(s: &'a str, suffixes: &[&str]) -> &'a str {
  let mut cleaned = s;
  loop {
    let before = cleaned.len();
    for suffix in suffixes.iter().filter(|suffix| !suffix.is_empty()) {
      while let Some(rest) = cleaned.strip_suffix(suffix) {
        cleaned = rest;
      }
    }
    if cleaned.len() == before {
      return cleaned;
    }
  }
}

/// Strips the first of `prefixes` that `s` starts with, at most once.
///
/// Used to turn a walked path into a tree-relative one, e.g. dropping the
/// leading separator left over after the root is removed.
pub fn clean_prefixes<'a>(s: &'a str, prefixes: &[&str]) -> &'a str {
  prefixes
    .iter()
    .filter(|prefix| !prefix.is_empty())
    .find_map(|prefix| s.strip_prefix(prefix))
    .unwrap_or(s)
}
