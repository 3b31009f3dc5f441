//! # go.mod Reader
//!
//! A small reader for Go module manifests. Only the `module` line and the
//! requirements are kept; the other directives are recognized and skipped.

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use super::NoticeError;

/// Directives that are understood but carry nothing the notice needs.
const IGNORED_DIRECTIVES: &[&str] = &["go", "toolchain", "godebug", "replace", "exclude", "retract"];

static UPPERCASE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Z]+").expect("uppercase regex must compile"));

/// A parsed `go.mod` manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoMod {
  /// Module path from the `module` directive
  pub module: Option<String>,
  /// Required module paths mapped to their versions
  pub require: BTreeMap<String, String>,
}

impl GoMod {
  /// Local directories of every requirement inside `module_cache`, sorted.
  ///
  /// # Errors
  ///
  /// Returns [`NoticeError::NoDependencies`] when nothing is required.
  pub fn module_paths(&self, module_cache: &Path) -> Result<Vec<PathBuf>, NoticeError> {
    if self.require.is_empty() {
      return Err(NoticeError::NoDependencies);
    }

    let mut paths: Vec<PathBuf> = self
      .require
      .iter()
      .map(|(module, version)| {
        let mut path = module_cache.to_path_buf();
        path.extend(escape_module_path(module).split('/'));
        let mut path = path.into_os_string();
        path.push(format!("@{version}"));
        PathBuf::from(path)
      })
      .collect();
    paths.sort();
    Ok(paths)
  }
}

/// Escapes a module path for the module cache: every run of uppercase
/// letters becomes `!` followed by the lowercased run.
pub fn escape_module_path(module: &str) -> String {
  UPPERCASE_RUN
    .replace_all(module, |caps: &regex::Captures<'_>| format!("!{}", caps[0].to_lowercase()))
    .into_owned()
}

/// Directory where downloaded modules live: `$GOPATH/pkg/mod`.
///
/// The first `GOPATH` entry is used; without one it falls back to `$HOME/go`.
pub fn module_cache_dir() -> PathBuf {
  let gopath = env::var_os("GOPATH")
    .and_then(|value| env::split_paths(&value).find(|p| !p.as_os_str().is_empty()))
    .or_else(|| env::var_os("HOME").map(|home| PathBuf::from(home).join("go")))
    .unwrap_or_else(|| PathBuf::from("go"));
  gopath.join("pkg").join("mod")
}

/// Reads and parses the manifest at `path`.
pub fn read_go_mod(path: &Path) -> Result<GoMod, NoticeError> {
  let contents = fs::read_to_string(path).map_err(|source| NoticeError::ReadModFile {
    path: path.to_path_buf(),
    source,
  })?;
  parse_go_mod(path, &contents)
}

fn unquote(s: &str) -> &str {
  s.strip_prefix('"').and_then(|rest| rest.strip_suffix('"')).unwrap_or(s)
}

/// Parses manifest `contents`; `path` is only used in error messages.
pub fn parse_go_mod(path: &Path, contents: &str) -> Result<GoMod, NoticeError> {
  let parse_error = |line: usize, message: String| NoticeError::ParseModFile {
    path: path.to_path_buf(),
    line,
    message,
  };

  let mut go_mod = GoMod::default();
  let mut block: Option<(&str, usize)> = None;
  let mut last_line = 0;

  for (idx, raw) in contents.lines().enumerate() {
    let line_no = idx + 1;
    last_line = line_no;
    let line = raw.split_once("//").map_or(raw, |(code, _)| code).trim();
    if line.is_empty() {
      continue;
    }

    let (directive, rest) = match block {
      Some(_) if line == ")" => {
        block = None;
        continue;
      }
      Some((directive, _)) => (directive, line),
      None => {
        let (directive, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        if rest == "(" {
          block = Some((directive, line_no));
          continue;
        }
        (directive, rest)
      }
    };

    match directive {
      "module" => go_mod.module = Some(unquote(rest).to_string()),
      "require" => {
        let fields: Vec<&str> = rest.split_whitespace().collect();
        let [module, version] = fields.as_slice() else {
          return Err(parse_error(line_no, "usage: require module/path v1.2.3".to_string()));
        };
        go_mod
          .require
          .insert(unquote(module).to_string(), unquote(version).to_string());
      }
      d if IGNORED_DIRECTIVES.contains(&d) => {}
      unknown => return Err(parse_error(line_no, format!("unknown directive: {unknown}"))),
    }
  }

  if let Some((directive, opened_at)) = block {
    return Err(parse_error(
      last_line.max(opened_at),
      format!("unterminated {directive} block"),
    ));
  }

  Ok(go_mod)
}
