//! # Content Transformer Module
//!
//! This module locates the existing header block of a file and replaces it
//! with a new one, leaving every other byte of the file as it was.
//!
//! A header block is found by scanning line prefixes:
//! - a *starter* line (a copyright or license comment) opens the block
//! - a *terminator* line (a package clause, package doc comment, build
//!   constraint, generated-code marker or compiler directive) ends the scan
//!
//! Everything from the first starter up to the first terminator, blank lines
//! and further comment blocks included, is one replaceable region. Stale or
//! duplicated headers are therefore replaced together.

use std::ops::Range;

use crate::error::LicenserError;

/// Line prefixes that end a header block. Scanning stops at the first one.
pub const TERMINATOR_PREFIXES: &[&str] = &[
  "package ",
  "// Package ",
  "// +build ",
  "// Code generated",
  "// code generated",
  "//go:",
];

/// Line prefixes that open a header block.
pub const STARTER_PREFIXES: &[&str] = &[
  "// Copyright",
  "// copyright",
  "// Licensed",
  "// licensed",
  "// ELASTICSEARCH CONFIDENTIAL",
];

/// Minimum length of a replacement header, in bytes.
pub const MIN_HEADER_LEN: usize = 2;

/// Header blocks are followed by exactly one blank line.
const HEADER_SEPARATOR: &[u8] = b"\n\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
  Terminator,
  Starter,
  Other,
}

/// Classifies a line (without its terminator) by prefix. Terminators win.
fn classify(line: &[u8]) -> LineKind {
  let has_prefix = |prefixes: &[&str]| prefixes.iter().any(|p| line.starts_with(p.as_bytes()));

  if has_prefix(TERMINATOR_PREFIXES) {
    LineKind::Terminator
  } else if has_prefix(STARTER_PREFIXES) {
    LineKind::Starter
  } else {
    LineKind::Other
  }
}

/// Strips `\n` and a preceding `\r` from a line.
fn line_text(line: &[u8]) -> &[u8] {
  let line = line.strip_suffix(b"\n").unwrap_or(line);
  line.strip_suffix(b"\r").unwrap_or(line)
}

/// Locates the existing header block of `content`.
///
/// Returns the byte range of the block, line terminators included. The range
/// is empty (`0..0`) when no starter line appears before the first
/// terminator.
pub fn locate_header_region(content: &[u8]) -> Range<usize> {
  let mut start = None;
  let mut offset = 0;

  for line in content.split_inclusive(|&b| b == b'\n') {
    match classify(line_text(line)) {
      LineKind::Terminator => break,
      LineKind::Starter if start.is_none() => start = Some(offset),
      _ => {}
    }
    offset += line.len();
  }

  match start {
    Some(start) => start..offset,
    None => 0..0,
  }
}

/// Returns the bytes of the existing header block of `content`.
pub fn header_region(content: &[u8]) -> &[u8] {
  &content[locate_header_region(content)]
}

/// Pads `header` with newlines until it ends with a blank line.
fn pad_header(header: &[u8]) -> Vec<u8> {
  let mut padded = Vec::with_capacity(header.len() + HEADER_SEPARATOR.len());
  padded.extend_from_slice(header);
  while !padded.ends_with(HEADER_SEPARATOR) {
    padded.push(b'\n');
  }
  padded
}

/// Finds the first occurrence of `needle` in `haystack`.
fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
  if needle.is_empty() {
    return Some(0);
  }
  haystack.windows(needle.len()).position(|window| window == needle)
}

/// Replaces the header block of file contents with a fixed header.
///
/// The replacement header is validated and padded once, then applied to as
/// many files as needed.
pub struct ContentTransformer {
  /// Replacement header, ending in a blank line
  header: Vec<u8>,
}

impl ContentTransformer {
  /// Creates a transformer that writes `header`.
  ///
  /// # Errors
  ///
  /// Returns [`LicenserError::HeaderTooShort`] when `header` is shorter than
  /// [`MIN_HEADER_LEN`] bytes.
  pub fn new(header: &[u8]) -> Result<Self, LicenserError> {
    if header.len() < MIN_HEADER_LEN {
      return Err(LicenserError::HeaderTooShort);
    }
    Ok(Self {
      header: pad_header(header),
    })
  }

  /// The padded header this transformer writes.
  pub fn header(&self) -> &[u8] {
    &self.header
  }

  /// Rewrites `original` with this transformer's header.
  ///
  /// The first occurrence of the old header block's bytes is replaced. When
  /// there is no old block the header is prepended. Bytes outside the block
  /// are copied unchanged.
  pub fn rewrite(&self, original: &[u8]) -> Vec<u8> {
    let region = locate_header_region(original);
    let old = &original[region.clone()];
    let at = find_subslice(original, old).unwrap_or(region.start);

    let mut rewritten = Vec::with_capacity(original.len() - old.len() + self.header.len());
    rewritten.extend_from_slice(&original[..at]);
    rewritten.extend_from_slice(&self.header);
    rewritten.extend_from_slice(&original[at + old.len()..]);
    rewritten
  }
}

/// Rewrites `original` so that it starts with `header`.
///
/// # Errors
///
/// Returns [`LicenserError::HeaderTooShort`] when `header` is shorter than
/// [`MIN_HEADER_LEN`] bytes.
pub fn rewrite_with_header(original: &[u8], header: &[u8]) -> Result<Vec<u8>, LicenserError> {
  Ok(ContentTransformer::new(header)?.rewrite(original))
}
