//! # License Detection Module
//!
//! This module contains the interfaces and implementations for license
//! detection. It allows for replacing the detection algorithm without
//! modifying the processor.
//!
//! Detection never modifies the file: it only reads lines from a stream.

use std::io::{self, BufRead, Read as _};

/// Upper bound on line length for scans that aren't tied to a header size.
pub const DEFAULT_MAX_LINE_LEN: usize = 64 * 1024;

/// Trait for license detectors.
///
/// Implementations of this trait are responsible for determining whether a
/// file already starts with the expected license header.
pub trait LicenseDetector: Send + Sync {
  /// Checks if the stream starts with the expected license header.
  fn has_license(&self, reader: &mut dyn BufRead) -> bool;

  /// Checks if any line of the stream is one of the header's lines, wherever
  /// it appears. Used to tell a misplaced header apart from a missing one.
  fn has_license_lines(&self, _reader: &mut dyn BufRead) -> bool {
    false
  }
}

/// Strict, line-by-line header detector.
///
/// The first N lines of a file must equal the N expected lines exactly, in
/// order. Whitespace differences are mismatches.
pub struct HeaderDetector {
  /// Expected header lines, without line terminators
  expected: Vec<String>,
  /// Expected lines that carry text, searched for out of position
  distinctive: Vec<String>,
  /// Longest line the scanner accepts before giving up
  max_line_len: usize,
}

impl HeaderDetector {
  /// Creates a detector for `expected` lines.
  ///
  /// `max_line_len` bounds the length of any single line read from a file.
  /// It is raised to the longest expected line if needed.
  pub fn new(expected: Vec<String>, max_line_len: usize) -> Self {
    let longest = expected.iter().map(String::len).max().unwrap_or(0);
    let distinctive = expected.iter().filter(|line| has_text(line)).cloned().collect();
    Self {
      expected,
      distinctive,
      max_line_len: max_line_len.max(longest),
    }
  }
}

/// Whether a header line says anything beyond its comment markers. Bare
/// `//` separators appear in ordinary comments too.
fn has_text(line: &str) -> bool {
  line.chars().any(|c| !c.is_whitespace() && !matches!(c, '/' | '*' | '#'))
}

impl LicenseDetector for HeaderDetector {
  fn has_license(&self, reader: &mut dyn BufRead) -> bool {
    contains_header(reader, &self.expected, self.max_line_len)
  }

  fn has_license_lines(&self, reader: &mut dyn BufRead) -> bool {
    contains_any_line(reader, &self.distinctive, self.max_line_len)
  }
}

/// Outcome of reading one bounded line.
enum LineRead {
  /// A line was read into the buffer, terminator stripped
  Line,
  /// End of input
  Eof,
  /// The line exceeded the length bound
  TooLong,
}

/// Reads one line into `buf`, refusing lines longer than `max_len` bytes.
///
/// The trailing `\n` and an optional `\r` before it are not part of the line.
fn read_bounded_line<R: BufRead + ?Sized>(reader: &mut R, buf: &mut Vec<u8>, max_len: usize) -> io::Result<LineRead> {
  buf.clear();
  // Room for the line, "\r\n", and one byte to notice overflow.
  let limit = max_len.saturating_add(3) as u64;
  let read = reader.take(limit).read_until(b'\n', buf)?;
  if read == 0 {
    return Ok(LineRead::Eof);
  }

  if buf.last() == Some(&b'\n') {
    buf.pop();
    if buf.last() == Some(&b'\r') {
      buf.pop();
    }
  } else if read as u64 == limit {
    return Ok(LineRead::TooLong);
  }

  if buf.len() > max_len {
    return Ok(LineRead::TooLong);
  }
  Ok(LineRead::Line)
}

/// Checks that the first `expected.len()` lines of `reader` equal `expected`.
///
/// Returns `false` on the first mismatch, when the stream has fewer lines
/// than the header, when a line is longer than `max_line_len`, or when the
/// stream can't be read. What follows the header is never inspected.
pub fn contains_header<R: BufRead + ?Sized>(reader: &mut R, expected: &[String], max_line_len: usize) -> bool {
  let mut buf = Vec::with_capacity(max_line_len.min(DEFAULT_MAX_LINE_LEN) + 2);

  for expected_line in expected {
    match read_bounded_line(reader, &mut buf, max_line_len) {
      Ok(LineRead::Line) if buf == expected_line.as_bytes() => {}
      // Mismatch, file shorter than the header, overlong line or read error
      _ => return false,
    }
  }

  true
}

/// Checks whether any line of `reader` equals any of `candidates`.
///
/// Unlike [`contains_header`] this scans the whole stream and ignores
/// position.
pub fn contains_any_line<R: BufRead + ?Sized>(reader: &mut R, candidates: &[String], max_line_len: usize) -> bool {
  if candidates.is_empty() {
    return false;
  }

  let mut buf = Vec::new();
  loop {
    match read_bounded_line(reader, &mut buf, max_line_len) {
      Ok(LineRead::Line) => {
        if candidates.iter().any(|c| buf == c.as_bytes()) {
          return true;
        }
      }
      Ok(LineRead::Eof | LineRead::TooLong) | Err(_) => return false,
    }
  }
}
