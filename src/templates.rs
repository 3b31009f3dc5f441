//! # Templates Module
//!
//! This module provides the license header registry: the canonical text of
//! each supported header, keyed by a short license label, and the rendering
//! step that substitutes the licensor name.
//!
//! The module includes:
//! - [`HeaderRegistry`] mapping labels like `ASL2` to their templates
//! - [`HeaderTemplate`] holding the raw template lines
//! - [`RenderedHeader`] holding the lines after licensor substitution
//!
//! ## Example
//!
//! ```rust
//! use licenser::templates::HeaderRegistry;
//!
//! # fn main() -> anyhow::Result<()> {
//! let registry = HeaderRegistry::builtin();
//! let header = registry.get("Elastic")?.render("Elasticsearch B.V.");
//!
//! assert_eq!(header.lines().len(), 3);
//! assert!(header.to_bytes().ends_with(b"Elastic License.\n"));
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;

use crate::error::LicenserError;
use crate::verbose_log;

/// Placeholder replaced by the licensor name when a template is rendered.
pub const LICENSOR_PLACEHOLDER: &str = "{{licensor}}";

/// Default license label.
pub const DEFAULT_LICENSE: &str = "ASL2";

/// Default licensor name.
pub const DEFAULT_LICENSOR: &str = "Elasticsearch B.V.";

const ASL2: &[&str] = &[
  "// Licensed to {{licensor}} under one or more contributor",
  "// license agreements. See the NOTICE file distributed with",
  "// this work for additional information regarding copyright",
  "// ownership. {{licensor}} licenses this file to you under",
  "// the Apache License, Version 2.0 (the \"License\"); you may",
  "// not use this file except in compliance with the License.",
  "// You may obtain a copy of the License at",
  "//",
  "//     http://www.apache.org/licenses/LICENSE-2.0",
  "//",
  "// Unless required by applicable law or agreed to in writing,",
  "// software distributed under the License is distributed on an",
  "// \"AS IS\" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY",
  "// KIND, either express or implied.  See the License for the",
  "// specific language governing permissions and limitations",
  "// under the License.",
];

const ASL2_SHORT: &[&str] = &[
  "// Licensed to {{licensor}} under one or more agreements.",
  "// {{licensor}} licenses this file to you under the Apache 2.0 License.",
  "// See the LICENSE file in the project root for more information.",
];

const ELASTIC: &[&str] = &[
  "// Copyright Elasticsearch B.V. and/or licensed to Elasticsearch B.V. under one",
  "// or more contributor license agreements. Licensed under the Elastic License;",
  "// you may not use this file except in compliance with the Elastic License.",
];

const ELASTIC_V2: &[&str] = &[
  "// Copyright Elasticsearch B.V. and/or licensed to Elasticsearch B.V. under one",
  "// or more contributor license agreements. Licensed under the Elastic License 2.0;",
  "// you may not use this file except in compliance with the Elastic License 2.0.",
];

const CLOUD: &[&str] = &[
  "// ELASTICSEARCH CONFIDENTIAL",
  "// __________________",
  "//",
  "//  Copyright Elasticsearch B.V. All rights reserved.",
  "//",
  "// NOTICE:  All information contained herein is, and remains",
  "// the property of Elasticsearch B.V. and its suppliers, if any.",
  "// The intellectual and technical concepts contained herein",
  "// are proprietary to Elasticsearch B.V. and its suppliers and",
  "// may be covered by U.S. and Foreign Patents, patents in",
  "// process, and are protected by trade secret or copyright",
  "// law.  Dissemination of this information or reproduction of",
  "// this material is strictly forbidden unless prior written",
  "// permission is obtained from Elasticsearch B.V.",
];

/// The raw, unrendered text of a license header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderTemplate {
  lines: Vec<String>,
}

impl HeaderTemplate {
  /// Creates a template from its lines, without trailing newlines.
  pub fn new<I, S>(lines: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self {
      lines: lines.into_iter().map(Into::into).collect(),
    }
  }

  /// The raw template lines, placeholders included.
  pub fn lines(&self) -> &[String] {
    &self.lines
  }

  /// Renders the template, replacing [`LICENSOR_PLACEHOLDER`] with `licensor`.
  pub fn render(&self, licensor: &str) -> RenderedHeader {
    verbose_log!("Rendering header template with licensor: {}", licensor);

    RenderedHeader {
      lines: self
        .lines
        .iter()
        .map(|line| line.replace(LICENSOR_PLACEHOLDER, licensor))
        .collect(),
    }
  }

  /// Byte length of the template with one newline per line.
  fn byte_len(&self) -> usize {
    self.lines.iter().map(|l| l.len() + 1).sum()
  }
}

/// A header whose placeholders have been filled in.
///
/// The lines are what the detector compares a file against; the byte form is
/// what the rewriter writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedHeader {
  lines: Vec<String>,
}

impl RenderedHeader {
  pub fn lines(&self) -> &[String] {
    &self.lines
  }

  /// The header as bytes, each line terminated by `\n`.
  pub fn to_bytes(&self) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(self.byte_len());
    for line in &self.lines {
      bytes.extend_from_slice(line.as_bytes());
      bytes.push(b'\n');
    }
    bytes
  }

  /// Byte length of [`to_bytes`](Self::to_bytes).
  pub fn byte_len(&self) -> usize {
    self.lines.iter().map(|l| l.len() + 1).sum()
  }
}

/// Registry of license headers keyed by license label.
///
/// Built once at startup (built-ins plus any templates from the config file)
/// and passed by reference to whatever needs it. Never mutated while files are
/// being processed.
#[derive(Debug, Clone)]
pub struct HeaderRegistry {
  templates: BTreeMap<String, HeaderTemplate>,
}

impl Default for HeaderRegistry {
  fn default() -> Self {
    Self::builtin()
  }
}

impl HeaderRegistry {
  /// Creates a registry without any templates.
  pub const fn empty() -> Self {
    Self {
      templates: BTreeMap::new(),
    }
  }

  /// Creates a registry holding the built-in headers: `ASL2`, `ASL2-Short`,
  /// `Elastic`, `Elasticv2` and `Cloud`.
  pub fn builtin() -> Self {
    let mut registry = Self::empty();
    registry.insert("ASL2", HeaderTemplate::new(ASL2.iter().copied()));
    registry.insert("ASL2-Short", HeaderTemplate::new(ASL2_SHORT.iter().copied()));
    registry.insert("Elastic", HeaderTemplate::new(ELASTIC.iter().copied()));
    registry.insert("Elasticv2", HeaderTemplate::new(ELASTIC_V2.iter().copied()));
    registry.insert("Cloud", HeaderTemplate::new(CLOUD.iter().copied()));
    registry
  }

  /// Adds or replaces the template for `label`.
  pub fn insert(&mut self, label: impl Into<String>, template: HeaderTemplate) {
    let label = label.into();
    verbose_log!("Registering header template: {}", label);
    self.templates.insert(label, template);
  }

  /// Looks up the template for `label`.
  ///
  /// # Errors
  ///
  /// Returns [`LicenserError::UnknownLicense`] when no template is registered
  /// under `label`.
  pub fn get(&self, label: &str) -> Result<&HeaderTemplate, LicenserError> {
    self
      .templates
      .get(label)
      .ok_or_else(|| LicenserError::UnknownLicense(label.to_string()))
  }

  /// Registered labels in sorted order.
  pub fn labels(&self) -> impl Iterator<Item = &str> {
    self.templates.keys().map(String::as_str)
  }

  /// Byte length of the longest registered template.
  ///
  /// Used as the upper bound on line length when scanning files, so a single
  /// runaway line can't make the detector buffer the whole file.
  pub fn max_header_len(&self) -> usize {
    self.templates.values().map(HeaderTemplate::byte_len).max().unwrap_or(0)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_builtin_labels() {
    let registry = HeaderRegistry::builtin();
    let labels: Vec<&str> = registry.labels().collect();
    assert_eq!(labels, vec!["ASL2", "ASL2-Short", "Cloud", "Elastic", "Elasticv2"]);
  }

  #[test]
  fn test_unknown_license() {
    let registry = HeaderRegistry::builtin();
    let err = registry.get("foo").unwrap_err();
    assert!(matches!(err, LicenserError::UnknownLicense(ref l) if l == "foo"));
  }

  #[test]
  fn test_render_substitutes_every_placeholder() {
    let registry = HeaderRegistry::builtin();
    let header = registry.get("ASL2").unwrap().render("ACME Corp");

    assert_eq!(header.lines().len(), 16);
    assert_eq!(header.lines()[0], "// Licensed to ACME Corp under one or more contributor");
    assert_eq!(header.lines()[3], "// ownership. ACME Corp licenses this file to you under");
    assert!(header.lines().iter().all(|l| !l.contains(LICENSOR_PLACEHOLDER)));
  }

  #[test]
  fn test_render_leaves_templates_without_placeholder_untouched() {
    let registry = HeaderRegistry::builtin();
    let template = registry.get("Cloud").unwrap();
    let header = template.render("Someone Else");
    assert_eq!(header.lines(), template.lines());
  }

  #[test]
  fn test_to_bytes_terminates_every_line() {
    let header = HeaderTemplate::new(["// a", "// b"]).render("x");
    assert_eq!(header.to_bytes(), b"// a\n// b\n");
    assert_eq!(header.byte_len(), 10);
  }

  #[test]
  fn test_insert_overrides_and_extends() {
    let mut registry = HeaderRegistry::builtin();
    registry.insert("Custom", HeaderTemplate::new(["// Copyright {{licensor}}"]));
    registry.insert("Elastic", HeaderTemplate::new(["// Copyright Elastic"]));

    assert_eq!(registry.get("Custom").unwrap().render("Me").lines()[0], "// Copyright Me");
    assert_eq!(registry.get("Elastic").unwrap().lines().len(), 1);
  }

  #[test]
  fn test_max_header_len_tracks_longest_template() {
    let mut registry = HeaderRegistry::empty();
    assert_eq!(registry.max_header_len(), 0);

    registry.insert("short", HeaderTemplate::new(["// a"]));
    registry.insert("long", HeaderTemplate::new(["// abc", "// def"]));
    assert_eq!(registry.max_header_len(), 14);
  }
}
