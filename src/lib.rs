//! # licenser
//!
//! A tool that keeps the license headers of source files in line with a
//! chosen license, and compiles a NOTICE file for a Go project's
//! dependencies.
//!
//! `licenser` walks a directory tree and checks that every file with the
//! scanned extension starts with the exact header of the selected license.
//! Files that don't are rewritten in place: an old header block is replaced
//! and a missing one is prepended. In dry mode nothing is written and every
//! nonconforming file is reported instead.
//!
//! ## Features
//!
//! * Strict, line-by-line header detection
//! * Built-in ASL2, Elastic and Cloud headers, plus custom ones from
//!   `.licenser.toml`
//! * Path exclusions, with `vendor` and `.git` always skipped
//! * Distinct exit codes per failure kind
//! * NOTICE generation from `go.mod`
//!
//! ## Usage as a Library
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use licenser::processor::{Processor, ProcessorConfig};
//! use licenser::templates::{DEFAULT_LICENSOR, HeaderRegistry};
//!
//! fn main() -> anyhow::Result<()> {
//!     let registry = HeaderRegistry::builtin();
//!     let header = registry.get("ASL2")?.render(DEFAULT_LICENSOR);
//!
//!     let processor = Processor::new(ProcessorConfig {
//!         dry_run: true,
//!         exclude: vec!["testdata".to_string()],
//!         ..ProcessorConfig::new(header)
//!     })?;
//!
//!     match processor.process(Path::new("."), &mut std::io::stdout()) {
//!         Ok(summary) => println!("{} files conform", summary.conforming),
//!         Err(err) if err.is_verification_mismatch() => println!("some files need a header"),
//!         Err(err) => return Err(err.into()),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! * [`processor`] - Tree walking, header extraction and rewriting
//! * [`license_detection`] - Header detection
//! * [`templates`] - License header registry
//! * [`notice`] - NOTICE generation
//! * [`config`] - `.licenser.toml` support
//! * [`logging`] - Logging utilities for verbose output

pub mod cli;
pub mod config;
pub mod error;
pub mod file_filter;
pub mod license_detection;
pub mod logging;
pub mod notice;
pub mod output;
pub mod processor;
pub mod report;
pub mod templates;
