//! # Logging Module
//!
//! User-facing status output for licenser, separate from the `tracing`
//! diagnostics set up by [`init_tracing`]:
//! - [`verbose_log!`](crate::verbose_log) for detail shown only with `-v`
//! - [`info_log!`](crate::info_log) for status lines hidden by `-q`
//!
//! Both write to stderr, so stdout carries nothing but the missing-header
//! report and the notice dump.
//!
//! ## Example
//!
//! ```rust
//! use licenser::logging::{ColorMode, set_verbose};
//! use licenser::{info_log, verbose_log};
//!
//! set_verbose();
//! ColorMode::Never.apply();
//!
//! verbose_log!("Checking: {}", "main.go");
//! info_log!("Rewrote header in: {}", "main.go");
//! ```

mod modes;

pub use modes::{ColorMode, default_directive, init_tracing, is_quiet, is_verbose, set_quiet, set_verbose};
use owo_colors::{OwoColorize, Stream};

/// Logs a message to stderr if verbose mode is enabled.
///
/// Takes the same format string syntax as [`eprintln!`].
#[macro_export]
macro_rules! verbose_log {
    ($($arg:tt)*) => {
        if $crate::logging::is_verbose() {
            eprintln!($($arg)*);
        }
    };
}

/// Logs a status message to stderr unless quiet mode is enabled.
#[macro_export]
macro_rules! info_log {
    ($($arg:tt)*) => {
        if !$crate::logging::is_quiet() {
            $crate::logging::print_info_log(&format!($($arg)*));
        }
    };
}

/// Prints a status line, in yellow when stderr supports color.
pub fn print_info_log(message: &str) {
  eprintln!("{}", message.if_supports_color(Stream::Stderr, |m| m.yellow()));
}
