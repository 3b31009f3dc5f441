//! # licenser
//!
//! Checks and rewrites the license headers of source files.

use std::io::{self, Write};
use std::process;

use licenser::cli::{Cli, run_check};
use licenser::error::{LicenserError, exit_code_for};
use licenser::output::print_error;

fn main() {
  let cli = Cli::parse_args();

  let mut stdout = io::stdout().lock();
  let result = run_check(cli.args, &mut stdout);
  let _ = stdout.flush();

  if let Err(err) = result {
    // The report lines already explain a mismatch.
    let mismatch = err
      .downcast_ref::<LicenserError>()
      .is_some_and(LicenserError::is_verification_mismatch);
    if !mismatch {
      print_error(&format!("{err:#}"));
    }
    process::exit(exit_code_for(&err));
  }
}
