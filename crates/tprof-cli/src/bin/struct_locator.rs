//! `struct-locator`: records loop ranges and call sites per function.
//!
//! Delegates to [`tprof_cli::run`], which writes one `<identifier>.cst` file
//! per function definition into `$TPROF_WORKSPACE`.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

use tprof_cli::Tool;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    tprof_cli::run(
        Tool::StructLocator,
        std::env::args_os(),
        &mut stdout,
        &mut stderr,
    )
}
