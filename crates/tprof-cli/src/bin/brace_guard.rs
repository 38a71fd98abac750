//! `brace-guard`: wraps single-statement loop and branch bodies in braces.
//!
//! Delegates to [`tprof_cli::run`], which writes a patched
//! `<file>_tprof_subs.<ext>` copy next to every source given on the command
//! line.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

use tprof_cli::Tool;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    tprof_cli::run(
        Tool::BraceGuard,
        std::env::args_os(),
        &mut stdout,
        &mut stderr,
    )
}
