//! Entry point for the `warden` binary.

use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    // Unlocked handle: tracing writes to stderr from the same process.
    let mut stderr = io::stderr();
    warden_cli::run(std::env::args_os(), &mut stderr)
}
