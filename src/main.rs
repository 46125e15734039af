//! SUM - command-line converter between images and SUM scripts

use std::process::ExitCode;

use sumimg::cli;

fn main() -> ExitCode {
    cli::run()
}
