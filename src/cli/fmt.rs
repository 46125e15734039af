//! Fmt command implementation

use std::path::PathBuf;
use std::process::ExitCode;

use super::{report_warnings, EXIT_ERROR, EXIT_SUCCESS};
use crate::config::SumConfig;
use crate::fmt::format_script;

/// Execute the fmt command
pub fn run_fmt(files: &[PathBuf], check: bool, stdout_mode: bool, config: &SumConfig) -> ExitCode {
    let mut needs_formatting = false;
    let options = config.format_options();

    for file in files {
        let content = match std::fs::read_to_string(file) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error: Cannot read '{}': {}", file.display(), e);
                return ExitCode::from(EXIT_ERROR);
            }
        };

        let (formatted, warnings) = match format_script(&content, &options) {
            Ok(f) => f,
            Err(e) => {
                eprintln!("Error: Cannot format '{}': {}", file.display(), e);
                return ExitCode::from(EXIT_ERROR);
            }
        };

        // Rewriting would drop the rows and tokens these warnings point at.
        if !warnings.is_empty() && !stdout_mode {
            report_warnings(file, &warnings, false);
            eprintln!(
                "Error: {}: not formatted, fix the {} warning(s) first",
                file.display(),
                warnings.len()
            );
            return ExitCode::from(EXIT_ERROR);
        }
        if !report_warnings(file, &warnings, config.validate.strict) {
            return ExitCode::from(EXIT_ERROR);
        }

        if check {
            if content != formatted {
                eprintln!("{}: needs formatting", file.display());
                needs_formatting = true;
            }
        } else if stdout_mode {
            print!("{}", formatted);
        } else if content != formatted {
            if let Err(e) = std::fs::write(file, &formatted) {
                eprintln!("Error: Cannot write '{}': {}", file.display(), e);
                return ExitCode::from(EXIT_ERROR);
            }
            eprintln!("{}: formatted", file.display());
        } else {
            eprintln!("{}: already formatted", file.display());
        }
    }

    if check && needs_formatting {
        ExitCode::from(EXIT_ERROR)
    } else {
        ExitCode::from(EXIT_SUCCESS)
    }
}
