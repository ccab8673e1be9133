//! Output formatting shared by all commands.

use serde::Serialize;

use crate::OutputFormat;

/// Print a serializable result in the requested format.
///
/// Text output is written by each command itself; this only handles the
/// machine-readable path.
pub fn print<T: Serialize>(value: &T, format: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match format {
        OutputFormat::Json => match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("failed to serialize output: {e}"),
        },
        OutputFormat::Text => {}
    }
}
