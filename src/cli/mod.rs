//! Command-line interface.

pub mod commands;
pub mod output;
pub mod types;

pub use types::{Cli, Commands};

use serde_json::json;

/// Report a fatal error and exit with status 1.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let report = json!({
            "success": false,
            "error": format!("{err:#}"),
        });
        eprintln!("{report}");
    } else {
        eprintln!("Error: {err:#}");
    }
    std::process::exit(1)
}
