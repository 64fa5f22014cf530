//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "secops-mcp")]
#[command(about = "MCP server exposing security-assessment tools", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Defaults to `serve` when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file to load instead of the project configuration
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Serve the operation catalog over MCP stdio
    Serve,

    /// List the available operations
    Tools,

    /// Invoke one operation and print its envelope
    Call {
        /// Operation name (e.g. subdomain_enum)
        operation: String,

        /// Arguments as a JSON object
        #[arg(short, long, default_value = "{}")]
        args: String,
    },
}

impl Cli {
    /// The command to run, falling back to `serve`.
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Serve)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_serves() {
        let cli = Cli::try_parse_from(["secops-mcp"]).unwrap();
        assert_eq!(cli.command(), Commands::Serve);
        assert!(!cli.json);
    }

    #[test]
    fn test_call_with_args_and_global_flags() {
        let cli = Cli::try_parse_from([
            "secops-mcp",
            "call",
            "subdomain_enum",
            "--args",
            r#"{"domain":"example.com"}"#,
            "--json",
            "--config",
            "custom.yaml",
        ])
        .unwrap();
        assert_eq!(
            cli.command(),
            Commands::Call {
                operation: "subdomain_enum".to_string(),
                args: r#"{"domain":"example.com"}"#.to_string(),
            }
        );
        assert!(cli.json);
        assert_eq!(cli.config, Some(PathBuf::from("custom.yaml")));
    }

    #[test]
    fn test_call_args_default_to_empty_object() {
        let cli = Cli::try_parse_from(["secops-mcp", "call", "ip_lookup"]).unwrap();
        assert!(matches!(cli.command(), Commands::Call { ref args, .. } if args == "{}"));
    }

    #[test]
    fn test_call_requires_operation() {
        assert!(Cli::try_parse_from(["secops-mcp", "call"]).is_err());
    }
}
