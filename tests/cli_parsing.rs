//! Command-line parsing.

use clap::Parser;
use secops_mcp::cli::{Cli, Commands};

#[test]
fn test_default_is_serve() {
    let cli = Cli::try_parse_from(["secops-mcp", "--json"]).unwrap();
    assert_eq!(cli.command(), Commands::Serve);
    assert!(cli.json);
}

#[test]
fn test_tools_subcommand() {
    let cli = Cli::try_parse_from(["secops-mcp", "tools", "-c", "/etc/secops.yaml"]).unwrap();
    assert_eq!(cli.command(), Commands::Tools);
    assert_eq!(cli.config.unwrap().to_str(), Some("/etc/secops.yaml"));
}

#[test]
fn test_unknown_subcommand_fails() {
    assert!(Cli::try_parse_from(["secops-mcp", "scan"]).is_err());
}
