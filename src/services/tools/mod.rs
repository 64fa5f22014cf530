//! Tool profiles, one per wrapped binary.
//!
//! Each profile is configuration only; the control flow lives in
//! [`crate::services::invocation`].

pub mod amass;
pub mod arjun;
pub mod dirsearch;
pub mod ffuf;
pub mod gospider;
pub mod hashcat;
pub mod httpx;
pub mod ipinfo;
pub mod nmap;
pub mod nuclei;
pub mod sqlmap;
pub mod subfinder;
pub mod tlsx;
pub mod wfuzz;
pub mod xsstrike;

use serde::{Deserialize, Serialize};
use std::io;

use crate::domain::errors::{ToolError, ToolResult};
use crate::domain::models::ExecutionSpec;

pub use amass::AmassProfile;
pub use arjun::{ArjunBulkOperation, ArjunCustomProfile, ArjunProfile};
pub use dirsearch::DirsearchProfile;
pub use ffuf::FfufProfile;
pub use gospider::{GospiderFilteredProfile, GospiderProfile};
pub use hashcat::HashcatProfile;
pub use httpx::HttpxProfile;
pub use ipinfo::IpinfoProfile;
pub use nmap::NmapProfile;
pub use nuclei::NucleiProfile;
pub use sqlmap::SqlmapProfile;
pub use subfinder::SubfinderProfile;
pub use tlsx::TlsxProfile;
pub use wfuzz::WfuzzProfile;
pub use xsstrike::XsstrikeProfile;

/// A single target or a list of targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Targets {
    One(String),
    Many(Vec<String>),
}

impl Targets {
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            Self::One(target) => vec![target.clone()],
            Self::Many(targets) => targets.clone(),
        }
    }
}

/// Requested output shape for tools that can emit either JSON or text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    #[serde(alias = "txt")]
    Text,
}

/// Validate a user-supplied value that lands in the argument vector.
///
/// Values may not be blank, may not span lines and may not start with a
/// dash, so they can never be read as an extra option by the tool.
pub fn checked<'a>(name: &str, value: &'a str) -> ToolResult<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ToolError::invalid(format!(
            "Parameter '{name}' must not be empty"
        )));
    }
    if value.starts_with('-') {
        return Err(ToolError::invalid(format!(
            "Parameter '{name}' must not start with '-': {value}"
        )));
    }
    if value.contains(['\n', '\r', '\0']) {
        return Err(ToolError::invalid(format!(
            "Parameter '{name}' must be a single line"
        )));
    }
    Ok(value)
}

/// Validate a list of bare tokens such as file extensions.
pub fn alphanumeric_list(name: &str, values: &[String]) -> ToolResult<Vec<String>> {
    values
        .iter()
        .map(|value| {
            let token = value.trim().trim_start_matches('.');
            if !token.is_empty() && token.chars().all(|c| c.is_ascii_alphanumeric()) {
                Ok(token.to_string())
            } else {
                Err(ToolError::invalid(format!(
                    "Parameter '{name}' entries must be alphanumeric, got '{value}'"
                )))
            }
        })
        .collect()
}

/// Attach targets to a spec: one target goes inline after `single_flag`,
/// several go newline-joined on stdin after `list_flag -`.
pub fn apply_targets(
    spec: &mut ExecutionSpec,
    name: &str,
    targets: &[String],
    single_flag: &str,
    list_flag: &str,
) -> ToolResult<()> {
    let targets = targets
        .iter()
        .map(|t| checked(name, t))
        .collect::<ToolResult<Vec<_>>>()?;

    match targets.as_slice() {
        [] => {
            return Err(ToolError::invalid(
                "No targets provided. Please provide at least one URL or IP address.",
            ))
        }
        [single] => {
            spec.arg(single_flag).arg(*single);
        }
        many => {
            spec.arg(list_flag).arg("-").stdin(many.join("\n"));
        }
    }
    Ok(())
}

/// Failure to prepare scratch files before the tool runs.
pub fn scratch_failure(tool: &str, error: &io::Error) -> ToolError {
    ToolError::ExecutionFailed {
        tool: tool.to_string(),
        exit_code: None,
        stderr: format!("Failed to prepare scratch file: {error}"),
        stdout: String::new(),
    }
}

#[cfg(test)]
pub(crate) fn completed(exit_code: i32, stdout: &str) -> crate::domain::models::ExecutionOutcome {
    crate::domain::models::ExecutionOutcome {
        exit_code: Some(exit_code),
        stdout: stdout.to_string(),
        stderr: String::new(),
        started_at: chrono::Utc::now(),
        elapsed: std::time::Duration::from_millis(10),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_single_target_inline() {
        let mut spec = ExecutionSpec::new("gospider", Duration::from_secs(1));
        apply_targets(&mut spec, "target", &["https://a.test".into()], "-s", "-S").unwrap();
        assert_eq!(spec.args, vec!["-s", "https://a.test"]);
        assert!(spec.stdin.is_none());
    }

    #[test]
    fn test_many_targets_on_stdin_in_order() {
        let mut spec = ExecutionSpec::new("gospider", Duration::from_secs(1));
        let targets = vec!["https://b.test".to_string(), "https://a.test".to_string()];
        apply_targets(&mut spec, "target", &targets, "-s", "-S").unwrap();
        assert_eq!(spec.args, vec!["-S", "-"]);
        assert_eq!(spec.stdin.as_deref(), Some("https://b.test\nhttps://a.test"));
    }

    #[test]
    fn test_no_targets_rejected() {
        let mut spec = ExecutionSpec::new("httpx", Duration::from_secs(1));
        assert!(apply_targets(&mut spec, "urls", &[], "-u", "-l").is_err());
    }

    #[test]
    fn test_checked_rejects_option_like_values() {
        assert!(checked("target", "-oN /tmp/x").is_err());
        assert!(checked("target", "a\nb").is_err());
        assert_eq!(checked("target", " example.com ").unwrap(), "example.com");
    }

    #[test]
    fn test_targets_untagged() {
        let one: Targets = serde_json::from_str("\"a\"").unwrap();
        let many: Targets = serde_json::from_str("[\"a\",\"b\"]").unwrap();
        assert_eq!(one.to_vec(), vec!["a"]);
        assert_eq!(many.to_vec(), vec!["a", "b"]);
    }

    #[test]
    fn test_output_format_accepts_txt_alias() {
        let format: OutputFormat = serde_json::from_str("\"txt\"").unwrap();
        assert_eq!(format, OutputFormat::Text);
        assert!(serde_json::from_str::<OutputFormat>("\"xml\"").is_err());
    }

    #[test]
    fn test_alphanumeric_list() {
        assert_eq!(
            alphanumeric_list("extensions", &[".js".into(), "json".into()]).unwrap(),
            vec!["js", "json"]
        );
        assert!(alphanumeric_list("extensions", &["php|sh".into()]).is_err());
    }
}
