//! `dir_bruteforce`: dirsearch path discovery.
//!
//! dirsearch has no machine-readable stdout mode, so findings are scraped
//! from its progress lines:
//!
//! ```text
//! [14:02:11] 301 -  312B  - /admin  ->  http://t.test/admin/
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::LazyLock;

use super::{alphanumeric_list, checked};
use crate::domain::errors::ToolResult;
use crate::domain::models::{
    ExecutionOutcome, ExecutionSpec, OperationDescriptor, ParamKind, ParamSpec, Payload,
};
use crate::services::invocation::{ExecutionSettings, ToolProfile};

static FINDING_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\[[^\]]+\]\s+(?P<status>\d{3})\s+-\s+(?P<size>\S+)\s+-\s+(?P<path>\S+)(?:\s+->\s+(?P<redirect>\S+))?",
    )
    .expect("valid regex")
});

/// Extract `{status, size, path, redirect?}` records from dirsearch output.
pub fn parse_findings(stdout: &str) -> Vec<Value> {
    stdout
        .lines()
        .filter_map(|line| FINDING_LINE.captures(line.trim()))
        .map(|caps| {
            let mut record = Map::new();
            let status = caps["status"].parse::<u16>().map_or(Value::Null, Value::from);
            record.insert("status".into(), status);
            record.insert("size".into(), Value::String(caps["size"].to_string()));
            record.insert("path".into(), Value::String(caps["path"].to_string()));
            if let Some(redirect) = caps.name("redirect") {
                record.insert("redirect".into(), Value::String(redirect.as_str().to_string()));
            }
            Value::Object(record)
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DirsearchParams {
    pub url: String,
    pub extensions: Option<Vec<String>>,
    pub wordlist: Option<String>,
}

pub struct DirsearchProfile;

impl ToolProfile for DirsearchProfile {
    type Params = DirsearchParams;

    const BINARY: &'static str = "dirsearch";
    const INSTALL_HINT: &'static str = "Please install dirsearch: pip install dirsearch";

    fn descriptor(&self) -> OperationDescriptor {
        OperationDescriptor::new(
            "dir_bruteforce",
            Self::BINARY,
            "Run Dirsearch to brute force directories and files. Returns discovered paths with their status codes.",
        )
        .param(ParamSpec::required("url", ParamKind::String, "Target URL to scan"))
        .param(ParamSpec::optional(
            "extensions",
            ParamKind::StringList,
            "File extensions to check (e.g. [\"php\", \"html\", \"txt\"])",
        ))
        .param(ParamSpec::optional(
            "wordlist",
            ParamKind::String,
            "Path to custom wordlist file",
        ))
    }

    fn build(&self, params: &DirsearchParams, settings: &ExecutionSettings) -> ToolResult<ExecutionSpec> {
        let mut spec = settings.spec(Self::BINARY);
        spec.arg("-u").arg(checked("url", &params.url)?);

        if let Some(extensions) = params.extensions.as_ref().filter(|e| !e.is_empty()) {
            spec.arg("-e")
                .arg(alphanumeric_list("extensions", extensions)?.join(","));
        }
        if let Some(ref wordlist) = params.wordlist {
            spec.arg("-w").arg(checked("wordlist", wordlist)?);
        }

        spec.arg("--no-color");
        Ok(spec)
    }

    fn parse(&self, _params: &DirsearchParams, outcome: &ExecutionOutcome) -> ToolResult<Payload> {
        Ok(Payload::records("findings", parse_findings(&outcome.stdout)))
    }

    fn targets(&self, params: &DirsearchParams) -> Vec<String> {
        vec![params.url.clone()]
    }
}
