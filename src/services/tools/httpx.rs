//! `http_probe`: projectdiscovery httpx.
//!
//! The bound scales with the number of targets. A different program
//! called `httpx` (the Python HTTP client's CLI) is common on developer
//! machines, so its error output is recognized and reported as a wrong
//! binary rather than a generic failure.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::apply_targets;
use crate::domain::errors::ToolResult;
use crate::domain::models::{
    ExecutionOutcome, ExecutionSpec, OperationDescriptor, ParamKind, ParamSpec, Payload,
};
use crate::services::invocation::{BinarySignature, ExecutionSettings, ToolProfile};
use crate::services::output_parsers;

const PYTHON_HTTPX: BinarySignature = BinarySignature {
    patterns: &[
        "command line client could not run",
        "required dependencies",
        "pip install",
    ],
    expected: "Please install projectdiscovery httpx (not Python httpx). Install with: go install -v github.com/projectdiscovery/httpx/cmd/httpx@latest",
};

const SINGLE_TARGET_BOUND_SECS: u64 = 20;

/// Execution bound for probing `targets` hosts.
///
/// A single target gets 20 seconds; a list gets 15 seconds per target
/// plus 20 seconds of headroom, never less than the single-target bound.
pub fn bound_for(targets: usize) -> Duration {
    if targets <= 1 {
        return Duration::from_secs(SINGLE_TARGET_BOUND_SECS);
    }
    let secs = u64::try_from(targets)
        .unwrap_or(u64::MAX)
        .saturating_mul(15)
        .saturating_add(20);
    Duration::from_secs(secs.max(SINGLE_TARGET_BOUND_SECS))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpxParams {
    pub urls: Vec<String>,
    pub status_codes: Option<Vec<i64>>,
}

pub struct HttpxProfile;

impl ToolProfile for HttpxProfile {
    type Params = HttpxParams;

    const BINARY: &'static str = "httpx";
    const INSTALL_HINT: &'static str = "Please install projectdiscovery httpx: go install -v github.com/projectdiscovery/httpx/cmd/httpx@latest";

    fn descriptor(&self) -> OperationDescriptor {
        OperationDescriptor::new(
            "http_probe",
            Self::BINARY,
            "Run httpx to probe HTTP servers and discover endpoints. Returns one JSON record per responding target with status code, title and technology details.",
        )
        .param(ParamSpec::required(
            "urls",
            ParamKind::StringList,
            "Target URLs or IPs to probe, at least one (e.g. [\"https://example.com\"])",
        ))
        .param(ParamSpec::optional(
            "status_codes",
            ParamKind::IntegerList,
            "Only return results with these HTTP status codes (e.g. [200, 301])",
        ))
    }

    fn build(&self, params: &HttpxParams, settings: &ExecutionSettings) -> ToolResult<ExecutionSpec> {
        let mut spec = settings.spec(Self::BINARY);
        spec.args(["-json", "-silent", "-timeout", "10"]);

        if let Some(codes) = params.status_codes.as_ref().filter(|c| !c.is_empty()) {
            let codes: Vec<String> = codes.iter().map(ToString::to_string).collect();
            spec.arg("-mc").arg(codes.join(","));
        }

        apply_targets(&mut spec, "urls", &params.urls, "-u", "-l")?;
        spec.timeout(bound_for(params.urls.len()));
        Ok(spec)
    }

    fn parse(&self, _params: &HttpxParams, outcome: &ExecutionOutcome) -> ToolResult<Payload> {
        Ok(Payload::records(
            "results",
            output_parsers::json_lines(&outcome.stdout),
        ))
    }

    fn targets(&self, params: &HttpxParams) -> Vec<String> {
        params.urls.clone()
    }

    fn signature(&self) -> Option<&'static BinarySignature> {
        Some(&PYTHON_HTTPX)
    }
}
