//! `http_fuzz`: ffuf in JSON-lines mode.

use serde::{Deserialize, Serialize};

use super::checked;
use crate::domain::errors::{ToolError, ToolResult};
use crate::domain::models::{
    ExecutionOutcome, ExecutionSpec, OperationDescriptor, ParamKind, ParamSpec, Payload,
};
use crate::services::invocation::{ExecutionSettings, ToolProfile};
use crate::services::output_parsers;

/// Placeholder both fuzzers substitute with wordlist entries.
pub const FUZZ_KEYWORD: &str = "FUZZ";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FfufParams {
    pub url: String,
    pub wordlist: String,
    pub filter_code: Option<String>,
}

pub struct FfufProfile;

/// Reject fuzz URLs without the placeholder; the tool would send one
/// request per wordlist entry to the same URL.
pub fn fuzz_url<'a>(url: &'a str) -> ToolResult<&'a str> {
    let url = checked("url", url)?;
    if url.contains(FUZZ_KEYWORD) {
        Ok(url)
    } else {
        Err(ToolError::invalid(format!(
            "url must contain the {FUZZ_KEYWORD} keyword (e.g. http://example.com/{FUZZ_KEYWORD})"
        )))
    }
}

impl ToolProfile for FfufProfile {
    type Params = FfufParams;

    const BINARY: &'static str = "ffuf";
    const INSTALL_HINT: &'static str =
        "Please install ffuf: go install -v github.com/ffuf/ffuf/v2@latest";

    fn descriptor(&self) -> OperationDescriptor {
        OperationDescriptor::new(
            "http_fuzz",
            Self::BINARY,
            "Run ffuf to fuzz web application endpoints. Matches are returned as JSON records.",
        )
        .param(ParamSpec::required(
            "url",
            ParamKind::String,
            "Target URL with FUZZ keyword (e.g. \"http://example.com/FUZZ\")",
        ))
        .param(ParamSpec::required(
            "wordlist",
            ParamKind::String,
            "Path to wordlist file",
        ))
        .param(
            ParamSpec::optional(
                "filter_code",
                ParamKind::String,
                "HTTP status codes to filter out (e.g. \"404\" or \"404,403\")",
            )
            .with_default("404"),
        )
    }

    fn build(&self, params: &FfufParams, settings: &ExecutionSettings) -> ToolResult<ExecutionSpec> {
        let mut spec = settings.spec(Self::BINARY);
        spec.arg("-u")
            .arg(fuzz_url(&params.url)?)
            .arg("-w")
            .arg(checked("wordlist", &params.wordlist)?)
            .args(["-json", "-s"]);

        if let Some(code) = params.filter_code.as_deref().filter(|c| !c.trim().is_empty()) {
            spec.arg("-fc").arg(checked("filter_code", code)?);
        }

        Ok(spec)
    }

    fn parse(&self, _params: &FfufParams, outcome: &ExecutionOutcome) -> ToolResult<Payload> {
        Ok(Payload::records(
            "results",
            output_parsers::json_lines(&outcome.stdout),
        ))
    }

    fn targets(&self, params: &FfufParams) -> Vec<String> {
        vec![params.url.clone()]
    }
}
