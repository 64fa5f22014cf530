//! `http_fuzz_wfuzz`: wfuzz with its JSON printer.

use serde::{Deserialize, Serialize};

use super::checked;
use super::ffuf::fuzz_url;
use crate::domain::errors::ToolResult;
use crate::domain::models::{
    ExecutionOutcome, ExecutionSpec, OperationDescriptor, ParamKind, ParamSpec, Payload,
};
use crate::services::invocation::{ExecutionSettings, ToolProfile};
use crate::services::output_parsers;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WfuzzParams {
    pub url: String,
    pub wordlist: String,
    pub hide_code: Option<String>,
}

pub struct WfuzzProfile;

impl ToolProfile for WfuzzProfile {
    type Params = WfuzzParams;

    const BINARY: &'static str = "wfuzz";
    const INSTALL_HINT: &'static str = "Please install wfuzz: pip install wfuzz";

    fn descriptor(&self) -> OperationDescriptor {
        OperationDescriptor::new(
            "http_fuzz_wfuzz",
            Self::BINARY,
            "Run wfuzz to fuzz web application endpoints.",
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
                "hide_code",
                ParamKind::String,
                "HTTP status codes to hide from results (e.g. \"404\")",
            )
            .with_default("404"),
        )
    }

    fn build(&self, params: &WfuzzParams, settings: &ExecutionSettings) -> ToolResult<ExecutionSpec> {
        let url = fuzz_url(&params.url)?;
        let mut spec = settings.spec(Self::BINARY);
        spec.arg("-w")
            .arg(checked("wordlist", &params.wordlist)?)
            .args(["-o", "json"]);

        if let Some(code) = params.hide_code.as_deref().filter(|c| !c.trim().is_empty()) {
            spec.arg("--hc").arg(checked("hide_code", code)?);
        }

        spec.arg(url);
        Ok(spec)
    }

    fn parse(&self, _params: &WfuzzParams, outcome: &ExecutionOutcome) -> ToolResult<Payload> {
        Ok(Payload::Results(output_parsers::json_document_or_text(
            &outcome.stdout,
        )))
    }

    fn targets(&self, params: &WfuzzParams) -> Vec<String> {
        vec![params.url.clone()]
    }
}
