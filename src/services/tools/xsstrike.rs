//! `xss_scan`: XSStrike.

use serde::{Deserialize, Serialize};

use super::checked;
use crate::domain::errors::ToolResult;
use crate::domain::models::{
    ExecutionOutcome, ExecutionSpec, OperationDescriptor, ParamKind, ParamSpec, Payload,
};
use crate::services::invocation::{ExecutionSettings, ToolProfile};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct XsstrikeParams {
    pub url: String,
    pub crawl: bool,
}

pub struct XsstrikeProfile;

impl ToolProfile for XsstrikeProfile {
    type Params = XsstrikeParams;

    const BINARY: &'static str = "xsstrike";
    const INSTALL_HINT: &'static str =
        "Please install XSStrike from https://github.com/s0md3v/XSStrike and put `xsstrike` on PATH.";

    fn descriptor(&self) -> OperationDescriptor {
        OperationDescriptor::new(
            "xss_scan",
            Self::BINARY,
            "Run XSStrike to detect XSS vulnerabilities.",
        )
        .param(ParamSpec::required("url", ParamKind::String, "Target URL to scan"))
        .param(
            ParamSpec::optional(
                "crawl",
                ParamKind::Boolean,
                "Whether to crawl the website for more URLs",
            )
            .with_default(false),
        )
    }

    fn build(&self, params: &XsstrikeParams, settings: &ExecutionSettings) -> ToolResult<ExecutionSpec> {
        let mut spec = settings.spec(Self::BINARY);
        spec.arg("-u")
            .arg(checked("url", &params.url)?)
            .flag("--crawl", params.crawl);
        Ok(spec)
    }

    fn parse(&self, _params: &XsstrikeParams, outcome: &ExecutionOutcome) -> ToolResult<Payload> {
        Ok(Payload::raw_output(outcome.stdout.clone()))
    }

    fn targets(&self, params: &XsstrikeParams) -> Vec<String> {
        vec![params.url.clone()]
    }
}
