//! `subdomain_enum`: subfinder passive enumeration.

use serde::{Deserialize, Serialize};

use super::checked;
use crate::domain::errors::ToolResult;
use crate::domain::models::{
    ExecutionOutcome, ExecutionSpec, OperationDescriptor, ParamKind, ParamSpec, Payload,
};
use crate::services::invocation::{ExecutionSettings, ToolProfile};
use crate::services::output_parsers;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubfinderParams {
    pub domain: String,
    pub recursive: bool,
}

pub struct SubfinderProfile;

impl ToolProfile for SubfinderProfile {
    type Params = SubfinderParams;

    const BINARY: &'static str = "subfinder";
    const INSTALL_HINT: &'static str = "Please install subfinder: go install -v github.com/projectdiscovery/subfinder/v2/cmd/subfinder@latest";

    fn descriptor(&self) -> OperationDescriptor {
        OperationDescriptor::new(
            "subdomain_enum",
            Self::BINARY,
            "Run subfinder to enumerate subdomains. Returns the subdomains array with a count.",
        )
        .param(ParamSpec::required(
            "domain",
            ParamKind::String,
            "Target domain to enumerate",
        ))
        .param(
            ParamSpec::optional(
                "recursive",
                ParamKind::Boolean,
                "Whether to perform recursive enumeration",
            )
            .with_default(false),
        )
    }

    fn build(&self, params: &SubfinderParams, settings: &ExecutionSettings) -> ToolResult<ExecutionSpec> {
        let mut spec = settings.spec(Self::BINARY);
        spec.arg("-d")
            .arg(checked("domain", &params.domain)?)
            .arg("-json")
            .flag("-recursive", params.recursive);
        Ok(spec)
    }

    fn parse(&self, _params: &SubfinderParams, outcome: &ExecutionOutcome) -> ToolResult<Payload> {
        Ok(Payload::records(
            "subdomains",
            output_parsers::json_lines(&outcome.stdout),
        ))
    }

    fn targets(&self, params: &SubfinderParams) -> Vec<String> {
        vec![params.domain.clone()]
    }
}
