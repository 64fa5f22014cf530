//! `attack_surface_map`: OWASP Amass enumeration.

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
pub struct AmassParams {
    pub domain: String,
    pub passive: bool,
}

pub struct AmassProfile;

impl ToolProfile for AmassProfile {
    type Params = AmassParams;

    const BINARY: &'static str = "amass";
    const INSTALL_HINT: &'static str =
        "Please install amass: go install -v github.com/owasp-amass/amass/v4/...@master";

    fn descriptor(&self) -> OperationDescriptor {
        OperationDescriptor::new(
            "attack_surface_map",
            Self::BINARY,
            "Run Amass to enumerate subdomains and map the attack surface of a domain.",
        )
        .param(ParamSpec::required(
            "domain",
            ParamKind::String,
            "Target domain to enumerate",
        ))
        .param(
            ParamSpec::optional(
                "passive",
                ParamKind::Boolean,
                "Passive enumeration only",
            )
            .with_default(true),
        )
    }

    fn build(&self, params: &AmassParams, settings: &ExecutionSettings) -> ToolResult<ExecutionSpec> {
        let mut spec = settings.spec(Self::BINARY);
        spec.args(["enum", "-d"])
            .arg(checked("domain", &params.domain)?)
            .flag("-passive", params.passive);
        Ok(spec)
    }

    fn parse(&self, _params: &AmassParams, outcome: &ExecutionOutcome) -> ToolResult<Payload> {
        Ok(Payload::records(
            "subdomains",
            output_parsers::text_lines(&outcome.stdout),
        ))
    }

    fn targets(&self, params: &AmassParams) -> Vec<String> {
        vec![params.domain.clone()]
    }
}
