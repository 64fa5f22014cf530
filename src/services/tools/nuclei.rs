//! `vulnerability_scan`: nuclei template scan.

use serde::{Deserialize, Serialize};

use super::{checked, OutputFormat};
use crate::domain::errors::ToolResult;
use crate::domain::models::{
    ExecutionOutcome, ExecutionSpec, OperationDescriptor, ParamKind, ParamSpec, Payload,
};
use crate::services::invocation::{ExecutionSettings, ToolProfile};
use crate::services::output_parsers;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NucleiParams {
    pub target: String,
    pub templates: Option<Vec<String>>,
    pub severity: Option<String>,
    pub output_format: OutputFormat,
}

pub struct NucleiProfile;

impl ToolProfile for NucleiProfile {
    type Params = NucleiParams;

    const BINARY: &'static str = "nuclei";
    const INSTALL_HINT: &'static str =
        "Please install nuclei: go install -v github.com/projectdiscovery/nuclei/v3/cmd/nuclei@latest";

    fn descriptor(&self) -> OperationDescriptor {
        OperationDescriptor::new(
            "vulnerability_scan",
            Self::BINARY,
            "Run a Nuclei template scan on the specified target. Returns the findings array.",
        )
        .param(ParamSpec::required(
            "target",
            ParamKind::String,
            "The target URL or IP to scan",
        ))
        .param(ParamSpec::optional(
            "templates",
            ParamKind::StringList,
            "Specific templates or template directories to use",
        ))
        .param(ParamSpec::optional(
            "severity",
            ParamKind::String,
            "Filter by severity (critical, high, medium, low, info; comma-separated for several)",
        ))
        .param(
            ParamSpec::optional("output_format", ParamKind::String, "Output format: json or text")
                .with_default("json"),
        )
    }

    fn build(&self, params: &NucleiParams, settings: &ExecutionSettings) -> ToolResult<ExecutionSpec> {
        let mut spec = settings.spec(Self::BINARY);
        spec.arg("-u")
            .arg(checked("target", &params.target)?)
            .arg("-silent");

        if let Some(templates) = params.templates.as_ref().filter(|t| !t.is_empty()) {
            let templates = templates
                .iter()
                .map(|t| checked("templates", t))
                .collect::<ToolResult<Vec<_>>>()?;
            spec.arg("-t").arg(templates.join(","));
        }
        if let Some(ref severity) = params.severity {
            spec.arg("-severity").arg(checked("severity", severity)?);
        }

        spec.flag("-jsonl", params.output_format == OutputFormat::Json);
        Ok(spec)
    }

    fn parse(&self, params: &NucleiParams, outcome: &ExecutionOutcome) -> ToolResult<Payload> {
        Ok(match params.output_format {
            OutputFormat::Json => {
                Payload::records("findings", output_parsers::json_lines(&outcome.stdout))
            }
            OutputFormat::Text => Payload::raw_output(outcome.stdout.clone()),
        })
    }

    fn targets(&self, params: &NucleiParams) -> Vec<String> {
        vec![params.target.clone()]
    }
}
