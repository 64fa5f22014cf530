//! `network_scan`: nmap with XML output on stdout.

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::checked;
use crate::domain::errors::{ToolError, ToolResult};
use crate::domain::models::{
    ExecutionOutcome, ExecutionSpec, OperationDescriptor, ParamKind, ParamSpec, Payload,
};
use crate::services::invocation::{ExecutionSettings, ToolProfile};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NmapParams {
    pub target: String,
    pub ports: Option<String>,
    pub scan_type: Option<String>,
}

pub struct NmapProfile;

impl ToolProfile for NmapProfile {
    type Params = NmapParams;

    const BINARY: &'static str = "nmap";
    const INSTALL_HINT: &'static str =
        "Please install nmap from https://nmap.org/download or your package manager.";

    fn descriptor(&self) -> OperationDescriptor {
        OperationDescriptor::new(
            "network_scan",
            Self::BINARY,
            "Run an Nmap network scan on the specified target. Returns the raw XML report under results.xml_output.",
        )
        .param(ParamSpec::required(
            "target",
            ParamKind::String,
            "The target IP or hostname to scan",
        ))
        .param(ParamSpec::optional(
            "ports",
            ParamKind::String,
            "Specific ports to scan (e.g. \"22,80,443\")",
        ))
        .param(
            ParamSpec::optional(
                "scan_type",
                ParamKind::String,
                "Scan type letters without the dash (e.g. \"sV\" for version detection, \"sS\" for SYN scan)",
            )
            .with_default("sV"),
        )
    }

    fn build(&self, params: &NmapParams, settings: &ExecutionSettings) -> ToolResult<ExecutionSpec> {
        let mut spec = settings.spec(Self::BINARY);
        spec.args(["-oX", "-"]).arg(checked("target", &params.target)?);

        if let Some(ref ports) = params.ports {
            spec.arg("-p").arg(checked("ports", ports)?);
        }

        if let Some(scan_type) = params.scan_type.as_deref().map(str::trim) {
            if !scan_type.is_empty() {
                if !scan_type.chars().all(|c| c.is_ascii_alphanumeric()) {
                    return Err(ToolError::invalid(format!(
                        "scan_type must be nmap option letters such as \"sV\", got '{scan_type}'"
                    )));
                }
                spec.arg(format!("-{scan_type}"));
            }
        }

        Ok(spec)
    }

    fn parse(&self, _params: &NmapParams, outcome: &ExecutionOutcome) -> ToolResult<Payload> {
        Ok(Payload::Results(json!({ "xml_output": outcome.stdout })))
    }

    fn targets(&self, params: &NmapParams) -> Vec<String> {
        vec![params.target.clone()]
    }
}
