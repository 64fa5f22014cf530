//! `ip_lookup`: ipinfo.io through curl.

use serde::{Deserialize, Serialize};
use std::net::IpAddr;

use crate::domain::errors::{ToolError, ToolResult};
use crate::domain::models::{
    ExecutionOutcome, ExecutionSpec, OperationDescriptor, ParamKind, ParamSpec, Payload,
};
use crate::services::invocation::{ExecutionSettings, ToolProfile};
use crate::services::output_parsers;

const IPINFO_BASE: &str = "https://ipinfo.io";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IpinfoParams {
    pub ip: Option<String>,
}

impl IpinfoParams {
    fn address(&self) -> ToolResult<Option<IpAddr>> {
        match self.ip.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|_| ToolError::invalid(format!("Invalid IP address: {raw}"))),
        }
    }
}

pub struct IpinfoProfile;

impl ToolProfile for IpinfoProfile {
    type Params = IpinfoParams;

    const BINARY: &'static str = "curl";
    const INSTALL_HINT: &'static str = "Please install curl.";

    fn descriptor(&self) -> OperationDescriptor {
        OperationDescriptor::new(
            "ip_lookup",
            "ipinfo",
            "Get IP information (location, ISP, ASN) from ipinfo.io.",
        )
        .param(ParamSpec::optional(
            "ip",
            ParamKind::String,
            "IP address to look up. The current host's public IP when omitted.",
        ))
    }

    fn build(&self, params: &IpinfoParams, settings: &ExecutionSettings) -> ToolResult<ExecutionSpec> {
        let url = match params.address()? {
            Some(ip) => format!("{IPINFO_BASE}/{ip}/json"),
            None => format!("{IPINFO_BASE}/json"),
        };
        let mut spec = settings.spec(Self::BINARY);
        spec.args(["-sS", "--max-time", "30"]).arg(url);
        Ok(spec)
    }

    fn parse(&self, _params: &IpinfoParams, outcome: &ExecutionOutcome) -> ToolResult<Payload> {
        Ok(Payload::Results(output_parsers::json_document_or_text(
            &outcome.stdout,
        )))
    }

    fn targets(&self, params: &IpinfoParams) -> Vec<String> {
        params.ip.iter().cloned().collect()
    }
}
