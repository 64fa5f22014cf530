//! `tls_inspect`: tlsx certificate and handshake details.

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
pub struct TlsxParams {
    pub host: String,
    pub port: i64,
}

pub struct TlsxProfile;

impl ToolProfile for TlsxProfile {
    type Params = TlsxParams;

    const BINARY: &'static str = "tlsx";
    const INSTALL_HINT: &'static str =
        "Please install tlsx: go install -v github.com/projectdiscovery/tlsx/cmd/tlsx@latest";

    fn descriptor(&self) -> OperationDescriptor {
        OperationDescriptor::new(
            "tls_inspect",
            Self::BINARY,
            "Run tlsx to analyze TLS configurations.",
        )
        .param(ParamSpec::required(
            "host",
            ParamKind::String,
            "Target hostname or IP address",
        ))
        .param(ParamSpec::optional("port", ParamKind::Integer, "Target port").with_default(443))
    }

    fn build(&self, params: &TlsxParams, settings: &ExecutionSettings) -> ToolResult<ExecutionSpec> {
        let mut spec = settings.spec(Self::BINARY);
        spec.arg("-u")
            .arg(checked("host", &params.host)?)
            .arg("-p")
            .arg(params.port.to_string())
            .args(["-json", "-silent"]);
        Ok(spec)
    }

    fn parse(&self, _params: &TlsxParams, outcome: &ExecutionOutcome) -> ToolResult<Payload> {
        Ok(Payload::records(
            "results",
            output_parsers::json_lines(&outcome.stdout),
        ))
    }

    fn targets(&self, params: &TlsxParams) -> Vec<String> {
        vec![format!("{}:{}", params.host, params.port)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arguments() {
        let params = TlsxParams {
            host: "example.com".into(),
            port: 8443,
        };
        let spec = TlsxProfile.build(&params, &ExecutionSettings::default()).unwrap();
        assert_eq!(
            spec.args,
            vec!["-u", "example.com", "-p", "8443", "-json", "-silent"]
        );
        assert_eq!(TlsxProfile.targets(&params), vec!["example.com:8443"]);
    }
}
