//! `sql_injection_test`: sqlmap in batch mode.

use serde::{Deserialize, Serialize};

use super::checked;
use crate::domain::errors::ToolResult;
use crate::domain::models::{
    ExecutionOutcome, ExecutionSpec, OperationDescriptor, ParamKind, ParamSpec, Payload,
};
use crate::services::invocation::{ExecutionSettings, ToolProfile};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SqlmapParams {
    pub url: String,
    pub risk: i64,
    pub level: i64,
}

pub struct SqlmapProfile;

impl ToolProfile for SqlmapProfile {
    type Params = SqlmapParams;

    const BINARY: &'static str = "sqlmap";
    const INSTALL_HINT: &'static str =
        "Please install sqlmap from https://sqlmap.org or your package manager.";

    fn descriptor(&self) -> OperationDescriptor {
        OperationDescriptor::new(
            "sql_injection_test",
            Self::BINARY,
            "Run sqlmap to test for SQL injection vulnerabilities. Runs non-interactively; the raw report is returned.",
        )
        .param(ParamSpec::required(
            "url",
            ParamKind::String,
            "Target URL to scan",
        ))
        .param(ParamSpec::optional("risk", ParamKind::Integer, "Risk level (1-3)").with_default(1))
        .param(ParamSpec::optional("level", ParamKind::Integer, "Test level (1-5)").with_default(1))
    }

    fn build(&self, params: &SqlmapParams, settings: &ExecutionSettings) -> ToolResult<ExecutionSpec> {
        let output_dir = settings.scratch_dir.join("sqlmap");
        let mut spec = settings.spec(Self::BINARY);
        spec.arg("-u")
            .arg(checked("url", &params.url)?)
            .arg("--batch")
            .arg(format!("--output-dir={}", output_dir.display()));

        // zero means "leave it to sqlmap"
        if params.risk != 0 {
            spec.arg("--risk").arg(params.risk.to_string());
        }
        if params.level != 0 {
            spec.arg("--level").arg(params.level.to_string());
        }

        Ok(spec)
    }

    fn parse(&self, _params: &SqlmapParams, outcome: &ExecutionOutcome) -> ToolResult<Payload> {
        Ok(Payload::raw_output(outcome.stdout.clone()))
    }

    fn targets(&self, params: &SqlmapParams) -> Vec<String> {
        vec![params.url.clone()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::invocation::decode_arguments;
    use serde_json::json;

    #[test]
    fn test_arguments_use_scratch_dir() {
        let mut settings = ExecutionSettings::default();
        settings.scratch_dir = "/var/tmp/secops".into();
        let params = SqlmapParams {
            url: "http://t.test/item?id=1".into(),
            risk: 2,
            level: 0,
        };
        let spec = SqlmapProfile.build(&params, &settings).unwrap();
        assert_eq!(
            spec.args,
            vec![
                "-u",
                "http://t.test/item?id=1",
                "--batch",
                "--output-dir=/var/tmp/secops/sqlmap",
                "--risk",
                "2"
            ]
        );
    }

    #[test]
    fn test_out_of_range_levels_reach_sqlmap() {
        let params: SqlmapParams = decode_arguments(
            &SqlmapProfile.descriptor(),
            json!({ "url": "http://t.test/?id=1", "risk": -1, "level": 9 }),
        )
        .unwrap();
        let spec = SqlmapProfile.build(&params, &ExecutionSettings::default()).unwrap();
        assert_eq!(spec.args[4..], ["--risk", "-1", "--level", "9"]);
    }
}
