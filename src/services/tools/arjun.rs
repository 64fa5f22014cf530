//! HTTP parameter discovery with Arjun.
//!
//! Three operations share the same argument builder and output scraper:
//! `param_discover` for one URL, `param_discover_custom` which adds
//! caller-supplied parameter names through a scratch wordlist, and
//! `param_discover_bulk` which runs one arjun process per URL in order.

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::io::Write;
use std::sync::{Arc, LazyLock};
use tracing::Instrument;
use uuid::Uuid;

use super::{checked, scratch_failure, OutputFormat};
use crate::domain::errors::{ToolError, ToolResult};
use crate::domain::models::{
    Envelope, ExecutionOutcome, ExecutionSpec, OperationDescriptor, ParamKind, ParamSpec, Payload,
};
use crate::domain::ports::Operation;
use crate::services::envelope;
use crate::services::invocation::{
    decode_arguments, echo_params, ExecutionSettings, Invoker, ToolProfile,
};

const BINARY: &str = "arjun";
const INSTALL_HINT: &str = "Please install Arjun: pip install arjun";
const DEFAULT_REQUEST_TIMEOUT: i64 = 10;

static ANSI_ESCAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b\[[0-9;]*[A-Za-z]").expect("valid regex"));

static PARAMETERS_FOUND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)parameters found:\s*(.*)$").expect("valid regex"));

/// Parameter names from arjun's `Parameters found:` summary line.
pub fn parse_parameters(stdout: &str) -> Vec<Value> {
    let plain = ANSI_ESCAPE.replace_all(stdout, "");
    plain
        .lines()
        .filter_map(|line| PARAMETERS_FOUND.captures(line.trim()))
        .last()
        .map(|caps| {
            caps[1]
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(|name| Value::String(name.to_string()))
                .collect()
        })
        .unwrap_or_default()
}

fn method(raw: &str) -> ToolResult<String> {
    let method = raw.trim();
    if !method.is_empty() && method.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(method.to_ascii_uppercase())
    } else {
        Err(ToolError::invalid(format!("Invalid HTTP method: '{raw}'")))
    }
}

fn base_spec(settings: &ExecutionSettings, url: &str, http_method: &str) -> ToolResult<ExecutionSpec> {
    let mut spec = settings.spec(BINARY);
    spec.arg("-u")
        .arg(checked("url", url)?)
        .arg("-m")
        .arg(method(http_method)?);
    Ok(spec)
}

fn tuning(spec: &mut ExecutionSpec, timeout: i64, threads: i64, stable: bool) {
    spec.arg("-T")
        .arg(timeout.to_string())
        .arg("-t")
        .arg(threads.to_string())
        .flag("--stable", stable);
}

fn parameters_payload(format: OutputFormat, outcome: &ExecutionOutcome) -> Payload {
    match format {
        OutputFormat::Json => Payload::records("parameters", parse_parameters(&outcome.stdout)),
        OutputFormat::Text => Payload::raw_output(outcome.stdout.clone()),
    }
}

fn method_param() -> ParamSpec {
    ParamSpec::optional("method", ParamKind::String, "HTTP method to use (GET, POST, JSON, XML)")
        .with_default("GET")
}

fn threads_param() -> ParamSpec {
    ParamSpec::optional("threads", ParamKind::Integer, "Number of threads to use").with_default(25)
}

fn stable_param() -> ParamSpec {
    ParamSpec::optional(
        "stable",
        ParamKind::Boolean,
        "Stable mode: slower, fewer false positives",
    )
    .with_default(false)
}

fn timeout_param() -> ParamSpec {
    ParamSpec::optional("timeout", ParamKind::Integer, "Request timeout in seconds")
        .with_default(DEFAULT_REQUEST_TIMEOUT)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArjunParams {
    pub url: String,
    pub method: String,
    pub wordlist: Option<String>,
    pub headers: Option<Vec<String>>,
    pub data: Option<String>,
    pub delay: i64,
    pub timeout: i64,
    pub threads: i64,
    pub stable: bool,
    pub output_format: OutputFormat,
}

pub struct ArjunProfile;

impl ToolProfile for ArjunProfile {
    type Params = ArjunParams;

    const BINARY: &'static str = BINARY;
    const INSTALL_HINT: &'static str = INSTALL_HINT;

    fn descriptor(&self) -> OperationDescriptor {
        OperationDescriptor::new(
            "param_discover",
            BINARY,
            "Run Arjun to discover hidden HTTP parameters of a web endpoint.",
        )
        .param(ParamSpec::required(
            "url",
            ParamKind::String,
            "Target URL to scan for parameters",
        ))
        .param(method_param())
        .param(ParamSpec::optional(
            "wordlist",
            ParamKind::String,
            "Custom wordlist file path",
        ))
        .param(ParamSpec::optional(
            "headers",
            ParamKind::StringList,
            "Custom headers (e.g. [\"Authorization: Bearer token\"])",
        ))
        .param(ParamSpec::optional(
            "data",
            ParamKind::String,
            "Data included in every request body",
        ))
        .param(
            ParamSpec::optional("delay", ParamKind::Integer, "Delay between requests in seconds")
                .with_default(0),
        )
        .param(timeout_param())
        .param(threads_param())
        .param(stable_param())
        .param(
            ParamSpec::optional("output_format", ParamKind::String, "Output format: json or text")
                .with_default("json"),
        )
    }

    fn build(&self, params: &ArjunParams, settings: &ExecutionSettings) -> ToolResult<ExecutionSpec> {
        let mut spec = base_spec(settings, &params.url, &params.method)?;

        if let Some(ref wordlist) = params.wordlist {
            spec.arg("-w").arg(checked("wordlist", wordlist)?);
        }
        if let Some(headers) = params.headers.as_ref().filter(|h| !h.is_empty()) {
            let headers = headers
                .iter()
                .map(|h| checked("headers", h))
                .collect::<ToolResult<Vec<_>>>()?;
            spec.arg("--headers").arg(headers.join("\n"));
        }
        if let Some(ref data) = params.data {
            spec.arg("--include").arg(checked("data", data)?);
        }

        spec.arg("-d").arg(params.delay.to_string());
        tuning(&mut spec, params.timeout, params.threads, params.stable);
        Ok(spec)
    }

    fn parse(&self, params: &ArjunParams, outcome: &ExecutionOutcome) -> ToolResult<Payload> {
        Ok(parameters_payload(params.output_format, outcome))
    }

    fn targets(&self, params: &ArjunParams) -> Vec<String> {
        vec![params.url.clone()]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArjunCustomParams {
    pub url: String,
    pub method: String,
    pub custom_params: Option<Vec<String>>,
    pub wordlist: Option<String>,
    pub timeout: i64,
    pub threads: i64,
    pub stable: bool,
}

pub struct ArjunCustomProfile;

impl ArjunCustomProfile {
    /// Write custom names, then the optional wordlist, into a scratch
    /// wordlist that lives as long as the returned spec.
    fn scratch_wordlist(
        spec: &mut ExecutionSpec,
        settings: &ExecutionSettings,
        names: &[String],
        wordlist: Option<&str>,
    ) -> ToolResult<()> {
        let mut contents = String::new();
        for name in names {
            let name = name.trim();
            if name.is_empty() || name.chars().any(char::is_whitespace) {
                return Err(ToolError::invalid(format!(
                    "Custom parameter names must be non-empty and contain no whitespace, got '{name}'"
                )));
            }
            contents.push_str(name);
            contents.push('\n');
        }

        if let Some(wordlist) = wordlist {
            let wordlist = checked("wordlist", wordlist)?;
            let extra = std::fs::read_to_string(wordlist).map_err(|e| {
                ToolError::invalid(format!("Cannot read wordlist {wordlist}: {e}"))
            })?;
            contents.push_str(&extra);
        }

        let mut file = tempfile::Builder::new()
            .prefix("arjun-params-")
            .suffix(".txt")
            .tempfile_in(&settings.scratch_dir)
            .map_err(|e| scratch_failure(BINARY, &e))?;
        file.write_all(contents.as_bytes())
            .and_then(|()| file.flush())
            .map_err(|e| scratch_failure(BINARY, &e))?;

        let path = file.into_temp_path();
        spec.arg("-w").arg(path.display().to_string());
        spec.attach_scratch(path);
        Ok(())
    }
}

impl ToolProfile for ArjunCustomProfile {
    type Params = ArjunCustomParams;

    const BINARY: &'static str = BINARY;
    const INSTALL_HINT: &'static str = INSTALL_HINT;

    fn descriptor(&self) -> OperationDescriptor {
        OperationDescriptor::new(
            "param_discover_custom",
            BINARY,
            "Run Arjun with caller-supplied parameter names tested alongside an optional wordlist.",
        )
        .param(ParamSpec::required("url", ParamKind::String, "Target URL to scan"))
        .param(method_param())
        .param(ParamSpec::optional(
            "custom_params",
            ParamKind::StringList,
            "Parameter names to test (e.g. [\"api_key\", \"token\"])",
        ))
        .param(ParamSpec::optional(
            "wordlist",
            ParamKind::String,
            "Custom wordlist file path",
        ))
        .param(timeout_param())
        .param(threads_param())
        .param(stable_param())
    }

    fn build(
        &self,
        params: &ArjunCustomParams,
        settings: &ExecutionSettings,
    ) -> ToolResult<ExecutionSpec> {
        let mut spec = base_spec(settings, &params.url, &params.method)?;

        match params.custom_params.as_deref() {
            Some(names) if !names.is_empty() => {
                Self::scratch_wordlist(&mut spec, settings, names, params.wordlist.as_deref())?;
            }
            _ => {
                if let Some(ref wordlist) = params.wordlist {
                    spec.arg("-w").arg(checked("wordlist", wordlist)?);
                }
            }
        }

        tuning(&mut spec, params.timeout, params.threads, params.stable);
        Ok(spec)
    }

    fn parse(&self, _params: &ArjunCustomParams, outcome: &ExecutionOutcome) -> ToolResult<Payload> {
        Ok(parameters_payload(OutputFormat::Json, outcome))
    }

    fn targets(&self, params: &ArjunCustomParams) -> Vec<String> {
        vec![params.url.clone()]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArjunBulkParams {
    pub urls: Vec<String>,
    pub method: String,
    pub wordlist: Option<String>,
    pub threads: i64,
    pub stable: bool,
}

impl ArjunBulkParams {
    fn single(&self, url: &str) -> ArjunParams {
        ArjunParams {
            url: url.to_string(),
            method: self.method.clone(),
            wordlist: self.wordlist.clone(),
            headers: None,
            data: None,
            delay: 0,
            timeout: DEFAULT_REQUEST_TIMEOUT,
            threads: self.threads,
            stable: self.stable,
            output_format: OutputFormat::Json,
        }
    }
}

/// `param_discover_bulk`: sequential arjun runs aggregated into one envelope.
///
/// A failing URL yields an error record in `results`; the envelope itself
/// only fails when the request arguments are invalid.
pub struct ArjunBulkOperation {
    descriptor: OperationDescriptor,
    invoker: Arc<Invoker>,
}

impl ArjunBulkOperation {
    pub fn new(invoker: Arc<Invoker>) -> Self {
        let descriptor = OperationDescriptor::new(
            "param_discover_bulk",
            BINARY,
            "Run Arjun parameter discovery on multiple URLs, one after another. Returns per-URL results.",
        )
        .param(ParamSpec::required(
            "urls",
            ParamKind::StringList,
            "Target URLs to scan",
        ))
        .param(method_param())
        .param(ParamSpec::optional(
            "wordlist",
            ParamKind::String,
            "Custom wordlist file path",
        ))
        .param(threads_param())
        .param(stable_param());

        Self {
            descriptor,
            invoker,
        }
    }

    async fn scan(&self, params: &ArjunParams) -> ToolResult<Vec<Value>> {
        let spec = ArjunProfile.build(params, self.invoker.settings())?;
        let outcome = self
            .invoker
            .run(&ArjunProfile, &spec, vec![params.url.clone()])
            .await?;
        Ok(parse_parameters(&outcome.stdout))
    }

    async fn scan_all(&self, arguments: Value) -> Envelope {
        let raw_echo = arguments.as_object().cloned().unwrap_or_default();
        let params: ArjunBulkParams = match decode_arguments(&self.descriptor, arguments) {
            Ok(params) => params,
            Err(e) => {
                tracing::warn!(error = %e, "Rejected arguments");
                return envelope::failure(raw_echo, &e);
            }
        };

        let mut results = Vec::with_capacity(params.urls.len());
        for url in &params.urls {
            let record = match self.scan(&params.single(url)).await {
                Ok(parameters) => json!({
                    "url": url,
                    "success": true,
                    "count": parameters.len(),
                    "parameters": parameters,
                }),
                Err(e) => {
                    tracing::warn!(url = %url, error_kind = %e.kind(), error = %e, "Bulk scan entry failed");
                    json!({
                        "url": url,
                        "success": false,
                        "error": e.to_string(),
                        "error_kind": e.kind(),
                    })
                }
            };
            results.push(record);
        }

        envelope::success(echo_params(&params), Payload::records("results", results))
    }
}

#[async_trait]
impl Operation for ArjunBulkOperation {
    fn descriptor(&self) -> &OperationDescriptor {
        &self.descriptor
    }

    async fn invoke(&self, arguments: Value) -> Envelope {
        let span = tracing::info_span!(
            "invocation",
            operation = self.descriptor.name,
            invocation_id = %Uuid::new_v4()
        );
        self.scan_all(arguments).instrument(span).await
    }
}
