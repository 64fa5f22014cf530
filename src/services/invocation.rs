//! Generic invocation helper shared by every tool adapter.
//!
//! A [`ToolProfile`] supplies only per-tool configuration: the executable
//! name, how typed parameters become an argument vector, how stdout becomes
//! a payload and which output signatures reveal a wrong binary. The
//! [`Invoker`] and [`CommandOperation`] own the control flow around it:
//! argument decoding, execution under a bound, failure classification and
//! envelope rendering.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;
use uuid::Uuid;

use crate::domain::errors::{ToolError, ToolResult};
use crate::domain::models::{
    Config, Envelope, ExecutionOutcome, ExecutionSpec, OperationDescriptor, Payload,
};
use crate::domain::ports::{Operation, ProcessError, ProcessRunner};
use crate::infrastructure::logging::SecretScrubber;
use crate::services::envelope;

/// Output fragments identifying an unrelated program installed under the
/// expected executable name.
#[derive(Debug, Clone, Copy)]
pub struct BinarySignature {
    /// Lowercase substrings matched against combined stdout and stderr
    pub patterns: &'static [&'static str],
    /// Where the right binary comes from
    pub expected: &'static str,
}

impl BinarySignature {
    fn matches(&self, combined_output: &str) -> bool {
        let haystack = combined_output.to_lowercase();
        self.patterns.iter().any(|p| haystack.contains(p))
    }
}

/// Per-tool configuration consumed by [`CommandOperation`].
pub trait ToolProfile: Send + Sync + 'static {
    /// Typed parameters, decoded from the request after defaults are applied.
    type Params: DeserializeOwned + Serialize + Send + Sync;

    /// Executable name, resolved against configured binary overrides.
    const BINARY: &'static str;

    /// Appended to the not-found message.
    const INSTALL_HINT: &'static str;

    fn descriptor(&self) -> OperationDescriptor;

    /// Build the execution spec. Scratch files it creates must be
    /// attached to the returned spec.
    fn build(&self, params: &Self::Params, settings: &ExecutionSettings)
        -> ToolResult<ExecutionSpec>;

    fn parse(&self, params: &Self::Params, outcome: &ExecutionOutcome) -> ToolResult<Payload>;

    /// Targets reported back when the bound is exceeded.
    fn targets(&self, params: &Self::Params) -> Vec<String>;

    /// Request parameters echoed into the envelope.
    fn echo(&self, params: &Self::Params) -> Map<String, Value> {
        echo_params(params)
    }

    fn signature(&self) -> Option<&'static BinarySignature> {
        None
    }

    fn accepts_exit(&self, exit_code: Option<i32>) -> bool {
        exit_code == Some(0)
    }
}

/// Serialize parameters into an echo map.
pub fn echo_params<T: Serialize>(params: &T) -> Map<String, Value> {
    match serde_json::to_value(params) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

/// Startup-time execution settings shared by all adapters.
#[derive(Debug, Clone)]
pub struct ExecutionSettings {
    binaries: HashMap<String, String>,
    pub default_timeout: Duration,
    pub scratch_dir: PathBuf,
}

impl ExecutionSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            binaries: config.binaries.clone(),
            default_timeout: Duration::from_secs(config.execution.default_timeout_secs),
            scratch_dir: config.execution.scratch_dir.clone(),
        }
    }

    /// Executable path for a tool binary, honoring overrides.
    pub fn program(&self, binary: &str) -> PathBuf {
        self.binaries
            .get(binary)
            .map_or_else(|| PathBuf::from(binary), PathBuf::from)
    }

    /// Fresh execution spec for a binary under the default bound.
    pub fn spec(&self, binary: &str) -> ExecutionSpec {
        ExecutionSpec::new(self.program(binary), self.default_timeout)
    }
}

impl Default for ExecutionSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Runs execution specs and classifies their failures.
pub struct Invoker {
    runner: Arc<dyn ProcessRunner>,
    settings: ExecutionSettings,
    scrubber: SecretScrubber,
}

impl Invoker {
    pub fn new(runner: Arc<dyn ProcessRunner>, settings: ExecutionSettings) -> Self {
        Self {
            runner,
            settings,
            scrubber: SecretScrubber::new(),
        }
    }

    pub const fn settings(&self) -> &ExecutionSettings {
        &self.settings
    }

    /// Run one process for a profile. Exit statuses the profile does not
    /// accept are classified into a [`ToolError`].
    pub async fn run<P: ToolProfile>(
        &self,
        profile: &P,
        spec: &ExecutionSpec,
        targets: Vec<String>,
    ) -> ToolResult<ExecutionOutcome> {
        let command = self
            .scrubber
            .scrub_command(&spec.program.display().to_string(), &spec.args);

        tracing::info!(
            tool = P::BINARY,
            command = %command,
            timeout_secs = spec.timeout.as_secs(),
            stdin = spec.stdin.is_some(),
            "Launching external tool"
        );

        let outcome = self
            .runner
            .run(spec)
            .await
            .map_err(|e| process_failure(P::BINARY, P::INSTALL_HINT, e, targets, command))?;

        tracing::info!(
            tool = P::BINARY,
            exit_code = ?outcome.exit_code,
            elapsed_ms = u64::try_from(outcome.elapsed.as_millis()).unwrap_or(u64::MAX),
            stdout_bytes = outcome.stdout.len(),
            "External tool finished"
        );

        if profile.accepts_exit(outcome.exit_code) {
            Ok(outcome)
        } else {
            Err(classify_failure(
                P::BINARY,
                P::INSTALL_HINT,
                profile.signature(),
                outcome,
            ))
        }
    }
}

fn process_failure(
    tool: &str,
    install_hint: &str,
    error: ProcessError,
    targets: Vec<String>,
    command: String,
) -> ToolError {
    if error.is_not_found() {
        return ToolError::ToolNotFound {
            tool: tool.to_string(),
            install_hint: install_hint.to_string(),
        };
    }
    match error {
        ProcessError::TimedOut { bound } => ToolError::Timeout {
            tool: tool.to_string(),
            bound_secs: bound.as_secs(),
            targets,
            command,
        },
        other => ToolError::ExecutionFailed {
            tool: tool.to_string(),
            exit_code: None,
            stderr: other.to_string(),
            stdout: String::new(),
        },
    }
}

/// Classify a completed run whose exit status was not accepted.
///
/// Signature matches win over everything else, then shell-style exit 127
/// means the executable was missing, and anything left is a plain failure.
pub fn classify_failure(
    tool: &str,
    install_hint: &str,
    signature: Option<&BinarySignature>,
    outcome: ExecutionOutcome,
) -> ToolError {
    if let Some(signature) = signature {
        if signature.matches(&outcome.combined_output()) {
            return ToolError::WrongBinaryVariant {
                tool: tool.to_string(),
                expected: signature.expected.to_string(),
                stderr: outcome.stderr,
                stdout: outcome.stdout,
            };
        }
    }

    if outcome.exit_code == Some(127) {
        return ToolError::ToolNotFound {
            tool: tool.to_string(),
            install_hint: install_hint.to_string(),
        };
    }

    ToolError::ExecutionFailed {
        tool: tool.to_string(),
        exit_code: outcome.exit_code,
        stderr: outcome.stderr,
        stdout: outcome.stdout,
    }
}

/// Decode request arguments against a descriptor.
///
/// Required parameters must be present and non-empty; absent or null
/// optional parameters take their declared default.
pub fn decode_arguments<T: DeserializeOwned>(
    descriptor: &OperationDescriptor,
    arguments: Value,
) -> ToolResult<T> {
    let mut object = match arguments {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        _ => {
            return Err(ToolError::invalid(format!(
                "Arguments for {} must be a JSON object",
                descriptor.name
            )))
        }
    };

    for param in &descriptor.params {
        let supplied = object.get(param.name).filter(|v| !v.is_null());
        if let Some(value) = supplied {
            if param.required {
                ensure_not_empty(param.name, value)?;
            }
        } else if param.required {
            return Err(ToolError::invalid(format!(
                "Missing required parameter: {}",
                param.name
            )));
        } else if let Some(ref default) = param.default {
            object.insert(param.name.to_string(), default.clone());
        }
    }

    serde_json::from_value(Value::Object(object)).map_err(|e| {
        ToolError::invalid(format!("Invalid arguments for {}: {e}", descriptor.name))
    })
}

fn ensure_not_empty(name: &str, value: &Value) -> ToolResult<()> {
    match value {
        Value::String(s) if s.trim().is_empty() => Err(ToolError::invalid(format!(
            "Parameter '{name}' must not be empty"
        ))),
        Value::Array(items) if items.is_empty() => Err(ToolError::invalid(format!(
            "Parameter '{name}' requires at least one value"
        ))),
        _ => Ok(()),
    }
}

/// An [`Operation`] backed by one external tool.
pub struct CommandOperation<P: ToolProfile> {
    profile: P,
    descriptor: OperationDescriptor,
    invoker: Arc<Invoker>,
}

impl<P: ToolProfile> CommandOperation<P> {
    pub fn new(profile: P, invoker: Arc<Invoker>) -> Self {
        let descriptor = profile.descriptor();
        Self {
            profile,
            descriptor,
            invoker,
        }
    }

    async fn execute(&self, params: &P::Params) -> ToolResult<Payload> {
        let spec = self.profile.build(params, self.invoker.settings())?;
        let outcome = self
            .invoker
            .run(&self.profile, &spec, self.profile.targets(params))
            .await?;
        self.profile.parse(params, &outcome)
    }

    async fn invoke_inner(&self, arguments: Value) -> Envelope {
        let raw_echo = arguments.as_object().cloned().unwrap_or_default();
        let params: P::Params = match decode_arguments(&self.descriptor, arguments) {
            Ok(params) => params,
            Err(e) => {
                tracing::warn!(error = %e, "Rejected arguments");
                return envelope::failure(raw_echo, &e);
            }
        };

        let echo = self.profile.echo(&params);
        match self.execute(&params).await {
            Ok(payload) => envelope::success(echo, payload),
            Err(e) => {
                tracing::warn!(error_kind = %e.kind(), error = %e, "Operation failed");
                envelope::failure(echo, &e)
            }
        }
    }
}

#[async_trait]
impl<P: ToolProfile> Operation for CommandOperation<P> {
    fn descriptor(&self) -> &OperationDescriptor {
        &self.descriptor
    }

    async fn invoke(&self, arguments: Value) -> Envelope {
        let span = tracing::info_span!(
            "invocation",
            operation = self.descriptor.name,
            invocation_id = %Uuid::new_v4()
        );
        self.invoke_inner(arguments).instrument(span).await
    }
}
