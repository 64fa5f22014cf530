//! Process execution spec and outcome.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tempfile::TempPath;

/// Everything needed to launch one external process.
///
/// Owned by a single invocation. Scratch files attached to the spec are
/// removed when the spec is dropped.
#[derive(Debug)]
pub struct ExecutionSpec {
    /// Executable name or path. Never interpreted by a shell.
    pub program: PathBuf,
    pub args: Vec<String>,
    /// Payload written to the child's stdin, which is closed afterwards.
    pub stdin: Option<String>,
    pub timeout: Duration,
    scratch: Vec<TempPath>,
}

impl ExecutionSpec {
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            stdin: None,
            timeout,
            scratch: Vec::new(),
        }
    }

    pub fn arg(&mut self, arg: impl Into<String>) -> &mut Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(&mut self, args: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Append `flag value` only when `value` is present.
    pub fn opt_arg(&mut self, flag: &str, value: Option<impl ToString>) -> &mut Self {
        if let Some(value) = value {
            self.args.push(flag.to_string());
            self.args.push(value.to_string());
        }
        self
    }

    /// Append `flag` only when `enabled`.
    pub fn flag(&mut self, flag: &str, enabled: bool) -> &mut Self {
        if enabled {
            self.args.push(flag.to_string());
        }
        self
    }

    pub fn stdin(&mut self, payload: impl Into<String>) -> &mut Self {
        self.stdin = Some(payload.into());
        self
    }

    pub fn timeout(&mut self, timeout: Duration) -> &mut Self {
        self.timeout = timeout;
        self
    }

    /// Keep a scratch file alive for as long as this spec.
    pub fn attach_scratch(&mut self, path: TempPath) -> &mut Self {
        self.scratch.push(path);
        self
    }

    pub fn scratch_files(&self) -> &[TempPath] {
        &self.scratch
    }

    /// Program and arguments joined for display.
    pub fn command_line(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// Raw result of running an [`ExecutionSpec`] to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutcome {
    /// Exit code, or `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
}

impl ExecutionOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Stderr and stdout joined, for signature matching.
    pub fn combined_output(&self) -> String {
        format!("{}\n{}", self.stderr, self.stdout)
    }
}
