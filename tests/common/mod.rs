//! Common test utilities for integration tests
//!
//! Provides a scripted process runner and helpers for building
//! registries around it.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use secops_mcp::domain::models::{Config, ExecutionOutcome, ExecutionSpec};
use secops_mcp::domain::ports::{ProcessError, ProcessRunner};
use secops_mcp::services::{registry_with_runner, OperationRegistry};

/// What a recorded invocation looked like.
#[derive(Debug, Clone)]
pub struct RecordedSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub stdin: Option<String>,
    pub timeout: Duration,
}

/// Canned reply for one run.
pub enum Reply {
    Exit { code: i32, stdout: String, stderr: String },
    TimedOut,
    NotFound,
}

impl Reply {
    pub fn ok(stdout: &str) -> Self {
        Self::Exit {
            code: 0,
            stdout: stdout.to_string(),
            stderr: String::new(),
        }
    }

    pub fn exit(code: i32, stdout: &str, stderr: &str) -> Self {
        Self::Exit {
            code,
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        }
    }
}

/// Process runner that records every spec and replays canned replies.
///
/// When the queue is empty, runs succeed with empty output.
#[derive(Default)]
pub struct StubRunner {
    replies: Mutex<VecDeque<Reply>>,
    recorded: Mutex<Vec<RecordedSpec>>,
}

impl StubRunner {
    pub fn with_replies(replies: impl IntoIterator<Item = Reply>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into_iter().collect()),
            recorded: Mutex::default(),
        })
    }

    pub fn recorded(&self) -> Vec<RecordedSpec> {
        self.recorded.lock().unwrap().clone()
    }

    pub fn last(&self) -> RecordedSpec {
        self.recorded().pop().expect("no process was run")
    }
}

#[async_trait]
impl ProcessRunner for StubRunner {
    async fn run(&self, spec: &ExecutionSpec) -> Result<ExecutionOutcome, ProcessError> {
        self.recorded.lock().unwrap().push(RecordedSpec {
            program: spec.program.clone(),
            args: spec.args.clone(),
            stdin: spec.stdin.clone(),
            timeout: spec.timeout,
        });

        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Reply::ok(""));

        match reply {
            Reply::Exit { code, stdout, stderr } => Ok(ExecutionOutcome {
                exit_code: Some(code),
                stdout,
                stderr,
                started_at: Utc::now(),
                elapsed: Duration::from_millis(5),
            }),
            Reply::TimedOut => Err(ProcessError::TimedOut {
                bound: spec.timeout,
            }),
            Reply::NotFound => Err(ProcessError::Spawn {
                program: spec.program.display().to_string(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            }),
        }
    }
}

/// Registry over a stub runner with default configuration.
pub fn stub_registry(runner: &Arc<StubRunner>) -> OperationRegistry {
    registry_with_runner(&Config::default(), Arc::clone(runner) as Arc<dyn ProcessRunner>)
        .expect("catalog registers")
}

/// Dispatch and parse the rendered envelope.
pub async fn call(registry: &OperationRegistry, name: &str, arguments: Value) -> Value {
    let (success, text) = registry.dispatch_text(name, arguments).await;
    let envelope: Value = serde_json::from_str(&text).expect("envelope is JSON");
    assert_eq!(envelope["success"], success);
    envelope
}

/// Write an executable shell script that stands in for a tool binary.
#[cfg(unix)]
pub fn stub_binary(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write stub binary");
    let mut permissions = std::fs::metadata(&path).unwrap().permissions();
    permissions.set_mode(0o755);
    std::fs::set_permissions(&path, permissions).unwrap();
    path
}
