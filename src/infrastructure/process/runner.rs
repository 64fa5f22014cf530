//! Tokio-backed process runner.
//!
//! Spawns the executable directly (no shell), feeds stdin from a separate
//! task, drains stdout/stderr concurrently so a chatty child never blocks
//! on a full pipe, and enforces the execution bound. On timeout the child
//! receives SIGTERM, then SIGKILL after the grace period, and is reaped.
//! The child leads its own process group so the signals reach every
//! process it started.

use async_trait::async_trait;
use chrono::Utc;
use std::io;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tokio::time::timeout;

use crate::domain::models::{ExecutionConfig, ExecutionOutcome, ExecutionSpec};
use crate::domain::ports::{ProcessError, ProcessRunner};

type PipeTask = JoinHandle<io::Result<Vec<u8>>>;

/// Process runner built on `tokio::process`.
#[derive(Debug, Clone)]
pub struct TokioProcessRunner {
    terminate_grace: Duration,
}

impl TokioProcessRunner {
    pub const fn new(terminate_grace: Duration) -> Self {
        Self { terminate_grace }
    }

    pub const fn from_config(config: &ExecutionConfig) -> Self {
        Self::new(Duration::from_millis(config.terminate_grace_ms))
    }

    /// Stop a child that exceeded its bound, together with its process group.
    async fn terminate(&self, child: &mut Child, group: Option<i32>) {
        if group.is_some() {
            signal_group(group, GroupSignal::Terminate);
            let exited = timeout(self.terminate_grace, child.wait()).await.is_ok();
            // descendants that ignored SIGTERM outlive the leader
            signal_group(group, GroupSignal::Kill);
            if exited {
                return;
            }
        }

        if let Err(e) = child.kill().await {
            tracing::warn!(error = %e, "Failed to kill timed out process");
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum GroupSignal {
    Terminate,
    Kill,
}

/// Signal every process in the child's group. The child leads its own
/// group, so its id is the group id.
#[cfg(unix)]
fn signal_group(group: Option<i32>, signal: GroupSignal) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    let Some(group) = group else {
        return;
    };
    let signal = match signal {
        GroupSignal::Terminate => Signal::SIGTERM,
        GroupSignal::Kill => Signal::SIGKILL,
    };
    // ESRCH just means the group is already gone
    if let Err(e) = killpg(Pid::from_raw(group), signal) {
        tracing::trace!(group, error = %e, "Process group signal not delivered");
    }
}

#[cfg(not(unix))]
fn signal_group(_group: Option<i32>, _signal: GroupSignal) {}

impl Default for TokioProcessRunner {
    fn default() -> Self {
        Self::from_config(&ExecutionConfig::default())
    }
}

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(&self, spec: &ExecutionSpec) -> Result<ExecutionOutcome, ProcessError> {
        let mut command = Command::new(&spec.program);
        command
            .args(&spec.args)
            .stdin(if spec.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        command.process_group(0);

        let started_at = Utc::now();
        let started = Instant::now();
        let mut child = command.spawn().map_err(|source| ProcessError::Spawn {
            program: spec.program.display().to_string(),
            source,
        })?;
        let group = child.id().and_then(|pid| i32::try_from(pid).ok());

        let stdin_task = match (child.stdin.take(), spec.stdin.clone()) {
            (Some(mut stdin), Some(payload)) => Some(tokio::spawn(async move {
                // A child may exit without draining stdin; a broken pipe here is not a failure.
                let _ = stdin.write_all(payload.as_bytes()).await;
                let _ = stdin.shutdown().await;
            })),
            _ => None,
        };
        let stdout_task = child.stdout.take().map(|pipe| tokio::spawn(drain(pipe)));
        let stderr_task = child.stderr.take().map(|pipe| tokio::spawn(drain(pipe)));

        let waited = timeout(spec.timeout, child.wait()).await;
        let status = match waited {
            Ok(status) => status?,
            Err(_) => {
                self.terminate(&mut child, group).await;
                abort_all(stdin_task, stdout_task, stderr_task);
                return Err(ProcessError::TimedOut {
                    bound: spec.timeout,
                });
            }
        };

        // Descendants can keep the pipes open after the child exits; reading
        // them is still subject to what remains of the bound.
        let remaining = spec.timeout.saturating_sub(started.elapsed());
        let collected = timeout(remaining, async {
            let stdout = collect(stdout_task).await?;
            let stderr = collect(stderr_task).await?;
            Ok::<_, ProcessError>((stdout, stderr))
        })
        .await;

        if let Some(task) = stdin_task {
            task.abort();
        }

        let (stdout, stderr) = collected.map_err(|_| {
            signal_group(group, GroupSignal::Kill);
            ProcessError::TimedOut {
                bound: spec.timeout,
            }
        })??;

        Ok(ExecutionOutcome {
            exit_code: status.code(),
            stdout,
            stderr,
            started_at,
            elapsed: started.elapsed(),
        })
    }
}

async fn drain<R: AsyncRead + Unpin>(mut pipe: R) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    pipe.read_to_end(&mut buf).await?;
    Ok(buf)
}

async fn collect(task: Option<PipeTask>) -> Result<String, ProcessError> {
    let Some(task) = task else {
        return Ok(String::new());
    };
    let bytes = task.await.map_err(io::Error::other)??;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn abort_all(stdin: Option<JoinHandle<()>>, stdout: Option<PipeTask>, stderr: Option<PipeTask>) {
    if let Some(task) = stdin {
        task.abort();
    }
    for task in [stdout, stderr].into_iter().flatten() {
        task.abort();
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn runner() -> TokioProcessRunner {
        TokioProcessRunner::new(Duration::from_millis(200))
    }

    fn spec(program: &str, args: &[&str], bound: Duration) -> ExecutionSpec {
        let mut spec = ExecutionSpec::new(program, bound);
        spec.args(args.iter().copied());
        spec
    }

    #[tokio::test]
    async fn test_captures_stdout_and_exit_code() {
        let outcome = runner()
            .run(&spec("sh", &["-c", "echo hello; echo oops >&2; exit 3"], Duration::from_secs(5)))
            .await
            .unwrap();
        assert_eq!(outcome.exit_code, Some(3));
        assert_eq!(outcome.stdout, "hello\n");
        assert_eq!(outcome.stderr, "oops\n");
        assert!(!outcome.success());
    }

    #[tokio::test]
    async fn test_stdin_payload_is_delivered() {
        let mut spec = spec("cat", &[], Duration::from_secs(5));
        spec.stdin("a\nb");
        let outcome = runner().run(&spec).await.unwrap();
        assert!(outcome.success());
        assert_eq!(outcome.stdout, "a\nb");
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_error() {
        let err = runner()
            .run(&spec("/nonexistent/definitely-not-here", &[], Duration::from_secs(1)))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_timeout_terminates_child() {
        let started = Instant::now();
        let err = runner()
            .run(&spec("sleep", &["30"], Duration::from_millis(300)))
            .await
            .unwrap_err();
        assert!(matches!(err, ProcessError::TimedOut { .. }));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_arguments_are_not_shell_interpreted() {
        let outcome = runner()
            .run(&spec("echo", &["$(id)", ";", "ls"], Duration::from_secs(5)))
            .await
            .unwrap();
        assert_eq!(outcome.stdout, "$(id) ; ls\n");
    }

    #[cfg(target_os = "linux")]
    fn running(pid: &str) -> bool {
        std::fs::read_to_string(format!("/proc/{pid}/stat"))
            .map(|stat| {
                let state = stat.rsplit(')').next().unwrap_or("").trim_start();
                !state.starts_with('Z') && !state.starts_with('X')
            })
            .unwrap_or(false)
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_timeout_terminates_descendants() {
        let dir = tempfile::tempdir().unwrap();
        let pid_file = dir.path().join("grandchild.pid");
        let script = format!("sleep 30 & echo $! > {}; wait", pid_file.display());

        let err = runner()
            .run(&spec("sh", &["-c", &script], Duration::from_millis(500)))
            .await
            .unwrap_err();
        assert!(matches!(err, ProcessError::TimedOut { .. }));

        let pid = std::fs::read_to_string(&pid_file).unwrap();
        let pid = pid.trim();
        let mut alive = running(pid);
        for _ in 0..20 {
            if !alive {
                break;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
            alive = running(pid);
        }
        assert!(!alive, "grandchild {pid} survived the timeout");
    }
}
