use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tempfile::tempdir;
use tokio::process::Command;

use crate::config::{BuiltinsProfile, ExecutorConfig};
use crate::engine::{ExecutionOutcome, Executor, Fault};
use crate::shim::{python_shim, PYTHON_SHIM_NAME};

/// Runs code in a fresh Python process per call.
///
/// Every call gets its own temporary directory, interpreter process and
/// global namespace; nothing survives between calls. The process is killed
/// if the calling task is dropped or the optional timeout elapses.
#[derive(Debug, Clone)]
pub struct PythonExecutor {
    python: String,
    builtins: BuiltinsProfile,
    timeout: Option<Duration>,
}

impl PythonExecutor {
    pub fn new(cfg: &ExecutorConfig) -> Self {
        Self {
            python: cfg.python.clone(),
            builtins: cfg.builtins,
            timeout: cfg.timeout(),
        }
    }
}

/* ---------------- shim result ---------------- */

#[derive(Debug, Deserialize)]
struct ShimOutput {
    stdout: String,
    stderr: String,
    error: Option<ShimError>,
}

#[derive(Debug, Deserialize)]
struct ShimError {
    #[serde(rename = "type")]
    kind: String,
    message: String,
    traceback: String,
}

impl From<ShimOutput> for ExecutionOutcome {
    fn from(out: ShimOutput) -> Self {
        Self {
            stdout: out.stdout,
            stderr: out.stderr,
            fault: out.error.map(|e| Fault {
                kind: e.kind,
                message: e.message,
                trace: e.traceback,
            }),
        }
    }
}

/* ---------------- invocation ---------------- */

#[async_trait]
impl Executor for PythonExecutor {
    async fn execute(&self, code: &str) -> Result<ExecutionOutcome> {
        let tmp = tempdir().context("Failed to create temp dir")?;

        let shim_path = tmp.path().join(PYTHON_SHIM_NAME);
        tokio::fs::write(&shim_path, python_shim())
            .await
            .context("Failed to write runner shim")?;

        let code_path = tmp.path().join("code.py");
        tokio::fs::write(&code_path, code)
            .await
            .context("Failed to write code file")?;

        let result_path = tmp.path().join("result.json");

        let mut cmd = Command::new(&self.python);
        cmd.arg(&shim_path)
            .arg(&code_path)
            .arg(&result_path)
            .arg(self.builtins.as_str())
            .current_dir(tmp.path())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd
            .spawn()
            .with_context(|| format!("Failed to spawn interpreter {:?}", self.python))?;

        let waiting = child.wait_with_output();
        let output = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, waiting).await {
                Ok(res) => res,
                Err(_) => {
                    tracing::warn!(timeout_ms = limit.as_millis() as u64, "execution timed out");
                    return Ok(timed_out(limit));
                }
            },
            None => waiting.await,
        }
        .context("Failed while waiting for interpreter to complete")?;

        if !result_path.exists() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "Interpreter exited with {} without producing a result: {}",
                output.status,
                stderr.trim()
            );
        }

        read_result(&result_path).await
    }
}

async fn read_result(path: &Path) -> Result<ExecutionOutcome> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read result file {:?}", path))?;

    let parsed: ShimOutput =
        serde_json::from_str(&raw).context("Shim did not emit a valid result document")?;

    Ok(parsed.into())
}

fn timed_out(limit: Duration) -> ExecutionOutcome {
    let message = format!("Execution exceeded {}ms", limit.as_millis());
    ExecutionOutcome {
        stdout: String::new(),
        stderr: String::new(),
        fault: Some(Fault {
            kind: "TimeoutError".to_string(),
            trace: format!("TimeoutError: {}\n", message),
            message,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn python_available() -> bool {
        std::process::Command::new("python3")
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    fn executor(builtins: BuiltinsProfile, timeout_ms: Option<u64>) -> PythonExecutor {
        PythonExecutor::new(&ExecutorConfig {
            python: "python3".to_string(),
            builtins,
            timeout_ms,
        })
    }

    #[tokio::test]
    async fn captures_stdout_verbatim() {
        if !python_available() {
            return;
        }

        let code = "print('Hello, World!')\nresult = 2 + 2\nprint(f'2 + 2 = {result}')";
        let outcome = executor(BuiltinsProfile::Restricted, None)
            .execute(code)
            .await
            .unwrap();

        assert!(outcome.success());
        assert_eq!(outcome.stdout, "Hello, World!\n2 + 2 = 4\n");
        assert_eq!(outcome.stderr, "");
    }

    #[tokio::test]
    async fn fault_keeps_output_captured_before_it() {
        if !python_available() {
            return;
        }

        let outcome = executor(BuiltinsProfile::Restricted, None)
            .execute("print('before')\nraise ValueError('boom')")
            .await
            .unwrap();

        assert_eq!(outcome.stdout, "before\n");
        let fault = outcome.fault.expect("fault expected");
        assert_eq!(fault.kind, "ValueError");
        assert_eq!(fault.message, "boom");
        assert!(fault.trace.contains("Traceback"));
    }

    #[tokio::test]
    async fn restricted_profile_hides_host_builtins() {
        if !python_available() {
            return;
        }

        let exec = executor(BuiltinsProfile::Restricted, None);

        let opened = exec.execute("open('/etc/hostname')").await.unwrap();
        assert_eq!(opened.fault.unwrap().kind, "NameError");

        let imported = exec.execute("import os").await.unwrap();
        assert_eq!(imported.fault.unwrap().kind, "ImportError");

        let classes = exec
            .execute("class Point:\n    x = 1\nprint(Point.x)")
            .await
            .unwrap();
        assert_eq!(classes.stdout, "1\n");
    }

    #[tokio::test]
    async fn full_profile_captures_stderr() {
        if !python_available() {
            return;
        }

        let outcome = executor(BuiltinsProfile::Full, None)
            .execute("import sys\nprint('warn', file=sys.stderr)\nprint('ok')")
            .await
            .unwrap();

        assert!(outcome.success());
        assert_eq!(outcome.stdout, "ok\n");
        assert_eq!(outcome.stderr, "warn\n");
    }

    #[tokio::test]
    async fn whitespace_only_code_runs_cleanly() {
        if !python_available() {
            return;
        }

        let outcome = executor(BuiltinsProfile::Restricted, None)
            .execute("   \n")
            .await
            .unwrap();

        assert!(outcome.success());
        assert_eq!(outcome.stdout, "");
    }

    #[tokio::test]
    async fn lone_surrogates_do_not_break_the_result() {
        if !python_available() {
            return;
        }

        let outcome = executor(BuiltinsProfile::Restricted, None)
            .execute("print('a\\ud800b')")
            .await
            .unwrap();

        assert!(outcome.success());
        assert_eq!(outcome.stdout, "a\\ud800b\n");
    }

    #[tokio::test]
    async fn syntax_errors_are_faults() {
        if !python_available() {
            return;
        }

        let outcome = executor(BuiltinsProfile::Restricted, None)
            .execute("def broken(:\n")
            .await
            .unwrap();

        assert_eq!(outcome.fault.unwrap().kind, "SyntaxError");
    }

    #[tokio::test]
    async fn calls_do_not_share_state() {
        if !python_available() {
            return;
        }

        let exec = executor(BuiltinsProfile::Restricted, None);

        let first = exec.execute("counter = 41\nprint(counter + 1)").await.unwrap();
        let again = exec.execute("counter = 41\nprint(counter + 1)").await.unwrap();
        assert_eq!(first.stdout, "42\n");
        assert_eq!(first.stdout, again.stdout);

        let leaked = exec.execute("print(counter)").await.unwrap();
        assert_eq!(leaked.fault.unwrap().kind, "NameError");
    }

    #[tokio::test]
    async fn timeout_reports_fault() {
        if !python_available() {
            return;
        }

        let outcome = executor(BuiltinsProfile::Restricted, Some(300))
            .execute("while True:\n    pass\n")
            .await
            .unwrap();

        let fault = outcome.fault.unwrap();
        assert_eq!(fault.kind, "TimeoutError");
        assert_eq!(fault.message, "Execution exceeded 300ms");
    }

    #[tokio::test]
    async fn missing_interpreter_is_an_infrastructure_error() {
        let exec = PythonExecutor::new(&ExecutorConfig {
            python: "definitely-not-a-python-binary".to_string(),
            ..ExecutorConfig::default()
        });

        let err = exec.execute("print(1)").await.unwrap_err();
        assert!(err.to_string().contains("Failed to spawn interpreter"));
    }
}
