use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;

pub mod emit;
pub mod events;
pub mod execute;
pub mod frame;
pub mod heartbeat;
pub mod response;
pub mod sink;

pub use execute::PythonExecutor;

/* ---------------- executor boundary ---------------- */

/// Runs a piece of code and reports what it printed and whether it raised.
///
/// `Err` is reserved for infrastructure failures (interpreter missing,
/// unreadable result). A fault raised by the submitted code is data and
/// comes back as `Ok` with `fault` set.
#[async_trait]
pub trait Executor: Send + Sync {
    async fn execute(&self, code: &str) -> Result<ExecutionOutcome>;
}

/// Everything observed while running one piece of code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionOutcome {
    pub stdout: String,
    pub stderr: String,
    pub fault: Option<Fault>,
}

impl ExecutionOutcome {
    pub fn success(&self) -> bool {
        self.fault.is_none()
    }
}

/// A fault raised by submitted code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    /// Exception class name, e.g. `ValueError`.
    pub kind: String,
    pub message: String,
    pub trace: String,
}

impl Fault {
    /// Kind, message and trace joined by newlines.
    pub fn summary(&self) -> String {
        format!("{}\n{}\n{}", self.kind, self.message, self.trace)
    }
}

/* ---------------- sync output ---------------- */

/// Result shape of the request/response path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionResult {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
    pub error: Option<String>,
}

impl From<ExecutionOutcome> for ExecutionResult {
    fn from(outcome: ExecutionOutcome) -> Self {
        Self {
            success: outcome.success(),
            error: outcome.fault.as_ref().map(Fault::summary),
            stdout: outcome.stdout,
            stderr: outcome.stderr,
        }
    }
}
