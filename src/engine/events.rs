use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Lifecycle of one streamed execution.
///
/// Always `ExecutionStart` first and `ExecutionComplete` last.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExecutionEvent {
    ExecutionStart {
        execution_id: String,
        timestamp: String,
    },
    Stdout {
        content: String,
    },
    Stderr {
        content: String,
    },
    Error {
        error_type: String,
        error_message: String,
        trace: String,
    },
    ExecutionComplete {
        success: bool,
        timestamp: String,
    },
}

impl ExecutionEvent {
    pub fn start(execution_id: &str) -> Self {
        Self::ExecutionStart {
            execution_id: execution_id.to_string(),
            timestamp: now(),
        }
    }

    pub fn complete(success: bool) -> Self {
        Self::ExecutionComplete {
            success,
            timestamp: now(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::ExecutionStart { .. } => "execution_start",
            Self::Stdout { .. } => "stdout",
            Self::Stderr { .. } => "stderr",
            Self::Error { .. } => "error",
            Self::ExecutionComplete { .. } => "execution_complete",
        }
    }
}

/// Events of the long-lived heartbeat stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConnectionEvent {
    ConnectionEstablished { timestamp: String },
    Heartbeat { sequence: u64, timestamp: String },
    ConnectionClosed { timestamp: String },
}

impl ConnectionEvent {
    pub fn established() -> Self {
        Self::ConnectionEstablished { timestamp: now() }
    }

    pub fn heartbeat(sequence: u64) -> Self {
        Self::Heartbeat {
            sequence,
            timestamp: now(),
        }
    }

    pub fn closed() -> Self {
        Self::ConnectionClosed { timestamp: now() }
    }
}
