use std::time::Instant;

use crate::engine::events::ExecutionEvent;
use crate::engine::sink::EventSink;
use crate::engine::Executor;
use crate::execution_id::ExecutionId;

/// Run `code` and report its lifecycle to `sink`.
///
/// Emission order is start, stdout, stderr, error, complete; the middle three
/// only when there is something to say. Emission stops at the first sink
/// failure, which means the receiver went away.
///
/// Returns whether the execution succeeded, or `None` if the sink closed
/// before completion was reported.
pub async fn emit_events<S>(
    executor: &dyn Executor,
    code: &str,
    execution_id: &ExecutionId,
    sink: &mut S,
) -> Option<bool>
where
    S: EventSink<ExecutionEvent> + ?Sized,
{
    // ---- execution started ----
    if sink.emit(ExecutionEvent::start(&execution_id.0)).is_err() {
        return None;
    }

    let started = Instant::now();
    let mut events = Vec::with_capacity(4);

    let success = match executor.execute(code).await {
        Ok(outcome) => {
            if !outcome.stdout.is_empty() {
                events.push(ExecutionEvent::Stdout {
                    content: outcome.stdout,
                });
            }
            if !outcome.stderr.is_empty() {
                events.push(ExecutionEvent::Stderr {
                    content: outcome.stderr,
                });
            }
            match outcome.fault {
                Some(fault) => {
                    events.push(ExecutionEvent::Error {
                        error_type: fault.kind,
                        error_message: fault.message,
                        trace: fault.trace,
                    });
                    false
                }
                None => true,
            }
        }
        Err(e) => {
            tracing::error!(execution_id = %execution_id, error = %e, "executor failed");
            events.push(ExecutionEvent::Error {
                error_type: "ExecutorError".to_string(),
                error_message: e.to_string(),
                trace: format!("{:?}", e),
            });
            false
        }
    };

    tracing::info!(
        execution_id = %execution_id,
        success,
        duration_ms = started.elapsed().as_millis() as u64,
        "execution finished"
    );

    // ---- output, error, completion ----
    events.push(ExecutionEvent::complete(success));
    for event in events {
        tracing::trace!(event = event.type_name(), "emitting");
        if sink.emit(event).is_err() {
            tracing::debug!(execution_id = %execution_id, "stream closed before completion");
            return None;
        }
    }

    Some(success)
}
