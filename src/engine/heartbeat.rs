use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::engine::events::ConnectionEvent;
use crate::engine::sink::EventSink;

/// Drive a long-lived connection: `connection_established`, then one
/// `heartbeat` per `interval` until `cancel` fires or the sink closes, then a
/// best-effort `connection_closed`.
///
/// `cancel` is checked at every wait. Returns the number of heartbeats sent.
pub async fn run_heartbeats<S>(interval: Duration, cancel: CancellationToken, sink: &mut S) -> u64
where
    S: EventSink<ConnectionEvent> + ?Sized,
{
    let mut sent = 0u64;

    if sink.emit(ConnectionEvent::established()).is_err() {
        cancel.cancel();
        return sent;
    }
    tracing::info!("persistent stream opened");

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }

        if sink.emit(ConnectionEvent::heartbeat(sent + 1)).is_err() {
            break;
        }
        sent += 1;
    }

    // Only reaches the client if the transport still accepts writes.
    let _ = sink.emit(ConnectionEvent::closed());
    cancel.cancel();

    tracing::info!(heartbeats = sent, "persistent stream closed");
    sent
}
