use anyhow::{anyhow, Result};
use axum::body::{Body, Bytes};
use serde::Serialize;
use std::convert::Infallible;
use tokio::sync::mpsc;
use tokio_stream::{wrappers::UnboundedReceiverStream, StreamExt};
use tokio_util::sync::CancellationToken;

use crate::engine::frame::{encode, FrameFormat};
use crate::engine::sink::EventSink;

/// Encodes events into frames and hands them to a response body.
///
/// Each frame is a separate body chunk, so hyper writes it out as soon as it
/// is produced.
#[derive(Debug, Clone)]
pub struct FrameSink {
    tx: mpsc::UnboundedSender<Bytes>,
    format: FrameFormat,
}

impl FrameSink {
    pub fn channel(format: FrameFormat) -> (Self, mpsc::UnboundedReceiver<Bytes>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx, format }, rx)
    }

    /// Cancel `token` once the receiving body is dropped (client disconnected).
    ///
    /// The watcher exits on its own when `token` is cancelled elsewhere, so it
    /// never keeps the body open.
    pub fn cancel_on_close(&self, token: CancellationToken) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = tx.closed() => {
                    tracing::debug!("stream receiver dropped");
                    token.cancel();
                }
                _ = token.cancelled() => {}
            }
        });
    }
}

impl<E: Serialize> EventSink<E> for FrameSink {
    fn emit(&mut self, event: E) -> Result<()> {
        let frame = encode(&event, self.format)?;
        self.tx
            .send(frame)
            .map_err(|_| anyhow!("stream receiver dropped"))
    }
}

/// Turn the receiving half into a streaming response body.
pub fn into_body(rx: mpsc::UnboundedReceiver<Bytes>) -> Body {
    Body::from_stream(UnboundedReceiverStream::new(rx).map(Ok::<_, Infallible>))
}
