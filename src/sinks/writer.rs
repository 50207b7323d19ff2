use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;

use crate::engine::frame::{encode, FrameFormat};
use crate::engine::sink::EventSink;

/// Writes each event as a frame and flushes immediately.
///
/// Used by the `exec` command to print frames to the terminal.
pub struct WriterSink<W> {
    writer: W,
    format: FrameFormat,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W, format: FrameFormat) -> Self {
        Self { writer, format }
    }
}

impl<E: Serialize, W: Write + Send> EventSink<E> for WriterSink<W> {
    fn emit(&mut self, event: E) -> Result<()> {
        let frame = encode(&event, self.format)?;
        self.writer
            .write_all(&frame)
            .context("Failed to write frame")?;
        self.writer.flush().context("Failed to flush frame")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::events::ExecutionEvent;

    #[test]
    fn frames_are_appended_in_order() {
        let mut buf = Vec::new();
        let mut sink = WriterSink::new(&mut buf, FrameFormat::NdJson);
        sink.emit(ExecutionEvent::Stdout { content: "a".into() }).unwrap();
        sink.emit(ExecutionEvent::complete(true)).unwrap();
        drop(sink);

        let out = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains(r#""type":"stdout""#));
        assert!(lines[1].contains(r#""type":"execution_complete""#));
    }
}
