//! Wire framing for streamed events.
//!
//! One event always becomes exactly one frame; frames are never coalesced.

use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::http::{header, HeaderMap};
use serde::Serialize;

pub const NDJSON_CONTENT_TYPE: &str = "application/x-ndjson";
pub const SSE_CONTENT_TYPE: &str = "text/event-stream";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FrameFormat {
    /// One JSON object per line.
    #[default]
    NdJson,
    /// `data: <json>` followed by a blank line.
    Sse,
}

impl FrameFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            FrameFormat::NdJson => NDJSON_CONTENT_TYPE,
            FrameFormat::Sse => SSE_CONTENT_TYPE,
        }
    }

    /// SSE when the client asks for `text/event-stream`, ND-JSON otherwise.
    pub fn negotiate(headers: &HeaderMap) -> Self {
        let wants_sse = headers
            .get_all(header::ACCEPT)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .any(|v| v.contains(SSE_CONTENT_TYPE));

        if wants_sse {
            FrameFormat::Sse
        } else {
            FrameFormat::NdJson
        }
    }
}

pub fn encode<E: Serialize>(event: &E, format: FrameFormat) -> Result<Bytes> {
    let json = serde_json::to_string(event).context("Failed to serialise event")?;

    let frame = match format {
        FrameFormat::NdJson => format!("{}\n", json),
        FrameFormat::Sse => format!("data: {}\n\n", json),
    };

    Ok(Bytes::from(frame))
}
