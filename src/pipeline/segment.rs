use base64::Engine;
use chrono::{DateTime, Utc};

use crate::audio::CapturedChunk;

/// One captured audio slice bound to its recording session.
///
/// Immutable once produced: the producer stamps it with the active session
/// id and the queue owns it until it is dispatched or discarded.
#[derive(Debug, Clone)]
pub struct Segment {
    pub bytes: Vec<u8>,
    pub session_id: String,
    pub captured_at: DateTime<Utc>,
}

impl Segment {
    pub fn from_chunk(chunk: CapturedChunk, session_id: String) -> Self {
        Self {
            bytes: chunk.bytes,
            session_id,
            captured_at: chunk.captured_at,
        }
    }

    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }

    /// Transport encoding expected by the classifier: base64 bytes behind a
    /// data-URI prefix.
    pub fn to_data_uri(&self) -> String {
        format!(
            "data:audio/webm;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(&self.bytes)
        )
    }
}
