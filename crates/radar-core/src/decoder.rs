//! Incremental decoding of the framed analysis stream
//!
//! Network reads can end anywhere: inside a JSON payload, inside the
//! delimiter, or between the bytes of one multi-byte character. The decoders
//! here keep whatever is incomplete and pick it up on the next read, so the
//! events produced do not depend on how the bytes were chunked.

use crate::error::ProtocolError;
use crate::event::AnalysisEvent;
use crate::frame::FRAME_DELIMITER;
use tracing::{debug, warn};

/// Message yielded when the undelimited tail of a stream cannot be parsed
pub const FINAL_FRAME_ERROR: &str = "Failed to parse final data from stream.";

/// Stateful UTF-8 decoder
///
/// Bytes of a character split across reads are held back until the rest
/// arrives. Invalid sequences become U+FFFD.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    /// Create an empty decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the next read, returning every complete character
    pub fn decode(&mut self, input: &[u8]) -> String {
        let mut bytes = std::mem::take(&mut self.pending);
        bytes.extend_from_slice(input);

        let mut out = String::with_capacity(bytes.len());
        let mut rest: &[u8] = &bytes;

        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    out.push_str(valid);
                    break;
                }
                Err(err) => {
                    let (valid, after) = rest.split_at(err.valid_up_to());
                    out.push_str(std::str::from_utf8(valid).unwrap_or_default());

                    match err.error_len() {
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            rest = &after[len..];
                        }
                        None => {
                            // Truncated sequence at the end of this read
                            self.pending = after.to_vec();
                            break;
                        }
                    }
                }
            }
        }

        out
    }

    /// Flush at end of input
    ///
    /// An incomplete trailing sequence can no longer be completed and is
    /// reported as a single replacement character.
    pub fn finish(&mut self) -> String {
        if self.pending.is_empty() {
            String::new()
        } else {
            self.pending.clear();
            char::REPLACEMENT_CHARACTER.to_string()
        }
    }

    /// Number of bytes waiting for the rest of their character
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

/// Splits decoded text into frames and parses them into events
#[derive(Debug, Default)]
pub struct FrameDecoder {
    utf8: Utf8Decoder,
    buffer: String,
    skipped: usize,
}

impl FrameDecoder {
    /// Create an empty decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one read and collect every event completed by it
    ///
    /// Frames that fail to parse are logged and skipped.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<AnalysisEvent> {
        let text = self.utf8.decode(bytes);
        self.buffer.push_str(&text);

        let mut events = Vec::new();
        let mut consumed = 0;

        while let Some(offset) = self.buffer[consumed..].find(FRAME_DELIMITER) {
            let payload = &self.buffer[consumed..consumed + offset];

            match parse_payload(payload) {
                Ok(Some(event)) => events.push(event),
                Ok(None) => {}
                Err(err) => {
                    self.skipped += 1;
                    warn!(error = %err, payload_len = payload.len(), "Skipping malformed frame");
                }
            }

            consumed += offset + FRAME_DELIMITER.len();
        }

        self.buffer.drain(..consumed);
        events
    }

    /// Flush at end of stream
    ///
    /// A producer may omit the delimiter after its last frame, so any
    /// non-blank remainder is parsed as one final event. If that fails the
    /// result is an error event rather than a panic or a silent drop.
    pub fn finish(&mut self) -> Option<AnalysisEvent> {
        let tail = self.utf8.finish();
        self.buffer.push_str(&tail);
        let rest = std::mem::take(&mut self.buffer);

        match parse_payload(&rest) {
            Ok(event) => event,
            Err(err) => {
                self.skipped += 1;
                warn!(error = %err, "Failed to parse final frame");
                Some(AnalysisEvent::error(FINAL_FRAME_ERROR))
            }
        }
    }

    /// Number of frames dropped because they failed to parse
    pub fn skipped_frames(&self) -> usize {
        self.skipped
    }

    /// Length of the undelimited text held for the next read
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }
}

fn parse_payload(payload: &str) -> Result<Option<AnalysisEvent>, ProtocolError> {
    if payload.trim().is_empty() {
        debug!("Ignoring blank frame");
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(payload)?))
}
