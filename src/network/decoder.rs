//! Incremental decoder for the `/chat/stream` body.
//!
//! The body is UTF-8 text made of records separated by a blank line. A data
//! record is `data:` followed by one JSON payload; anything else (comments,
//! keep-alives) is skipped. A malformed payload is logged and dropped without
//! failing the exchange.

use std::collections::VecDeque;

use futures::{Stream, StreamExt};
use serde::Deserialize;

use super::api::ApiError;

pub const RECORD_SEPARATOR: &str = "\n\n";
pub const DATA_PREFIX: &str = "data:";

/// One decoded record. The fields are not exclusive on the wire; the consumer
/// gives `error` precedence, then applies `delta`, then `done`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StreamPayload {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub delta: Option<String>,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub ai_role: Option<String>,
    #[serde(default)]
    pub role_name: Option<String>,
}

/// Splits raw chunks into payloads. Holds at most one partial record and one
/// partial UTF-8 sequence between calls.
#[derive(Debug, Default)]
pub struct StreamDecoder {
    pending: Vec<u8>,
    buffer: String,
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk; returns every record it completed, in wire order.
    pub fn push_chunk(&mut self, chunk: &[u8]) -> Vec<StreamPayload> {
        self.pending.extend_from_slice(chunk);
        self.decode_pending();
        self.take_records()
    }

    /// End of body: flush whatever is left, including an unterminated record.
    pub fn finish(&mut self) -> Vec<StreamPayload> {
        if !self.pending.is_empty() {
            self.buffer.push_str(&String::from_utf8_lossy(&self.pending));
            self.pending.clear();
        }
        let mut payloads = self.take_records();
        let tail = std::mem::take(&mut self.buffer);
        payloads.extend(parse_record(&tail));
        payloads
    }

    fn decode_pending(&mut self) {
        loop {
            let (valid, invalid_len) = match std::str::from_utf8(&self.pending) {
                Ok(_) => (self.pending.len(), None),
                Err(err) => (err.valid_up_to(), err.error_len()),
            };
            self.buffer
                .push_str(&String::from_utf8_lossy(&self.pending[..valid]));

            match invalid_len {
                Some(len) => {
                    self.buffer.push(char::REPLACEMENT_CHARACTER);
                    self.pending.drain(..valid + len);
                }
                // Either everything decoded or the tail is an incomplete
                // sequence waiting for the next chunk.
                None => {
                    self.pending.drain(..valid);
                    return;
                }
            }
        }
    }

    fn take_records(&mut self) -> Vec<StreamPayload> {
        let mut payloads = Vec::new();
        while let Some(pos) = self.buffer.find(RECORD_SEPARATOR) {
            let record: String = self.buffer.drain(..pos + RECORD_SEPARATOR.len()).collect();
            payloads.extend(parse_record(&record[..pos]));
        }
        payloads
    }
}

fn parse_record(record: &str) -> Option<StreamPayload> {
    let Some(rest) = record.strip_prefix(DATA_PREFIX) else {
        if !record.trim().is_empty() {
            log::trace!("Ignoring non-data stream record: {record:?}");
        }
        return None;
    };
    let json = rest.trim_start();
    if json.is_empty() {
        return None;
    }
    match serde_json::from_str::<StreamPayload>(json) {
        Ok(payload) => Some(payload),
        Err(err) => {
            log::warn!("Skipping malformed stream record ({err}): {record:?}");
            None
        }
    }
}

/// Pulls payloads out of a chunk stream, awaiting at most one chunk per call.
pub struct RecordReader<S> {
    chunks: S,
    decoder: StreamDecoder,
    ready: VecDeque<StreamPayload>,
    finished: bool,
}

impl<S> RecordReader<S>
where
    S: Stream<Item = Result<Vec<u8>, ApiError>> + Unpin,
{
    pub fn new(chunks: S) -> Self {
        Self {
            chunks,
            decoder: StreamDecoder::new(),
            ready: VecDeque::new(),
            finished: false,
        }
    }

    /// `None` once the body is exhausted. A transport error ends the reader.
    pub async fn next_record(&mut self) -> Option<Result<StreamPayload, ApiError>> {
        loop {
            if let Some(payload) = self.ready.pop_front() {
                return Some(Ok(payload));
            }
            if self.finished {
                return None;
            }
            match self.chunks.next().await {
                Some(Ok(chunk)) => self.ready.extend(self.decoder.push_chunk(&chunk)),
                Some(Err(err)) => {
                    self.finished = true;
                    return Some(Err(err));
                }
                None => {
                    self.finished = true;
                    self.ready.extend(self.decoder.finish());
                }
            }
        }
    }
}
