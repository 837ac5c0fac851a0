//! One ingestion session: decoder, line buffer and counts, owned together.
//!
//! Every session starts empty and nothing is shared between sessions, so
//! two runs can never bleed counts into each other. Tests drive a session
//! with hand-made chunk sequences; production code goes through
//! [`ingest_reader`].

use crate::aggregator::EventAggregator;
use crate::decoder::Utf8StreamDecoder;
use crate::error::Result;
use crate::models::{IngestStats, ProcessedEvent, TypeCountMap};
use crate::normalizer::normalize;
use crate::reassembler::LineBuffer;
use crate::transport::ChunkReader;
use std::io::Read;
use tracing::{debug, info};

#[derive(Debug, Default)]
pub struct IngestSession {
    decoder: Utf8StreamDecoder,
    lines: LineBuffer,
    aggregator: EventAggregator,
    chunks: u64,
}

impl IngestSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes one raw chunk through decode, reassembly and aggregation.
    pub fn feed(&mut self, chunk: &[u8]) {
        self.chunks += 1;
        self.aggregator.add_bytes(chunk.len());
        let text = self.decoder.decode(chunk);
        let aggregator = &mut self.aggregator;
        self.lines.push(&text, |line| {
            aggregator.record_line(line);
        });
        debug!(
            chunk = self.chunks,
            bytes = chunk.len(),
            pending = self.lines.pending_len(),
            "chunk processed"
        );
    }

    /// Ends the stream: flushes the decoder, counts the trailing line and
    /// hands back the raw counts.
    pub fn finish_counts(mut self) -> (TypeCountMap, IngestStats) {
        self.decoder.flush();
        if let Some(last) = self.lines.finish() {
            self.aggregator.record_line(&last);
        }
        let (counts, stats) = self.aggregator.into_parts();
        info!(
            chunks = self.chunks,
            lines = stats.lines,
            counted = stats.counted,
            skipped = stats.skipped,
            bytes = stats.bytes,
            types = counts.len(),
            "ingestion finished"
        );
        (counts, stats)
    }

    pub fn finish(self) -> Vec<ProcessedEvent> {
        let (counts, _) = self.finish_counts();
        normalize(&counts)
    }
}

/// Streams `reader` through a fresh session, `chunk_size` bytes at a time.
/// Any read error ends the session; nothing partial is returned.
pub fn ingest_reader<R: Read>(reader: R, chunk_size: usize) -> Result<Vec<ProcessedEvent>> {
    let mut session = IngestSession::new();
    for chunk in ChunkReader::new(reader, chunk_size) {
        session.feed(&chunk?);
    }
    Ok(session.finish())
}
