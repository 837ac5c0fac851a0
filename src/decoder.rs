//! Incremental UTF-8 decoding.
//!
//! Chunks arrive on arbitrary byte boundaries, so a multi-byte character can
//! be split between two of them. The decoder keeps the incomplete tail of a
//! chunk and prefixes it onto the next one. Invalid sequences are replaced
//! with U+FFFD instead of failing the stream. A byte order mark at the very
//! start of the stream is dropped.

use tracing::debug;

const REPLACEMENT: char = '\u{FFFD}';
const BOM: &[u8] = b"\xef\xbb\xbf";

#[derive(Debug, Default)]
pub struct Utf8StreamDecoder {
    /// Incomplete sequence carried over from the previous chunk (at most 3 bytes).
    pending: Vec<u8>,
    /// Set once the start of the stream has been checked for a BOM.
    past_bom: bool,
}

impl Utf8StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes `chunk`, holding back any trailing bytes that could still
    /// become a valid character once the next chunk arrives.
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        let joined;
        let input: &[u8] = if self.pending.is_empty() {
            chunk
        } else {
            let mut carried = std::mem::take(&mut self.pending);
            carried.extend_from_slice(chunk);
            joined = carried;
            &joined
        };

        let input = if self.past_bom {
            input
        } else if input.len() < BOM.len() && BOM.starts_with(input) {
            // could still be a BOM split over chunks
            self.pending.extend_from_slice(input);
            return String::new();
        } else {
            self.past_bom = true;
            input.strip_prefix(BOM).unwrap_or(input)
        };

        let mut text = String::with_capacity(input.len());
        let mut rest = input;
        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    text.push_str(valid);
                    break;
                }
                Err(err) => {
                    let valid_up_to = err.valid_up_to();
                    text.push_str(&String::from_utf8_lossy(&rest[..valid_up_to]));
                    match err.error_len() {
                        Some(len) => {
                            text.push(REPLACEMENT);
                            rest = &rest[valid_up_to + len..];
                        }
                        None => {
                            // ran out of input in the middle of a character
                            self.pending.extend_from_slice(&rest[valid_up_to..]);
                            break;
                        }
                    }
                }
            }
        }
        text
    }

    /// Ends the stream. Held-back bytes can no longer complete a character
    /// and are discarded; returns how many were dropped.
    pub fn flush(&mut self) -> usize {
        let dropped = self.pending.len();
        if dropped > 0 {
            debug!(dropped, "discarding incomplete UTF-8 sequence at end of stream");
        }
        self.pending.clear();
        self.past_bom = false;
        dropped
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}
