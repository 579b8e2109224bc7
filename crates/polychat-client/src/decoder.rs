//! Incremental decoder for the relay's event stream.

use polychat_types::{DATA_PREFIX, DONE_SENTINEL, TokenDelta};
use tracing::trace;

/// Splits relay body chunks into lines and extracts token deltas.
///
/// Chunks can end anywhere, including inside a line or a multi-byte
/// character; the unterminated tail is held until the next chunk. Lines that
/// are not `data:` frames, the `[DONE]` sentinel, and frames that do not
/// parse are all skipped without error.
#[derive(Debug, Default)]
pub struct StreamDecoder {
    buffer: Vec<u8>,
    done: bool,
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one body chunk, returning the deltas it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut deltas = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(delta) = self.decode_line(&line) {
                deltas.push(delta);
            }
        }
        deltas
    }

    /// Flush a final line that arrived without a trailing newline.
    pub fn finish(&mut self) -> Vec<String> {
        let line = std::mem::take(&mut self.buffer);
        self.decode_line(&line).into_iter().collect()
    }

    /// Whether the `[DONE]` sentinel has been seen.
    pub fn is_done(&self) -> bool {
        self.done
    }

    fn decode_line(&mut self, raw: &[u8]) -> Option<String> {
        let line = String::from_utf8_lossy(raw);
        let line = line.trim_end_matches(['\n', '\r']);

        // The space after the colon is optional in SSE
        let data = line
            .strip_prefix(DATA_PREFIX)
            .or_else(|| line.strip_prefix(DATA_PREFIX.trim_end()))?;

        if data.trim() == DONE_SENTINEL {
            self.done = true;
            return None;
        }

        match serde_json::from_str::<TokenDelta>(data) {
            Ok(delta) => Some(delta.content),
            Err(e) => {
                trace!(error = %e, "Skipping unparsable frame");
                None
            }
        }
    }
}
