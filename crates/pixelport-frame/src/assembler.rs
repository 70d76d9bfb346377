use bytes::{Buf, Bytes, BytesMut};
use tracing::trace;

use crate::codec::{FrameConfig, HEADER_SIZE};
use crate::error::{FrameError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Where the assembler is within the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Fewer than 4 header bytes buffered; the payload length is unknown.
    AwaitingHeader,
    /// Header parsed; waiting for this many payload bytes.
    AwaitingPayload(usize),
}

/// Per-connection frame reassembly state.
///
/// Callers append raw socket bytes with [`extend_from_slice`] and then
/// drain completed payloads with [`advance`]. Partial headers and
/// partial payloads are buffered across calls; bytes beyond the end of
/// a completed frame are retained for the next one, so pipelined sends
/// lose nothing at frame boundaries.
///
/// At most one frame is in flight: the length is parsed once, the
/// header bytes are consumed, and the state resets as each payload is
/// handed out.
///
/// [`extend_from_slice`]: FrameAssembler::extend_from_slice
/// [`advance`]: FrameAssembler::advance
#[derive(Debug)]
pub struct FrameAssembler {
    buf: BytesMut,
    expected: Option<usize>,
    config: FrameConfig,
}

impl FrameAssembler {
    /// Create an assembler with default configuration.
    pub fn new() -> Self {
        Self::with_config(FrameConfig::default())
    }

    /// Create an assembler with explicit configuration.
    pub fn with_config(config: FrameConfig) -> Self {
        Self {
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            expected: None,
            config,
        }
    }

    /// Append newly received bytes to the frame buffer.
    pub fn extend_from_slice(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Try to complete the current frame.
    ///
    /// Returns `Ok(Some(payload))` when a full frame is buffered,
    /// consuming exactly the header and payload bytes and leaving any
    /// trailing bytes in place. Returns `Ok(None)` when more data is
    /// needed. Call in a loop after each append to drain every frame
    /// that arrived in one read.
    pub fn advance(&mut self) -> Result<Option<Bytes>> {
        if self.expected.is_none() {
            if self.buf.len() < HEADER_SIZE {
                return Ok(None);
            }
            let announced =
                u32::from_be_bytes(self.buf[..HEADER_SIZE].try_into().expect("4 header bytes"))
                    as usize;
            if announced > self.config.max_payload_size {
                return Err(FrameError::PayloadTooLarge {
                    size: announced,
                    max: self.config.max_payload_size,
                });
            }
            self.buf.advance(HEADER_SIZE);
            self.expected = Some(announced);
            trace!(expected = announced, "parsed frame header");
        }

        match self.expected {
            Some(expected) if self.buf.len() >= expected => {
                let payload = self.buf.split_to(expected).freeze();
                self.expected = None;
                Ok(Some(payload))
            }
            _ => Ok(None),
        }
    }

    /// Current position within the frame state machine.
    pub fn phase(&self) -> Phase {
        match self.expected {
            Some(expected) => Phase::AwaitingPayload(expected),
            None => Phase::AwaitingHeader,
        }
    }

    /// True when no header bytes and no partial payload are buffered.
    ///
    /// A connection that closes while this is false carried an
    /// incomplete frame that will never be delivered.
    pub fn is_idle(&self) -> bool {
        self.expected.is_none() && self.buf.is_empty()
    }

    /// Bytes currently buffered toward the in-progress frame.
    pub fn buffered_len(&self) -> usize {
        self.buf.len()
    }

    /// Assembler configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl Default for FrameAssembler {
    fn default() -> Self {
        Self::new()
    }
}
