use bytes::{BufMut, BytesMut};

use crate::error::{FrameError, Result};

/// Frame header: a 4-byte big-endian unsigned payload length.
pub const HEADER_SIZE: usize = 4;

/// Default maximum payload size: 64 MiB.
///
/// The wire format itself admits lengths up to `u32::MAX`; the cap
/// exists so an untrusted sender cannot grow server memory without
/// bound by announcing a huge frame.
pub const DEFAULT_MAX_PAYLOAD: usize = 64 * 1024 * 1024;

/// Configuration for frame assembly.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum payload size in bytes. Default: 64 MiB.
    pub max_payload_size: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_payload_size: DEFAULT_MAX_PAYLOAD,
        }
    }
}

/// Encode one frame into the wire format.
///
/// Wire format:
/// ```text
/// ┌────────────────┬──────────────────┐
/// │ Length (4B BE) │ Payload          │
/// │                │ (Length bytes)   │
/// └────────────────┴──────────────────┘
/// ```
pub fn encode_frame(payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    if payload.len() > u32::MAX as usize {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: u32::MAX as usize,
        });
    }
    dst.reserve(HEADER_SIZE + payload.len());
    dst.put_u32(payload.len() as u32);
    dst.put_slice(payload);
    Ok(())
}
