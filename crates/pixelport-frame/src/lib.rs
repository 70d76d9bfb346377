//! Length-prefixed image frame assembly for the pixelport wire protocol.
//!
//! Every image transfer on the wire is framed as:
//! - A 4-byte big-endian unsigned payload length
//! - Exactly that many payload bytes (the encoded image)
//!
//! Frames repeat back to back on one connection. The assembler in this
//! crate turns an arbitrary sequence of partial reads into complete
//! payloads, retaining any trailing bytes that belong to the next frame.

pub mod assembler;
pub mod codec;
pub mod error;

pub use assembler::{FrameAssembler, Phase};
pub use codec::{encode_frame, FrameConfig, DEFAULT_MAX_PAYLOAD, HEADER_SIZE};
pub use error::{FrameError, Result};
