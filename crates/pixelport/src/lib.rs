//! Receive length-prefixed images over TCP and hand them to a display layer.
//!
//! Clients send `[4-byte big-endian length][encoded image bytes]`,
//! repeatable on one connection; the server reassembles each frame from
//! partial reads, decodes it, answers with a bare HTTP status line, and
//! publishes decoded images to a single display consumer.
//!
//! # Crate Structure
//!
//! - [`frame`] — Wire codec and per-connection frame assembly
//! - [`decode`] — Image payload validation and decoding
//! - [`server`] — TCP listener, connection handlers, and the image sink
//!   (behind the `server` feature, on by default)

/// Re-export frame types.
pub mod frame {
    pub use pixelport_frame::*;
}

/// Re-export decode types.
pub mod decode {
    pub use pixelport_decode::*;
}

/// Re-export server types (requires `server` feature).
#[cfg(feature = "server")]
pub mod server {
    pub use pixelport_server::*;
}
