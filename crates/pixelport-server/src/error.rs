use std::net::SocketAddr;

use pixelport_frame::FrameError;

/// Errors that can occur in the listener's own lifecycle.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Failed to bind the listening socket. Fatal to the server.
    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    /// Failed to accept an incoming connection.
    #[error("failed to accept connection: {0}")]
    Accept(std::io::Error),
}

/// Errors that terminate a single connection.
///
/// These never escalate past the connection's own thread; the listener
/// and every other connection are unaffected.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// Framing failed (oversized announced length). The stream cannot
    /// be resynchronized, so the connection is closed.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// Socket-level read failure.
    #[error("connection read error: {0}")]
    Read(std::io::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;
