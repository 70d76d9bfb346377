//! TCP listener and per-connection receive loop.
//!
//! One thread per accepted connection drives a blocking read loop:
//! socket bytes feed a [`pixelport_frame::FrameAssembler`], each
//! completed payload goes through [`pixelport_decode::decode`], the
//! peer gets a one-line HTTP acknowledgement, and decoded images are
//! handed to the display consumer through an [`ImageSink`] channel.
//! No state is shared between connections.

pub mod connection;
pub mod error;
pub mod listener;
pub mod response;
pub mod sink;

pub use connection::{ConnectionHandler, READ_CHUNK_SIZE};
pub use error::{ConnectionError, Result, ServerError};
pub use listener::{ImageListener, ServerConfig, DEFAULT_PORT};
pub use response::Ack;
pub use sink::{ImageSink, ReceivedImage};
