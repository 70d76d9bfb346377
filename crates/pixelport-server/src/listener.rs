use std::net::{SocketAddr, TcpListener};
use std::thread;
use std::time::Duration;

use pixelport_frame::FrameConfig;
use tracing::{debug, info, warn};

use crate::connection::ConnectionHandler;
use crate::error::{Result, ServerError};
use crate::sink::ImageSink;

/// Default listening port, matching the senders in the field.
pub const DEFAULT_PORT: u16 = 8080;

/// Server-wide behavior knobs applied to every accepted connection.
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
    /// Framing limits (maximum announced payload size).
    pub frame: FrameConfig,
    /// Optional idle-read timeout. `None` (the default) waits forever,
    /// matching the original behavior; setting it is a hardening
    /// option that closes connections whose peer goes quiet.
    pub read_timeout: Option<Duration>,
}

/// Accepts image-sender connections and spawns a handler per socket.
#[derive(Debug)]
pub struct ImageListener {
    listener: TcpListener,
    addr: SocketAddr,
    config: ServerConfig,
}

impl ImageListener {
    /// Bind the listening socket. Failure here is fatal to the server
    /// and surfaced to the caller; nothing is retried.
    pub fn bind(addr: SocketAddr) -> Result<Self> {
        let listener = TcpListener::bind(addr).map_err(|source| ServerError::Bind {
            addr,
            source,
        })?;
        let addr = listener.local_addr().map_err(|source| ServerError::Bind {
            addr,
            source,
        })?;
        info!(%addr, "listening for image senders");
        Ok(Self {
            listener,
            addr,
            config: ServerConfig::default(),
        })
    }

    /// Override server configuration.
    pub fn with_config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// The bound address (useful after binding port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Accept connections forever, handing each one to its own thread.
    ///
    /// Per-connection failures are logged inside the connection thread
    /// and never reach this loop; only a failure of the listening
    /// socket itself returns. Dropping the listener from another
    /// thread stops new accepts.
    pub fn run(&self, sink: ImageSink) -> Result<()> {
        loop {
            let (stream, peer) = self.listener.accept().map_err(ServerError::Accept)?;
            debug!(%peer, "accepted connection");

            if let Err(err) = stream.set_read_timeout(self.config.read_timeout) {
                warn!(%peer, error = %err, "failed applying read timeout; closing");
                continue;
            }

            let sink = sink.clone();
            let frame_config = self.config.frame.clone();
            let spawned = thread::Builder::new()
                .name(format!("pixelport-conn-{peer}"))
                .spawn(move || {
                    let handler = ConnectionHandler::new(stream, peer, frame_config, sink);
                    if let Err(err) = handler.run() {
                        warn!(%peer, error = %err, "connection terminated");
                    } else {
                        debug!(%peer, "connection closed");
                    }
                });
            if let Err(err) = spawned {
                warn!(%peer, error = %err, "failed spawning connection thread");
            }
        }
    }
}
