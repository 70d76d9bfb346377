/// Errors that can occur during frame encoding/assembly.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The announced or supplied payload exceeds the configured maximum.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, FrameError>;
