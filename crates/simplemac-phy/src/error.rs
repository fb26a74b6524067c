use std::path::PathBuf;

/// Errors that can occur on a physical medium.
#[derive(Debug, thiserror::Error)]
pub enum PhyError {
    /// Failed to bind to the specified address.
    #[error("failed to bind to {path}: {source}")]
    Bind {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to connect to the specified address.
    #[error("failed to connect to {path}: {source}")]
    Connect {
        path: PathBuf,
        source: std::io::Error,
    },

    /// An I/O error occurred on the medium.
    #[error("phy I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The socket path is too long for the platform.
    #[error("socket path too long ({len} bytes, max {max}): {path}")]
    PathTooLong {
        path: PathBuf,
        len: usize,
        max: usize,
    },

    /// An outbound frame exceeds the medium's maximum message size.
    #[error("frame too large ({size} bytes, max {max})")]
    FrameTooLarge { size: usize, max: usize },

    /// The configured maximum frame size is outside the supported range.
    #[error("max_frame_size {size} out of range (1..={max})")]
    InvalidFrameLimit { size: usize, max: usize },

    /// An inbound message filled the receive buffer and may have been cut short.
    #[error("inbound message truncated ({size} bytes received, max {max})")]
    Truncated { size: usize, max: usize },

    /// A send was attempted on a socket with no connected peer.
    #[error("no peer connected")]
    NotConnected,

    /// The medium has been shut down.
    #[error("phy shut down")]
    Shutdown,
}

pub type Result<T> = std::result::Result<T, PhyError>;
