use simplemac_frame::Address;

/// Errors that can occur in MAC operations.
#[derive(Debug, thiserror::Error)]
pub enum MacError {
    /// Physical medium error.
    #[error("phy error: {0}")]
    Phy(#[from] simplemac_phy::PhyError),

    /// The address was changed while a TX or RX path was running.
    #[error("address change refused: {active} path invocation(s) in progress")]
    AddressBusy { active: usize },

    /// A port name did not match any of `macIn`, `macOut`, `phyIn`, `phyOut`.
    #[error("unknown port {0:?}")]
    UnknownPort(String),

    /// Invalid or unreadable configuration.
    #[error("config error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MacError>;

/// Why the RX path dropped a frame. Every drop increments the error counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DropReason {
    /// The frame was shorter than the address header.
    #[error("malformed frame ({len} bytes)")]
    Malformed { len: usize },

    /// The medium delivered a message larger than its frame limit.
    #[error("oversized frame (at least {size} bytes)")]
    Oversized { size: usize },

    /// The frame was addressed to another node.
    #[error("frame for {recipient} rejected by {own}")]
    AddressMismatch { recipient: Address, own: Address },
}
