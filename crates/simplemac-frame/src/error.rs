/// Errors that can occur during frame decoding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    /// The frame is shorter than the 4-byte address header.
    #[error("malformed frame ({len} bytes, header needs 4)")]
    Malformed { len: usize },
}

pub type Result<T> = std::result::Result<T, FrameError>;
