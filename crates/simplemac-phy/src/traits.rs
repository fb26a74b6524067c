use bytes::Bytes;

use crate::error::Result;

/// A message-oriented physical channel.
///
/// Implementations must preserve message boundaries: every `send_frame`
/// produces exactly one message, and `recv_frame` returns exactly one
/// message as it was sent (or `None` when nothing is available).
pub trait PhyChannel {
    /// Transmit one frame.
    fn send_frame(&mut self, frame: &[u8]) -> Result<()>;

    /// Receive one frame.
    ///
    /// Returns `Ok(None)` when no frame is available, either because the
    /// medium is empty or a configured read timeout elapsed.
    fn recv_frame(&mut self) -> Result<Option<Bytes>>;

    /// Medium name for diagnostics.
    fn medium_name(&self) -> &'static str;
}

impl<P: PhyChannel + ?Sized> PhyChannel for Box<P> {
    fn send_frame(&mut self, frame: &[u8]) -> Result<()> {
        (**self).send_frame(frame)
    }

    fn recv_frame(&mut self) -> Result<Option<Bytes>> {
        (**self).recv_frame()
    }

    fn medium_name(&self) -> &'static str {
        (**self).medium_name()
    }
}
