use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::address::Address;
use crate::error::{FrameError, Result};

/// Frame header: recipient (2) + sender (2) = 4 bytes.
pub const HEADER_SIZE: usize = 4;

/// A decoded MAC frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacFrame {
    /// Address of the node that transmitted the frame.
    pub sender: Address,
    /// Address the frame is destined for.
    pub recipient: Address,
    /// The upper-layer payload.
    pub payload: Bytes,
}

/// Encode a frame into the wire format, appending to `dst`.
///
/// Wire format:
/// ```text
/// ┌──────────────┬──────────────┬─────────────────┐
/// │ Recipient    │ Sender       │ Payload         │
/// │ (2B BE)      │ (2B BE)      │ (rest of msg)   │
/// └──────────────┴──────────────┴─────────────────┘
/// ```
pub fn encode_frame(sender: Address, recipient: Address, payload: &[u8], dst: &mut BytesMut) {
    dst.reserve(HEADER_SIZE + payload.len());
    dst.put_u16(recipient.get());
    dst.put_u16(sender.get());
    dst.put_slice(payload);
}

/// Encode a frame into a freshly allocated buffer.
pub fn encode(sender: Address, recipient: Address, payload: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(HEADER_SIZE + payload.len());
    encode_frame(sender, recipient, payload, &mut buf);
    buf.freeze()
}

/// Decode one complete transport message as a frame.
///
/// The payload is split off `frame` without copying.
pub fn decode_frame(mut frame: Bytes) -> Result<MacFrame> {
    if frame.len() < HEADER_SIZE {
        return Err(FrameError::Malformed { len: frame.len() });
    }

    let recipient = Address::new(frame.get_u16());
    let sender = Address::new(frame.get_u16());

    Ok(MacFrame {
        sender,
        recipient,
        payload: frame,
    })
}
