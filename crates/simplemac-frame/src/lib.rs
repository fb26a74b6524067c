//! Addressed MAC frame codec.
//!
//! Every frame carries a fixed 4-byte header ahead of the payload:
//! - A 2-byte big-endian recipient address
//! - A 2-byte big-endian sender address
//!
//! There is no length field, checksum, or sync pattern. Frame boundaries are
//! the message boundaries of the physical medium (one message = one frame).

pub mod address;
pub mod codec;
pub mod error;

pub use address::{accepts, Address, ParseAddressError, BROADCAST};
pub use codec::{decode_frame, encode, encode_frame, MacFrame, HEADER_SIZE};
pub use error::{FrameError, Result};
