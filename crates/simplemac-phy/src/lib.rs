//! Message-oriented physical media.
//!
//! A physical channel moves whole frames: one `send_frame` call produces
//! exactly one message on the medium and one `recv_frame` call yields
//! exactly one message. Two media are provided:
//! - An in-memory loopback queue (tests, single-node setups)
//! - Unix datagram sockets (Linux/macOS)
//!
//! This is the lowest layer of simplemac. The MAC engine never touches a
//! medium directly; the driver in `simplemac-link` moves frames between the
//! two.

pub mod config;
pub mod error;
pub mod loopback;
pub mod traits;

#[cfg(unix)]
pub mod datagram;

pub use config::{PhyConfig, DEFAULT_MAX_FRAME, MAX_FRAME_LIMIT};
pub use error::{PhyError, Result};
pub use loopback::LoopbackPhy;
pub use traits::PhyChannel;

#[cfg(unix)]
pub use datagram::DatagramPhy;
