//! Minimal addressing MAC layer.
//!
//! simplemac stamps upper-layer packets with 16-bit sender and recipient
//! addresses, frames them for a shared medium, and filters inbound frames on
//! the recipient field, counting everything it drops.
//!
//! # Crate Structure
//!
//! - [`phy`]: Message-oriented physical media (loopback, Unix datagrams)
//! - [`frame`]: Addresses and the 4-byte header wire codec
//! - [`link`]: The MAC engine, its dataflow ports, and the medium driver

/// Re-export physical medium types.
pub mod phy {
    pub use simplemac_phy::*;
}

/// Re-export frame types.
pub mod frame {
    pub use simplemac_frame::*;
}

/// Re-export MAC engine types.
pub mod link {
    pub use simplemac_link::*;
}
