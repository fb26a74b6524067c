//! Addressing MAC engine.
//!
//! This is the protocol layer of simplemac. Upper-layer packets are stamped
//! with this node's address and the recipient from their metadata, framed,
//! and handed to the physical side. Inbound frames are decoded and filtered
//! on the recipient field: frames for this node or for broadcast go up,
//! everything else is dropped and counted.
//!
//! - [`SimpleMac`] holds the node state and runs the TX and RX paths.
//! - [`MacBlock`] exposes the engine through the four named dataflow ports.
//! - [`MacDriver`] binds the engine to a [`simplemac_phy::PhyChannel`].

pub mod block;
pub mod config;
pub mod driver;
pub mod error;
pub mod mac;
pub mod packet;

pub use block::{MacBlock, PortName, WorkReport};
pub use config::MacConfig;
pub use driver::MacDriver;
pub use error::{DropReason, MacError, Result};
pub use mac::{MacStats, RxOutcome, SimpleMac};
pub use packet::{DType, ElementKind, MetaValue, Metadata, UpperPacket, RECIPIENT_KEY, SENDER_KEY};
pub use simplemac_frame::{Address, BROADCAST};
