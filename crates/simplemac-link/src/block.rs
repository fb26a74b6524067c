//! Dataflow port adapter.
//!
//! [`MacBlock`] wraps a [`SimpleMac`] behind the four named ports a host
//! scheduler wires into its graph:
//!
//! ```text
//!            macIn ──► TX ──► phyOut
//!   upper              │           physical
//!            macOut ◄─ RX ◄── phyIn
//! ```
//!
//! Inputs are queued until [`MacBlock::work`] runs; outputs are queued until
//! the host pops them. Each queue is FIFO.

use std::collections::VecDeque;
use std::fmt;
use std::ops::AddAssign;
use std::str::FromStr;
use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use tracing::trace;

use crate::error::MacError;
use crate::mac::{RxOutcome, SimpleMac};
use crate::packet::UpperPacket;

/// One of the four interaction points of a MAC block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortName {
    /// Upper-layer packets in (TX path input).
    MacIn,
    /// Upper-layer packets out (RX path output).
    MacOut,
    /// Physical frames in (RX path input).
    PhyIn,
    /// Physical frames out (TX path output).
    PhyOut,
}

impl PortName {
    pub const ALL: [PortName; 4] = [
        PortName::MacIn,
        PortName::MacOut,
        PortName::PhyIn,
        PortName::PhyOut,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            PortName::MacIn => "macIn",
            PortName::MacOut => "macOut",
            PortName::PhyIn => "phyIn",
            PortName::PhyOut => "phyOut",
        }
    }
}

impl fmt::Display for PortName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PortName {
    type Err = MacError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PortName::ALL
            .into_iter()
            .find(|port| port.as_str() == s)
            .ok_or_else(|| MacError::UnknownPort(s.to_string()))
    }
}

/// What one or more `work` calls did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WorkReport {
    /// Packets framed onto `phyOut`.
    pub transmitted: usize,
    /// Packets delivered onto `macOut`.
    pub accepted: usize,
    /// Frames dropped by the RX path.
    pub dropped: usize,
}

impl WorkReport {
    pub fn is_idle(&self) -> bool {
        *self == Self::default()
    }
}

impl AddAssign for WorkReport {
    fn add_assign(&mut self, rhs: Self) {
        self.transmitted += rhs.transmitted;
        self.accepted += rhs.accepted;
        self.dropped += rhs.dropped;
    }
}

/// A MAC engine with queued dataflow ports.
#[derive(Debug, Default)]
pub struct MacBlock {
    mac: Arc<SimpleMac>,
    mac_in: VecDeque<UpperPacket>,
    mac_out: VecDeque<UpperPacket>,
    phy_in: VecDeque<Bytes>,
    phy_out: VecDeque<Bytes>,
}

impl MacBlock {
    /// Create a block around a fresh, unconfigured MAC.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a block around an existing MAC.
    pub fn with_mac(mac: Arc<SimpleMac>) -> Self {
        Self {
            mac,
            ..Self::default()
        }
    }

    /// The engine, for configuration and counter inspection.
    pub fn mac(&self) -> &SimpleMac {
        &self.mac
    }

    /// Queue an upper-layer packet on `macIn`.
    pub fn feed_packet(&mut self, packet: UpperPacket) {
        self.mac_in.push_back(packet);
    }

    /// Queue a physical frame on `phyIn`.
    pub fn feed_frame(&mut self, frame: impl Into<Bytes>) {
        self.phy_in.push_back(frame.into());
    }

    /// Take the oldest packet from `macOut`.
    pub fn pop_packet(&mut self) -> Option<UpperPacket> {
        self.mac_out.pop_front()
    }

    /// Take the oldest frame from `phyOut`.
    pub fn pop_frame(&mut self) -> Option<Bytes> {
        self.phy_out.pop_front()
    }

    /// Take every packet queued on `macOut`, oldest first.
    pub fn drain_packets(&mut self) -> Vec<UpperPacket> {
        self.mac_out.drain(..).collect()
    }

    /// Take every frame queued on `phyOut`, oldest first.
    pub fn drain_frames(&mut self) -> Vec<Bytes> {
        self.phy_out.drain(..).collect()
    }

    /// Number of items queued on a port.
    pub fn pending(&self, port: PortName) -> usize {
        match port {
            PortName::MacIn => self.mac_in.len(),
            PortName::MacOut => self.mac_out.len(),
            PortName::PhyIn => self.phy_in.len(),
            PortName::PhyOut => self.phy_out.len(),
        }
    }

    /// Run every queued input through its path.
    pub fn work(&mut self) -> WorkReport {
        let mut report = WorkReport::default();

        while let Some(packet) = self.mac_in.pop_front() {
            self.phy_out.push_back(self.mac.on_upper_packet(packet));
            report.transmitted += 1;
        }

        while let Some(frame) = self.phy_in.pop_front() {
            match self.mac.on_physical_frame(frame) {
                RxOutcome::Accepted(packet) => {
                    self.mac_out.push_back(packet);
                    report.accepted += 1;
                }
                RxOutcome::Dropped(_) => report.dropped += 1,
            }
        }

        if !report.is_idle() {
            trace!(?report, "mac block work");
        }
        report
    }

    /// Work with `phyOut` wired back into `phyIn` until no input remains.
    pub fn loopback_until_idle(&mut self) -> WorkReport {
        let mut total = WorkReport::default();
        loop {
            total += self.work();
            if self.phy_out.is_empty() {
                return total;
            }
            self.phy_in.extend(self.phy_out.drain(..));
        }
    }
}
