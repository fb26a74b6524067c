use std::sync::Arc;

use simplemac_phy::{PhyChannel, PhyError};

use crate::error::Result;
use crate::mac::{RxOutcome, SimpleMac};
use crate::packet::UpperPacket;

/// Drives a MAC engine over a physical channel.
///
/// `send` runs the TX path and puts the frame on the medium; `poll` and
/// `recv` pull frames off the medium and run the RX path. A message the
/// medium truncated is a counted drop, not an error.
pub struct MacDriver<P> {
    mac: Arc<SimpleMac>,
    phy: P,
}

impl<P: PhyChannel> MacDriver<P> {
    pub fn new(mac: Arc<SimpleMac>, phy: P) -> Self {
        Self { mac, phy }
    }

    pub fn mac(&self) -> &SimpleMac {
        &self.mac
    }

    pub fn phy(&self) -> &P {
        &self.phy
    }

    pub fn phy_mut(&mut self) -> &mut P {
        &mut self.phy
    }

    /// Frame `packet` and transmit it.
    pub fn send(&mut self, packet: UpperPacket) -> Result<()> {
        let frame = self.mac.on_upper_packet(packet);
        self.phy.send_frame(&frame)?;
        Ok(())
    }

    /// Receive at most one frame and run it through the RX path.
    ///
    /// Returns `Ok(None)` when the medium has nothing to deliver.
    pub fn poll(&mut self) -> Result<Option<RxOutcome>> {
        match self.phy.recv_frame() {
            Ok(Some(frame)) => Ok(Some(self.mac.on_physical_frame(frame))),
            Ok(None) => Ok(None),
            Err(PhyError::Truncated { size, .. }) => Ok(Some(self.mac.on_oversized_frame(size))),
            Err(err) => Err(err.into()),
        }
    }

    /// Receive the next accepted packet, skipping dropped frames.
    ///
    /// Returns `Ok(None)` once the medium has nothing more to deliver.
    pub fn recv(&mut self) -> Result<Option<UpperPacket>> {
        while let Some(outcome) = self.poll()? {
            if let RxOutcome::Accepted(packet) = outcome {
                return Ok(Some(packet));
            }
        }
        Ok(None)
    }
}

impl<P: PhyChannel> std::fmt::Debug for MacDriver<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MacDriver")
            .field("address", &self.mac.address())
            .field("medium", &self.phy.medium_name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use simplemac_frame::{encode, Address};
    use simplemac_phy::{LoopbackPhy, PhyConfig, PhyError};

    use super::*;
    use crate::error::{DropReason, MacError};

    const NODE: Address = Address::new(0x0101);

    fn driver() -> MacDriver<LoopbackPhy> {
        MacDriver::new(Arc::new(SimpleMac::with_address(NODE)), LoopbackPhy::new())
    }

    #[test]
    fn send_then_recv_over_loopback() {
        let mut driver = driver();
        driver
            .send(UpperPacket::new(&b"ping"[..]).with_recipient(NODE))
            .unwrap();

        assert_eq!(driver.phy().pending(), 1);

        let packet = driver.recv().unwrap().unwrap();
        assert_eq!(packet.payload.as_ref(), b"ping");
        assert_eq!(packet.sender(), Some(NODE));
        assert_eq!(driver.phy().pending(), 0);
        assert!(driver.recv().unwrap().is_none());
    }

    #[test]
    fn recv_skips_rejected_frames() {
        let mut driver = driver();
        driver
            .send(UpperPacket::new(&b"lost"[..]).with_recipient(NODE.complement()))
            .unwrap();
        driver.phy_mut().send_frame(b"\x01").unwrap();
        driver.send(UpperPacket::new(&b"kept"[..])).unwrap();

        let packet = driver.recv().unwrap().unwrap();
        assert_eq!(packet.payload.as_ref(), b"kept");
        assert_eq!(driver.mac().error_count(), 2);
    }

    #[test]
    fn poll_reports_each_outcome() {
        let mut driver = driver();
        driver
            .phy_mut()
            .send_frame(&encode(Address::new(9), Address::new(8), b"x"))
            .unwrap();

        let outcome = driver.poll().unwrap().unwrap();
        assert_eq!(
            outcome,
            RxOutcome::Dropped(DropReason::AddressMismatch {
                recipient: Address::new(8),
                own: NODE,
            })
        );
        assert!(driver.poll().unwrap().is_none());
    }

    #[test]
    fn phy_errors_propagate_from_send() {
        let cfg = PhyConfig {
            max_frame_size: 8,
            ..PhyConfig::default()
        };
        let mac = Arc::new(SimpleMac::with_address(NODE));
        let mut driver = MacDriver::new(mac, LoopbackPhy::with_config(&cfg));

        let err = driver.send(UpperPacket::new(vec![0u8; 16])).unwrap_err();
        assert!(matches!(
            err,
            MacError::Phy(PhyError::FrameTooLarge { size: 20, max: 8 })
        ));
        assert_eq!(driver.mac().stats().transmitted, 1);
    }

    #[test]
    fn two_nodes_share_a_broadcast_medium() {
        let medium = LoopbackPhy::new();
        let a = Address::new(0x000A);
        let b = Address::new(0x000B);
        let mut node_a = MacDriver::new(Arc::new(SimpleMac::with_address(a)), medium.clone());
        let mut node_b = MacDriver::new(Arc::new(SimpleMac::with_address(b)), medium);

        node_a
            .send(UpperPacket::new(&b"to b"[..]).with_recipient(b))
            .unwrap();
        node_a.send(UpperPacket::new(&b"to all"[..])).unwrap();

        let first = node_b.recv().unwrap().unwrap();
        assert_eq!(first.payload.as_ref(), b"to b");
        assert_eq!(first.sender(), Some(a));
        let second = node_b.recv().unwrap().unwrap();
        assert_eq!(second.recipient(), Some(Address::BROADCAST));
        assert_eq!(node_b.mac().error_count(), 0);
    }
}
