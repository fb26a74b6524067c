//! Two nodes on a shared in-memory medium.
//!
//! Node A sends one addressed packet to B, one to a third address, and one
//! broadcast. B receives the first and the last and counts the middle one as
//! an error.

use std::sync::Arc;

use simplemac::frame::Address;
use simplemac::link::{MacDriver, Result, SimpleMac, UpperPacket};
use simplemac::phy::LoopbackPhy;

fn main() -> Result<()> {
    let medium = LoopbackPhy::new();
    let a = Address::new(0x000A);
    let b = Address::new(0x000B);

    let mut node_a = MacDriver::new(Arc::new(SimpleMac::with_address(a)), medium.clone());
    let mut node_b = MacDriver::new(Arc::new(SimpleMac::with_address(b)), medium);

    node_a.send(UpperPacket::new(&b"hello b"[..]).with_recipient(b))?;
    node_a.send(UpperPacket::new(&b"hello c"[..]).with_recipient(Address::new(0x000C)))?;
    node_a.send(UpperPacket::new(&b"hello all"[..]))?;

    while let Some(packet) = node_b.recv()? {
        println!(
            "{} -> {}: {}",
            packet.sender().unwrap_or(Address::UNSET),
            packet.recipient().unwrap_or(Address::BROADCAST),
            String::from_utf8_lossy(&packet.payload)
        );
    }

    println!("node {b} error_count={}", node_b.mac().error_count());
    Ok(())
}
