use std::sync::Arc;

use bytes::Bytes;
use simplemac_frame::{decode_frame, encode, Address, BROADCAST};
use simplemac_link::{DType, MacBlock, MacDriver, PortName, SimpleMac, UpperPacket};
use simplemac_phy::LoopbackPhy;

/// Deterministic xorshift bytes so failures are reproducible.
fn noise(seed: u64, len: usize) -> Vec<u8> {
    let mut state = seed | 1;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            state as u8
        })
        .collect()
}

fn node_address(seed: u64) -> Address {
    // Top bit cleared: never broadcast.
    let bytes = noise(seed, 2);
    Address::new(u16::from_be_bytes([bytes[0] & 0x7F, bytes[1]]))
}

#[test]
fn reference_scenario_own_then_complement() {
    let mac_id = node_address(0x5EED);
    let mut block = MacBlock::new();
    block.mac().set_address(mac_id).unwrap();

    let payload = Bytes::from(noise(42, 100));
    block.feed_packet(UpperPacket::new(payload.clone()).with_recipient(mac_id));
    block.loopback_until_idle();

    assert_eq!(block.mac().error_count(), 0);
    let packets = block.drain_packets();
    assert_eq!(packets.len(), 1);
    let out = &packets[0];
    assert_eq!(out.sender(), Some(mac_id));
    assert_eq!(out.recipient(), Some(mac_id));
    assert_eq!(out.dtype, DType::BYTES);
    assert_eq!(out.elements(), 100);
    assert_eq!(out.payload, payload);

    let other_id = mac_id.complement();
    block.feed_packet(UpperPacket::new(payload).with_recipient(other_id));
    block.loopback_until_idle();

    assert_eq!(block.mac().error_count(), 1);
    assert_eq!(block.pending(PortName::MacOut), 0);
}

#[test]
fn untagged_packet_loops_back_as_broadcast() {
    let mac = Arc::new(SimpleMac::with_address(Address::new(0x0203)));
    let mut driver = MacDriver::new(mac, LoopbackPhy::new());

    driver.send(UpperPacket::new(noise(7, 33))).unwrap();
    let packet = driver.recv().unwrap().unwrap();

    assert_eq!(packet.payload.as_ref(), noise(7, 33).as_slice());
    assert_eq!(packet.recipient(), Some(BROADCAST));
    assert_eq!(packet.sender(), Some(Address::new(0x0203)));
    assert_eq!(driver.mac().error_count(), 0);
}

#[test]
fn codec_roundtrip_for_assorted_addresses_and_lengths() {
    let addresses = [0u16, 1, 0x00FF, 0x0100, 0x7FFF, 0x8000, 0xFFFE, 0xFFFF];
    for (i, &s) in addresses.iter().enumerate() {
        for &r in &addresses {
            let len = (i * 37) % 300;
            let payload = noise((u64::from(s) << 16) | u64::from(r), len);
            let frame = decode_frame(encode(Address::new(s), Address::new(r), &payload)).unwrap();
            assert_eq!(frame.sender, Address::new(s));
            assert_eq!(frame.recipient, Address::new(r));
            assert_eq!(frame.payload.as_ref(), payload.as_slice());
        }
    }
}

#[test]
fn filtering_accepts_exactly_own_and_broadcast() {
    let own = Address::new(0x1357);
    let mac = SimpleMac::with_address(own);
    let sender = Address::new(0x2468);

    let mut expected_errors = 0u64;
    for raw in (0..=u16::MAX).step_by(97).chain([own.get(), BROADCAST.get()]) {
        let recipient = Address::new(raw);
        let before = mac.error_count();
        let outcome = mac.on_physical_frame(encode(sender, recipient, b"probe"));

        if recipient == own || recipient == BROADCAST {
            let packet = outcome.into_packet().expect("frame should be accepted");
            assert_eq!(packet.sender(), Some(sender));
            assert_eq!(packet.recipient(), Some(recipient));
            assert_eq!(mac.error_count(), before);
        } else {
            assert!(outcome.into_packet().is_none());
            expected_errors += 1;
            assert_eq!(mac.error_count(), before + 1);
        }
    }
    assert_eq!(mac.error_count(), expected_errors);
}

#[test]
fn rx_preserves_arrival_order() {
    let own = Address::new(0x0042);
    let mut block = MacBlock::with_mac(Arc::new(SimpleMac::with_address(own)));
    for i in 0..64u8 {
        let recipient = if i % 4 == 0 { own.complement() } else { own };
        block.feed_frame(encode(Address::new(u16::from(i)), recipient, &[i]));
    }
    let report = block.work();
    assert_eq!(report.dropped, 16);

    let order: Vec<u8> = block.drain_packets().iter().map(|p| p.payload[0]).collect();
    let expected: Vec<u8> = (0..64u8).filter(|i| i % 4 != 0).collect();
    assert_eq!(order, expected);
}

#[cfg(unix)]
#[test]
fn reference_scenario_over_unix_datagrams() {
    use simplemac_phy::DatagramPhy;

    let dir = std::env::temp_dir().join(format!("simplemac-link-dgram-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("node.sock");

    let mut phy = DatagramPhy::bind(&path).unwrap();
    phy.connect(&path).unwrap();

    let mac_id = Address::new(0x4C2D);
    let mut driver = MacDriver::new(Arc::new(SimpleMac::with_address(mac_id)), phy);
    let payload = noise(99, 100);

    driver
        .send(UpperPacket::new(payload.clone()).with_recipient(mac_id))
        .unwrap();
    let packet = driver.poll().unwrap().unwrap().into_packet().unwrap();
    assert_eq!(packet.payload.as_ref(), payload.as_slice());
    assert_eq!(packet.sender(), Some(mac_id));
    assert_eq!(driver.mac().error_count(), 0);

    driver
        .send(UpperPacket::new(payload).with_recipient(mac_id.complement()))
        .unwrap();
    assert!(!driver.poll().unwrap().unwrap().is_accepted());
    assert_eq!(driver.mac().error_count(), 1);

    drop(driver);
    let _ = std::fs::remove_dir_all(&dir);
}

#[cfg(unix)]
#[test]
fn oversized_datagram_is_counted_and_reception_continues() {
    use simplemac_phy::{DatagramPhy, PhyChannel, PhyConfig};
    use simplemac_link::{DropReason, RxOutcome};

    let dir = std::env::temp_dir().join(format!("simplemac-link-oversize-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("node.sock");

    let cfg = PhyConfig {
        max_frame_size: 64,
        ..PhyConfig::default()
    };
    let phy = DatagramPhy::bind_with_config(&path, cfg).unwrap();
    let own = Address::new(0x0077);
    let mut driver = MacDriver::new(Arc::new(SimpleMac::with_address(own)), phy);

    let mut tx = DatagramPhy::unbound(PhyConfig::default()).unwrap();
    tx.connect(&path).unwrap();
    tx.send_frame(&noise(5, 200)).unwrap();
    tx.send_frame(&encode(Address::new(1), own, b"after")).unwrap();

    let outcome = driver.poll().unwrap().unwrap();
    assert!(matches!(outcome, RxOutcome::Dropped(DropReason::Oversized { .. })));
    assert_eq!(driver.mac().error_count(), 1);
    assert_eq!(driver.mac().stats().oversized, 1);

    let packet = driver.recv().unwrap().unwrap();
    assert_eq!(packet.payload.as_ref(), b"after");
    assert_eq!(packet.sender(), Some(Address::new(1)));
    assert_eq!(driver.mac().error_count(), 1);

    drop(driver);
    let _ = std::fs::remove_dir_all(&dir);
}
