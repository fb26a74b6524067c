use bytes::Bytes;
use simplemac_link::{DType, MacBlock, MacConfig, SimpleMac, UpperPacket};

use crate::cmd::{resolve_address, LoopbackArgs};
use crate::exit::{CliError, CliResult, SUCCESS};
use crate::output::{print_packet, print_stats, OutputFormat};

pub fn run(args: LoopbackArgs, config: MacConfig, format: OutputFormat) -> CliResult<i32> {
    let address = resolve_address(args.address, &config)?;
    let mut block = MacBlock::with_mac(SimpleMac::with_address(address).into());

    let payload = match &args.data {
        Some(text) => Bytes::from(text.clone().into_bytes()),
        None => pattern(args.size),
    };
    let dtype = args
        .dtype
        .map_or(DType::BYTES, |kind| DType::new(kind, 1));
    if payload.len() % dtype.element_size() != 0 {
        return Err(CliError::usage(format!(
            "payload of {} bytes is not a whole number of {dtype} elements",
            payload.len()
        )));
    }

    for _ in 0..args.count {
        let mut packet = UpperPacket::new(payload.clone()).with_dtype(dtype);
        if let Some(recipient) = args.recipient {
            packet = packet.with_recipient(recipient);
        }
        block.feed_packet(packet);
    }

    let report = block.loopback_until_idle();
    tracing::info!(
        %address,
        transmitted = report.transmitted,
        accepted = report.accepted,
        dropped = report.dropped,
        "loopback complete"
    );

    // The wire carries bytes only; the receiving side applies the agreed type.
    for packet in block.drain_packets() {
        print_packet(&packet.with_dtype(dtype), format);
    }
    print_stats(address, &block.mac().stats(), format);

    Ok(SUCCESS)
}

/// Repeating printable byte pattern, so previews stay readable.
fn pattern(size: usize) -> Bytes {
    (0..size).map(|i| b'a' + (i % 26) as u8).collect()
}
