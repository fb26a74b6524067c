use std::fs;
use std::sync::Arc;

use simplemac_link::{MacConfig, MacDriver, SimpleMac, UpperPacket};
use simplemac_phy::DatagramPhy;

use crate::cmd::{resolve_address, SendArgs};
use crate::exit::{io_error, mac_error, phy_error, CliResult, SUCCESS};
use crate::output::{print_stats, OutputFormat};

pub fn run(args: SendArgs, config: MacConfig, format: OutputFormat) -> CliResult<i32> {
    let address = resolve_address(args.address, &config)?;
    let payload = resolve_payload(&args)?;

    let mut phy =
        DatagramPhy::unbound(config.phy.clone()).map_err(|err| phy_error("socket failed", err))?;
    phy.connect(&args.path)
        .map_err(|err| phy_error("connect failed", err))?;

    let mac = Arc::new(SimpleMac::with_address(address));
    let mut driver = MacDriver::new(mac, phy);

    let mut packet = UpperPacket::new(payload);
    if let Some(recipient) = args.recipient {
        packet = packet.with_recipient(recipient);
    }
    driver
        .send(packet)
        .map_err(|err| mac_error("send failed", err))?;

    print_stats(address, &driver.mac().stats(), format);
    Ok(SUCCESS)
}

fn resolve_payload(args: &SendArgs) -> CliResult<Vec<u8>> {
    if let Some(data) = &args.data {
        return Ok(data.as_bytes().to_vec());
    }
    if let Some(path) = &args.file {
        return fs::read(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err));
    }
    Ok(Vec::new())
}
