use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use simplemac_link::{MacConfig, MacDriver, RxOutcome, SimpleMac};
use simplemac_phy::{DatagramPhy, PhyConfig};

use crate::cmd::{parse_duration, resolve_address, ListenArgs};
use crate::exit::{mac_error, phy_error, CliError, CliResult, SUCCESS};
use crate::output::{print_packet, print_stats, OutputFormat};

/// Receive poll interval, so Ctrl-C and idle timeouts are noticed promptly.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

pub fn run(args: ListenArgs, config: MacConfig, format: OutputFormat) -> CliResult<i32> {
    let address = resolve_address(args.address, &config)?;
    let idle_timeout = args
        .idle_timeout
        .as_deref()
        .map(parse_duration)
        .transpose()?;

    let phy_config = PhyConfig {
        read_timeout: Some(config.phy.read_timeout.unwrap_or(POLL_INTERVAL)),
        ..config.phy.clone()
    };
    let phy = DatagramPhy::bind_with_config(&args.path, phy_config)
        .map_err(|err| phy_error("bind failed", err))?;
    let mut driver = MacDriver::new(Arc::new(SimpleMac::with_address(address)), phy);

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut printed = 0usize;
    let mut last_frame = Instant::now();

    while running.load(Ordering::SeqCst) {
        let outcome = match driver.poll() {
            Ok(Some(outcome)) => outcome,
            Ok(None) => {
                if idle_timeout.is_some_and(|limit| last_frame.elapsed() >= limit) {
                    tracing::info!("idle timeout reached");
                    break;
                }
                continue;
            }
            Err(err) => return Err(mac_error("receive failed", err)),
        };
        last_frame = Instant::now();

        match outcome {
            RxOutcome::Accepted(packet) => {
                print_packet(&packet, format);
                printed = printed.saturating_add(1);
                if args.count.is_some_and(|count| printed >= count) {
                    break;
                }
            }
            RxOutcome::Dropped(reason) => {
                tracing::warn!(
                    %reason,
                    error_count = driver.mac().error_count(),
                    "frame dropped"
                );
            }
        }
    }

    print_stats(address, &driver.mac().stats(), format);
    Ok(SUCCESS)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| {
        CliError::new(
            crate::exit::INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}
