use std::io::{IsTerminal, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use simplemac_frame::Address;
use simplemac_link::{MacStats, Metadata, UpperPacket};

const PACKET_SCHEMA_ID: &str = "https://schemas.3leaps.dev/simplemac/cli/v1/packet-received.schema.json";
const STATS_SCHEMA_ID: &str = "https://schemas.3leaps.dev/simplemac/cli/v1/mac-stats.schema.json";

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct PacketOutput<'a> {
    schema_id: &'a str,
    sender: Option<String>,
    recipient: Option<String>,
    dtype: String,
    elements: usize,
    payload_size: usize,
    payload: String,
    metadata: &'a Metadata,
    timestamp: String,
}

#[derive(Serialize)]
struct StatsOutput<'a> {
    schema_id: &'a str,
    address: String,
    error_count: u64,
    #[serde(flatten)]
    stats: &'a MacStats,
}

pub fn print_packet(packet: &UpperPacket, format: OutputFormat) {
    let sender = packet.sender().map(|a| a.to_string());
    let recipient = packet.recipient().map(|a| a.to_string());

    match format {
        OutputFormat::Json => {
            let out = PacketOutput {
                schema_id: PACKET_SCHEMA_ID,
                sender,
                recipient,
                dtype: packet.dtype.to_string(),
                elements: packet.elements(),
                payload_size: packet.payload.len(),
                payload: payload_preview(packet.payload.as_ref()),
                metadata: &packet.metadata,
                timestamp: now_unix_seconds(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["SENDER", "RECIPIENT", "SIZE", "PAYLOAD"])
                .add_row(vec![
                    sender.unwrap_or_else(|| "-".to_string()),
                    recipient.unwrap_or_else(|| "-".to_string()),
                    packet.payload.len().to_string(),
                    payload_preview(packet.payload.as_ref()),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "sender={} recipient={} size={} payload={}",
                sender.as_deref().unwrap_or("-"),
                recipient.as_deref().unwrap_or("-"),
                packet.payload.len(),
                payload_preview(packet.payload.as_ref())
            );
        }
        OutputFormat::Raw => {
            print_raw(packet.payload.as_ref());
        }
    }
}

pub fn print_stats(address: Address, stats: &MacStats, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = StatsOutput {
                schema_id: STATS_SCHEMA_ID,
                address: address.to_string(),
                error_count: stats.rejected,
                stats,
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec![
                    "ADDRESS",
                    "TRANSMITTED",
                    "ACCEPTED",
                    "ERRORS",
                    "MALFORMED",
                    "MISMATCHED",
                    "OVERSIZED",
                ])
                .add_row(vec![
                    address.to_string(),
                    stats.transmitted.to_string(),
                    stats.accepted.to_string(),
                    stats.rejected.to_string(),
                    stats.malformed.to_string(),
                    stats.mismatched.to_string(),
                    stats.oversized.to_string(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "address={} transmitted={} accepted={} errors={} (malformed={} mismatched={} oversized={})",
                address,
                stats.transmitted,
                stats.accepted,
                stats.rejected,
                stats.malformed,
                stats.mismatched,
                stats.oversized
            );
        }
        // Raw output carries payload bytes only.
        OutputFormat::Raw => {}
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn payload_preview(payload: &[u8]) -> String {
    match std::str::from_utf8(payload) {
        Ok(text) => text.to_string(),
        Err(_) => format!("<binary {} bytes>", payload.len()),
    }
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_text_and_binary() {
        assert_eq!(payload_preview(b"hello"), "hello");
        assert_eq!(payload_preview(&[0xFF, 0xFE, 0x00]), "<binary 3 bytes>");
    }

    #[test]
    fn stats_json_flattens_counters() {
        let stats = MacStats {
            transmitted: 2,
            accepted: 1,
            rejected: 1,
            malformed: 0,
            mismatched: 1,
            oversized: 0,
        };
        let out = StatsOutput {
            schema_id: STATS_SCHEMA_ID,
            address: Address::new(0x10).to_string(),
            error_count: stats.rejected,
            stats: &stats,
        };
        let value: serde_json::Value = serde_json::to_value(&out).unwrap();
        assert_eq!(value["address"], "0x0010");
        assert_eq!(value["error_count"], 1);
        assert_eq!(value["transmitted"], 2);
        assert_eq!(value["mismatched"], 1);
    }
}
