use std::sync::atomic::{AtomicBool, AtomicU16, AtomicU64, AtomicUsize, Ordering};

use bytes::Bytes;
use serde::Serialize;
use simplemac_frame::{accepts, decode_frame, encode, Address, FrameError, BROADCAST};
use tracing::{debug, info, warn};

use crate::config::MacConfig;
use crate::error::{DropReason, MacError, Result};
use crate::packet::{DType, Metadata, UpperPacket, RECIPIENT_KEY, SENDER_KEY};

/// Result of running one frame through the RX path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RxOutcome {
    /// The frame was for this node (or broadcast) and goes to the upper layer.
    Accepted(UpperPacket),
    /// The frame was dropped and counted.
    Dropped(DropReason),
}

impl RxOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, RxOutcome::Accepted(_))
    }

    /// The accepted packet, if any.
    pub fn into_packet(self) -> Option<UpperPacket> {
        match self {
            RxOutcome::Accepted(packet) => Some(packet),
            RxOutcome::Dropped(_) => None,
        }
    }
}

/// Point-in-time counter snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MacStats {
    /// Frames produced by the TX path.
    pub transmitted: u64,
    /// Frames delivered to the upper layer.
    pub accepted: u64,
    /// Frames dropped for any reason. This is the error count and always
    /// equals `malformed + mismatched + oversized`.
    pub rejected: u64,
    /// Dropped because shorter than the header.
    pub malformed: u64,
    /// Dropped because addressed to another node.
    pub mismatched: u64,
    /// Dropped because the medium delivered more than its frame limit.
    pub oversized: u64,
}

// The error count is derived from the per-reason counters, so a snapshot
// can never disagree with itself.
#[derive(Debug, Default)]
struct Counters {
    transmitted: AtomicU64,
    accepted: AtomicU64,
    malformed: AtomicU64,
    mismatched: AtomicU64,
    oversized: AtomicU64,
}

impl Counters {
    fn rejected(&self) -> u64 {
        self.malformed.load(Ordering::Relaxed)
            + self.mismatched.load(Ordering::Relaxed)
            + self.oversized.load(Ordering::Relaxed)
    }
}

/// High bit of the active count: an address change holds the gate.
const ADDRESS_WRITER: usize = 1 << (usize::BITS - 1);

/// The MAC engine for one node.
///
/// Both paths take `&self`, so one instance can be shared (e.g. in an `Arc`)
/// between the thread driving traffic and threads reading counters. The
/// address is read once per invocation. [`SimpleMac::set_address`] refuses
/// while a path is running, and a path that starts during an address change
/// waits for the change to finish.
#[derive(Debug, Default)]
pub struct SimpleMac {
    address: AtomicU16,
    configured: AtomicBool,
    active: AtomicUsize,
    counters: Counters,
}

/// Marks a TX/RX invocation as in progress for its lifetime.
struct ActiveGuard<'a>(&'a AtomicUsize);

impl<'a> ActiveGuard<'a> {
    fn enter(active: &'a AtomicUsize) -> Self {
        let mut current = active.load(Ordering::Acquire);
        loop {
            if current & ADDRESS_WRITER != 0 {
                std::hint::spin_loop();
                current = active.load(Ordering::Acquire);
                continue;
            }
            match active.compare_exchange_weak(
                current,
                current + 1,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return Self(active),
                Err(actual) => current = actual,
            }
        }
    }
}

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

impl SimpleMac {
    /// Create an unconfigured MAC. Its address reads as [`Address::UNSET`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a MAC with its address already set.
    pub fn with_address(address: Address) -> Self {
        let mac = Self::new();
        mac.store_address(address);
        log_address(address);
        mac
    }

    /// Create a MAC from configuration. A missing address leaves it unconfigured.
    pub fn from_config(config: &MacConfig) -> Self {
        match config.address {
            Some(address) => Self::with_address(address),
            None => Self::new(),
        }
    }

    /// Replace this node's address.
    ///
    /// Frames already produced or queued are unaffected. Fails with
    /// [`MacError::AddressBusy`] if a TX or RX invocation is running.
    pub fn set_address(&self, address: Address) -> Result<()> {
        // Holding the writer bit keeps new invocations out until the store lands.
        if let Err(current) = self.active.compare_exchange(
            0,
            ADDRESS_WRITER,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            return Err(MacError::AddressBusy {
                active: current & !ADDRESS_WRITER,
            });
        }
        self.store_address(address);
        self.active.store(0, Ordering::Release);
        log_address(address);
        Ok(())
    }

    fn store_address(&self, address: Address) {
        self.address.store(address.get(), Ordering::Release);
        self.configured.store(true, Ordering::Release);
    }

    /// This node's address, or [`Address::UNSET`] if never configured.
    pub fn address(&self) -> Address {
        Address::new(self.address.load(Ordering::Acquire))
    }

    /// Whether an address has ever been set.
    pub fn is_configured(&self) -> bool {
        self.configured.load(Ordering::Acquire)
    }

    /// Cumulative number of dropped frames. Never decreases.
    pub fn error_count(&self) -> u64 {
        self.counters.rejected()
    }

    /// Counter snapshot. Fields are read one at a time, so counters from
    /// different paths may be a frame apart; `rejected` always matches the
    /// per-reason fields in the same snapshot.
    pub fn stats(&self) -> MacStats {
        let malformed = self.counters.malformed.load(Ordering::Relaxed);
        let mismatched = self.counters.mismatched.load(Ordering::Relaxed);
        let oversized = self.counters.oversized.load(Ordering::Relaxed);
        MacStats {
            transmitted: self.counters.transmitted.load(Ordering::Relaxed),
            accepted: self.counters.accepted.load(Ordering::Relaxed),
            rejected: malformed + mismatched + oversized,
            malformed,
            mismatched,
            oversized,
        }
    }

    /// TX path: frame an upper-layer packet for the physical side.
    ///
    /// The recipient comes from the packet's `recipient` metadata and
    /// defaults to broadcast when absent. A value that is present but not a
    /// 16-bit integer is also sent as broadcast, with a warning.
    pub fn on_upper_packet(&self, packet: UpperPacket) -> Bytes {
        let _guard = ActiveGuard::enter(&self.active);
        let sender = self.address();
        let recipient = resolve_recipient(&packet.metadata);

        let frame = encode(sender, recipient, &packet.payload);
        self.counters.transmitted.fetch_add(1, Ordering::Relaxed);
        debug!(%sender, %recipient, len = frame.len(), "tx frame");
        frame
    }

    /// RX path: decode and filter one physical frame.
    pub fn on_physical_frame(&self, frame: Bytes) -> RxOutcome {
        let _guard = ActiveGuard::enter(&self.active);
        let own = self.address();

        let decoded = match decode_frame(frame) {
            Ok(decoded) => decoded,
            Err(FrameError::Malformed { len }) => {
                self.counters.malformed.fetch_add(1, Ordering::Relaxed);
                return self.reject(DropReason::Malformed { len });
            }
        };

        if !accepts(own, decoded.recipient) {
            self.counters.mismatched.fetch_add(1, Ordering::Relaxed);
            return self.reject(DropReason::AddressMismatch {
                recipient: decoded.recipient,
                own,
            });
        }

        let mut metadata = Metadata::new();
        metadata.insert(SENDER_KEY, decoded.sender);
        metadata.insert(RECIPIENT_KEY, decoded.recipient);

        self.counters.accepted.fetch_add(1, Ordering::Relaxed);
        debug!(
            sender = %decoded.sender,
            recipient = %decoded.recipient,
            len = decoded.payload.len(),
            "rx frame accepted"
        );

        RxOutcome::Accepted(UpperPacket {
            payload: decoded.payload,
            dtype: DType::BYTES,
            metadata,
        })
    }

    /// RX path for a message the medium cut off at its frame limit.
    ///
    /// The contents are unusable, so the frame is dropped and counted like
    /// any other reception error.
    pub fn on_oversized_frame(&self, size: usize) -> RxOutcome {
        let _guard = ActiveGuard::enter(&self.active);
        self.counters.oversized.fetch_add(1, Ordering::Relaxed);
        self.reject(DropReason::Oversized { size })
    }

    fn reject(&self, reason: DropReason) -> RxOutcome {
        debug!(%reason, error_count = self.error_count(), "rx frame dropped");
        RxOutcome::Dropped(reason)
    }
}

fn log_address(address: Address) {
    if address.is_broadcast() {
        warn!(%address, "own address set to broadcast; every frame will be accepted");
    }
    info!(%address, "mac address set");
}

fn resolve_recipient(metadata: &Metadata) -> Address {
    match metadata.get(RECIPIENT_KEY) {
        None => BROADCAST,
        Some(value) => value.as_address().unwrap_or_else(|| {
            warn!(?value, "unusable recipient metadata; sending as broadcast");
            BROADCAST
        }),
    }
}
