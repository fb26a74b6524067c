use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use bytes::Bytes;
use tracing::trace;

use crate::config::PhyConfig;
use crate::error::{PhyError, Result};
use crate::traits::PhyChannel;

/// In-memory medium where every transmitted frame is delivered back in order.
///
/// Clones share the same queue, so one clone can act as the transmitter and
/// another as the receiver of the same node, or of several nodes attached to
/// a common broadcast medium.
#[derive(Debug, Clone)]
pub struct LoopbackPhy {
    shared: Arc<Shared>,
    max_frame_size: usize,
}

#[derive(Debug, Default)]
struct Shared {
    queue: Mutex<VecDeque<Bytes>>,
    closed: AtomicBool,
}

impl LoopbackPhy {
    /// Create an empty loopback medium with default configuration.
    pub fn new() -> Self {
        Self::with_config(&PhyConfig::default())
    }

    /// Create an empty loopback medium with explicit configuration.
    ///
    /// Only `max_frame_size` applies; the loopback never blocks.
    pub fn with_config(config: &PhyConfig) -> Self {
        Self {
            shared: Arc::new(Shared::default()),
            max_frame_size: config.max_frame_size,
        }
    }

    /// Number of frames waiting to be received.
    pub fn pending(&self) -> usize {
        self.queue().len()
    }

    /// Close the medium. Subsequent sends fail with [`PhyError::Shutdown`];
    /// frames already queued can still be received.
    pub fn close(&self) {
        self.shared.closed.store(true, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::SeqCst)
    }

    fn queue(&self) -> MutexGuard<'_, VecDeque<Bytes>> {
        // The queue holds plain data; a panicked holder cannot leave it inconsistent.
        self.shared
            .queue
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for LoopbackPhy {
    fn default() -> Self {
        Self::new()
    }
}

impl PhyChannel for LoopbackPhy {
    fn send_frame(&mut self, frame: &[u8]) -> Result<()> {
        if self.is_closed() {
            return Err(PhyError::Shutdown);
        }
        if frame.len() > self.max_frame_size {
            return Err(PhyError::FrameTooLarge {
                size: frame.len(),
                max: self.max_frame_size,
            });
        }
        trace!(len = frame.len(), "loopback enqueue");
        self.queue().push_back(Bytes::copy_from_slice(frame));
        Ok(())
    }

    fn recv_frame(&mut self) -> Result<Option<Bytes>> {
        Ok(self.queue().pop_front())
    }

    fn medium_name(&self) -> &'static str {
        "loopback"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_come_back_in_order() {
        let mut phy = LoopbackPhy::new();
        phy.send_frame(b"one").unwrap();
        phy.send_frame(b"two").unwrap();
        phy.send_frame(b"").unwrap();

        assert_eq!(phy.pending(), 3);
        assert_eq!(phy.recv_frame().unwrap().unwrap().as_ref(), b"one");
        assert_eq!(phy.recv_frame().unwrap().unwrap().as_ref(), b"two");
        assert!(phy.recv_frame().unwrap().unwrap().is_empty());
        assert!(phy.recv_frame().unwrap().is_none());
    }

    #[test]
    fn clones_share_the_medium() {
        let mut tx = LoopbackPhy::new();
        let mut rx = tx.clone();

        tx.send_frame(b"shared").unwrap();
        assert_eq!(rx.recv_frame().unwrap().unwrap().as_ref(), b"shared");
        assert_eq!(tx.pending(), 0);
    }

    #[test]
    fn oversized_frame_rejected() {
        let cfg = PhyConfig {
            max_frame_size: 4,
            ..PhyConfig::default()
        };
        let mut phy = LoopbackPhy::with_config(&cfg);

        phy.send_frame(b"four").unwrap();
        let err = phy.send_frame(b"fives").unwrap_err();
        assert!(matches!(err, PhyError::FrameTooLarge { size: 5, max: 4 }));
        assert_eq!(phy.pending(), 1);
    }

    #[test]
    fn closed_medium_rejects_sends_but_drains() {
        let mut phy = LoopbackPhy::new();
        phy.send_frame(b"last").unwrap();
        phy.close();

        assert!(matches!(phy.send_frame(b"late"), Err(PhyError::Shutdown)));
        assert_eq!(phy.recv_frame().unwrap().unwrap().as_ref(), b"last");
        assert!(phy.recv_frame().unwrap().is_none());
    }

    #[test]
    fn boxed_channel_delegates() {
        let mut phy: Box<dyn PhyChannel> = Box::new(LoopbackPhy::new());
        phy.send_frame(b"boxed").unwrap();
        assert_eq!(phy.medium_name(), "loopback");
        assert_eq!(phy.recv_frame().unwrap().unwrap().as_ref(), b"boxed");
    }
}
