use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{PhyError, Result};

/// Default maximum frame size: 64 KiB.
pub const DEFAULT_MAX_FRAME: usize = 64 * 1024;

/// Largest accepted `max_frame_size`. Receive buffers are sized from it up front.
pub const MAX_FRAME_LIMIT: usize = DEFAULT_MAX_FRAME;

/// Configuration for a physical medium.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhyConfig {
    /// Largest frame (header + payload) accepted in either direction. Default: 64 KiB.
    pub max_frame_size: usize,
    /// Read timeout for blocking receives.
    #[serde(with = "duration_ms")]
    pub read_timeout: Option<Duration>,
    /// Write timeout for blocking sends.
    #[serde(with = "duration_ms")]
    pub write_timeout: Option<Duration>,
}

impl Default for PhyConfig {
    fn default() -> Self {
        Self {
            max_frame_size: DEFAULT_MAX_FRAME,
            read_timeout: None,
            write_timeout: None,
        }
    }
}

impl PhyConfig {
    /// Check that `max_frame_size` lies in `1..=MAX_FRAME_LIMIT`.
    pub fn validate(&self) -> Result<()> {
        if self.max_frame_size == 0 || self.max_frame_size > MAX_FRAME_LIMIT {
            return Err(PhyError::InvalidFrameLimit {
                size: self.max_frame_size,
                max: MAX_FRAME_LIMIT,
            });
        }
        Ok(())
    }
}

/// Optional durations as whole milliseconds in config files.
mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => serializer.serialize_some(&(d.as_millis() as u64)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(PhyConfig::default().validate().is_ok());
    }

    #[test]
    fn frame_limit_bounds() {
        for size in [1, 512, MAX_FRAME_LIMIT] {
            let cfg = PhyConfig {
                max_frame_size: size,
                ..PhyConfig::default()
            };
            assert!(cfg.validate().is_ok(), "{size} should be accepted");
        }
        for size in [0, MAX_FRAME_LIMIT + 1, usize::MAX] {
            let cfg = PhyConfig {
                max_frame_size: size,
                ..PhyConfig::default()
            };
            assert!(matches!(
                cfg.validate(),
                Err(PhyError::InvalidFrameLimit { max: MAX_FRAME_LIMIT, .. })
            ));
        }
    }
}
