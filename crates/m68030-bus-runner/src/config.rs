//! Runner configuration, loaded from JSON.

use std::path::{Path, PathBuf};

use motorola_68030::testbench::SlaveConfig;
use motorola_68030::{AddressSpace, BURST_BEATS};
use serde::Deserialize;
use thiserror::Error;

/// Fastest clock whose half period is still a whole nanosecond.
pub const MAX_CLOCK_HZ: u64 = 500_000_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("clock frequency {0} Hz out of range (1 to 500000000)")]
    InvalidClock(u64),

    #[error("burst length {0} out of range (1 to 4)")]
    InvalidBurstBeats(u8),
}

/// Everything a run needs besides the stimulus itself.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub clock_hz: u64,
    /// Function code used for every stimulus operation.
    pub address_space: AddressSpace,
    /// Run the power-on reset sequence before the first operation.
    pub reset: bool,
    /// Poll IPL after each operation.
    pub poll_interrupts: bool,
    pub slave: SlaveConfig,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            clock_hz: 25_000_000,
            address_space: AddressSpace::SupervisorData,
            reset: true,
            poll_interrupts: true,
            slave: SlaveConfig::default(),
        }
    }
}

impl RunnerConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.clock_hz == 0 || self.clock_hz > MAX_CLOCK_HZ {
            return Err(ConfigError::InvalidClock(self.clock_hz));
        }
        if self.slave.burst_beats == 0 || self.slave.burst_beats > BURST_BEATS {
            return Err(ConfigError::InvalidBurstBeats(self.slave.burst_beats));
        }
        Ok(())
    }
}
