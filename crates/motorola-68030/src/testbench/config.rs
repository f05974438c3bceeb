//! Slave timing and contents.

use serde::Deserialize;

use crate::accountant::PortWidth;

/// How the slave ends a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Termination {
    /// STERM; always a 32-bit port.
    Synchronous,
    /// DSACK1-DSACK0 encoding the port width.
    Asynchronous,
}

/// Per-cycle behaviour of a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PortTiming {
    pub port: PortWidth,
    pub termination: Termination,
    /// Clocks inserted before terminating.
    pub wait_states: u32,
}

impl PortTiming {
    #[must_use]
    pub const fn synchronous(wait_states: u32) -> Self {
        Self {
            port: PortWidth::Long,
            termination: Termination::Synchronous,
            wait_states,
        }
    }

    #[must_use]
    pub const fn asynchronous(port: PortWidth, wait_states: u32) -> Self {
        Self {
            port,
            termination: Termination::Asynchronous,
            wait_states,
        }
    }

    /// Width the slave actually presents; STERM implies 32 bits.
    #[must_use]
    pub const fn effective_port(&self) -> PortWidth {
        match self.termination {
            Termination::Synchronous => PortWidth::Long,
            Termination::Asynchronous => self.port,
        }
    }
}

impl Default for PortTiming {
    fn default() -> Self {
        Self::asynchronous(PortWidth::Long, 0)
    }
}

/// An address range answered with its own timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Region {
    pub base: u32,
    pub length: u32,
    #[serde(flatten)]
    pub timing: PortTiming,
}

impl Region {
    #[must_use]
    pub fn contains(&self, address: u32) -> bool {
        let address = u64::from(address);
        let base = u64::from(self.base);
        address >= base && address < base + u64::from(self.length)
    }
}

/// Bytes placed in memory before the first cycle.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MemoryInit {
    pub address: u32,
    pub bytes: Vec<u8>,
}

/// Complete slave configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SlaveConfig {
    /// Timing for addresses outside every region.
    pub default: PortTiming,
    /// Checked in order; the first match wins.
    pub regions: Vec<Region>,
    /// Beats the slave is willing to supply in a line fill (1 disables bursts).
    pub burst_beats: u8,
    /// Wait states before each beat after the first.
    pub burst_wait_states: u32,
    /// Assert CIIN on every read.
    pub cache_inhibit: bool,
    /// Interrupt level requested on IPL2-IPL0 at power-on.
    pub interrupt_level: u8,
    /// Drop the interrupt request once it is acknowledged.
    pub clear_interrupt_on_ack: bool,
    /// Vector returned by acknowledge cycles; autovector (24 + level) if unset.
    pub interrupt_vector: Option<u8>,
    pub memory: Vec<MemoryInit>,
}

impl SlaveConfig {
    /// Timing used for a cycle starting at `address`.
    #[must_use]
    pub fn timing_for(&self, address: u32) -> PortTiming {
        self.regions
            .iter()
            .find(|r| r.contains(address))
            .map_or(self.default, |r| r.timing)
    }

    /// Whole address space answered with one timing.
    #[must_use]
    pub fn uniform(timing: PortTiming) -> Self {
        Self {
            default: timing,
            ..Self::default()
        }
    }
}

impl Default for SlaveConfig {
    fn default() -> Self {
        Self {
            default: PortTiming::default(),
            regions: Vec::new(),
            burst_beats: 4,
            burst_wait_states: 0,
            cache_inhibit: false,
            interrupt_level: 0,
            clear_interrupt_on_ack: false,
            interrupt_vector: None,
            memory: Vec::new(),
        }
    }
}
