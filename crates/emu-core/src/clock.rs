//! Bus clock configuration.

/// Clock driving a simulated bus.
///
/// Simulated time advances in half periods: every rising or falling edge
/// moves the clock forward by `half_period_ns`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MasterClock {
    /// Clock frequency in Hz (e.g., `25_000_000` for a 25 MHz 68030).
    pub frequency_hz: u64,
}

impl MasterClock {
    #[must_use]
    pub const fn new(frequency_hz: u64) -> Self {
        Self { frequency_hz }
    }

    /// Full clock period in nanoseconds (integer division).
    #[must_use]
    pub const fn period_ns(&self) -> u64 {
        1_000_000_000 / self.frequency_hz
    }

    /// Time between two consecutive edges.
    #[must_use]
    pub const fn half_period_ns(&self) -> u64 {
        self.period_ns() / 2
    }

    /// Simulated time after `edges` clock transitions.
    #[must_use]
    pub const fn edges_to_ns(&self, edges: u64) -> u64 {
        edges * self.half_period_ns()
    }
}

impl Default for MasterClock {
    fn default() -> Self {
        Self::new(25_000_000)
    }
}
