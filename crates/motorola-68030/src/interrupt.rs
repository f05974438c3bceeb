//! Interrupt priority polling and CPU-space acknowledge cycles.

use std::fmt;

use emu_core::{LogicVec, SignalBus};

use crate::engine::BusMaster;
use crate::error::BusError;
use crate::pins::Pin;
use crate::space::AddressSpace;
use crate::trace::TransactionResult;

/// Interrupt priority level, 0 (none pending) to 7 (non-maskable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct InterruptLevel(u8);

impl InterruptLevel {
    pub const NONE: Self = Self(0);

    /// Build a level from its low three bits.
    #[must_use]
    pub const fn new(level: u8) -> Self {
        Self(level & 0x07)
    }

    /// Decode IPL2-IPL0.
    ///
    /// The lines are active-low with pull-ups, so an undriven line reads as
    /// 1 and an idle bus decodes to level 0.
    #[must_use]
    pub const fn decode(ipl: LogicVec) -> Self {
        Self::new(!(ipl.resolve(true) as u8))
    }

    /// IPL2-IPL0 pattern a device drives to request this level.
    #[must_use]
    pub const fn encoded(self) -> u32 {
        (!self.0 & 0x07) as u32
    }

    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    #[must_use]
    pub const fn is_pending(self) -> bool {
        self.0 != 0
    }

    /// CPU-space address of the acknowledge cycle for this level.
    ///
    /// A31-A4 all ones marks an interrupt acknowledge; A3-A1 carry the level
    /// and A0 is set.
    #[must_use]
    pub const fn acknowledge_address(self) -> u32 {
        0xFFFF_FFF1 | ((self.0 as u32) << 1)
    }
}

impl fmt::Display for InterruptLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IPL{}", self.0)
    }
}

/// Samples IPL between transfers and acknowledges escalations.
///
/// One poller belongs to one simulated processor. It remembers the level
/// seen on the previous poll; only a strictly higher level triggers an
/// acknowledge. The remembered level is replaced on every poll, so a level
/// that drops and comes back is acknowledged again only if a poll observed
/// the drop.
#[derive(Debug, Clone, Default)]
pub struct InterruptPoller {
    last_level: InterruptLevel,
}

impl InterruptPoller {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last_level: InterruptLevel::NONE,
        }
    }

    /// Level observed by the most recent poll.
    #[must_use]
    pub const fn last_level(&self) -> InterruptLevel {
        self.last_level
    }

    /// Sample IPL and run an acknowledge cycle on escalation.
    pub fn poll<B: SignalBus<Line = Pin>>(
        &mut self,
        master: &mut BusMaster<B>,
    ) -> Result<Option<TransactionResult>, BusError> {
        let ipl = master
            .bus()
            .read_field(Pin::InterruptPriority, Pin::InterruptPriority.width());
        let level = InterruptLevel::decode(ipl);
        let previous = self.last_level;
        self.last_level = level;

        if !level.is_pending() || level <= previous {
            return Ok(None);
        }

        tracing::debug!(%level, %previous, "interrupt escalation; acknowledging");
        master
            .read(AddressSpace::CpuSpace, level.acknowledge_address(), 1)
            .map(Some)
    }
}
