//! Logical transfer requests.

use crate::error::BusError;
use crate::space::AddressSpace;

/// Bytes moved by a line fill request.
pub const LINE_FILL_SIZE: u8 = 4;

/// Which way data moves, and the options only that direction has.
///
/// Line fills only exist for reads; a write has no burst flag at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Read { burst: bool },
    Write { data: u32 },
}

/// One logical transfer, before it is split into bus cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferRequest {
    pub space: AddressSpace,
    pub address: u32,
    pub size: u8,
    pub direction: Direction,
}

impl TransferRequest {
    #[must_use]
    pub const fn read(space: AddressSpace, address: u32, size: u8) -> Self {
        Self {
            space,
            address,
            size,
            direction: Direction::Read { burst: false },
        }
    }

    /// A read that asks the slave for a cache line fill. The size is always
    /// a long word.
    #[must_use]
    pub const fn burst_read(space: AddressSpace, address: u32) -> Self {
        Self {
            space,
            address,
            size: LINE_FILL_SIZE,
            direction: Direction::Read { burst: true },
        }
    }

    #[must_use]
    pub const fn write(space: AddressSpace, address: u32, size: u8, data: u32) -> Self {
        Self {
            space,
            address,
            size,
            direction: Direction::Write { data },
        }
    }

    #[must_use]
    pub const fn burst(&self) -> bool {
        matches!(self.direction, Direction::Read { burst: true })
    }

    /// Operand size actually transferred (a line fill is always 4 bytes).
    #[must_use]
    pub const fn effective_size(&self) -> u8 {
        if self.burst() { LINE_FILL_SIZE } else { self.size }
    }

    /// Check size and address range.
    pub fn validate(&self) -> Result<(), BusError> {
        let size = self.effective_size();
        if !matches!(size, 1 | 2 | 4) {
            return Err(BusError::InvalidSize { size });
        }
        if u64::from(self.address) + u64::from(size) - 1 > u64::from(u32::MAX) {
            return Err(BusError::AddressOutOfRange {
                address: self.address,
                size,
            });
        }
        Ok(())
    }
}
