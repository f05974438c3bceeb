//! Byte accounting and lane alignment for dynamically sized transfers.
//!
//! The 68030 doesn't know a port's width until the slave answers. Each bus
//! cycle moves as many bytes as the port accepts, and the next cycle starts
//! at the first byte that wasn't taken. Operand bytes always sit on the
//! upper lanes of the data bus: an 8-bit port is wired to D31-D24 and a
//! 16-bit port to D31-D16.

use emu_core::{Logic, LogicVec};
use serde::{Deserialize, Serialize};

use crate::pins::size_code;

/// Port width reported by a slave for one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortWidth {
    #[serde(rename = "8")]
    Byte,
    #[serde(rename = "16")]
    Word,
    #[serde(rename = "32")]
    Long,
}

impl PortWidth {
    /// Bytes the port moves per cycle.
    #[must_use]
    pub const fn bytes(self) -> u8 {
        match self {
            Self::Byte => 1,
            Self::Word => 2,
            Self::Long => 4,
        }
    }

    /// Decode DSACK1-DSACK0.
    ///
    /// | DSACK1 | DSACK0 | port |
    /// |--------|--------|------|
    /// | low    | low    | 32   |
    /// | low    | -      | 16   |
    /// | -      | low    | 8    |
    ///
    /// A line driven high counts the same as an undriven one. Anything else
    /// (neither line asserted) is not a valid acknowledge.
    #[must_use]
    pub fn from_dsack(dsack: LogicVec) -> Option<Self> {
        match (dsack.bit(1).is_low(), dsack.bit(0).is_low()) {
            (true, true) => Some(Self::Long),
            (true, false) => Some(Self::Word),
            (false, true) => Some(Self::Byte),
            (false, false) => None,
        }
    }

    /// DSACK1-DSACK0 levels a slave of this width drives.
    #[must_use]
    pub fn dsack(self) -> LogicVec {
        let (dsack1, dsack0) = match self {
            Self::Long => (Logic::Low, Logic::Low),
            Self::Word => (Logic::Low, Logic::Floating),
            Self::Byte => (Logic::Floating, Logic::Low),
        };
        LogicVec::from_msb_first(&[dsack1, dsack0])
    }

    /// Data lines this port is wired to.
    #[must_use]
    pub const fn lane_mask(self) -> u32 {
        match self {
            Self::Byte => 0xFF00_0000,
            Self::Word => 0xFFFF_0000,
            Self::Long => 0xFFFF_FFFF,
        }
    }
}

/// Mask covering the low `bytes` bytes of a word.
const fn low_bytes_mask(bytes: u8) -> u32 {
    if bytes >= 4 {
        u32::MAX
    } else {
        (1u32 << (8 * bytes as u32)) - 1
    }
}

/// Tracks progress of one logical transfer across its bus cycles.
#[derive(Debug, Clone)]
pub struct TransferAccountant {
    start: u32,
    size: u8,
    transferred: u8,
    assembled: u32,
}

impl TransferAccountant {
    #[must_use]
    pub const fn new(start: u32, size: u8) -> Self {
        Self {
            start,
            size,
            transferred: 0,
            assembled: 0,
        }
    }

    #[must_use]
    pub const fn transferred(&self) -> u8 {
        self.transferred
    }

    #[must_use]
    pub const fn remaining(&self) -> u8 {
        self.size - self.transferred
    }

    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.transferred >= self.size
    }

    /// Address of the first byte not yet transferred.
    #[must_use]
    pub const fn next_address(&self) -> u32 {
        self.start.wrapping_add(self.transferred as u32)
    }

    /// SIZ encoding for the next cycle.
    #[must_use]
    pub const fn size_code(&self) -> u32 {
        size_code(self.remaining())
    }

    /// Bytes the next cycle moves on a port of the given width.
    #[must_use]
    pub fn take(&self, port: PortWidth) -> u8 {
        self.remaining().min(port.bytes())
    }

    /// Record a completed cycle. Returns the number of bytes it moved.
    pub fn advance(&mut self, port: PortWidth) -> u8 {
        let taken = self.take(port);
        self.transferred += taken;
        taken
    }

    /// Mark the transfer finished regardless of the byte count (line fills).
    pub fn complete(&mut self) {
        self.transferred = self.size;
    }

    /// Value placed in a read cycle's trace record.
    ///
    /// A 32-bit port reports the whole bus. Narrow ports report their lanes,
    /// moved down and then left by the bytes already transferred, so a byte
    /// port's records hold byte 0 in bits 7-0, byte 1 in bits 15-8, and so
    /// on. Bits pushed past D31 are lost.
    #[must_use]
    pub fn recorded_data(&self, port: PortWidth, bus: u32) -> u32 {
        let shift = 8 * self.transferred as u32;
        let lanes = match port {
            PortWidth::Long => return bus,
            PortWidth::Word => bus >> 16,
            PortWidth::Byte => bus >> 24,
        };
        lanes.checked_shl(shift).unwrap_or(0)
    }

    /// Fold the bytes a read cycle delivered into the assembled operand.
    ///
    /// Must be called before [`advance`](Self::advance) for the same cycle.
    pub fn absorb(&mut self, port: PortWidth, bus: u32) {
        let taken = u32::from(self.take(port));
        if taken == 0 {
            return;
        }
        let chunk = bus >> (32 - 8 * taken);
        self.assembled = if taken >= 4 {
            chunk
        } else {
            (self.assembled << (8 * taken)) | chunk
        };
    }

    /// Operand assembled from all read cycles so far, right-justified.
    #[must_use]
    pub const fn assembled(&self) -> u32 {
        self.assembled
    }

    /// Bus word a write cycle drives: the bytes not yet accepted,
    /// left-justified so the next byte sits on D31-D24.
    #[must_use]
    pub const fn write_lanes(&self, data: u32) -> u32 {
        let remaining = self.remaining();
        if remaining == 0 {
            return 0;
        }
        (data & low_bytes_mask(remaining)) << (8 * (4 - remaining as u32))
    }
}
