//! Cache line burst fill.
//!
//! A long-word read issued with CBREQ asserted can be stretched into a line
//! fill: if the first cycle terminates synchronously and the slave asserts
//! CBACK (without CIIN), the strobes stay asserted and up to three more beats
//! stream in. The slave ends the burst early by negating CBACK; the beat on
//! which that is seen still carries data and is the last one.

use emu_core::Logic;

/// Maximum beats in a line fill, including the initial cycle.
pub const BURST_BEATS: u8 = 4;

/// Per-request burst state.
#[derive(Debug, Clone)]
pub struct BurstController {
    start: u32,
    requested: bool,
    active: bool,
    beat: u8,
}

impl BurstController {
    #[must_use]
    pub const fn new(start: u32, requested: bool) -> Self {
        Self {
            start,
            requested,
            active: false,
            beat: 0,
        }
    }

    /// Whether the request asked for a line fill (CBREQ is driven).
    #[must_use]
    pub const fn requested(&self) -> bool {
        self.requested
    }

    /// Whether the transfer has been promoted to a burst.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Index of the current beat (0 for the initial cycle).
    #[must_use]
    pub const fn beat(&self) -> u8 {
        self.beat
    }

    /// Grant condition: CBACK asserted and CIIN not asserted.
    #[must_use]
    pub const fn granted(cback: Logic, ciin: Logic) -> bool {
        cback.is_low() && !ciin.is_low()
    }

    /// Address of a beat: the low nibble wraps inside the 16-byte line.
    #[must_use]
    pub const fn beat_address(start: u32, offset: u8) -> u32 {
        (start & !0xF) | (start.wrapping_add(offset as u32) & 0xF)
    }

    /// Address of the current beat.
    #[must_use]
    pub const fn address(&self) -> u32 {
        Self::beat_address(self.start, self.beat)
    }

    /// Decide promotion once the first cycle has terminated.
    ///
    /// Only the first cycle of a burst request that ended synchronously can
    /// be promoted. Returns true if the transfer became a burst.
    pub fn offer(&mut self, first_cycle: bool, synchronous: bool, granted: bool) -> bool {
        self.active = self.requested && first_cycle && synchronous && granted;
        self.active
    }

    /// Close the current beat. Returns true if another beat follows.
    ///
    /// A beat sampled without the grant is the last one, as is the fourth.
    pub fn finish_beat(&mut self, granted: bool) -> bool {
        if !self.active {
            return false;
        }
        if !granted || self.beat + 1 >= BURST_BEATS {
            self.active = false;
            return false;
        }
        self.beat += 1;
        true
    }
}
