//! 68030 bus master: the cycle engine shared by reads and writes.
//!
//! Every physical cycle walks the same states:
//!
//! - **S0** (rising edge): address, function code, SIZ and R/W driven.
//! - **S1** (falling edge): AS asserted (and DS for reads).
//! - **S2** (rising edge): write data driven.
//! - **S3** (falling edge): STERM/DSACK sampled. If neither is asserted the
//!   cycle inserts wait states, one clock at a time, until one is.
//! - **S4/S5** (asynchronous termination only): one more clock, data latched
//!   on the rising edge.
//!
//! The engine blocks on the bus for every edge. Nothing bounds the wait
//! loop: a slave that never terminates hangs the transfer, as it would hang
//! the real processor.

use emu_core::{Edge, Logic, LogicVec, SignalBus};

use crate::accountant::PortWidth;
use crate::pins::Pin;
use crate::space::AddressSpace;
use crate::trace::CycleRecord;

/// Clocks RESET is held asserted by [`BusMaster::reset`].
pub const RESET_CLOCKS: u32 = 512;

/// Bus master for the 68030 external bus.
///
/// Owns the signal bus for as long as it exists; transfers never overlap.
#[derive(Debug)]
pub struct BusMaster<B: SignalBus<Line = Pin>> {
    pub(crate) bus: B,
    transactions: u64,
}

impl<B: SignalBus<Line = Pin>> BusMaster<B> {
    #[must_use]
    pub fn new(bus: B) -> Self {
        Self {
            bus,
            transactions: 0,
        }
    }

    #[must_use]
    pub fn bus(&self) -> &B {
        &self.bus
    }

    #[must_use]
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Transfers started since construction (rejected requests excluded).
    #[must_use]
    pub const fn transactions(&self) -> u64 {
        self.transactions
    }

    /// Drive every master output to its idle level.
    pub fn idle_outputs(&mut self) {
        self.bus.drive_bit(Pin::Reset, true);
        self.bus.drive_bit(Pin::ReadWrite, true);
        self.bus.drive_bit(Pin::AddressStrobe, true);
        self.bus.drive_bit(Pin::DataStrobe, true);
        self.bus.drive_field(Pin::Size, 0, Pin::Size.width());
        self.bus.drive_field(Pin::FunctionCode, 0, Pin::FunctionCode.width());
        self.bus.drive_field(Pin::Address, 0, Pin::Address.width());
        self.bus.release(Pin::Data);
        self.bus.drive_bit(Pin::CacheBurstRequest, true);
    }

    /// Power-on reset: idle the outputs and hold RESET for [`RESET_CLOCKS`].
    pub fn reset(&mut self) {
        self.bus.await_edge(Edge::Rising);
        self.idle_outputs();
        self.bus.drive_bit(Pin::Reset, false);
        for _ in 0..RESET_CLOCKS {
            self.bus.await_edge(Edge::Falling);
            self.bus.await_edge(Edge::Rising);
        }
        self.bus.drive_bit(Pin::Reset, true);
        tracing::debug!(clocks = RESET_CLOCKS, time_ns = self.bus.time_ns(), "reset complete");
    }

    pub(crate) fn begin_transaction(&mut self) {
        self.transactions += 1;
    }

    /// One clock: a rising edge followed by a falling edge.
    pub(crate) fn wait_clock(&mut self) {
        self.bus.await_edge(Edge::Rising);
        self.bus.await_edge(Edge::Falling);
    }

    /// S0 drives: data released, address, function code, direction, size.
    pub(crate) fn drive_address_phase(
        &mut self,
        address: u32,
        space: AddressSpace,
        read: bool,
        size_code: u32,
    ) {
        self.bus.release(Pin::Data);
        self.bus.drive_field(Pin::Address, address, Pin::Address.width());
        self.bus.drive_field(Pin::FunctionCode, space.bits(), Pin::FunctionCode.width());
        self.bus.drive_bit(Pin::ReadWrite, read);
        self.bus.drive_field(Pin::Size, size_code, Pin::Size.width());
    }

    pub(crate) fn negate_strobes(&mut self) {
        self.bus.drive_bit(Pin::AddressStrobe, true);
        self.bus.drive_bit(Pin::DataStrobe, true);
    }

    pub(crate) fn sterm_asserted(&self) -> bool {
        self.bus.read_bit(Pin::SynchronousTermination).is_low()
    }

    pub(crate) fn dsack(&self) -> LogicVec {
        self.bus.read_field(Pin::DataAck, Pin::DataAck.width())
    }

    fn dsack_asserted(&self) -> bool {
        let dsack = self.dsack();
        dsack.bit(0).is_low() || dsack.bit(1).is_low()
    }

    /// Port width from DSACK, or `None` for an invalid encoding.
    pub(crate) fn decode_dsack(&self) -> Option<PortWidth> {
        PortWidth::from_dsack(self.dsack())
    }

    /// Data bus as sampled; undriven lanes read as 0.
    pub(crate) fn sample_data(&self) -> u32 {
        self.bus.read_field(Pin::Data, Pin::Data.width()).resolve(false)
    }

    /// Sample of the cache burst grant lines.
    pub(crate) fn burst_grant_lines(&self) -> (Logic, Logic) {
        (
            self.bus.read_bit(Pin::CacheBurstAck),
            self.bus.read_bit(Pin::CacheInhibit),
        )
    }

    /// Insert wait states until STERM or DSACK is asserted.
    pub(crate) fn await_termination(&mut self, record: &mut CycleRecord) {
        while !self.sterm_asserted() && !self.dsack_asserted() {
            self.wait_clock();
            record.clocks += 1;
            record.wait_states += 1;
        }
    }

    /// Insert wait states until STERM is asserted (burst beats).
    pub(crate) fn await_sterm(&mut self, record: &mut CycleRecord) {
        while !self.sterm_asserted() {
            self.wait_clock();
            record.clocks += 1;
            record.wait_states += 1;
        }
    }
}
