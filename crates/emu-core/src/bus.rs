//! Clocked signal bus interface.

use crate::{Logic, LogicVec};

/// A clock transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    Rising,
    Falling,
}

/// Clocked, signal-level bus.
///
/// A bus master sees the outside world only through this trait. Every call
/// to `await_edge` suspends the master until the next matching clock edge;
/// everything else happens instantaneously between two edges. Masters rely
/// on the order of their edge waits, so implementations must never reorder
/// or coalesce them.
///
/// Lines are named by the implementation's `Line` type. Multi-bit lines
/// (address, data, encoded inputs) are accessed as fields.
pub trait SignalBus {
    /// Identifier of a line or a group of lines.
    type Line: Copy + std::fmt::Debug;

    /// Block until the next clock edge of the given kind.
    fn await_edge(&mut self, edge: Edge);

    /// Current level of a single line.
    fn read_bit(&self, line: Self::Line) -> Logic;

    /// Current levels of a multi-bit line.
    fn read_field(&self, line: Self::Line, width: u8) -> LogicVec;

    /// Drive a single line high (`true`) or low.
    fn drive_bit(&mut self, line: Self::Line, high: bool);

    /// Drive every bit of a multi-bit line.
    fn drive_field(&mut self, line: Self::Line, value: u32, width: u8);

    /// Stop driving a line (high impedance).
    fn release(&mut self, line: Self::Line);

    /// Keep whatever the line currently carries without re-driving it.
    fn freeze(&mut self, line: Self::Line);

    /// Elapsed simulated time in nanoseconds.
    fn time_ns(&self) -> u64;
}
