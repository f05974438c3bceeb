//! Motorola 68030 external bus master.
//!
//! Drives the 68030's asynchronous bus protocol clock edge by clock edge
//! against any [`emu_core::SignalBus`]: address and strobe timing, dynamic
//! bus sizing for 8/16/32-bit ports, synchronous termination, cache line
//! burst fills, and interrupt acknowledge cycles. Every transfer returns a
//! [`TransactionResult`] describing each physical bus cycle it took.
//!
//! The [`testbench`] module supplies a memory-backed slave so the master
//! can be exercised without an external simulator.

mod accountant;
mod burst;
mod engine;
mod error;
mod interrupt;
mod pins;
mod read;
mod request;
mod space;
mod trace;
mod write;

pub mod testbench;

pub use accountant::{PortWidth, TransferAccountant};
pub use burst::{BURST_BEATS, BurstController};
pub use engine::{BusMaster, RESET_CLOCKS};
pub use error::BusError;
pub use interrupt::{InterruptLevel, InterruptPoller};
pub use pins::{Pin, size_code, size_from_code};
pub use request::{Direction, LINE_FILL_SIZE, TransferRequest};
pub use space::AddressSpace;
pub use trace::{CycleRecord, Operation, TraceRecorder, TransactionResult};
