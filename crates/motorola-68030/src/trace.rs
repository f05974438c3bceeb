//! Cycle-by-cycle transaction trace.
//!
//! The trace is the oracle the bus behaviour is checked against, so its
//! shape is fixed: absent fields serialize as `null` rather than vanishing.

use serde::Serialize;

use crate::request::{Direction, TransferRequest};
use crate::space::AddressSpace;

/// Kind of logical transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Read,
    Write,
}

/// Outcome of one physical bus cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CycleRecord {
    /// Port width in bytes acknowledged by the slave, 0 if the cycle was
    /// aborted on an invalid acknowledge.
    pub ack_size: u8,
    /// Terminated by STERM rather than DSACK.
    pub sync: bool,
    /// Clocks from S1 to the end of the cycle (or beat).
    pub clocks: u32,
    /// Clocks spent waiting for termination.
    pub wait_states: u32,
    /// Data sampled (reads) or driven (writes).
    pub data: Option<u32>,
    /// Beat address, present on line fill beats only.
    pub address: Option<u32>,
}

/// A complete logical transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionResult {
    pub operation: Operation,
    pub address_space: AddressSpace,
    pub address: u32,
    pub size: u8,
    /// True once the slave granted a line fill.
    pub burst: bool,
    /// Written value, or the assembled read value for non-burst reads.
    pub data: Option<u32>,
    /// Physical cycles in the order they happened.
    pub cycles: Vec<CycleRecord>,
    pub start_ns: u64,
    pub end_ns: u64,
}

impl TransactionResult {
    /// Sum of acknowledged bytes, clamped to what was still outstanding on
    /// each cycle.
    #[must_use]
    pub fn bytes_acknowledged(&self) -> u32 {
        let mut remaining = u32::from(self.size);
        let mut total = 0;
        for cycle in &self.cycles {
            let taken = u32::from(cycle.ack_size).min(remaining);
            remaining -= taken;
            total += taken;
        }
        total
    }

    /// True unless a cycle was aborted on an invalid acknowledge.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.cycles.iter().all(|c| c.ack_size != 0)
            && (self.burst || self.bytes_acknowledged() == u32::from(self.size))
    }

    /// Number of physical bus cycles.
    #[must_use]
    pub fn cycle_count(&self) -> usize {
        self.cycles.len()
    }

    /// Total clocks across all cycles.
    #[must_use]
    pub fn total_clocks(&self) -> u32 {
        self.cycles.iter().map(|c| c.clocks).sum()
    }
}

/// Builds a [`TransactionResult`] as cycles complete.
#[derive(Debug)]
pub struct TraceRecorder {
    result: TransactionResult,
}

impl TraceRecorder {
    /// Open a trace for `request` at simulated time `start_ns`.
    #[must_use]
    pub fn begin(request: &TransferRequest, start_ns: u64) -> Self {
        let (operation, data) = match request.direction {
            Direction::Read { .. } => (Operation::Read, None),
            Direction::Write { data } => (Operation::Write, Some(data)),
        };
        Self {
            result: TransactionResult {
                operation,
                address_space: request.space,
                address: request.address,
                size: request.effective_size(),
                burst: false,
                data,
                cycles: Vec::new(),
                start_ns,
                end_ns: start_ns,
            },
        }
    }

    /// Append a finished cycle.
    pub fn record(&mut self, cycle: CycleRecord) {
        self.result.cycles.push(cycle);
    }

    /// Mark the transfer as a line fill.
    pub fn promote_burst(&mut self) {
        self.result.burst = true;
    }

    /// Set the value assembled by a read.
    pub fn set_data(&mut self, data: u32) {
        self.result.data = Some(data);
    }

    /// Close the trace at simulated time `end_ns`.
    #[must_use]
    pub fn finish(mut self, end_ns: u64) -> TransactionResult {
        self.result.end_ns = end_ns;
        self.result
    }
}
