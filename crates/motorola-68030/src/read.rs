//! Read cycles, including line fill bursts.

use emu_core::{Edge, SignalBus};

use crate::accountant::{PortWidth, TransferAccountant};
use crate::burst::BurstController;
use crate::engine::BusMaster;
use crate::error::BusError;
use crate::pins::Pin;
use crate::request::TransferRequest;
use crate::space::AddressSpace;
use crate::trace::{CycleRecord, TraceRecorder, TransactionResult};

impl<B: SignalBus<Line = Pin>> BusMaster<B> {
    /// Read `size` (1, 2 or 4) bytes.
    pub fn read(
        &mut self,
        space: AddressSpace,
        address: u32,
        size: u8,
    ) -> Result<TransactionResult, BusError> {
        self.run_read(&TransferRequest::read(space, address, size))
    }

    /// Read a long word with CBREQ asserted, letting the slave turn it into
    /// a line fill.
    pub fn burst_read(
        &mut self,
        space: AddressSpace,
        address: u32,
    ) -> Result<TransactionResult, BusError> {
        self.run_read(&TransferRequest::burst_read(space, address))
    }

    pub(crate) fn run_read(
        &mut self,
        request: &TransferRequest,
    ) -> Result<TransactionResult, BusError> {
        request.validate()?;
        self.begin_transaction();

        let mut trace = TraceRecorder::begin(request, self.bus.time_ns());
        let mut acct = TransferAccountant::new(request.address, request.effective_size());
        let mut burst = BurstController::new(request.address, request.burst());
        let mut promoted = false;

        while !acct.is_complete() {
            let first = acct.transferred() == 0;
            let mut record = CycleRecord::default();

            self.bus.await_edge(Edge::Rising); // S0
            self.drive_address_phase(acct.next_address(), request.space, true, acct.size_code());

            self.bus.await_edge(Edge::Falling); // S1
            if first && burst.requested() {
                self.bus.drive_bit(Pin::CacheBurstRequest, false);
            }
            self.bus.drive_bit(Pin::AddressStrobe, false);
            self.bus.drive_bit(Pin::DataStrobe, false);
            record.clocks += 1;

            self.bus.await_edge(Edge::Rising); // S2
            self.bus.await_edge(Edge::Falling); // S3
            record.clocks += 1;

            self.await_termination(&mut record);

            let aborted = if self.sterm_asserted() {
                record.sync = true;
                record.ack_size = PortWidth::Long.bytes();
                let word = self.sample_data();
                let (cback, ciin) = self.burst_grant_lines();
                let granted = BurstController::granted(cback, ciin);

                if burst.offer(first, true, granted) {
                    trace.promote_burst();
                    promoted = true;
                    self.run_burst(&mut trace, &mut burst, record, word);
                    acct.complete();
                } else {
                    record.data = Some(acct.recorded_data(PortWidth::Long, word));
                    acct.absorb(PortWidth::Long, word);
                    acct.advance(PortWidth::Long);
                    trace.record(record);
                }
                false
            } else {
                self.bus.await_edge(Edge::Rising); // S4
                let port = self.decode_dsack();
                let word = self.sample_data();
                self.bus.await_edge(Edge::Falling); // S5
                record.clocks += 1;

                match port {
                    Some(port) => {
                        record.ack_size = port.bytes();
                        record.data = Some(acct.recorded_data(port, word));
                        acct.absorb(port, word);
                        acct.advance(port);
                        trace.record(record);
                        false
                    }
                    None => {
                        tracing::warn!(
                            dsack = %self.dsack(),
                            "invalid acknowledge encoding at {:#010x}; aborting read",
                            acct.next_address()
                        );
                        trace.record(record);
                        true
                    }
                }
            };

            if first && burst.requested() {
                self.bus.drive_bit(Pin::CacheBurstRequest, true);
            }
            self.negate_strobes();

            tracing::trace!(
                ack_size = record.ack_size,
                sync = record.sync,
                clocks = record.clocks,
                wait_states = record.wait_states,
                "read cycle"
            );

            if aborted {
                break;
            }
        }

        if !promoted && acct.is_complete() {
            trace.set_data(acct.assembled());
        }

        let result = trace.finish(self.bus.time_ns());
        tracing::debug!(
            space = ?result.address_space,
            size = result.size,
            burst = result.burst,
            cycles = result.cycles.len(),
            clocks = result.total_clocks(),
            "read {:#010x} complete",
            result.address
        );
        Ok(result)
    }

    /// Stream the remaining beats of a granted line fill.
    ///
    /// `first` is the record of the initial cycle, already terminated; `word`
    /// is the data it sampled. Strobes stay asserted throughout.
    fn run_burst(
        &mut self,
        trace: &mut TraceRecorder,
        burst: &mut BurstController,
        mut first: CycleRecord,
        word: u32,
    ) {
        first.address = Some(burst.address());
        first.data = Some(word);
        trace.record(first);

        // The initial beat was granted, otherwise there'd be no burst.
        let mut granted = true;
        while burst.finish_beat(granted) {
            let mut record = CycleRecord {
                sync: true,
                ack_size: PortWidth::Long.bytes(),
                ..CycleRecord::default()
            };

            self.wait_clock();
            record.clocks += 1;
            self.await_sterm(&mut record);

            record.address = Some(burst.address());
            record.data = Some(self.sample_data());
            let (cback, ciin) = self.burst_grant_lines();
            granted = BurstController::granted(cback, ciin);
            trace.record(record);

            tracing::trace!(
                beat = burst.beat(),
                granted,
                wait_states = record.wait_states,
                "burst beat at {:#010x}",
                burst.address()
            );
        }
    }
}
