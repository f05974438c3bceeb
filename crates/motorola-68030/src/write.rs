//! Write cycles.
//!
//! Writes never request a line fill. Data goes out on the upper lanes, so
//! whatever port width the slave reports, the next byte it should take is
//! always on D31-D24.

use emu_core::{Edge, SignalBus};

use crate::accountant::{PortWidth, TransferAccountant};
use crate::engine::BusMaster;
use crate::error::BusError;
use crate::pins::Pin;
use crate::request::TransferRequest;
use crate::space::AddressSpace;
use crate::trace::{CycleRecord, TraceRecorder, TransactionResult};

impl<B: SignalBus<Line = Pin>> BusMaster<B> {
    /// Write the low `size` (1, 2 or 4) bytes of `data`.
    pub fn write(
        &mut self,
        space: AddressSpace,
        address: u32,
        size: u8,
        data: u32,
    ) -> Result<TransactionResult, BusError> {
        let request = TransferRequest::write(space, address, size, data);
        request.validate()?;
        self.begin_transaction();

        let mut trace = TraceRecorder::begin(&request, self.bus.time_ns());
        let mut acct = TransferAccountant::new(address, size);

        while !acct.is_complete() {
            let mut record = CycleRecord::default();

            self.bus.await_edge(Edge::Rising); // S0
            self.drive_address_phase(acct.next_address(), space, false, acct.size_code());

            self.bus.await_edge(Edge::Falling); // S1
            self.bus.drive_bit(Pin::AddressStrobe, false);
            record.clocks += 1;

            self.bus.await_edge(Edge::Rising); // S2
            self.bus.freeze(Pin::Data);
            let lanes = acct.write_lanes(data);
            self.bus.drive_field(Pin::Data, lanes, Pin::Data.width());
            record.data = Some(lanes);

            self.bus.await_edge(Edge::Falling); // S3
            record.clocks += 1;

            let port = if self.sterm_asserted() {
                record.sync = true;
                Some(PortWidth::Long)
            } else {
                self.bus.drive_bit(Pin::DataStrobe, false);
                self.await_termination(&mut record);

                if self.sterm_asserted() {
                    record.sync = true;
                    Some(PortWidth::Long)
                } else {
                    let port = self.decode_dsack();
                    self.bus.await_edge(Edge::Rising); // S4
                    self.bus.await_edge(Edge::Falling); // S5
                    record.clocks += 1;
                    port
                }
            };

            if let Some(port) = port {
                record.ack_size = port.bytes();
                acct.advance(port);
            }
            trace.record(record);
            self.negate_strobes();

            tracing::trace!(
                ack_size = record.ack_size,
                sync = record.sync,
                clocks = record.clocks,
                wait_states = record.wait_states,
                "write cycle"
            );

            if port.is_none() {
                tracing::warn!(
                    dsack = %self.dsack(),
                    "invalid acknowledge encoding at {:#010x}; aborting write",
                    acct.next_address()
                );
                break;
            }
        }

        self.bus.release(Pin::Data);

        let result = trace.finish(self.bus.time_ns());
        tracing::debug!(
            space = ?result.address_space,
            size = result.size,
            cycles = result.cycles.len(),
            clocks = result.total_clocks(),
            "write {:#010x} complete",
            result.address
        );
        Ok(result)
    }
}
