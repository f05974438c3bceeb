//! Reference bus for driving the master without an external simulator.
//!
//! [`SimBus`] owns the clock, the master's line drivers and a memory-backed
//! [`Slave`]. Each edge is applied to the slave with the master outputs as
//! they stood before the edge, then control returns to the master. That
//! gives the master the usual setup/sample relationship: what it drives
//! after an edge is seen by the slave on the next one.

mod config;
mod memory;
mod slave;

use std::collections::HashMap;

use emu_core::{Edge, Logic, LogicVec, MasterClock, SignalBus};

pub use config::{MemoryInit, PortTiming, Region, SlaveConfig, Termination};
pub use memory::Memory;
pub use slave::{MasterView, Slave};

use crate::pins::Pin;

/// Clocked bus joining a master to a [`Slave`].
#[derive(Debug, Clone)]
pub struct SimBus {
    clock: MasterClock,
    edges: u64,
    clock_high: bool,
    drivers: HashMap<Pin, LogicVec>,
    slave: Slave,
}

impl SimBus {
    #[must_use]
    pub fn new(clock: MasterClock, config: SlaveConfig) -> Self {
        Self {
            clock,
            edges: 0,
            clock_high: false,
            drivers: HashMap::new(),
            slave: Slave::new(config),
        }
    }

    /// Bus at the default clock rate.
    #[must_use]
    pub fn with_config(config: SlaveConfig) -> Self {
        Self::new(MasterClock::default(), config)
    }

    #[must_use]
    pub const fn clock(&self) -> MasterClock {
        self.clock
    }

    /// Clock edges elapsed since construction.
    #[must_use]
    pub const fn edges(&self) -> u64 {
        self.edges
    }

    #[must_use]
    pub fn slave(&self) -> &Slave {
        &self.slave
    }

    pub fn slave_mut(&mut self) -> &mut Slave {
        &mut self.slave
    }

    #[must_use]
    pub fn memory(&self) -> &Memory {
        self.slave.memory()
    }

    /// Request an interrupt on IPL2-IPL0; 0 releases the lines.
    pub fn set_interrupt_level(&mut self, level: u8) {
        self.slave.set_interrupt_level(level);
    }

    /// What the master is currently driving on `pin`.
    #[must_use]
    pub fn driven(&self, pin: Pin) -> LogicVec {
        self.drivers
            .get(&pin)
            .copied()
            .unwrap_or_else(|| LogicVec::floating(pin.width()))
    }

    fn driven_bit(&self, pin: Pin) -> Logic {
        self.driven(pin).bit(0)
    }

    fn master_view(&self) -> MasterView {
        MasterView {
            address: self.driven(Pin::Address),
            function_code: self.driven(Pin::FunctionCode),
            size: self.driven(Pin::Size),
            read_write: self.driven_bit(Pin::ReadWrite),
            address_strobe: self.driven_bit(Pin::AddressStrobe),
            cache_burst_request: self.driven_bit(Pin::CacheBurstRequest),
            data: self.driven(Pin::Data),
        }
    }

    /// Resolved level of a whole pin group; master drivers win over the
    /// slave on shared lines.
    fn line(&self, pin: Pin) -> LogicVec {
        let master = self.driven(pin);
        if pin == Pin::Data {
            let slave = self.slave.output(pin);
            let driven = master.driven_mask() | slave.driven_mask();
            let value = (master.resolve(false) & master.driven_mask())
                | (slave.resolve(false) & slave.driven_mask() & !master.driven_mask());
            LogicVec::with_mask(value, driven, pin.width())
        } else if pin.is_master_output() {
            master
        } else {
            self.slave.output(pin)
        }
    }

    fn step_edge(&mut self) -> Edge {
        self.clock_high = !self.clock_high;
        self.edges += 1;
        let edge = if self.clock_high {
            Edge::Rising
        } else {
            Edge::Falling
        };
        let view = self.master_view();
        self.slave.on_edge(edge, &view);
        edge
    }
}

impl Default for SimBus {
    fn default() -> Self {
        Self::with_config(SlaveConfig::default())
    }
}

impl SignalBus for SimBus {
    type Line = Pin;

    fn await_edge(&mut self, edge: Edge) {
        while self.step_edge() != edge {}
    }

    fn read_bit(&self, line: Pin) -> Logic {
        self.line(line).bit(0)
    }

    fn read_field(&self, line: Pin, width: u8) -> LogicVec {
        let value = self.line(line);
        LogicVec::with_mask(value.resolve(false), value.driven_mask(), width)
    }

    fn drive_bit(&mut self, line: Pin, high: bool) {
        self.drivers.insert(line, LogicVec::from_u32(u32::from(high), 1));
    }

    fn drive_field(&mut self, line: Pin, value: u32, width: u8) {
        self.drivers.insert(line, LogicVec::from_u32(value, width));
    }

    fn release(&mut self, line: Pin) {
        self.drivers.insert(line, LogicVec::floating(line.width()));
    }

    fn freeze(&mut self, line: Pin) {
        let current = self.line(line);
        self.drivers.insert(
            line,
            LogicVec::with_mask(current.resolve(false), current.driven_mask(), line.width()),
        );
    }

    fn time_ns(&self) -> u64 {
        self.clock.edges_to_ns(self.edges)
    }
}
