//! Behavioural bus slave.
//!
//! The slave only looks at the bus on clock edges. It latches a cycle the
//! first time it sees AS asserted, counts wait states down on falling
//! edges, and terminates on the falling edge after the count runs out. It
//! holds its outputs until AS is negated, then releases everything.

use emu_core::{Edge, Logic, LogicVec};

use super::config::{PortTiming, SlaveConfig, Termination};
use super::memory::Memory;
use crate::accountant::PortWidth;
use crate::burst::BurstController;
use crate::interrupt::InterruptLevel;
use crate::pins::{Pin, size_from_code};
use crate::space::AddressSpace;

/// First autovector number; level n acknowledges with vector 24 + n.
const AUTOVECTOR_BASE: u8 = 24;

/// Master outputs as seen by the slave on an edge.
#[derive(Debug, Clone, Copy)]
pub struct MasterView {
    pub address: LogicVec,
    pub function_code: LogicVec,
    pub size: LogicVec,
    pub read_write: Logic,
    pub address_strobe: Logic,
    pub cache_burst_request: Logic,
    pub data: LogicVec,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Falling edges left before terminating.
    Waiting(u32),
    /// Terminated; `continues` if the next rising edge starts another beat.
    Terminated { continues: bool },
}

#[derive(Debug, Clone, Copy)]
struct ActiveCycle {
    address: u32,
    space: Option<AddressSpace>,
    read: bool,
    size: u8,
    burst_requested: bool,
    timing: PortTiming,
    beat: u8,
    phase: Phase,
}

#[derive(Debug, Clone, Copy)]
struct Outputs {
    sterm: Logic,
    dsack: LogicVec,
    cback: Logic,
    ciin: Logic,
    data: LogicVec,
}

impl Outputs {
    const fn released() -> Self {
        Self {
            sterm: Logic::Floating,
            dsack: LogicVec::floating(2),
            cback: Logic::Floating,
            ciin: Logic::Floating,
            data: LogicVec::floating(32),
        }
    }
}

/// Memory-backed slave with configurable port width and timing.
#[derive(Debug, Clone)]
pub struct Slave {
    config: SlaveConfig,
    memory: Memory,
    cycle: Option<ActiveCycle>,
    outputs: Outputs,
    interrupt_level: InterruptLevel,
    cycles_served: u64,
    acknowledged: Vec<InterruptLevel>,
}

impl Slave {
    #[must_use]
    pub fn new(config: SlaveConfig) -> Self {
        let mut memory = Memory::new();
        for init in &config.memory {
            memory.load(init.address, &init.bytes);
        }
        let interrupt_level = InterruptLevel::new(config.interrupt_level);
        Self {
            config,
            memory,
            cycle: None,
            outputs: Outputs::released(),
            interrupt_level,
            cycles_served: 0,
            acknowledged: Vec::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &SlaveConfig {
        &self.config
    }

    #[must_use]
    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    /// Bus cycles (including burst line fills) completed so far.
    #[must_use]
    pub const fn cycles_served(&self) -> u64 {
        self.cycles_served
    }

    /// Levels acknowledged by CPU-space cycles, oldest first.
    #[must_use]
    pub fn acknowledged(&self) -> &[InterruptLevel] {
        &self.acknowledged
    }

    #[must_use]
    pub const fn interrupt_level(&self) -> InterruptLevel {
        self.interrupt_level
    }

    pub fn set_interrupt_level(&mut self, level: u8) {
        self.interrupt_level = InterruptLevel::new(level);
    }

    /// Current level on one of the slave-driven pins.
    #[must_use]
    pub fn output(&self, pin: Pin) -> LogicVec {
        let bit = |level: Logic| LogicVec::floating(1).with_bit(0, level);
        match pin {
            Pin::SynchronousTermination => bit(self.outputs.sterm),
            Pin::DataAck => self.outputs.dsack,
            Pin::CacheBurstAck => bit(self.outputs.cback),
            Pin::CacheInhibit => bit(self.outputs.ciin),
            Pin::Data => self.outputs.data,
            Pin::InterruptPriority => {
                if self.interrupt_level.is_pending() {
                    LogicVec::from_u32(self.interrupt_level.encoded(), 3)
                } else {
                    LogicVec::floating(3)
                }
            }
            _ => LogicVec::floating(pin.width()),
        }
    }

    /// React to one clock edge.
    pub fn on_edge(&mut self, edge: Edge, master: &MasterView) {
        let strobe = master.address_strobe.is_low();
        match self.cycle.take() {
            None if strobe => self.cycle = Some(self.start_cycle(master)),
            None => {}
            Some(_) if !strobe => self.end_cycle(),
            Some(mut cycle) => {
                self.step(&mut cycle, edge, master);
                self.cycle = Some(cycle);
            }
        }
    }

    fn start_cycle(&self, master: &MasterView) -> ActiveCycle {
        let address = master.address.resolve(false);
        let space = AddressSpace::from_bits(master.function_code.resolve(false));
        let timing = self.config.timing_for(address);
        tracing::trace!(?space, ?timing, "slave cycle at {address:#010x}");
        ActiveCycle {
            address,
            space,
            read: master.read_write.resolve(true),
            size: size_from_code(master.size.resolve(false)),
            burst_requested: master.cache_burst_request.is_low(),
            timing,
            beat: 0,
            phase: Phase::Waiting(timing.wait_states),
        }
    }

    fn end_cycle(&mut self) {
        self.outputs = Outputs::released();
        self.cycles_served += 1;
    }

    fn step(&mut self, cycle: &mut ActiveCycle, edge: Edge, master: &MasterView) {
        match (edge, cycle.phase) {
            (Edge::Falling, Phase::Waiting(0)) => self.terminate(cycle, master),
            (Edge::Falling, Phase::Waiting(n)) => cycle.phase = Phase::Waiting(n - 1),
            (Edge::Rising, Phase::Terminated { continues: true }) => {
                cycle.beat += 1;
                self.outputs.sterm = Logic::High;
                cycle.phase = Phase::Waiting(self.config.burst_wait_states);
            }
            _ => {}
        }
    }

    fn terminate(&mut self, cycle: &mut ActiveCycle, master: &MasterView) {
        let port = cycle.timing.effective_port();
        let sync = cycle.timing.termination == Termination::Synchronous;

        if cycle.read {
            let word = self.read_word(cycle, port);
            self.outputs.data = LogicVec::with_mask(word, port.lane_mask(), 32);
        } else {
            let count = cycle.size.min(port.bytes());
            let word = master.data.resolve(false);
            self.memory.write_left_justified(cycle.address, count, word);
        }

        if sync {
            self.outputs.sterm = Logic::Low;
            self.outputs.dsack = LogicVec::floating(2);
        } else {
            self.outputs.sterm = Logic::Floating;
            self.outputs.dsack = port.dsack();
        }

        let inhibit = cycle.read && self.config.cache_inhibit;
        self.outputs.ciin = if inhibit { Logic::Low } else { Logic::Floating };

        let burst_capable = cycle.read && sync && cycle.burst_requested;
        let more = burst_capable && !inhibit && cycle.beat + 1 < self.config.burst_beats;
        self.outputs.cback = match (burst_capable, more) {
            (false, _) => Logic::Floating,
            (true, true) => Logic::Low,
            (true, false) => Logic::High,
        };

        tracing::trace!(
            beat = cycle.beat,
            sync,
            burst = more,
            "slave terminated cycle at {:#010x}",
            cycle.address
        );
        cycle.phase = Phase::Terminated { continues: more };
    }

    fn read_word(&mut self, cycle: &ActiveCycle, port: PortWidth) -> u32 {
        if cycle.space == Some(AddressSpace::CpuSpace) && cycle.address >> 4 == 0x0FFF_FFFF {
            let level = InterruptLevel::new(((cycle.address >> 1) & 0x07) as u8);
            self.acknowledged.push(level);
            if self.config.clear_interrupt_on_ack && self.interrupt_level == level {
                self.interrupt_level = InterruptLevel::NONE;
            }
            let vector = self
                .config
                .interrupt_vector
                .unwrap_or(AUTOVECTOR_BASE + level.get());
            tracing::debug!(%level, vector, "interrupt acknowledged");
            return u32::from(vector) << 24;
        }

        if cycle.beat > 0 {
            let address = BurstController::beat_address(cycle.address, cycle.beat);
            return self.memory.read_left_justified(address, 4);
        }
        self.memory
            .read_left_justified(cycle.address, cycle.size.min(port.bytes()))
    }
}
