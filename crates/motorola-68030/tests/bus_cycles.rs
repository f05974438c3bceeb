//! Bus cycle behaviour against the reference slave.
//!
//! Each test builds a fresh `SimBus` with a memory-backed slave, runs one or
//! more transfers through the master and checks the cycle-by-cycle trace.

use emu_core::{Edge, Logic, LogicVec, SignalBus};
use motorola_68030::testbench::{MemoryInit, PortTiming, SimBus, SlaveConfig};
use motorola_68030::{AddressSpace, BusError, BusMaster, Operation, Pin, PortWidth, RESET_CLOCKS};

const SPACE: AddressSpace = AddressSpace::SupervisorData;

fn master(config: SlaveConfig) -> BusMaster<SimBus> {
    BusMaster::new(SimBus::with_config(config))
}

fn with_memory(timing: PortTiming, address: u32, bytes: &[u8]) -> SlaveConfig {
    SlaveConfig {
        memory: vec![MemoryInit {
            address,
            bytes: bytes.to_vec(),
        }],
        ..SlaveConfig::uniform(timing)
    }
}

/// Sixteen bytes 0x00..0x0F at 0x1000.
fn line_config(timing: PortTiming) -> SlaveConfig {
    let bytes: Vec<u8> = (0..16).collect();
    with_memory(timing, 0x1000, &bytes)
}

// === Asynchronous reads ===

#[test]
fn long_port_read_takes_one_cycle() {
    let mut cpu = master(with_memory(
        PortTiming::asynchronous(PortWidth::Long, 0),
        0x1000,
        &[0xDE, 0xAD, 0xBE, 0xEF],
    ));
    let result = cpu.read(SPACE, 0x1000, 4).expect("valid request");

    assert_eq!(result.operation, Operation::Read);
    assert_eq!(result.data, Some(0xDEAD_BEEF));
    assert!(!result.burst);
    assert_eq!(result.cycles.len(), 1);

    let cycle = result.cycles[0];
    assert_eq!(cycle.ack_size, 4);
    assert!(!cycle.sync);
    assert_eq!(cycle.clocks, 3);
    assert_eq!(cycle.wait_states, 0);
    assert_eq!(cycle.data, Some(0xDEAD_BEEF));
    assert_eq!(cycle.address, None);
}

#[test]
fn byte_port_long_read_takes_four_cycles() {
    let mut cpu = master(with_memory(
        PortTiming::asynchronous(PortWidth::Byte, 0),
        0x2000,
        &[0xDE, 0xAD, 0xBE, 0xEF],
    ));
    let result = cpu.read(SPACE, 0x2000, 4).expect("valid request");

    assert_eq!(result.cycles.len(), 4);
    assert!(result.cycles.iter().all(|c| c.ack_size == 1));
    assert_eq!(
        result.cycles.iter().map(|c| c.data).collect::<Vec<_>>(),
        vec![
            Some(0x0000_00DE),
            Some(0x0000_AD00),
            Some(0x00BE_0000),
            Some(0xEF00_0000)
        ]
    );
    assert_eq!(result.data, Some(0xDEAD_BEEF));
    assert!(result.is_complete());
}

#[test]
fn word_port_word_read_takes_one_cycle() {
    let mut cpu = master(with_memory(
        PortTiming::asynchronous(PortWidth::Word, 0),
        0x3000,
        &[0x12, 0x34],
    ));
    let result = cpu.read(SPACE, 0x3000, 2).expect("valid request");
    assert_eq!(result.cycles.len(), 1);
    assert_eq!(result.cycles[0].ack_size, 2);
    assert_eq!(result.cycles[0].data, Some(0x1234));
    assert_eq!(result.data, Some(0x1234));
}

#[test]
fn byte_read_from_long_port() {
    let mut cpu = master(with_memory(
        PortTiming::asynchronous(PortWidth::Long, 0),
        0x10,
        &[0x5A],
    ));
    let result = cpu.read(SPACE, 0x10, 1).expect("valid request");
    assert_eq!(result.cycles.len(), 1);
    assert_eq!(result.cycles[0].ack_size, 4);
    assert_eq!(result.data, Some(0x5A));
    assert_eq!(result.bytes_acknowledged(), 1);
}

#[test]
fn wait_states_are_counted() {
    let mut cpu = master(SlaveConfig::uniform(PortTiming::asynchronous(
        PortWidth::Long,
        3,
    )));
    let result = cpu.read(SPACE, 0x100, 4).expect("valid request");
    let cycle = result.cycles[0];
    assert_eq!(cycle.wait_states, 3);
    assert_eq!(cycle.clocks, 6);
}

#[test]
fn regions_select_port_width() {
    let mut config = SlaveConfig::uniform(PortTiming::asynchronous(PortWidth::Long, 0));
    config.regions.push(motorola_68030::testbench::Region {
        base: 0x8000,
        length: 0x1000,
        timing: PortTiming::asynchronous(PortWidth::Byte, 1),
    });
    let mut cpu = master(config);

    let fast = cpu.read(SPACE, 0x100, 4).expect("valid request");
    let slow = cpu.read(SPACE, 0x8000, 2).expect("valid request");
    assert_eq!(fast.cycles.len(), 1);
    assert_eq!(slow.cycles.len(), 2);
    assert!(slow.cycles.iter().all(|c| c.wait_states == 1));
}

#[test]
fn timestamps_follow_the_clock() {
    let mut cpu = master(SlaveConfig::default());
    let result = cpu.read(SPACE, 0, 4).expect("valid request");
    // Three clocks at 25 MHz.
    assert_eq!(result.start_ns, 0);
    assert_eq!(result.end_ns, 120);

    let next = cpu.read(SPACE, 0, 4).expect("valid request");
    assert_eq!(next.start_ns, 120);
    assert_eq!(cpu.transactions(), 2);
}

// === Synchronous termination and bursts ===

#[test]
fn sync_read_without_burst_request() {
    let mut cpu = master(line_config(PortTiming::synchronous(0)));
    let result = cpu.read(SPACE, 0x1004, 4).expect("valid request");

    assert!(!result.burst);
    assert_eq!(result.cycles.len(), 1);
    let cycle = result.cycles[0];
    assert!(cycle.sync);
    assert_eq!(cycle.ack_size, 4);
    assert_eq!(cycle.clocks, 2);
    assert_eq!(cycle.data, Some(0x0405_0607));
    assert_eq!(result.data, Some(0x0405_0607));
}

#[test]
fn sync_wait_states() {
    let mut cpu = master(SlaveConfig::uniform(PortTiming::synchronous(2)));
    let result = cpu.read(SPACE, 0x40, 4).expect("valid request");
    let cycle = result.cycles[0];
    assert!(cycle.sync);
    assert_eq!(cycle.wait_states, 2);
    assert_eq!(cycle.clocks, 4);
}

#[test]
fn full_line_fill() {
    let mut cpu = master(line_config(PortTiming::synchronous(0)));
    let result = cpu.burst_read(SPACE, 0x1008).expect("valid request");

    assert!(result.burst);
    assert_eq!(result.size, 4);
    assert_eq!(result.data, None);
    assert_eq!(result.cycles.len(), 4);
    assert!(result.cycles.iter().all(|c| c.ack_size == 4 && c.sync));
    assert_eq!(
        result.cycles.iter().map(|c| c.address).collect::<Vec<_>>(),
        vec![Some(0x1008), Some(0x1009), Some(0x100A), Some(0x100B)]
    );
    assert_eq!(result.cycles[0].data, Some(0x0809_0A0B));
    assert_eq!(result.cycles[1].data, Some(0x090A_0B0C));
    assert_eq!(result.cycles[3].data, Some(0x0B0C_0D0E));
    assert_eq!(result.cycles[0].clocks, 2);
    assert!(result.cycles[1..].iter().all(|c| c.clocks == 1));
    assert!(result.is_complete());
}

#[test]
fn line_fill_addresses_wrap_inside_the_line() {
    let mut cpu = master(line_config(PortTiming::synchronous(0)));
    let result = cpu.burst_read(SPACE, 0x100E).expect("valid request");
    assert_eq!(
        result.cycles.iter().map(|c| c.address).collect::<Vec<_>>(),
        vec![Some(0x100E), Some(0x100F), Some(0x1000), Some(0x1001)]
    );
    assert_eq!(result.cycles[2].data, Some(0x0001_0203));
}

#[test]
fn slave_ends_burst_after_two_beats() {
    let mut config = line_config(PortTiming::synchronous(0));
    config.burst_beats = 2;
    let mut cpu = master(config);
    let result = cpu.burst_read(SPACE, 0x1000).expect("valid request");

    assert!(result.burst);
    assert_eq!(result.cycles.len(), 2);
    assert_eq!(result.cycles[1].address, Some(0x1001));
}

#[test]
fn burst_beat_wait_states() {
    let mut config = line_config(PortTiming::synchronous(0));
    config.burst_wait_states = 2;
    let mut cpu = master(config);
    let result = cpu.burst_read(SPACE, 0x1000).expect("valid request");
    assert_eq!(result.cycles.len(), 4);
    for beat in &result.cycles[1..] {
        assert_eq!(beat.wait_states, 2);
        assert_eq!(beat.clocks, 3);
    }
}

#[test]
fn burst_needs_synchronous_termination() {
    let mut cpu = master(line_config(PortTiming::asynchronous(PortWidth::Long, 0)));
    let result = cpu.burst_read(SPACE, 0x1000).expect("valid request");
    assert!(!result.burst);
    assert_eq!(result.cycles.len(), 1);
    assert_eq!(result.data, Some(0x0001_0203));
}

#[test]
fn cache_inhibit_refuses_burst() {
    let mut config = line_config(PortTiming::synchronous(0));
    config.cache_inhibit = true;
    let mut cpu = master(config);
    let result = cpu.burst_read(SPACE, 0x1000).expect("valid request");
    assert!(!result.burst);
    assert_eq!(result.cycles.len(), 1);
    assert_eq!(result.cycles[0].address, None);
}

#[test]
fn burst_request_on_narrow_port_falls_back_to_sizing() {
    let mut cpu = master(line_config(PortTiming::asynchronous(PortWidth::Word, 0)));
    let result = cpu.burst_read(SPACE, 0x1004).expect("valid request");
    assert!(!result.burst);
    assert_eq!(result.cycles.len(), 2);
    assert_eq!(result.data, Some(0x0405_0607));
}

#[test]
fn cbreq_released_after_burst() {
    let mut cpu = master(line_config(PortTiming::synchronous(0)));
    cpu.reset();
    cpu.burst_read(SPACE, 0x1000).expect("valid request");
    assert_eq!(cpu.bus().driven(Pin::CacheBurstRequest).bit(0), Logic::High);
    assert_eq!(cpu.bus().driven(Pin::AddressStrobe).bit(0), Logic::High);
}

// === Writes ===

#[test]
fn long_write_to_long_port() {
    let mut cpu = master(SlaveConfig::default());
    let result = cpu
        .write(SPACE, 0x4000, 4, 0x1122_3344)
        .expect("valid request");

    assert_eq!(result.operation, Operation::Write);
    assert_eq!(result.data, Some(0x1122_3344));
    assert_eq!(result.cycles.len(), 1);
    assert_eq!(result.cycles[0].clocks, 3);
    assert_eq!(cpu.bus().memory().read_be(0x4000, 4), 0x1122_3344);
    assert!(cpu.bus().driven(Pin::Data).is_floating());
}

#[test]
fn long_write_to_word_port_splits() {
    let mut cpu = master(SlaveConfig::uniform(PortTiming::asynchronous(
        PortWidth::Word,
        0,
    )));
    let result = cpu
        .write(SPACE, 0x4000, 4, 0x1122_3344)
        .expect("valid request");

    assert_eq!(result.cycles.len(), 2);
    assert_eq!(result.cycles[0].data, Some(0x1122_3344));
    assert_eq!(result.cycles[1].data, Some(0x3344_0000));
    assert!(result.cycles.iter().all(|c| c.ack_size == 2));
    assert_eq!(cpu.bus().memory().read_be(0x4000, 4), 0x1122_3344);
}

#[test]
fn word_write_to_byte_port() {
    let mut cpu = master(SlaveConfig::uniform(PortTiming::asynchronous(
        PortWidth::Byte,
        1,
    )));
    let result = cpu.write(SPACE, 0x10, 2, 0xABCD).expect("valid request");
    assert_eq!(result.cycles.len(), 2);
    assert!(result.cycles.iter().all(|c| c.wait_states == 1));
    assert_eq!(cpu.bus().memory().read_byte(0x10), 0xAB);
    assert_eq!(cpu.bus().memory().read_byte(0x11), 0xCD);
    assert_eq!(cpu.bus().memory().read_byte(0x12), 0x00);
}

#[test]
fn sync_write() {
    let mut cpu = master(SlaveConfig::uniform(PortTiming::synchronous(0)));
    let result = cpu.write(SPACE, 0x20, 1, 0x7F).expect("valid request");
    assert_eq!(result.cycles.len(), 1);
    let cycle = result.cycles[0];
    assert!(cycle.sync);
    assert_eq!(cycle.ack_size, 4);
    assert_eq!(cycle.clocks, 2);
    assert_eq!(cycle.data, Some(0x7F00_0000));
    assert_eq!(cpu.bus().memory().read_byte(0x20), 0x7F);
    assert!(cpu.bus().driven(Pin::Data).is_floating());
}

#[test]
fn write_then_read_back() {
    let mut cpu = master(SlaveConfig::uniform(PortTiming::asynchronous(
        PortWidth::Byte,
        0,
    )));
    cpu.write(SPACE, 0x500, 4, 0xCAFE_F00D).expect("valid request");
    let back = cpu.read(SPACE, 0x500, 4).expect("valid request");
    assert_eq!(back.data, Some(0xCAFE_F00D));
}

// === Rejected requests ===

#[test]
fn invalid_size_drives_nothing() {
    let mut cpu = master(SlaveConfig::default());
    assert_eq!(
        cpu.read(SPACE, 0x100, 3),
        Err(BusError::InvalidSize { size: 3 })
    );
    assert_eq!(
        cpu.write(SPACE, 0x100, 0, 0),
        Err(BusError::InvalidSize { size: 0 })
    );
    assert_eq!(cpu.bus().edges(), 0);
    assert_eq!(cpu.transactions(), 0);
    assert!(cpu.bus().driven(Pin::AddressStrobe).is_floating());
}

#[test]
fn address_overflow_is_rejected() {
    let mut cpu = master(SlaveConfig::default());
    assert_eq!(
        cpu.read(SPACE, 0xFFFF_FFFE, 4),
        Err(BusError::AddressOutOfRange {
            address: 0xFFFF_FFFE,
            size: 4
        })
    );
    assert_eq!(
        cpu.burst_read(SPACE, 0xFFFF_FFFD),
        Err(BusError::AddressOutOfRange {
            address: 0xFFFF_FFFD,
            size: 4
        })
    );
    assert!(cpu.read(SPACE, 0xFFFF_FFFF, 1).is_ok());
    assert_eq!(cpu.transactions(), 1);
}

// === Reset ===

#[test]
fn reset_holds_reset_for_512_clocks() {
    let mut cpu = master(SlaveConfig::default());
    cpu.reset();
    let bus = cpu.bus();
    assert_eq!(bus.edges(), 1 + 2 * u64::from(RESET_CLOCKS));
    // Odd edge counts are rising edges.
    assert_eq!(bus.edges() % 2, 1);
    assert_eq!(bus.driven(Pin::Reset).bit(0), Logic::High);
    assert_eq!(bus.driven(Pin::AddressStrobe).bit(0), Logic::High);
    assert_eq!(bus.driven(Pin::Size).to_u32(), Some(0));
    assert!(bus.driven(Pin::Data).is_floating());
}

// === Invalid acknowledge ===

/// Bus whose slave asserts DSACK for exactly one edge, so the encoding seen
/// at S4 no longer matches anything.
#[derive(Default)]
struct GlitchBus {
    edges: u64,
    /// Word on D31-D0, `None` while released.
    data: Option<u32>,
    data_driven: bool,
}

impl GlitchBus {
    fn driven_data(&self) -> LogicVec {
        self.data.map_or_else(
            || LogicVec::floating(Pin::Data.width()),
            |value| LogicVec::from_u32(value, Pin::Data.width()),
        )
    }
}

impl SignalBus for GlitchBus {
    type Line = Pin;

    fn await_edge(&mut self, edge: Edge) {
        loop {
            self.edges += 1;
            let rising = self.edges % 2 == 1;
            if rising == (edge == Edge::Rising) {
                break;
            }
        }
    }

    fn read_bit(&self, _line: Pin) -> Logic {
        Logic::Floating
    }

    fn read_field(&self, line: Pin, width: u8) -> LogicVec {
        if line == Pin::DataAck && self.edges == 4 {
            LogicVec::from_u32(0, width)
        } else {
            LogicVec::floating(width)
        }
    }

    fn drive_bit(&mut self, _line: Pin, _high: bool) {}

    fn drive_field(&mut self, line: Pin, value: u32, _width: u8) {
        if line == Pin::Data {
            self.data = Some(value);
            self.data_driven = true;
        }
    }

    fn release(&mut self, line: Pin) {
        if line == Pin::Data {
            self.data = None;
        }
    }

    fn freeze(&mut self, _line: Pin) {}

    fn time_ns(&self) -> u64 {
        self.edges * 20
    }
}

#[test]
fn invalid_acknowledge_aborts_transfer() {
    let mut cpu = BusMaster::new(GlitchBus::default());
    let result = cpu.read(SPACE, 0x100, 4).expect("valid request");

    assert_eq!(result.cycles.len(), 1);
    assert_eq!(result.cycles[0].ack_size, 0);
    assert_eq!(result.data, None);
    assert!(!result.is_complete());
}

#[test]
fn invalid_acknowledge_aborts_write_and_releases_data() {
    let mut cpu = BusMaster::new(GlitchBus::default());
    let result = cpu
        .write(SPACE, 0x100, 4, 0x1234_5678)
        .expect("valid request");

    assert_eq!(result.cycles.len(), 1);
    assert_eq!(result.cycles[0].ack_size, 0);
    assert_eq!(result.cycles[0].data, Some(0x1234_5678));
    assert!(!result.is_complete());
    assert!(cpu.bus().data_driven);
    assert!(cpu.bus().driven_data().is_floating());
}
