//! Sequencing stimulus operations and interrupt polls.

use emu_core::{MasterClock, SignalBus};
use format_io_list::{Command, IoList, Stimulus};
use motorola_68030::testbench::SimBus;
use motorola_68030::{AddressSpace, BusError, BusMaster, InterruptPoller, TransactionResult};

use crate::config::{ConfigError, RunnerConfig};
use crate::report::ReportEntry;

/// A master, its poller and the reference slave, ready to take commands.
#[derive(Debug)]
pub struct Session {
    master: BusMaster<SimBus>,
    poller: InterruptPoller,
    space: AddressSpace,
    poll_interrupts: bool,
}

impl Session {
    /// Build the bus and, if configured, run the reset sequence.
    pub fn new(config: &RunnerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let bus = SimBus::new(MasterClock::new(config.clock_hz), config.slave.clone());
        let mut master = BusMaster::new(bus);
        if config.reset {
            master.reset();
        }
        Ok(Self {
            master,
            poller: InterruptPoller::new(),
            space: config.address_space,
            poll_interrupts: config.poll_interrupts,
        })
    }

    #[must_use]
    pub fn master(&self) -> &BusMaster<SimBus> {
        &self.master
    }

    pub fn master_mut(&mut self) -> &mut BusMaster<SimBus> {
        &mut self.master
    }

    /// Issue one command.
    pub fn execute(&mut self, command: Command) -> Result<TransactionResult, BusError> {
        match command {
            Command::Read { size, address } => self.master.read(self.space, address, size),
            Command::BurstRead { address } => self.master.burst_read(self.space, address),
            Command::Write {
                size,
                address,
                data,
            } => self.master.write(self.space, address, size, data),
        }
    }

    /// Sample IPL and acknowledge an escalation.
    pub fn poll(&mut self) -> Option<TransactionResult> {
        match self.poller.poll(&mut self.master) {
            Ok(ack) => ack,
            Err(error) => {
                tracing::warn!(%error, "interrupt acknowledge rejected");
                None
            }
        }
    }

    /// Run one stimulus line, then poll interrupts if it completed.
    pub fn step(&mut self, stimulus: &Stimulus, report: &mut Vec<ReportEntry>) {
        match self.execute(stimulus.command) {
            Ok(result) => {
                report.push(ReportEntry {
                    line: Some(stimulus.line),
                    result,
                });
            }
            Err(error) => {
                tracing::warn!(
                    line = stimulus.line,
                    %error,
                    "rejected '{}'",
                    stimulus.command
                );
                return;
            }
        }

        if !self.poll_interrupts {
            return;
        }
        if let Some(result) = self.poll() {
            report.push(ReportEntry { line: None, result });
        }
    }

    /// Run every stimulus in order.
    pub fn run(&mut self, list: &IoList) -> Vec<ReportEntry> {
        let mut report = Vec::with_capacity(list.len());
        for stimulus in &list.stimuli {
            self.step(stimulus, &mut report);
        }
        tracing::info!(
            operations = list.len(),
            entries = report.len(),
            time_ns = self.master.bus().time_ns(),
            "run complete"
        );
        report
    }
}

/// Run `list` on a fresh session built from `config`.
pub fn run(config: &RunnerConfig, list: &IoList) -> Result<Vec<ReportEntry>, ConfigError> {
    Ok(Session::new(config)?.run(list))
}
