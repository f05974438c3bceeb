//! Stimulus-driven runs of the 68030 bus master against the reference slave.

pub mod config;
pub mod report;
pub mod session;

pub use config::{ConfigError, RunnerConfig};
pub use report::{ReportEntry, to_json};
pub use session::{Session, run};
