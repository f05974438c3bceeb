//! Core traits and types for clocked, signal-level bus simulation.
//!
//! Everything is sampled and driven on clock edges. A bus master never
//! observes a line between edges, and every line can be undriven.

mod bus;
mod clock;
mod logic;

pub use bus::{Edge, SignalBus};
pub use clock::MasterClock;
pub use logic::{Logic, LogicVec};
