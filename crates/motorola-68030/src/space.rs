//! Address spaces selected by the FC2-FC0 pins.

use serde::{Deserialize, Serialize};

/// Function code values presented on FC2-FC0.
///
/// These tell external logic which address space a cycle belongs to. CPU
/// space carries interrupt acknowledge (and coprocessor/breakpoint) cycles
/// rather than memory accesses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AddressSpace {
    /// User data access (FC=1).
    UserData = 1,
    /// User program access (FC=2).
    #[serde(rename = "USER_PROG")]
    UserProgram = 2,
    /// Supervisor data access (FC=5).
    #[serde(rename = "SUPER_DATA")]
    SupervisorData = 5,
    /// Supervisor program access (FC=6).
    #[serde(rename = "SUPER_PROG")]
    SupervisorProgram = 6,
    /// CPU space (FC=7).
    CpuSpace = 7,
}

impl AddressSpace {
    /// Decode a value sampled from FC2-FC0. Reserved codes (0, 3, 4) yield `None`.
    #[must_use]
    pub fn from_bits(bits: u32) -> Option<Self> {
        match bits & 0x07 {
            1 => Some(Self::UserData),
            2 => Some(Self::UserProgram),
            5 => Some(Self::SupervisorData),
            6 => Some(Self::SupervisorProgram),
            7 => Some(Self::CpuSpace),
            _ => None,
        }
    }

    /// Returns the 3-bit value for the function code.
    #[must_use]
    pub fn bits(self) -> u32 {
        self as u32
    }
}
