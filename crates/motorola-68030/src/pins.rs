//! External bus pins of the 68030.
//!
//! Active-low pins are named without the bar; "asserted" always means the
//! line is driven low.

/// A pin or pin group on the 68030 bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pin {
    // === Master outputs ===
    /// A31-A0.
    Address,
    /// FC2-FC0.
    FunctionCode,
    /// SIZ1-SIZ0: bytes remaining in the operand.
    Size,
    /// R/W: high for reads.
    ReadWrite,
    /// AS: address strobe.
    AddressStrobe,
    /// DS: data strobe.
    DataStrobe,
    /// CBREQ: cache burst request.
    CacheBurstRequest,
    /// RESET.
    Reset,

    // === Bidirectional ===
    /// D31-D0.
    Data,

    // === Slave outputs ===
    /// STERM: synchronous termination.
    SynchronousTermination,
    /// DSACK1-DSACK0: asynchronous acknowledge, encodes the port width.
    DataAck,
    /// CBACK: cache burst acknowledge.
    CacheBurstAck,
    /// CIIN: cache inhibit.
    CacheInhibit,
    /// IPL2-IPL0: encoded interrupt priority.
    InterruptPriority,
}

impl Pin {
    /// Number of lines in the group.
    #[must_use]
    pub const fn width(self) -> u8 {
        match self {
            Self::Address | Self::Data => 32,
            Self::FunctionCode | Self::InterruptPriority => 3,
            Self::Size | Self::DataAck => 2,
            _ => 1,
        }
    }

    /// True for pins the bus master drives.
    #[must_use]
    pub const fn is_master_output(self) -> bool {
        matches!(
            self,
            Self::Address
                | Self::FunctionCode
                | Self::Size
                | Self::ReadWrite
                | Self::AddressStrobe
                | Self::DataStrobe
                | Self::CacheBurstRequest
                | Self::Reset
                | Self::Data
        )
    }
}

/// SIZ1-SIZ0 encoding for the number of operand bytes still to transfer.
///
/// 1 → `01`, 2 → `10`, 3 → `11`, 4 → `00`.
#[must_use]
pub const fn size_code(bytes_remaining: u8) -> u32 {
    (bytes_remaining & 0x03) as u32
}

/// Operand bytes announced by a SIZ1-SIZ0 encoding (inverse of [`size_code`]).
#[must_use]
pub const fn size_from_code(code: u32) -> u8 {
    match code & 0x03 {
        0 => 4,
        n => n as u8,
    }
}
