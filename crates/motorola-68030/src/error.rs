use thiserror::Error;

/// Reasons a transfer is refused before any signal is driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BusError {
    #[error("invalid operation size: {size} (expected 1, 2 or 4)")]
    InvalidSize { size: u8 },

    #[error("invalid address and size: {address:#010x}, {size}")]
    AddressOutOfRange { address: u32, size: u8 },
}
