//! Sparse byte-addressed memory behind the slave.

use std::collections::BTreeMap;

/// 4 GiB of byte storage; untouched bytes read as 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Memory {
    bytes: BTreeMap<u32, u8>,
}

impl Memory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn read_byte(&self, address: u32) -> u8 {
        self.bytes.get(&address).copied().unwrap_or(0)
    }

    pub fn write_byte(&mut self, address: u32, value: u8) {
        self.bytes.insert(address, value);
    }

    /// Copy `data` in starting at `address`, wrapping at the top of memory.
    pub fn load(&mut self, address: u32, data: &[u8]) {
        let mut addr = address;
        for &byte in data {
            self.write_byte(addr, byte);
            addr = addr.wrapping_add(1);
        }
    }

    /// Read `count` (at most 4) bytes big-endian, left-justified in the word.
    #[must_use]
    pub fn read_left_justified(&self, address: u32, count: u8) -> u32 {
        let mut word = 0u32;
        for i in 0..count.min(4) {
            let byte = self.read_byte(address.wrapping_add(u32::from(i)));
            word |= u32::from(byte) << (24 - 8 * u32::from(i));
        }
        word
    }

    /// Store the upper `count` (at most 4) bytes of `word` starting at `address`.
    pub fn write_left_justified(&mut self, address: u32, count: u8, word: u32) {
        for i in 0..count.min(4) {
            let byte = (word >> (24 - 8 * u32::from(i))) as u8;
            self.write_byte(address.wrapping_add(u32::from(i)), byte);
        }
    }

    /// Big-endian value of the `count` bytes at `address`.
    #[must_use]
    pub fn read_be(&self, address: u32, count: u8) -> u32 {
        let count = count.min(4);
        if count == 0 {
            return 0;
        }
        self.read_left_justified(address, count) >> (32 - 8 * u32::from(count))
    }

    /// Bytes ever written.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwritten_reads_zero() {
        let mem = Memory::new();
        assert_eq!(mem.read_byte(0xDEAD_BEEF), 0);
        assert!(mem.is_empty());
    }

    #[test]
    fn left_justified_round_trip() {
        let mut mem = Memory::new();
        mem.write_left_justified(0x100, 2, 0xBEEF_0000);
        assert_eq!(mem.read_byte(0x100), 0xBE);
        assert_eq!(mem.read_byte(0x101), 0xEF);
        assert_eq!(mem.read_left_justified(0x100, 2), 0xBEEF_0000);
        assert_eq!(mem.read_be(0x100, 2), 0xBEEF);
    }

    #[test]
    fn load_wraps_at_top() {
        let mut mem = Memory::new();
        mem.load(0xFFFF_FFFE, &[1, 2, 3, 4]);
        assert_eq!(mem.read_be(0xFFFF_FFFE, 4), 0x0102_0304);
        assert_eq!(mem.read_byte(0), 3);
        assert_eq!(mem.len(), 4);
    }
}
