//! Three-state signal values.

use std::fmt;

/// Level of a single line.
///
/// Bus lines are open to more than one driver, so a line can be driven low,
/// driven high, or left undriven. Port-size negotiation depends on telling
/// all three apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Logic {
    /// Driven to 0.
    Low,
    /// Driven to 1.
    High,
    /// Nobody is driving the line (high impedance).
    #[default]
    Floating,
}

impl Logic {
    /// True if the line is driven low.
    ///
    /// Every handshake line on the bus is active-low, so this is the
    /// "asserted" test.
    #[must_use]
    pub const fn is_low(self) -> bool {
        matches!(self, Self::Low)
    }

    #[must_use]
    pub const fn is_floating(self) -> bool {
        matches!(self, Self::Floating)
    }

    /// Resolve to a bit, substituting `pull` for an undriven line.
    #[must_use]
    pub const fn resolve(self, pull: bool) -> bool {
        match self {
            Self::Low => false,
            Self::High => true,
            Self::Floating => pull,
        }
    }

    /// Single-character form used in traces: `0`, `1` or `Z`.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Low => '0',
            Self::High => '1',
            Self::Floating => 'Z',
        }
    }
}

impl fmt::Display for Logic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// A tri-state bit vector of up to 32 lines.
///
/// Bit 0 is the least significant line (D0, A0, ...). Each bit is either
/// driven (its level taken from `value`) or floating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LogicVec {
    width: u8,
    value: u32,
    driven: u32,
}

impl LogicVec {
    /// Widest field a vector can hold.
    pub const MAX_WIDTH: u8 = 32;

    /// All lines undriven.
    #[must_use]
    pub const fn floating(width: u8) -> Self {
        debug_assert!(width <= Self::MAX_WIDTH);
        Self {
            width,
            value: 0,
            driven: 0,
        }
    }

    /// All lines driven to the bits of `value`.
    #[must_use]
    pub const fn from_u32(value: u32, width: u8) -> Self {
        let mask = Self::width_mask(width);
        Self {
            width,
            value: value & mask,
            driven: mask,
        }
    }

    /// Lines in `driven` take their level from `value`; the rest float.
    #[must_use]
    pub const fn with_mask(value: u32, driven: u32, width: u8) -> Self {
        let mask = Self::width_mask(width);
        Self {
            width,
            value: value & driven & mask,
            driven: driven & mask,
        }
    }

    /// Build a vector from levels listed most significant line first.
    ///
    /// `LogicVec::from_msb_first(&[Logic::Low, Logic::Floating])` is the
    /// two-line vector that prints as `0Z`.
    #[must_use]
    pub fn from_msb_first(levels: &[Logic]) -> Self {
        let width = levels.len() as u8;
        let mut vec = Self::floating(width);
        for (i, &level) in levels.iter().enumerate() {
            vec = vec.with_bit(width - 1 - i as u8, level);
        }
        vec
    }

    const fn width_mask(width: u8) -> u32 {
        if width >= 32 {
            u32::MAX
        } else {
            (1u32 << width) - 1
        }
    }

    #[must_use]
    pub const fn width(&self) -> u8 {
        self.width
    }

    /// Mask of the lines that are being driven.
    #[must_use]
    pub const fn driven_mask(&self) -> u32 {
        self.driven
    }

    /// Level of one line. Lines beyond the vector's width read as floating.
    #[must_use]
    pub const fn bit(&self, index: u8) -> Logic {
        if index >= self.width || self.driven & (1 << index) == 0 {
            Logic::Floating
        } else if self.value & (1 << index) != 0 {
            Logic::High
        } else {
            Logic::Low
        }
    }

    /// Copy of the vector with one line changed.
    #[must_use]
    pub const fn with_bit(self, index: u8, level: Logic) -> Self {
        if index >= self.width {
            return self;
        }
        let bit = 1u32 << index;
        let (value, driven) = match level {
            Logic::Low => (self.value & !bit, self.driven | bit),
            Logic::High => (self.value | bit, self.driven | bit),
            Logic::Floating => (self.value & !bit, self.driven & !bit),
        };
        Self {
            width: self.width,
            value,
            driven,
        }
    }

    /// True when every line is driven.
    #[must_use]
    pub const fn is_fully_driven(&self) -> bool {
        self.driven == Self::width_mask(self.width)
    }

    /// True when no line is driven.
    #[must_use]
    pub const fn is_floating(&self) -> bool {
        self.driven == 0
    }

    /// Numeric value if every line is driven.
    #[must_use]
    pub const fn to_u32(&self) -> Option<u32> {
        if self.is_fully_driven() {
            Some(self.value)
        } else {
            None
        }
    }

    /// Numeric value with floating lines read as `pull`.
    #[must_use]
    pub const fn resolve(&self, pull: bool) -> u32 {
        if pull {
            self.value | (!self.driven & Self::width_mask(self.width))
        } else {
            self.value
        }
    }
}

impl fmt::Display for LogicVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in (0..self.width).rev() {
            write!(f, "{}", self.bit(i))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floating_resolves_to_pull() {
        assert!(Logic::Floating.resolve(true));
        assert!(!Logic::Floating.resolve(false));
        assert!(!Logic::Low.resolve(true));
    }

    #[test]
    fn display_is_msb_first() {
        let v = LogicVec::from_msb_first(&[Logic::Low, Logic::Floating]);
        assert_eq!(v.to_string(), "0Z");
        assert_eq!(v.bit(1), Logic::Low);
        assert_eq!(v.bit(0), Logic::Floating);
    }

    #[test]
    fn partially_driven_has_no_value() {
        let v = LogicVec::with_mask(0xAB00_0000, 0xFF00_0000, 32);
        assert_eq!(v.to_u32(), None);
        assert_eq!(v.resolve(false), 0xAB00_0000);
        assert_eq!(v.resolve(true), 0xABFF_FFFF);
    }

    #[test]
    fn full_width_vector() {
        let v = LogicVec::from_u32(0xDEAD_BEEF, 32);
        assert!(v.is_fully_driven());
        assert_eq!(v.to_u32(), Some(0xDEAD_BEEF));
    }

    #[test]
    fn with_bit_floats_a_line() {
        let v = LogicVec::from_u32(0b111, 3).with_bit(1, Logic::Floating);
        assert_eq!(v.to_string(), "1Z1");
        assert_eq!(v.resolve(false), 0b101);
    }

    #[test]
    fn bits_beyond_width_float() {
        let v = LogicVec::from_u32(0xFF, 3);
        assert_eq!(v.bit(5), Logic::Floating);
        assert_eq!(v.to_u32(), Some(0b111));
    }
}
