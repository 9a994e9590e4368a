//! Fixed-point values with explicit bit widths
//!
//! Every intermediate carries the width a hardware register would need to
//! hold it: addition grows by one bit, multiplication by the sum of both
//! operand widths, a left shift by the shift amount. Values only get
//! narrower through [`Fx::saturate`] (or a right shift), so an overflow is
//! clamped and never wraps.

use std::fmt;
use std::ops::{Add, Mul, Neg};

/// Widest value the datapath can carry
pub const MAX_WIDTH: u32 = 128;

/// Largest value representable in `width` signed bits
#[inline]
pub const fn max_signed(width: u32) -> i128 {
    if width >= MAX_WIDTH {
        i128::MAX
    } else {
        (1i128 << (width - 1)) - 1
    }
}

/// Smallest value representable in `width` signed bits
#[inline]
pub const fn min_signed(width: u32) -> i128 {
    if width >= MAX_WIDTH {
        i128::MIN
    } else {
        -(1i128 << (width - 1))
    }
}

/// Whether `value` is representable in `width` signed bits
#[inline]
pub const fn fits(value: i128, width: u32) -> bool {
    value >= min_signed(width) && value <= max_signed(width)
}

/// Saturating cast of a signed `in_width`-bit value into `out_width` bits.
///
/// Out-of-range values clamp to the extreme of matching sign, in-range
/// values pass through unchanged. Saturation is a normal operating mode
/// under large transients, so nothing is reported.
#[inline]
pub fn saturate(value: i128, in_width: u32, out_width: u32) -> i128 {
    debug_assert!(
        out_width <= in_width,
        "saturate widens {in_width} -> {out_width} bits"
    );
    debug_assert!(fits(value, in_width), "{value} exceeds {in_width} bits");

    let max = max_signed(out_width);
    let min = min_signed(out_width);
    if value > max {
        max
    } else if value < min {
        min
    } else {
        value
    }
}

/// Signed fixed-point value tagged with its register width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fx {
    value: i128,
    width: u32,
}

impl Fx {
    /// Create a value of `width` bits
    #[inline]
    pub fn new(value: i128, width: u32) -> Self {
        debug_assert!((1..=MAX_WIDTH).contains(&width), "bad width {width}");
        debug_assert!(fits(value, width), "{value} exceeds {width} bits");
        Self { value, width }
    }

    /// Zero of `width` bits
    #[inline]
    pub fn zero(width: u32) -> Self {
        Self::new(0, width)
    }

    #[inline]
    pub fn value(self) -> i128 {
        self.value
    }

    #[inline]
    pub fn width(self) -> u32 {
        self.width
    }

    /// Multiply by `2^bits`
    #[inline]
    pub fn shl(self, bits: u32) -> Self {
        Self::new(self.value << bits, self.width + bits)
    }

    /// Arithmetic shift right (floor division by `2^bits`)
    #[inline]
    pub fn shr(self, bits: u32) -> Self {
        Self::new(self.value >> bits, self.width.saturating_sub(bits).max(1))
    }

    /// Shift right by `bits`, adding back the most significant discarded bit.
    ///
    /// This is round-half-up: ties go toward positive infinity, so -1.5
    /// becomes -1 and 1.5 becomes 2.
    #[inline]
    pub fn shr_round(self, bits: u32) -> Self {
        if bits == 0 {
            return self;
        }
        let round = (self.value >> (bits - 1)) & 1;
        let width = self.width.saturating_sub(bits).max(1) + 1;
        Self::new((self.value >> bits) + round, width)
    }

    /// Saturating cast into a `width`-bit register. A wider register just
    /// sign-extends.
    #[inline]
    pub fn saturate(self, width: u32) -> Self {
        if width >= self.width {
            return Self::new(self.value, width);
        }
        Self::new(saturate(self.value, self.width, width), width)
    }
}

impl Add for Fx {
    type Output = Fx;

    #[inline]
    fn add(self, rhs: Fx) -> Fx {
        Fx::new(self.value + rhs.value, self.width.max(rhs.width) + 1)
    }
}

impl Mul for Fx {
    type Output = Fx;

    #[inline]
    fn mul(self, rhs: Fx) -> Fx {
        Fx::new(self.value * rhs.value, self.width + rhs.width)
    }
}

impl Neg for Fx {
    type Output = Fx;

    #[inline]
    fn neg(self) -> Fx {
        Fx::new(-self.value, self.width + 1)
    }
}

impl fmt::Display for Fx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}'s{}", self.width, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_range() {
        assert_eq!(max_signed(8), 127);
        assert_eq!(min_signed(8), -128);
        assert_eq!(max_signed(1), 0);
        assert_eq!(min_signed(1), -1);
        assert_eq!(max_signed(128), i128::MAX);
        assert_eq!(min_signed(128), i128::MIN);
    }

    #[test]
    fn test_saturate_passes_in_range() {
        for value in -128..=127 {
            assert_eq!(saturate(value, 16, 8), value);
        }
    }

    #[test]
    fn test_saturate_clamps_out_of_range() {
        for value in 128..=32767 {
            assert_eq!(saturate(value, 16, 8), 127);
        }
        for value in -32768..=-129 {
            assert_eq!(saturate(value, 16, 8), -128);
        }
    }

    #[test]
    fn test_width_growth() {
        let a = Fx::new(-32768, 16);
        let b = Fx::new(-32768, 16);

        let product = a * b;
        assert_eq!(product.width(), 32);
        assert_eq!(product.value(), 1 << 30);

        let sum = a + b;
        assert_eq!(sum.width(), 17);
        assert_eq!(sum.value(), -65536);

        let negated = -a;
        assert_eq!(negated.width(), 17);
        assert_eq!(negated.value(), 32768);
    }

    #[test]
    fn test_shr_round_half_up() {
        // 1.5 and -1.5 with one fractional bit
        assert_eq!(Fx::new(3, 8).shr_round(1).value(), 2);
        assert_eq!(Fx::new(-3, 8).shr_round(1).value(), -1);
        // Below half rounds down, above half rounds up
        assert_eq!(Fx::new(0b101, 8).shr_round(2).value(), 1);
        assert_eq!(Fx::new(0b111, 8).shr_round(2).value(), 2);
        // -1.25
        assert_eq!(Fx::new(-5, 8).shr_round(2).value(), -1);
    }

    #[test]
    fn test_shr_floors() {
        assert_eq!(Fx::new(-1, 8).shr(4).value(), -1);
        assert_eq!(Fx::new(31, 8).shr(4).value(), 1);
    }

    #[test]
    fn test_fx_saturate_sign_extends_narrower_values() {
        let v = Fx::new(-100, 8);
        assert_eq!(v.saturate(16), Fx::new(-100, 16));
        assert_eq!(Fx::new(1000, 16).saturate(8).value(), 127);
        assert_eq!(Fx::new(1000, 16).saturate(8).width(), 8);
    }
}
