//! Coefficient bank
//!
//! Raw C-bit fixed-point coefficients, all bits fractional. One section (the
//! "shaping" section) carries real numerator taps; every other section uses
//! the hard-wired (1, ±2, 1) numerator selected by the filter type.
//!
//! Feedback taps use the direct-form sign convention: they are *added* to the
//! accumulator, i.e. they are the negated textbook `a1`/`a2`. `a1` is stored
//! halved so that its [-2, 2) range fits a [-1, 1) coefficient; the datapath
//! doubles it back.

use serde::{Deserialize, Serialize};

use crate::{FilterConfig, FilterType, SosError, SosResult, fits};

/// Numerator taps of the shaping section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Numerator {
    pub b0: i32,
    pub b1: i32,
    pub b2: i32,
}

impl Numerator {
    pub const fn new(b0: i32, b1: i32, b2: i32) -> Self {
        Self { b0, b1, b2 }
    }
}

/// Feedback taps of one section (`a1` stored halved)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Denominator {
    pub a1: i32,
    pub a2: i32,
}

impl Denominator {
    pub const fn new(a1: i32, a2: i32) -> Self {
        Self { a1, a2 }
    }
}

/// Numerator used by the feedforward datapath for a given section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionNumerator {
    /// Real taps of the shaping section
    Shaping(Numerator),
    /// Hard-wired (1, ±2, 1) taps
    Fixed(FilterType),
}

/// Immutable per-filter coefficient bank
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coefficients {
    shaping: Numerator,
    shaping_section: usize,
    denominators: Vec<Denominator>,
}

impl Coefficients {
    /// Create a bank with section 0 as the shaping section
    pub fn new(shaping: Numerator, denominators: Vec<Denominator>) -> Self {
        Self {
            shaping,
            shaping_section: 0,
            denominators,
        }
    }

    /// Builder: choose which section carries the real numerator
    pub fn with_shaping_section(mut self, index: usize) -> Self {
        self.shaping_section = index;
        self
    }

    #[inline]
    pub fn shaping(&self) -> Numerator {
        self.shaping
    }

    #[inline]
    pub fn shaping_section(&self) -> usize {
        self.shaping_section
    }

    #[inline]
    pub fn denominators(&self) -> &[Denominator] {
        &self.denominators
    }

    #[inline]
    pub fn sections(&self) -> usize {
        self.denominators.len()
    }

    /// Feedback taps of `section`
    #[inline]
    pub fn denominator(&self, section: usize) -> Denominator {
        self.denominators[section]
    }

    /// Feedforward taps of `section`
    #[inline]
    pub fn numerator(&self, section: usize, filter_type: FilterType) -> SectionNumerator {
        if section == self.shaping_section {
            SectionNumerator::Shaping(self.shaping)
        } else {
            SectionNumerator::Fixed(filter_type)
        }
    }

    /// Check that the bank matches `config` and every raw value fits the
    /// coefficient width. Pole/zero placement is not checked.
    pub fn validate(&self, config: &FilterConfig) -> SosResult<()> {
        let sections = config.sections();
        if self.denominators.len() != sections {
            return Err(SosError::SectionCountMismatch {
                expected: sections,
                actual: self.denominators.len(),
            });
        }
        if self.shaping_section >= sections {
            return Err(SosError::ShapingSectionOutOfRange {
                index: self.shaping_section,
                sections,
            });
        }

        let width = config.coefficient_width;
        let shaping = [
            ("b0", self.shaping.b0),
            ("b1", self.shaping.b1),
            ("b2", self.shaping.b2),
        ];
        for (name, value) in shaping {
            check_fits(name.to_string(), value, width)?;
        }
        for (i, d) in self.denominators.iter().enumerate() {
            check_fits(format!("a1[{i}]"), d.a1, width)?;
            check_fits(format!("a2[{i}]"), d.a2, width)?;
        }
        Ok(())
    }
}

fn check_fits(name: String, value: i32, width: u32) -> SosResult<()> {
    if fits(value as i128, width) {
        Ok(())
    } else {
        Err(SosError::CoefficientOverflow { name, value, width })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bank() -> Coefficients {
        Coefficients::new(
            Numerator::new(334, 668, 334),
            vec![Denominator::new(14016, -6871), Denominator::new(18236, -18811)],
        )
    }

    #[test]
    fn test_numerator_lookup() {
        let coeffs = bank();
        assert_eq!(
            coeffs.numerator(0, FilterType::Lowpass),
            SectionNumerator::Shaping(Numerator::new(334, 668, 334))
        );
        assert_eq!(
            coeffs.numerator(1, FilterType::Highpass),
            SectionNumerator::Fixed(FilterType::Highpass)
        );

        let moved = bank().with_shaping_section(1);
        assert_eq!(
            moved.numerator(0, FilterType::Lowpass),
            SectionNumerator::Fixed(FilterType::Lowpass)
        );
    }

    #[test]
    fn test_validate_section_count() {
        let config = FilterConfig::default().with_order(6);
        assert_eq!(
            bank().validate(&config),
            Err(SosError::SectionCountMismatch {
                expected: 3,
                actual: 2
            })
        );
        assert!(bank().validate(&FilterConfig::default()).is_ok());
    }

    #[test]
    fn test_validate_shaping_index() {
        let coeffs = bank().with_shaping_section(2);
        assert!(matches!(
            coeffs.validate(&FilterConfig::default()),
            Err(SosError::ShapingSectionOutOfRange { index: 2, .. })
        ));
    }

    #[test]
    fn test_validate_coefficient_width() {
        let config = FilterConfig::default().with_coefficient_width(12);
        let err = bank().validate(&config).unwrap_err();
        assert!(matches!(err, SosError::CoefficientOverflow { width: 12, .. }));
    }
}
