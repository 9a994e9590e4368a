//! Filter configuration
//!
//! Fixed for the lifetime of a filter instance. Widths follow the hardware
//! naming: D = data width, C = coefficient width (all bits fractional),
//! O = overhead (guard) bits added to the section state.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{MAX_WIDTH, SosError, SosResult};

pub const MIN_DATA_WIDTH: u32 = 2;
pub const MAX_DATA_WIDTH: u32 = 32;
pub const MIN_COEFFICIENT_WIDTH: u32 = 2;
pub const MAX_COEFFICIENT_WIDTH: u32 = 32;
pub const MAX_OVERHEAD_BITS: u32 = 64;

/// Filter response type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterType {
    #[default]
    Lowpass,
    Highpass,
}

impl FilterType {
    /// Sign of the middle tap of the hard-wired (1, ±2, 1) numerator
    #[inline]
    pub fn middle_tap_sign(self) -> i32 {
        match self {
            FilterType::Lowpass => 1,
            FilterType::Highpass => -1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FilterType::Lowpass => "lowpass",
            FilterType::Highpass => "highpass",
        }
    }
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterType {
    type Err = SosError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lowpass" | "lp" => Ok(FilterType::Lowpass),
            "highpass" | "hp" => Ok(FilterType::Highpass),
            _ => Err(SosError::UnknownFilterType(s.to_string())),
        }
    }
}

/// Static configuration of a looped SOS filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Lowpass or highpass
    pub filter_type: FilterType,

    /// Filter order (even, at least 2)
    pub order: u32,

    /// Input/output sample width (D)
    pub data_width: u32,

    /// Coefficient width (C), range [-1, 1)
    pub coefficient_width: u32,

    /// Guard bits added to the section state (O)
    pub overhead_bits: u32,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            filter_type: FilterType::Lowpass,
            order: 4,
            data_width: 16,
            coefficient_width: 16,
            overhead_bits: 4,
        }
    }
}

impl FilterConfig {
    /// 16-bit audio path with 16-bit coefficients
    pub fn audio_16bit() -> Self {
        Self::default()
    }

    /// 24-bit data, 24-bit coefficients, extra headroom
    pub fn high_precision() -> Self {
        Self {
            data_width: 24,
            coefficient_width: 24,
            overhead_bits: 6,
            ..Default::default()
        }
    }

    /// Builder: set filter type
    pub fn with_filter_type(mut self, filter_type: FilterType) -> Self {
        self.filter_type = filter_type;
        self
    }

    /// Builder: set order
    pub fn with_order(mut self, order: u32) -> Self {
        self.order = order;
        self
    }

    /// Builder: set data width
    pub fn with_data_width(mut self, bits: u32) -> Self {
        self.data_width = bits;
        self
    }

    /// Builder: set coefficient width
    pub fn with_coefficient_width(mut self, bits: u32) -> Self {
        self.coefficient_width = bits;
        self
    }

    /// Builder: set overhead bits
    pub fn with_overhead_bits(mut self, bits: u32) -> Self {
        self.overhead_bits = bits;
        self
    }

    /// Check structural parameters
    pub fn validate(&self) -> SosResult<()> {
        if self.order < 2 || self.order % 2 != 0 {
            return Err(SosError::InvalidOrder(self.order));
        }
        check_width("data", self.data_width, MIN_DATA_WIDTH, MAX_DATA_WIDTH)?;
        check_width(
            "coefficient",
            self.coefficient_width,
            MIN_COEFFICIENT_WIDTH,
            MAX_COEFFICIENT_WIDTH,
        )?;
        check_width("overhead", self.overhead_bits, 0, MAX_OVERHEAD_BITS)?;

        let widest = self.datapath_width();
        if widest > MAX_WIDTH {
            return Err(SosError::DatapathTooWide(widest));
        }
        Ok(())
    }

    /// Number of second-order sections
    #[inline]
    pub fn sections(&self) -> usize {
        (self.order / 2) as usize
    }

    /// Fractional bits of a coefficient (C - 1)
    #[inline]
    pub fn fraction_bits(&self) -> u32 {
        self.coefficient_width - 1
    }

    /// Width of a section history register (D + O)
    #[inline]
    pub fn state_width(&self) -> u32 {
        self.data_width + self.overhead_bits
    }

    /// Width of the in-flight accumulator (D + O + C - 1)
    #[inline]
    pub fn accumulator_width(&self) -> u32 {
        self.state_width() + self.fraction_bits()
    }

    /// Width the final feedforward value is clamped to before the output
    /// shift, i.e. the accumulator without its guard bits (D + C - 1)
    #[inline]
    pub fn output_saturation_width(&self) -> u32 {
        self.data_width + self.fraction_bits()
    }

    /// Widest intermediate of the feedback sum: a (D+O)-bit history times a
    /// C-bit coefficient, doubled, plus two additions
    #[inline]
    pub fn datapath_width(&self) -> u32 {
        self.state_width() + self.coefficient_width + 3
    }

    /// Largest input/output sample
    #[inline]
    pub fn sample_max(&self) -> i32 {
        crate::max_signed(self.data_width) as i32
    }

    /// Smallest input/output sample
    #[inline]
    pub fn sample_min(&self) -> i32 {
        crate::min_signed(self.data_width) as i32
    }
}

fn check_width(name: &'static str, value: u32, min: u32, max: u32) -> SosResult<()> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(SosError::InvalidWidth {
            name,
            value,
            min,
            max,
        })
    }
}

impl fmt::Display for FilterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} order {} (DW/CW {}/{}, +{} guard bits)",
            self.filter_type,
            self.order,
            self.data_width,
            self.coefficient_width,
            self.overhead_bits
        )
    }
}
