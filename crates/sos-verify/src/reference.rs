//! Double-precision reference cascade
//!
//! Transposed Direct Form II biquads with cookbook lowpass/highpass
//! coefficients and Butterworth section Qs. The fixed-point model is scored
//! against this cascade after its output has been rounded to the sample
//! domain.

use std::f64::consts::PI;

use sos_core::{FilterConfig, FilterType};
use sos_iir::{Processor, SampleFilter};

/// Normalized biquad coefficients (a0 = 1, textbook sign convention)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BiquadCoeffs {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub a1: f64,
    pub a2: f64,
}

impl BiquadCoeffs {
    /// Calculate lowpass filter coefficients
    pub fn lowpass(freq: f64, q: f64, sample_rate: f64) -> Self {
        let omega = 2.0 * PI * freq / sample_rate;
        let cos_omega = omega.cos();
        let alpha = omega.sin() / (2.0 * q);

        let b0 = (1.0 - cos_omega) / 2.0;
        let a0 = 1.0 + alpha;

        Self {
            b0: b0 / a0,
            b1: 2.0 * b0 / a0,
            b2: b0 / a0,
            a1: -2.0 * cos_omega / a0,
            a2: (1.0 - alpha) / a0,
        }
    }

    /// Calculate highpass filter coefficients
    pub fn highpass(freq: f64, q: f64, sample_rate: f64) -> Self {
        let omega = 2.0 * PI * freq / sample_rate;
        let cos_omega = omega.cos();
        let alpha = omega.sin() / (2.0 * q);

        let b0 = (1.0 + cos_omega) / 2.0;
        let a0 = 1.0 + alpha;

        Self {
            b0: b0 / a0,
            b1: -2.0 * b0 / a0,
            b2: b0 / a0,
            a1: -2.0 * cos_omega / a0,
            a2: (1.0 - alpha) / a0,
        }
    }

    /// Unity passthrough
    pub fn bypass() -> Self {
        Self {
            b0: 1.0,
            ..Default::default()
        }
    }

    /// Section of the given response type
    pub fn for_type(filter_type: FilterType, freq: f64, q: f64, sample_rate: f64) -> Self {
        match filter_type {
            FilterType::Lowpass => Self::lowpass(freq, q, sample_rate),
            FilterType::Highpass => Self::highpass(freq, q, sample_rate),
        }
    }

    /// Feedback taps in direct-form convention (negated a1, a2)
    #[inline]
    pub fn feedback_taps(&self) -> (f64, f64) {
        (-self.a1, -self.a2)
    }
}

/// Q of each second-order section of an even-order Butterworth filter
pub fn butterworth_q(order: u32) -> Vec<f64> {
    let n = order as f64;
    (0..order / 2)
        .map(|k| 1.0 / (2.0 * ((2 * k + 1) as f64 * PI / (2.0 * n)).cos()))
        .collect()
}

/// Butterworth cascade, one biquad per section
pub fn butterworth(
    filter_type: FilterType,
    order: u32,
    cutoff_hz: f64,
    sample_rate: f64,
) -> Vec<BiquadCoeffs> {
    butterworth_q(order)
        .into_iter()
        .map(|q| BiquadCoeffs::for_type(filter_type, cutoff_hz, q, sample_rate))
        .collect()
}

/// Single biquad, Transposed Direct Form II
#[derive(Debug, Clone)]
pub struct BiquadTDF2 {
    coeffs: BiquadCoeffs,
    z1: f64,
    z2: f64,
}

impl BiquadTDF2 {
    pub fn new(coeffs: BiquadCoeffs) -> Self {
        Self {
            coeffs,
            z1: 0.0,
            z2: 0.0,
        }
    }

    #[inline]
    pub fn coeffs(&self) -> &BiquadCoeffs {
        &self.coeffs
    }

    #[inline(always)]
    pub fn process(&mut self, input: f64) -> f64 {
        let output = self.coeffs.b0 * input + self.z1;
        self.z1 = self.coeffs.b1 * input - self.coeffs.a1 * output + self.z2;
        self.z2 = self.coeffs.b2 * input - self.coeffs.a2 * output;
        output
    }

    pub fn reset(&mut self) {
        self.z1 = 0.0;
        self.z2 = 0.0;
    }
}

/// Biquads in series
#[derive(Debug, Clone)]
pub struct ReferenceCascade {
    sections: Vec<BiquadTDF2>,
}

impl ReferenceCascade {
    pub fn new(design: &[BiquadCoeffs]) -> Self {
        Self {
            sections: design.iter().copied().map(BiquadTDF2::new).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    #[inline]
    pub fn process(&mut self, input: f64) -> f64 {
        self.sections
            .iter_mut()
            .fold(input, |signal, section| section.process(signal))
    }

    pub fn reset(&mut self) {
        self.sections.iter_mut().for_each(BiquadTDF2::reset);
    }
}

/// Round a reference sample the way the scored outputs are produced:
/// scale into the coefficient fraction, round, truncate back to an integer
/// and saturate to the data width.
pub fn round_to_sample(value: f64, config: &FilterConfig) -> i32 {
    let scale = (1u64 << config.fraction_bits()) as f64;
    let rounded = ((value * scale).round() / scale).trunc();
    rounded.clamp(config.sample_min() as f64, config.sample_max() as f64) as i32
}

/// Reference cascade with integer input and output
#[derive(Debug, Clone)]
pub struct ReferenceFilter {
    cascade: ReferenceCascade,
    config: FilterConfig,
}

impl ReferenceFilter {
    pub fn new(design: &[BiquadCoeffs], config: FilterConfig) -> Self {
        Self {
            cascade: ReferenceCascade::new(design),
            config,
        }
    }

    /// Unrounded output for one input sample
    #[inline]
    pub fn process_exact(&mut self, input: i32) -> f64 {
        self.cascade.process(input as f64)
    }
}

impl Processor for ReferenceFilter {
    fn reset(&mut self) {
        self.cascade.reset();
    }
}

impl SampleFilter for ReferenceFilter {
    fn process_sample(&mut self, input: i32) -> i32 {
        let exact = self.process_exact(input);
        round_to_sample(exact, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_butterworth_q_table() {
        let q2 = butterworth_q(2);
        assert_eq!(q2.len(), 1);
        assert_relative_eq!(q2[0], std::f64::consts::FRAC_1_SQRT_2, epsilon = 1e-12);

        let q4 = butterworth_q(4);
        assert_relative_eq!(q4[0], 0.541_196_100_146_197, epsilon = 1e-12);
        assert_relative_eq!(q4[1], 1.306_562_964_876_376_6, epsilon = 1e-12);
    }

    #[test]
    fn test_lowpass_unity_dc_gain() {
        let c = BiquadCoeffs::lowpass(1000.0, 0.707, 48000.0);
        let dc = (c.b0 + c.b1 + c.b2) / (1.0 + c.a1 + c.a2);
        assert_relative_eq!(dc, 1.0, epsilon = 1e-12);
        assert_relative_eq!(c.b1, 2.0 * c.b0, epsilon = 1e-15);
    }

    #[test]
    fn test_highpass_unity_nyquist_gain() {
        let c = BiquadCoeffs::highpass(1000.0, 0.707, 48000.0);
        let nyquist = (c.b0 - c.b1 + c.b2) / (1.0 - c.a1 + c.a2);
        assert_relative_eq!(nyquist, 1.0, epsilon = 1e-12);
        assert_relative_eq!(c.b1, -2.0 * c.b0, epsilon = 1e-15);
    }

    #[test]
    fn test_cascade_settles_to_dc() {
        let design = butterworth(FilterType::Lowpass, 4, 5512.5, 44100.0);
        let mut cascade = ReferenceCascade::new(&design);
        let mut y = 0.0;
        for _ in 0..2000 {
            y = cascade.process(1000.0);
        }
        assert_relative_eq!(y, 1000.0, epsilon = 1e-6);

        cascade.reset();
        assert_eq!(cascade.process(0.0), 0.0);
    }

    #[test]
    fn test_round_to_sample() {
        let config = FilterConfig::default();
        assert_eq!(round_to_sample(12.7, &config), 12);
        assert_eq!(round_to_sample(-12.7, &config), -12);
        assert_eq!(round_to_sample(1e9, &config), 32767);
        assert_eq!(round_to_sample(-1e9, &config), -32768);
    }

    #[test]
    fn test_bypass_reference_filter() {
        let mut filter = ReferenceFilter::new(&[BiquadCoeffs::bypass()], FilterConfig::default());
        assert_eq!(filter.process_sample(1234), 1234);
        assert_eq!(filter.process_sample(-5), -5);
    }
}
