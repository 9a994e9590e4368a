//! Float cascade to fixed-point coefficient bank
//!
//! Only one section has a programmable numerator, so every section gain is
//! folded into it and the remaining sections are left with the hard-wired
//! (1, ±2, 1) taps. Feedback taps are negated into the direct-form
//! convention, a1 is stored halved, and everything is rounded to C bits.

use log::{debug, warn};
use sos_core::{Coefficients, Denominator, FilterConfig, Numerator, SosError, max_signed, min_signed};

use crate::reference::BiquadCoeffs;
use crate::{Result, VerifyError};

/// Relative tolerance when checking a section for the (1, ±2, 1) shape
const SHAPE_TOLERANCE: f64 = 1e-9;

/// Round `value` into a `width`-bit fraction, saturating on overflow
pub fn to_fixed(value: f64, width: u32) -> i32 {
    let scaled = (value * (1u64 << (width - 1)) as f64).round();
    let max = max_signed(width) as f64;
    let min = min_signed(width) as f64;
    if scaled > max || scaled < min {
        warn!("coefficient {value} saturates in {width} bits");
    }
    scaled.clamp(min, max) as i32
}

/// Quantize a float design for `config`, putting the combined gain into
/// section `shaping_section`.
pub fn quantize(
    config: &FilterConfig,
    design: &[BiquadCoeffs],
    shaping_section: usize,
) -> Result<Coefficients> {
    config.validate()?;
    if design.len() != config.sections() {
        return Err(SosError::SectionCountMismatch {
            expected: config.sections(),
            actual: design.len(),
        }
        .into());
    }

    let sign = config.filter_type.middle_tap_sign() as f64;
    for (index, section) in design.iter().enumerate() {
        let shaped = (section.b1 - 2.0 * sign * section.b0).abs()
            <= SHAPE_TOLERANCE * section.b0.abs()
            && (section.b2 - section.b0).abs() <= SHAPE_TOLERANCE * section.b0.abs();
        if !shaped {
            return Err(VerifyError::ConfigError(format!(
                "section {index} numerator is not a (1, {}2, 1) multiple",
                if sign > 0.0 { "+" } else { "-" }
            )));
        }
    }

    let width = config.coefficient_width;
    let gain: f64 = design.iter().map(|s| s.b0).product();
    let shaping = Numerator::new(
        to_fixed(gain, width),
        to_fixed(2.0 * sign * gain, width),
        to_fixed(gain, width),
    );
    let denominators: Vec<Denominator> = design
        .iter()
        .map(|s| {
            let (a1, a2) = s.feedback_taps();
            Denominator::new(to_fixed(a1 / 2.0, width), to_fixed(a2, width))
        })
        .collect();

    debug!(
        "quantized {} sections, gain {gain:.6e} -> {:?}",
        denominators.len(),
        shaping
    );

    let coeffs = Coefficients::new(shaping, denominators).with_shaping_section(shaping_section);
    coeffs.validate(config)?;
    Ok(coeffs)
}
