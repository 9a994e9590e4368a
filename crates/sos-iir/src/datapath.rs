//! Feedback and feedforward arithmetic
//!
//! One instance of this arithmetic is time-shared by every section. All
//! functions are pure: they see the current accumulator, the addressed
//! section's pre-update history and its coefficients, and return a new
//! value with its exact register width.
//!
//! Domains: the accumulator is scaled by `2^(C-1)` (fractional domain),
//! section histories are plain integers (state domain).

use sos_core::{Denominator, FilterConfig, FilterType, Fx, SectionNumerator};

use crate::state::SectionHistory;

/// Accumulator value loaded by a start pulse: the input clamped to the data
/// width and aligned into the fractional domain
#[inline]
pub fn inject(sample: i32, config: &FilterConfig) -> Fx {
    Fx::new(sample as i128, i32::BITS)
        .saturate(config.data_width)
        .shl(config.fraction_bits())
        .saturate(config.accumulator_width())
}

/// Full-precision feedback sum: `acc + 2·a1·history1 + a2·history2`
#[inline]
pub fn feedback_sum(
    acc: Fx,
    history: SectionHistory,
    denominator: Denominator,
    config: &FilterConfig,
) -> Fx {
    let cw = config.coefficient_width;
    let a1 = Fx::new(denominator.a1 as i128, cw);
    let a2 = Fx::new(denominator.a2 as i128, cw);

    // a1 is stored halved
    let term1 = (history.history1 * a1).shl(1);
    let term2 = history.history2 * a2;
    acc + term1 + term2
}

/// Bring a feedback sum back to the state domain: shift out the fraction
/// with round-half-up, then saturate to the state width
#[inline]
pub fn rescale(sum: Fx, config: &FilterConfig) -> Fx {
    sum.shr_round(config.fraction_bits())
        .saturate(config.state_width())
}

/// New history1 of the addressed section
#[inline]
pub fn feedback(
    acc: Fx,
    history: SectionHistory,
    denominator: Denominator,
    config: &FilterConfig,
) -> Fx {
    rescale(feedback_sum(acc, history, denominator, config), config)
}

/// Section output in the fractional domain, threaded into the next section
/// as its accumulator
///
/// `fb` is this cycle's feedback result; `history` must be the values from
/// before this cycle's write-back.
#[inline]
pub fn feedforward(
    fb: Fx,
    history: SectionHistory,
    numerator: SectionNumerator,
    config: &FilterConfig,
) -> Fx {
    let sum = match numerator {
        SectionNumerator::Shaping(b) => {
            let cw = config.coefficient_width;
            fb * Fx::new(b.b0 as i128, cw)
                + history.history1 * Fx::new(b.b1 as i128, cw)
                + history.history2 * Fx::new(b.b2 as i128, cw)
        }
        SectionNumerator::Fixed(filter_type) => {
            // Unity is 1 << (C-1) in the fractional domain
            let frac = config.fraction_bits();
            let middle = history.history1.shl(frac + 1);
            let middle = match filter_type {
                FilterType::Lowpass => middle,
                FilterType::Highpass => -middle,
            };
            fb.shl(frac) + middle + history.history2.shl(frac)
        }
    };
    sum.saturate(config.accumulator_width())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sos_core::Numerator;

    fn config() -> FilterConfig {
        FilterConfig::default()
    }

    fn history(h1: i128, h2: i128) -> SectionHistory {
        let w = config().state_width();
        SectionHistory {
            history1: Fx::new(h1, w),
            history2: Fx::new(h2, w),
        }
    }

    #[test]
    fn test_inject_aligns_input() {
        let acc = inject(-3, &config());
        assert_eq!(acc.value(), -3 << 15);
        assert_eq!(acc.width(), config().accumulator_width());
    }

    #[test]
    fn test_inject_clamps_out_of_range_input() {
        let cfg = config();
        assert_eq!(inject(40000, &cfg).value(), 32767 << 15);
        assert_eq!(inject(i32::MIN, &cfg).value(), -32768 << 15);
        assert_eq!(inject(-32768, &cfg).value(), -32768 << 15);

        let wide = FilterConfig::default().with_data_width(32);
        assert_eq!(inject(i32::MAX, &wide).value(), (i32::MAX as i128) << 15);
    }

    #[test]
    fn test_feedback_sum_exact() {
        let cfg = config();
        let acc = Fx::new(1000 << 15, cfg.accumulator_width());
        // a1 = 0.25 (stored as 0.125), a2 = -0.5
        let den = Denominator::new(1 << 12, -(1 << 14));
        let sum = feedback_sum(acc, history(400, 100), den, &cfg);
        // 1000 + 2*0.125*400 - 0.5*100 = 1050
        assert_eq!(sum.value(), 1050 << 15);
        assert_eq!(feedback(acc, history(400, 100), den, &cfg).value(), 1050);
    }

    #[test]
    fn test_rescale_rounds_half_up() {
        let cfg = config();
        let w = cfg.datapath_width();
        // 2.5 and -2.5 in the fractional domain
        assert_eq!(rescale(Fx::new(5 << 14, w), &cfg).value(), 3);
        assert_eq!(rescale(Fx::new(-5 << 14, w), &cfg).value(), -2);
        // Just below half
        assert_eq!(rescale(Fx::new((5 << 14) - 1, w), &cfg).value(), 2);
    }

    #[test]
    fn test_feedback_saturates_to_state_width() {
        let cfg = config();
        let max = sos_core::max_signed(cfg.state_width());
        let min = sos_core::min_signed(cfg.state_width());
        // Both taps near +1 with histories at the rails
        let den = Denominator::new(32767, 32767);
        let acc = Fx::new(sos_core::max_signed(35), 35);
        assert_eq!(feedback(acc, history(max, max), den, &cfg).value(), max);
        let acc = Fx::new(sos_core::min_signed(35), 35);
        assert_eq!(feedback(acc, history(min, min), den, &cfg).value(), min);
    }

    #[test]
    fn test_feedforward_shaping_taps() {
        let cfg = config();
        let fb = Fx::new(10, cfg.state_width());
        let num = SectionNumerator::Shaping(Numerator::new(1 << 14, -(1 << 13), 1 << 12));
        let y = feedforward(fb, history(8, 16), num, &cfg);
        // 0.5*10 - 0.25*8 + 0.125*16 = 5
        assert_eq!(y.value(), 5 << 15);
    }

    #[test]
    fn test_feedforward_fixed_taps() {
        let cfg = config();
        let fb = Fx::new(3, cfg.state_width());
        let lp = feedforward(fb, history(5, 7), SectionNumerator::Fixed(FilterType::Lowpass), &cfg);
        assert_eq!(lp.value(), (3 + 10 + 7) << 15);
        let hp = feedforward(fb, history(5, 7), SectionNumerator::Fixed(FilterType::Highpass), &cfg);
        assert_eq!(hp.value(), (3 - 10 + 7) << 15);
    }

    #[test]
    fn test_feedforward_saturates_to_accumulator() {
        let cfg = config();
        let max = sos_core::max_signed(cfg.state_width());
        let fb = Fx::new(max, cfg.state_width());
        let y = feedforward(fb, history(max, max), SectionNumerator::Fixed(FilterType::Lowpass), &cfg);
        assert_eq!(y.value(), sos_core::max_signed(cfg.accumulator_width()));
        assert_eq!(y.width(), cfg.accumulator_width());
    }
}
