//! Output latch and validity pulse

use sos_core::{FilterConfig, Fx};

/// Registered output sample plus its one-cycle validity flag
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputStage {
    sample: i32,
    valid: bool,
}

impl OutputStage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Last latched sample. Only meaningful while [`valid`](Self::valid).
    #[inline]
    pub fn sample(&self) -> i32 {
        self.sample
    }

    #[inline]
    pub fn valid(&self) -> bool {
        self.valid
    }

    /// Strip the guard bits from the final feedforward value, then undo the
    /// fractional scaling. The result always fits the data width.
    #[inline]
    pub fn rescale(value: Fx, config: &FilterConfig) -> i32 {
        let sample = value
            .saturate(config.output_saturation_width())
            .shr(config.fraction_bits());
        debug_assert!(sample.width() <= config.data_width);
        sample.value() as i32
    }

    /// Clock edge: latch `acc` when the delayed last-section flag is set and
    /// forward the flag as the validity pulse.
    #[inline]
    pub fn clock(&mut self, last_delayed: bool, acc: Fx, config: &FilterConfig) {
        if last_delayed {
            self.sample = Self::rescale(acc, config);
        }
        self.valid = last_delayed;
    }
}
