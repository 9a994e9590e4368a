//! Error metrics between the fixed-point output and the reference

use serde::{Deserialize, Serialize};

/// Energies below this are treated as zero when forming the NMSE ratio
const ENERGY_FLOOR: f64 = 1e-30;

/// Streaming accumulator of squared error and reference energy
#[derive(Debug, Clone, Default)]
pub struct ErrorAccumulator {
    sum_sq_error: f64,
    sum_sq_reference: f64,
    peak_error: u64,
    peak_error_sample: usize,
    count: usize,
}

impl ErrorAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one reference/measured pair
    #[inline]
    pub fn push(&mut self, reference: i32, measured: i32) {
        let error = measured as i64 - reference as i64;
        self.sum_sq_error += (error as f64).powi(2);
        self.sum_sq_reference += (reference as f64).powi(2);

        let abs = error.unsigned_abs();
        if abs > self.peak_error {
            self.peak_error = abs;
            self.peak_error_sample = self.count;
        }
        self.count += 1;
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Final metrics, peak error scaled to a `data_width`-bit full scale
    pub fn finish(&self, data_width: u32) -> ErrorMetrics {
        let rms_error = if self.count == 0 {
            0.0
        } else {
            (self.sum_sq_error / self.count as f64).sqrt()
        };

        ErrorMetrics {
            samples: self.count,
            nmse_db: nmse_db(self.sum_sq_error, self.sum_sq_reference),
            peak_error: self.peak_error,
            peak_error_percent: 100.0 * self.peak_error as f64 / (1u64 << data_width) as f64,
            peak_error_sample: self.peak_error_sample,
            rms_error,
        }
    }
}

/// Normalized mean squared error in dB: `10 log10(sum err^2 / sum ref^2)`
pub fn nmse_db(sum_sq_error: f64, sum_sq_reference: f64) -> f64 {
    10.0 * (sum_sq_error.max(ENERGY_FLOOR) / sum_sq_reference.max(ENERGY_FLOOR)).log10()
}

/// Summary of one comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorMetrics {
    /// Number of compared samples
    pub samples: usize,

    /// Normalized mean squared error in dB
    pub nmse_db: f64,

    /// Maximum absolute sample error
    pub peak_error: u64,

    /// Peak error as a percentage of the data full scale (2^D)
    pub peak_error_percent: f64,

    /// Sample index of the peak error
    pub peak_error_sample: usize,

    /// RMS of sample errors
    pub rms_error: f64,
}

impl ErrorMetrics {
    /// Calculate metrics from two sample arrays (compared up to the shorter)
    pub fn calculate(reference: &[i32], measured: &[i32], data_width: u32) -> Self {
        let mut acc = ErrorAccumulator::new();
        for (&r, &m) in reference.iter().zip(measured) {
            acc.push(r, m);
        }
        acc.finish(data_width)
    }

    /// Bit-exact agreement
    pub fn is_exact(&self) -> bool {
        self.peak_error == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_identical_signals() {
        let signal = [100, -200, 300];
        let metrics = ErrorMetrics::calculate(&signal, &signal, 16);
        assert!(metrics.is_exact());
        assert_eq!(metrics.rms_error, 0.0);
        assert!(metrics.nmse_db < -290.0);
    }

    #[test]
    fn test_known_nmse() {
        // Error energy is 1% of reference energy
        let reference = [1000, -1000, 1000, -1000];
        let measured = [1100, -1100, 1100, -1100];
        let metrics = ErrorMetrics::calculate(&reference, &measured, 16);
        assert_relative_eq!(metrics.nmse_db, -20.0, epsilon = 1e-9);
        assert_eq!(metrics.peak_error, 100);
        assert_relative_eq!(metrics.peak_error_percent, 100.0 * 100.0 / 65536.0, epsilon = 1e-12);
        assert_relative_eq!(metrics.rms_error, 100.0, epsilon = 1e-12);
    }

    #[test]
    fn test_peak_error_location() {
        let metrics = ErrorMetrics::calculate(&[0, 0, 0, 0], &[1, -5, 3, 5], 16);
        assert_eq!(metrics.peak_error, 5);
        assert_eq!(metrics.peak_error_sample, 1);
    }

    #[test]
    fn test_silent_reference_reports_large_error() {
        let metrics = ErrorMetrics::calculate(&[0, 0], &[1, 0], 16);
        assert!(metrics.nmse_db > 290.0);
    }

    #[test]
    fn test_extreme_samples_do_not_overflow() {
        let metrics = ErrorMetrics::calculate(&[i32::MIN], &[i32::MAX], 32);
        assert_eq!(metrics.peak_error, u32::MAX as u64);
    }

    #[test]
    fn test_empty() {
        let metrics = ErrorAccumulator::new().finish(16);
        assert_eq!(metrics.samples, 0);
        assert_eq!(metrics.rms_error, 0.0);
    }
}
