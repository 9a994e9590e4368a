//! End-to-end verification run
//!
//! Design a Butterworth cascade, quantize it, clock the looped filter over
//! a stimulus at the configured pacing, run the same stimulus through the
//! float reference, and score the difference.

use log::info;
use sos_iir::{LoopedSosIir, SampleFilter};

use crate::config::VerifyConfig;
use crate::metrics::ErrorAccumulator;
use crate::quantize::quantize;
use crate::reference::{ReferenceFilter, butterworth};
use crate::report::{LatencySummary, VerifyReport};
use crate::stimulus::StimulusGenerator;
use crate::testbench::Testbench;
use crate::Result;

/// Runs one configured verification
pub struct VerifyRunner {
    config: VerifyConfig,
}

impl VerifyRunner {
    pub fn new(config: VerifyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &VerifyConfig {
        &self.config
    }

    /// Run on a generated stimulus
    pub fn run(&self) -> Result<VerifyReport> {
        self.config.validate()?;
        let mut generator =
            StimulusGenerator::new(self.config.seed, &self.config.filter, self.config.sample_rate);
        let input = generator.generate(self.config.stimulus, self.config.samples);
        self.run_with_input(&input)
    }

    /// Run on caller-provided samples
    pub fn run_with_input(&self, input: &[i32]) -> Result<VerifyReport> {
        let config = &self.config;
        config.validate()?;
        let filter = config.filter;

        let design = butterworth(
            filter.filter_type,
            filter.order,
            config.cutoff_hz(),
            config.sample_rate,
        );
        let coeffs = quantize(&filter, &design, config.shaping_section)?;
        let dut = LoopedSosIir::new(filter, coeffs)?;
        let expected_latency = dut.pass_latency();

        let mut bench = Testbench::new(dut, config.clocks_per_sample())?;
        let capture = bench.run(input)?;

        let mut reference = ReferenceFilter::new(&design, filter);
        let mut errors = ErrorAccumulator::new();
        for (&x, &measured) in input.iter().zip(&capture.outputs) {
            errors.push(reference.process_sample(x), measured);
        }
        let metrics = errors.finish(filter.data_width);

        let latency = LatencySummary {
            expected: expected_latency,
            min: capture.min_latency().unwrap_or(expected_latency),
            max: capture.max_latency().unwrap_or(expected_latency),
        };
        let report = VerifyReport::new(config.clone(), metrics, latency, capture.cycles);
        info!("{}", report.summary());
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VerifyError;

    #[test]
    fn test_default_run_passes() {
        let report = VerifyRunner::new(VerifyConfig::ci()).run().unwrap();
        assert!(report.passed, "{}", report.generate(crate::ReportFormat::Text));
        assert_eq!(report.metrics.samples, 1000);
        assert_eq!(report.latency.max, 4);
    }

    #[test]
    fn test_tight_pacing_is_rejected() {
        let config = VerifyConfig::ci().with_clocks_per_sample(1);
        assert!(matches!(
            VerifyRunner::new(config).run(),
            Err(VerifyError::PacingTooTight { minimum: 2, .. })
        ));
    }

    #[test]
    fn test_section_count_pacing_passes() {
        let report = VerifyRunner::new(VerifyConfig::ci().with_clocks_per_sample(2))
            .run()
            .unwrap();
        assert!(report.passed, "{}", report.summary());
    }

    #[test]
    fn test_run_with_input() {
        let runner = VerifyRunner::new(VerifyConfig::ci());
        let report = runner.run_with_input(&[0; 32]).unwrap();
        assert!(report.metrics.is_exact());
    }
}
