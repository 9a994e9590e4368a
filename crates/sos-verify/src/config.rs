//! Configuration for verification runs

use serde::{Deserialize, Serialize};
use sos_core::FilterConfig;

use crate::stimulus::Stimulus;
use crate::testbench::Testbench;
use crate::{Result, VerifyError};

/// Configuration for one verification run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifyConfig {
    /// Filter under test
    pub filter: FilterConfig,

    /// Sample rate used for the design and the stimulus (Hz)
    pub sample_rate: f64,

    /// Cutoff as a fraction of the sample rate
    pub cutoff: f64,

    /// Section carrying the programmable numerator
    pub shaping_section: usize,

    /// Number of samples to run
    pub samples: usize,

    /// Random seed for reproducibility (None = random)
    pub seed: Option<u64>,

    /// Cycles between start pulses (None = sections + 10)
    pub clocks_per_sample: Option<usize>,

    /// Input signal
    pub stimulus: Stimulus,

    /// Maximum allowed NMSE in dB
    pub max_nmse_db: f64,

    /// Maximum allowed peak error in percent of full scale
    pub max_peak_error_percent: f64,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            filter: FilterConfig::default(),
            sample_rate: 44100.0,
            cutoff: 0.125,
            shaping_section: 0,
            samples: 100,
            seed: None,
            clocks_per_sample: None,
            stimulus: Stimulus::Random,
            max_nmse_db: -20.0,
            max_peak_error_percent: 1.0,
        }
    }
}

impl VerifyConfig {
    /// Quick, reproducible run for CI
    pub fn ci() -> Self {
        Self {
            samples: 1000,
            seed: Some(1),
            ..Default::default()
        }
    }

    /// Long run for local testing
    pub fn exhaustive() -> Self {
        Self {
            samples: 100_000,
            max_nmse_db: -40.0,
            max_peak_error_percent: 0.1,
            ..Default::default()
        }
    }

    /// Cutoff frequency in Hz
    pub fn cutoff_hz(&self) -> f64 {
        self.cutoff * self.sample_rate
    }

    /// Effective start pacing
    pub fn clocks_per_sample(&self) -> usize {
        self.clocks_per_sample
            .unwrap_or_else(|| Testbench::default_pacing(&self.filter))
    }

    pub fn validate(&self) -> Result<()> {
        self.filter.validate()?;
        if !self.sample_rate.is_finite() || self.sample_rate <= 0.0 {
            return Err(VerifyError::ConfigError(format!(
                "sample rate must be positive, got {}",
                self.sample_rate
            )));
        }
        if self.cutoff.is_nan() || self.cutoff <= 0.0 || self.cutoff >= 0.5 {
            return Err(VerifyError::ConfigError(format!(
                "cutoff must lie in (0, 0.5) of the sample rate, got {}",
                self.cutoff
            )));
        }
        if self.samples == 0 {
            return Err(VerifyError::ConfigError("no samples to run".into()));
        }
        Ok(())
    }

    /// Builder pattern: set filter
    pub fn with_filter(mut self, filter: FilterConfig) -> Self {
        self.filter = filter;
        self
    }

    /// Builder pattern: set cutoff as a fraction of the sample rate
    pub fn with_cutoff(mut self, cutoff: f64) -> Self {
        self.cutoff = cutoff;
        self
    }

    /// Builder pattern: set shaping section
    pub fn with_shaping_section(mut self, index: usize) -> Self {
        self.shaping_section = index;
        self
    }

    /// Builder pattern: set sample count
    pub fn with_samples(mut self, samples: usize) -> Self {
        self.samples = samples;
        self
    }

    /// Builder pattern: set seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builder pattern: set start pacing
    pub fn with_clocks_per_sample(mut self, clocks: usize) -> Self {
        self.clocks_per_sample = Some(clocks);
        self
    }

    /// Builder pattern: set stimulus
    pub fn with_stimulus(mut self, stimulus: Stimulus) -> Self {
        self.stimulus = stimulus;
        self
    }

    /// Builder pattern: set NMSE threshold
    pub fn with_max_nmse_db(mut self, db: f64) -> Self {
        self.max_nmse_db = db;
        self
    }
}
