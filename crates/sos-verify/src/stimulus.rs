//! Stimulus generators
//!
//! All generators produce integer samples within the data width. The
//! random generator is seeded so a failing run can be replayed.

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use sos_core::FilterConfig;

use crate::VerifyError;

/// Stimulus shape
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Stimulus {
    /// Uniform random samples in `[min/4, max/4)`
    Random,
    /// Sine at `frequency_hz`, `amplitude` as a fraction of full scale
    Sine { frequency_hz: f64, amplitude: f64 },
    /// Quarter-scale impulse followed by silence
    Impulse,
    /// Quarter-scale step
    Step,
}

impl Default for Stimulus {
    fn default() -> Self {
        Stimulus::Random
    }
}

impl fmt::Display for Stimulus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stimulus::Random => f.write_str("random"),
            Stimulus::Sine {
                frequency_hz,
                amplitude,
            } => write!(f, "sine {frequency_hz:.1} Hz @ {amplitude:.2} FS"),
            Stimulus::Impulse => f.write_str("impulse"),
            Stimulus::Step => f.write_str("step"),
        }
    }
}

impl FromStr for Stimulus {
    type Err = VerifyError;

    /// `random`, `impulse`, `step` or `sine[:<hz>[:<amplitude>]]`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(':');
        let kind = parts.next().unwrap_or_default().to_ascii_lowercase();
        let parse = |field: Option<&str>, default: f64| -> Result<f64, VerifyError> {
            match field {
                None => Ok(default),
                Some(v) => v
                    .parse()
                    .map_err(|_| VerifyError::ConfigError(format!("bad stimulus parameter '{v}'"))),
            }
        };

        match kind.as_str() {
            "random" | "noise" => Ok(Stimulus::Random),
            "impulse" => Ok(Stimulus::Impulse),
            "step" => Ok(Stimulus::Step),
            "sine" => Ok(Stimulus::Sine {
                frequency_hz: parse(parts.next(), 1000.0)?,
                amplitude: parse(parts.next(), 0.25)?,
            }),
            _ => Err(VerifyError::ConfigError(format!("unknown stimulus '{s}'"))),
        }
    }
}

/// Seeded sample generator for one filter configuration
pub struct StimulusGenerator {
    rng: ChaCha8Rng,
    sample_max: i32,
    sample_min: i32,
    sample_rate: f64,
}

impl StimulusGenerator {
    /// Create a new generator with optional seed
    pub fn new(seed: Option<u64>, config: &FilterConfig, sample_rate: f64) -> Self {
        let rng = match seed {
            Some(s) => ChaCha8Rng::seed_from_u64(s),
            None => ChaCha8Rng::from_os_rng(),
        };

        Self {
            rng,
            sample_max: config.sample_max(),
            sample_min: config.sample_min(),
            sample_rate,
        }
    }

    /// Generate `len` samples of `stimulus`
    pub fn generate(&mut self, stimulus: Stimulus, len: usize) -> Vec<i32> {
        match stimulus {
            Stimulus::Random => self.random(len),
            Stimulus::Sine {
                frequency_hz,
                amplitude,
            } => self.sine(frequency_hz, amplitude, len),
            Stimulus::Impulse => self.impulse(len),
            Stimulus::Step => vec![self.quarter_scale(); len],
        }
    }

    /// Uniform random samples in `[min/4, max/4)`, rounded toward negative
    /// infinity so the range stays non-empty at narrow widths
    pub fn random(&mut self, len: usize) -> Vec<i32> {
        let low = self.sample_min.div_euclid(4);
        let high = self.sample_max.div_euclid(4);
        (0..len).map(|_| self.rng.random_range(low..high)).collect()
    }

    /// Sine with `amplitude` relative to full scale, clamped to the data range
    pub fn sine(&self, frequency_hz: f64, amplitude: f64, len: usize) -> Vec<i32> {
        let peak = amplitude.clamp(0.0, 1.0) * self.sample_max as f64;
        (0..len)
            .map(|i| {
                let t = i as f64 / self.sample_rate;
                (peak * (2.0 * PI * frequency_hz * t).sin()).round() as i32
            })
            .collect()
    }

    pub fn impulse(&self, len: usize) -> Vec<i32> {
        let mut signal = vec![0; len];
        if let Some(first) = signal.first_mut() {
            *first = self.quarter_scale();
        }
        signal
    }

    fn quarter_scale(&self) -> i32 {
        self.sample_max / 4
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator(seed: u64) -> StimulusGenerator {
        StimulusGenerator::new(Some(seed), &FilterConfig::default(), 44100.0)
    }

    #[test]
    fn test_random_range_and_reproducibility() {
        let a = generator(7).random(5000);
        let b = generator(7).random(5000);
        assert_eq!(a, b);
        assert!(a.iter().all(|&x| (-8192..8191).contains(&x)));
        assert!(a.iter().any(|&x| x < -4000) && a.iter().any(|&x| x > 4000));
    }

    #[test]
    fn test_random_narrow_width() {
        for width in [2, 3] {
            let config = FilterConfig::default().with_data_width(width);
            let signal = StimulusGenerator::new(Some(1), &config, 44100.0).random(4);
            assert_eq!(signal, vec![-1; 4], "width {width}");
        }

        let config = FilterConfig::default().with_data_width(4);
        let signal = StimulusGenerator::new(Some(1), &config, 44100.0).random(200);
        assert!(signal.iter().all(|&x| (-2..1).contains(&x)));
    }

    #[test]
    fn test_sine_peak() {
        let signal = generator(0).sine(1000.0, 0.5, 441);
        let peak = signal.iter().map(|x| x.abs()).max().unwrap();
        assert!((16300..=16384).contains(&peak), "peak {peak}");
        assert_eq!(signal[0], 0);
    }

    #[test]
    fn test_impulse_and_step() {
        let mut g = generator(0);
        assert_eq!(g.generate(Stimulus::Impulse, 3), vec![8191, 0, 0]);
        assert_eq!(g.generate(Stimulus::Step, 3), vec![8191; 3]);
        assert!(g.generate(Stimulus::Impulse, 0).is_empty());
    }

    #[test]
    fn test_parse_stimulus() {
        assert_eq!("random".parse::<Stimulus>().unwrap(), Stimulus::Random);
        assert_eq!(
            "sine:440:0.5".parse::<Stimulus>().unwrap(),
            Stimulus::Sine {
                frequency_hz: 440.0,
                amplitude: 0.5
            }
        );
        assert_eq!(
            "sine".parse::<Stimulus>().unwrap(),
            Stimulus::Sine {
                frequency_hz: 1000.0,
                amplitude: 0.25
            }
        );
        assert!("square".parse::<Stimulus>().is_err());
        assert!("sine:fast".parse::<Stimulus>().is_err());
    }
}
