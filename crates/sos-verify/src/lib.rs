//! # sos-verify
//!
//! Verification harness for the looped SOS IIR model.
//!
//! ## Features
//!
//! - **Reference**: double-precision Transposed Direct Form II cascade
//! - **Quantizer**: float Butterworth design to a fixed-point coefficient bank
//! - **Stimulus**: seeded random, sine, impulse and step generators
//! - **Testbench**: drives the cycle model with a fixed start pacing
//! - **Scoring**: NMSE and peak error against the rounded reference
//!
//! ## Example
//!
//! ```rust,ignore
//! use sos_verify::{VerifyConfig, VerifyRunner};
//!
//! let report = VerifyRunner::new(VerifyConfig::ci()).run()?;
//! println!("{}", report.summary());
//! assert!(report.passed);
//! ```

pub mod config;
pub mod metrics;
pub mod quantize;
pub mod reference;
pub mod report;
pub mod runner;
pub mod stimulus;
pub mod testbench;

pub use config::VerifyConfig;
pub use metrics::{ErrorAccumulator, ErrorMetrics};
pub use quantize::quantize;
pub use reference::{BiquadCoeffs, BiquadTDF2, ReferenceCascade, ReferenceFilter};
pub use report::{ReportFormat, VerifyCheck, VerifyReport};
pub use runner::VerifyRunner;
pub use stimulus::{Stimulus, StimulusGenerator};
pub use testbench::{Capture, Testbench};

use sos_core::SosError;
use thiserror::Error;

/// Errors raised by the verification harness
#[derive(Error, Debug)]
pub enum VerifyError {
    #[error(transparent)]
    Filter(#[from] SosError),

    #[error("Pacing too tight: {clocks_per_sample} clocks per sample, a pass needs at least {minimum}")]
    PacingTooTight {
        clocks_per_sample: usize,
        minimum: usize,
    },

    #[error("Missing outputs: expected {expected}, received {received}")]
    MissingOutputs { expected: usize, received: usize },

    #[error("Validity pulse at cycle {0} without a pass in flight")]
    UnexpectedValid(usize),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, VerifyError>;

/// Run one verification with default settings
pub fn quick_verify() -> Result<VerifyReport> {
    VerifyRunner::new(VerifyConfig::default()).run()
}
