//! Error types for the looped SOS model

use thiserror::Error;

/// Core error type
///
/// Only structural configuration problems are reported. Coefficient value
/// ranges (pole placement) are a caller contract and never checked here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SosError {
    #[error("Invalid filter order: {0} (must be even and at least 2)")]
    InvalidOrder(u32),

    #[error("Invalid {name} width: {value} bits (supported {min}..={max})")]
    InvalidWidth {
        name: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },

    #[error("Datapath too wide: {0} bits does not fit the 128-bit accumulator")]
    DatapathTooWide(u32),

    #[error("Section count mismatch: configuration has {expected}, coefficients have {actual}")]
    SectionCountMismatch { expected: usize, actual: usize },

    #[error("Shaping section {index} out of range for {sections} sections")]
    ShapingSectionOutOfRange { index: usize, sections: usize },

    #[error("Coefficient {name} = {value} does not fit in {width} bits")]
    CoefficientOverflow {
        name: String,
        value: i32,
        width: u32,
    },

    #[error("Unknown filter type: {0}")]
    UnknownFilterType(String),
}

/// Result type alias
pub type SosResult<T> = Result<T, SosError>;
