//! sos-core: Shared types for the looped SOS IIR model
//!
//! This crate provides the foundational types used by the filter model and
//! the verification harness:
//! - explicit-width fixed-point values and the saturating cast
//! - filter configuration (type, order, bit widths)
//! - the coefficient bank
//! - the common error type

mod coeffs;
mod config;
mod error;
mod fixed;

pub use coeffs::*;
pub use config::*;
pub use error::*;
pub use fixed::*;
