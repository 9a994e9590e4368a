//! sos-iir: Looped second-order-section IIR filter
//!
//! Cycle-accurate model of a fixed-point IIR cascade whose sections share a
//! single feedback/feedforward arithmetic unit. One clock cycle processes one
//! section; each section's two-sample history lives in a pair of tables
//! addressed by the sequencer.
//!
//! ## Modules
//! - `sequencer` - section index walker, write enable, last-section flags
//! - `state` - per-section history tables
//! - `datapath` - accumulator injection, feedback and feedforward arithmetic
//! - `output` - output latch and validity pulse
//! - `filter` - the assembled filter, clocked one cycle at a time

pub mod datapath;
pub mod filter;
pub mod output;
pub mod sequencer;
pub mod state;

pub use filter::{CycleInput, CycleOutput, LoopedSosIir};

/// Trait for all sample filters
pub trait Processor: Send {
    /// Reset filter state
    fn reset(&mut self);

    /// Get latency in clock cycles
    fn latency(&self) -> usize {
        0
    }
}

/// Integer sample-in, sample-out filter
pub trait SampleFilter: Processor {
    /// Process a single sample
    fn process_sample(&mut self, input: i32) -> i32;

    /// Process a block of samples
    fn process_block(&mut self, input: &[i32], output: &mut [i32]) {
        debug_assert_eq!(input.len(), output.len());
        for (x, y) in input.iter().zip(output.iter_mut()) {
            *y = self.process_sample(*x);
        }
    }
}
