//! Cycle-level testbench
//!
//! Drives a [`LoopedSosIir`] the way a surrounding design would: one start
//! pulse every `clocks_per_sample` cycles, collecting each output on its
//! validity pulse together with the observed start-to-valid latency.

use std::collections::VecDeque;

use log::{debug, info};
use sos_core::FilterConfig;
use sos_iir::{CycleInput, LoopedSosIir};

use crate::{Result, VerifyError};

/// Slack added to the section count for the default pacing
pub const DEFAULT_PACING_SLACK: usize = 10;

/// Outputs and timing observed over one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capture {
    /// Output samples in validity order
    pub outputs: Vec<i32>,
    /// Start-to-valid latency per sample, in cycles
    pub latencies: Vec<usize>,
    /// Clock cycles simulated
    pub cycles: usize,
}

impl Capture {
    pub fn min_latency(&self) -> Option<usize> {
        self.latencies.iter().copied().min()
    }

    pub fn max_latency(&self) -> Option<usize> {
        self.latencies.iter().copied().max()
    }
}

/// Paced driver around one filter instance
pub struct Testbench {
    dut: LoopedSosIir,
    clocks_per_sample: usize,
}

impl Testbench {
    /// Pacing used when none is given: sections plus a fixed slack
    pub fn default_pacing(config: &FilterConfig) -> usize {
        config.sections() + DEFAULT_PACING_SLACK
    }

    /// Wrap `dut`, rejecting a pacing shorter than one pass
    pub fn new(dut: LoopedSosIir, clocks_per_sample: usize) -> Result<Self> {
        let minimum = dut.min_start_spacing();
        if clocks_per_sample < minimum {
            return Err(VerifyError::PacingTooTight {
                clocks_per_sample,
                minimum,
            });
        }
        Ok(Self {
            dut,
            clocks_per_sample,
        })
    }

    #[inline]
    pub fn dut(&self) -> &LoopedSosIir {
        &self.dut
    }

    #[inline]
    pub fn clocks_per_sample(&self) -> usize {
        self.clocks_per_sample
    }

    /// Feed `input`, one start every `clocks_per_sample` cycles, and clock
    /// until every sample has produced its output.
    pub fn run(&mut self, input: &[i32]) -> Result<Capture> {
        let max_cycles = input.len() * self.clocks_per_sample + self.dut.pass_latency() + 1;
        let mut in_flight = VecDeque::new();
        let mut capture = Capture::default();
        let mut next = 0;

        debug!(
            "testbench: {} samples, {} clocks per sample",
            input.len(),
            self.clocks_per_sample
        );

        for cycle in 0..max_cycles {
            if capture.outputs.len() == input.len() {
                break;
            }

            let pins = if cycle % self.clocks_per_sample == 0 && next < input.len() {
                in_flight.push_back(cycle);
                next += 1;
                CycleInput::start(input[next - 1])
            } else {
                CycleInput::idle()
            };

            let observed = self.dut.tick(pins);
            capture.cycles = cycle + 1;

            if observed.valid {
                let started = in_flight
                    .pop_front()
                    .ok_or(VerifyError::UnexpectedValid(cycle))?;
                capture.latencies.push(cycle - started);
                capture.outputs.push(observed.sample);
            }
        }

        if capture.outputs.len() != input.len() {
            return Err(VerifyError::MissingOutputs {
                expected: input.len(),
                received: capture.outputs.len(),
            });
        }

        info!(
            "testbench: {} outputs in {} cycles, latency {:?}..={:?}",
            capture.outputs.len(),
            capture.cycles,
            capture.min_latency(),
            capture.max_latency()
        );
        Ok(capture)
    }
}
