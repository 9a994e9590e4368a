//! Looped SOS IIR filter
//!
//! Assembles the sequencer, history tables, datapath and output stage into
//! one synchronous circuit. [`LoopedSosIir::tick`] evaluates one clock
//! cycle: the datapath works on the section the sequencer addresses, then
//! every register commits at once.
//!
//! Timing of one pass with N sections (cycle 0 carries the start pulse):
//!
//! | cycle   | activity                                                  |
//! |---------|-----------------------------------------------------------|
//! | 0       | accumulator <- input << (C-1)                             |
//! | 1..=N   | section `cycle-1` computed, accumulator <- its output     |
//! | 2..=N+1 | history of section `cycle-2` written back                 |
//! | N       | result register <- last section output                    |
//! | N+1     | output register <- rescaled result                        |
//! | N+2     | output sample and validity observed                       |
//!
//! The next start may be asserted from cycle N on, overlapping the last
//! section; with a single section the write-back needs one more cycle. There
//! is no busy signal: a start during cycles 1..N restarts the walk and
//! corrupts the pass in flight.

use log::{debug, trace, warn};
use sos_core::{Coefficients, FilterConfig, Fx, SosResult};

use crate::datapath;
use crate::output::OutputStage;
use crate::sequencer::Sequencer;
use crate::state::SectionStateStore;
use crate::{Processor, SampleFilter};

/// Input ports for one clock cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleInput {
    /// Synchronous reset
    pub reset: bool,
    /// Start of a new sample, one cycle wide
    pub start: bool,
    /// Input sample, sampled only with `start`
    pub sample: i32,
}

impl CycleInput {
    /// No reset, no start
    pub const fn idle() -> Self {
        Self {
            reset: false,
            start: false,
            sample: 0,
        }
    }

    /// Start pulse carrying `sample`
    pub const fn start(sample: i32) -> Self {
        Self {
            reset: false,
            start: true,
            sample,
        }
    }

    /// Synchronous reset
    pub const fn reset() -> Self {
        Self {
            reset: true,
            start: false,
            sample: 0,
        }
    }
}

/// Output ports as observed during one clock cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleOutput {
    /// Output sample, meaningful only with `valid`
    pub sample: i32,
    /// One-cycle validity pulse
    pub valid: bool,
}

/// Fixed-point SOS cascade sharing one arithmetic unit across all sections
#[derive(Debug, Clone)]
pub struct LoopedSosIir {
    config: FilterConfig,
    coeffs: Coefficients,
    sequencer: Sequencer,
    state: SectionStateStore,
    /// In-flight accumulator (fractional domain)
    acc: Fx,
    /// Feedback result awaiting write-back at the delayed index
    pending: Fx,
    /// Last section output, held for the output stage
    result: Fx,
    output: OutputStage,
    cycle: u64,
}

impl LoopedSosIir {
    /// Build a filter. Structural problems in `config` or `coeffs` are
    /// rejected; coefficient values are trusted.
    pub fn new(config: FilterConfig, coeffs: Coefficients) -> SosResult<Self> {
        config.validate()?;
        coeffs.validate(&config)?;

        debug!(
            "looped SOS IIR: {}, {} sections, state {} bits, accumulator {} bits",
            config,
            config.sections(),
            config.state_width(),
            config.accumulator_width()
        );

        Ok(Self {
            sequencer: Sequencer::new(config.sections()),
            state: SectionStateStore::new(config.sections(), config.state_width()),
            acc: Fx::zero(config.accumulator_width()),
            pending: Fx::zero(config.state_width()),
            result: Fx::zero(config.accumulator_width()),
            output: OutputStage::new(),
            cycle: 0,
            config,
            coeffs,
        })
    }

    #[inline]
    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    #[inline]
    pub fn coefficients(&self) -> &Coefficients {
        &self.coeffs
    }

    #[inline]
    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    #[inline]
    pub fn state(&self) -> &SectionStateStore {
        &self.state
    }

    /// Clock cycles elapsed since construction
    #[inline]
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Cycles from a start pulse to its validity pulse
    #[inline]
    pub fn pass_latency(&self) -> usize {
        self.config.sections() + 2
    }

    /// Minimum distance in cycles between two start pulses
    #[inline]
    pub fn min_start_spacing(&self) -> usize {
        self.config.sections().max(2)
    }

    /// Evaluate one clock cycle.
    ///
    /// Returns the output ports as observed during this cycle, i.e. before
    /// the clock edge commits the new register values.
    pub fn tick(&mut self, input: CycleInput) -> CycleOutput {
        let observed = CycleOutput {
            sample: self.output.sample(),
            valid: self.output.valid(),
        };
        self.cycle += 1;

        if input.reset {
            self.sequencer.reset();
            self.output.reset();
            self.acc = Fx::zero(self.config.accumulator_width());
            self.pending = Fx::zero(self.config.state_width());
            self.result = Fx::zero(self.config.accumulator_width());
            return observed;
        }

        let now = self.sequencer.signals();

        // Combinational datapath for the addressed section
        let history = self.state.read(now.index);
        let fb = datapath::feedback(
            self.acc,
            history,
            self.coeffs.denominator(now.index),
            &self.config,
        );
        let ff = datapath::feedforward(
            fb,
            history,
            self.coeffs.numerator(now.index, self.config.filter_type),
            &self.config,
        );

        // Clock edge
        if now.write_enable {
            self.state.write(now.write_index, self.pending);
        }
        self.pending = fb;
        self.output.clock(now.last_delayed, self.result, &self.config);
        if now.last {
            self.result = ff;
        }

        if input.start {
            if now.active && !(now.last && self.config.sections() > 1) {
                warn!(
                    "start at cycle {} overlaps the pass at section {}",
                    self.cycle, now.index
                );
            }
            self.acc = datapath::inject(input.sample, &self.config);
        } else if now.active {
            self.acc = ff;
        }

        if now.last {
            trace!("pass complete at cycle {}", self.cycle);
        }
        self.sequencer.clock(input.start);

        observed
    }

    /// Clock the filter through a sequence of cycle inputs
    pub fn run<I>(&mut self, inputs: I) -> Vec<CycleOutput>
    where
        I: IntoIterator<Item = CycleInput>,
    {
        inputs.into_iter().map(|input| self.tick(input)).collect()
    }
}

impl Processor for LoopedSosIir {
    /// Reset the registers and zero the history tables
    fn reset(&mut self) {
        self.tick(CycleInput::reset());
        self.state.clear();
    }

    fn latency(&self) -> usize {
        self.pass_latency()
    }
}

impl SampleFilter for LoopedSosIir {
    /// Run one complete pass: start, then idle until the validity pulse
    fn process_sample(&mut self, input: i32) -> i32 {
        let mut output = self.tick(CycleInput::start(input));
        for _ in 0..self.pass_latency() {
            output = self.tick(CycleInput::idle());
            if output.valid {
                break;
            }
        }
        debug_assert!(output.valid, "no validity pulse within the pass latency");
        output.sample
    }
}
