//! Section sequencer
//!
//! Walks the section index `0..sections` once per start pulse. A pass takes
//! the start cycle plus one cycle per section; the cycle after the last
//! section the sequencer is idle again at index 0.
//!
//! The datapath result for a section is written back one cycle after it is
//! computed, so the sequencer also exposes the previous cycle's index and
//! activity as the write address and write enable.

/// Combinational view of the sequencer registers for the current cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SequencerSignals {
    /// Section addressed this cycle
    pub index: usize,
    /// A pass is running this cycle
    pub active: bool,
    /// This cycle processes the last section
    pub last: bool,
    /// Index addressed in the previous cycle
    pub write_index: usize,
    /// Previous cycle processed a section
    pub write_enable: bool,
    /// Previous cycle processed the last section
    pub last_delayed: bool,
}

/// Counter-driven section scheduler
#[derive(Debug, Clone)]
pub struct Sequencer {
    sections: usize,
    index: usize,
    active: bool,
    prev_index: usize,
    prev_active: bool,
    last_delayed: bool,
}

impl Sequencer {
    pub fn new(sections: usize) -> Self {
        debug_assert!(sections > 0);
        Self {
            sections,
            index: 0,
            active: false,
            prev_index: 0,
            prev_active: false,
            last_delayed: false,
        }
    }

    /// Synchronous reset: index 0, idle
    pub fn reset(&mut self) {
        self.index = 0;
        self.active = false;
        self.prev_index = 0;
        self.prev_active = false;
        self.last_delayed = false;
    }

    #[inline]
    pub fn sections(&self) -> usize {
        self.sections
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn signals(&self) -> SequencerSignals {
        SequencerSignals {
            index: self.index,
            active: self.active,
            last: self.active && self.index == self.sections - 1,
            write_index: self.prev_index,
            write_enable: self.prev_active,
            last_delayed: self.last_delayed,
        }
    }

    /// Clock edge
    ///
    /// A start restarts the walk at index 0 even mid-pass; callers must not
    /// assert it while [`is_active`](Self::is_active).
    pub fn clock(&mut self, start: bool) {
        let now = self.signals();
        self.prev_index = now.index;
        self.prev_active = now.active;
        self.last_delayed = now.last;

        if start {
            self.active = true;
            self.index = 0;
        } else if now.last {
            self.active = false;
            self.index = 0;
        } else if now.active {
            self.index += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_holds_index() {
        let mut seq = Sequencer::new(3);
        for _ in 0..5 {
            seq.clock(false);
            assert!(!seq.is_active());
            assert_eq!(seq.index(), 0);
        }
    }

    #[test]
    fn test_walks_sections_once() {
        let mut seq = Sequencer::new(3);
        seq.clock(true);

        let mut seen = Vec::new();
        while seq.is_active() {
            let s = seq.signals();
            seen.push((s.index, s.last));
            seq.clock(false);
        }
        assert_eq!(seen, vec![(0, false), (1, false), (2, true)]);

        // The cycle after the last section
        let s = seq.signals();
        assert!(!s.active);
        assert_eq!(s.index, 0);
        assert!(s.last_delayed);
        assert!(s.write_enable);
        assert_eq!(s.write_index, 2);

        seq.clock(false);
        let s = seq.signals();
        assert!(!s.last_delayed);
        assert!(!s.write_enable);
    }

    #[test]
    fn test_single_section_pass() {
        let mut seq = Sequencer::new(1);
        seq.clock(true);
        let s = seq.signals();
        assert!(s.active && s.last);
        seq.clock(false);
        assert!(!seq.is_active());
        assert!(seq.signals().last_delayed);
    }

    #[test]
    fn test_write_address_lags_index() {
        let mut seq = Sequencer::new(4);
        seq.clock(true);
        for expected in 0..4 {
            seq.clock(false);
            let s = seq.signals();
            assert_eq!(s.write_index, expected);
            assert!(s.write_enable);
        }
    }

    #[test]
    fn test_reset() {
        let mut seq = Sequencer::new(4);
        seq.clock(true);
        seq.clock(false);
        seq.reset();
        assert_eq!(seq.signals(), SequencerSignals::default());
    }
}
