//! Per-section history tables
//!
//! Two tables indexed by section number hold each section's one-sample
//! (`history1`) and two-sample (`history2`) delay registers. This is the
//! only state that survives from one sample to the next.

use sos_core::Fx;

/// History pair of one section as seen by the datapath
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionHistory {
    pub history1: Fx,
    pub history2: Fx,
}

/// History tables for all sections
#[derive(Debug, Clone)]
pub struct SectionStateStore {
    history1: Vec<i128>,
    history2: Vec<i128>,
    width: u32,
}

impl SectionStateStore {
    /// Zeroed tables for `sections` sections of `width`-bit entries
    pub fn new(sections: usize, width: u32) -> Self {
        Self {
            history1: vec![0; sections],
            history2: vec![0; sections],
            width,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.history1.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.history1.is_empty()
    }

    /// Entry width in bits
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Combinational read
    #[inline]
    pub fn read(&self, section: usize) -> SectionHistory {
        SectionHistory {
            history1: Fx::new(self.history1[section], self.width),
            history2: Fx::new(self.history2[section], self.width),
        }
    }

    /// Registered write: `value` becomes history1, the old history1 moves
    /// to history2.
    #[inline]
    pub fn write(&mut self, section: usize, value: Fx) {
        debug_assert!(value.width() <= self.width);
        self.history2[section] = self.history1[section];
        self.history1[section] = value.value();
    }

    /// Zero every entry
    pub fn clear(&mut self) {
        self.history1.fill(0);
        self.history2.fill(0);
    }

    /// Snapshot of `(history1, history2)` per section
    pub fn snapshot(&self) -> Vec<(i128, i128)> {
        self.history1
            .iter()
            .copied()
            .zip(self.history2.iter().copied())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_shifts_history() {
        let mut store = SectionStateStore::new(3, 20);
        store.write(1, Fx::new(5, 20));
        store.write(1, Fx::new(-7, 20));

        let h = store.read(1);
        assert_eq!(h.history1.value(), -7);
        assert_eq!(h.history2.value(), 5);
        assert_eq!(h.history1.width(), 20);

        // Other sections untouched
        assert_eq!(store.read(0).history1.value(), 0);
        assert_eq!(store.read(2).history2.value(), 0);
    }

    #[test]
    fn test_clear() {
        let mut store = SectionStateStore::new(2, 16);
        store.write(0, Fx::new(100, 16));
        store.write(0, Fx::new(200, 16));
        store.clear();
        assert_eq!(store.snapshot(), vec![(0, 0), (0, 0)]);
    }
}
