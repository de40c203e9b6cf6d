use alloc::vec::Vec;

use crate::fenwick::{Fenwick, lower_bound_blended};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HeightMode {
    /// One constant for every index.
    Fixed(u32),
    /// Per-index measurements, with the running average standing in for unmeasured indexes.
    Dynamic,
}

/// What a measurement did to the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MeasureOutcome {
    /// The stored height did not change.
    Unchanged,
    /// Offsets moved, but not enough to warrant an extra layout pass.
    Updated,
    /// The height deviated beyond the threshold; one re-layout pass is advisable.
    Relayout,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Entry {
    Estimated,
    Measured {
        height: u32,
        /// Consecutive re-measurements that deviated beyond the threshold.
        strikes: u8,
    },
}

/// Per-index heights and the offsets derived from them.
///
/// Offsets are computed as `measured_prefix(i) + unmeasured_before(i) * average`, backed by two
/// Fenwick trees, so both measuring an item and moving the average are cheap and every measured
/// item contributes exactly its recorded height.
#[derive(Clone, Debug)]
pub struct HeightRegistry {
    mode: HeightMode,
    count: usize,
    initial_estimate: u32,
    average: u32,
    threshold: f32,
    entries: Vec<Entry>,
    sums: Fenwick,
    flags: Fenwick,
    measured_count: usize,
}

impl HeightRegistry {
    pub fn fixed(count: usize, item_height: u32) -> Self {
        assert!(item_height > 0, "fixed item height must be positive");
        Self {
            mode: HeightMode::Fixed(item_height),
            count,
            initial_estimate: item_height,
            average: item_height,
            threshold: 0.0,
            entries: Vec::new(),
            sums: Fenwick::new(0),
            flags: Fenwick::new(0),
            measured_count: 0,
        }
    }

    /// A dynamic registry where unmeasured items start at `estimate`.
    ///
    /// `threshold` is the relative deviation that turns a measurement into
    /// [`MeasureOutcome::Relayout`].
    pub fn dynamic(count: usize, estimate: u32, threshold: f32) -> Self {
        let mut registry = Self {
            mode: HeightMode::Dynamic,
            count: 0,
            initial_estimate: estimate,
            average: estimate,
            threshold,
            entries: Vec::new(),
            sums: Fenwick::new(0),
            flags: Fenwick::new(0),
            measured_count: 0,
        };
        registry.reset(count);
        registry
    }

    pub fn mode(&self) -> HeightMode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Current estimate for unmeasured items.
    pub fn average(&self) -> u32 {
        self.average
    }

    pub fn measured_count(&self) -> usize {
        self.measured_count
    }

    /// Drops every measurement and resizes to `count` items.
    pub fn reset(&mut self, count: usize) {
        self.count = count;
        self.measured_count = 0;
        self.average = self.initial_estimate;
        if let HeightMode::Dynamic = self.mode {
            self.entries.clear();
            self.entries.resize(count, Entry::Estimated);
            self.sums = Fenwick::new(count);
            self.flags = Fenwick::new(count);
        }
    }

    /// Height of `index`: the measurement if present, else the estimate.
    ///
    /// # Panics
    /// Panics if `index >= len()`.
    pub fn height(&self, index: usize) -> u32 {
        self.check_index(index);
        match self.mode {
            HeightMode::Fixed(h) => h,
            HeightMode::Dynamic => match self.entries[index] {
                Entry::Measured { height, .. } => height,
                Entry::Estimated => self.average,
            },
        }
    }

    pub fn measured_height(&self, index: usize) -> Option<u32> {
        match self.entries.get(index) {
            Some(Entry::Measured { height, .. }) => Some(*height),
            _ => None,
        }
    }

    pub fn is_measured(&self, index: usize) -> bool {
        self.measured_height(index).is_some()
    }

    /// Sum of the heights of all items before `index`. `offset(len())` is the total height.
    ///
    /// # Panics
    /// Panics if `index > len()`.
    pub fn offset(&self, index: usize) -> u64 {
        assert!(
            index <= self.count,
            "offset index out of bounds (index={index}, count={})",
            self.count
        );
        match self.mode {
            HeightMode::Fixed(h) => index as u64 * h as u64,
            HeightMode::Dynamic => {
                let measured = self.flags.prefix_sum(index);
                let unmeasured = index as u64 - measured;
                self.sums
                    .prefix_sum(index)
                    .saturating_add(unmeasured.saturating_mul(self.average as u64))
            }
        }
    }

    pub fn total_height(&self) -> u64 {
        self.offset(self.count)
    }

    /// The index whose extent contains `offset`, clamped to the last index.
    ///
    /// Returns `None` for an empty sequence.
    pub fn index_at_offset(&self, offset: u64) -> Option<usize> {
        if self.count == 0 {
            return None;
        }
        let consumed = match self.mode {
            HeightMode::Fixed(h) => usize::try_from(offset / h as u64).unwrap_or(usize::MAX),
            HeightMode::Dynamic => {
                lower_bound_blended(&self.sums, &self.flags, self.average as u64, offset)
            }
        };
        Some(consumed.min(self.count - 1))
    }

    /// Stores a measured height for `index`.
    ///
    /// The first measurement of an estimated item requests a re-layout as soon as it deviates
    /// beyond the threshold. Later re-measurements need two consecutive deviations before they
    /// do, so a height that flickers around the threshold cannot keep re-triggering layout.
    ///
    /// Fixed-mode registries ignore measurements.
    ///
    /// # Panics
    /// Panics if `index >= len()`.
    pub fn record_measurement(&mut self, index: usize, height: u32) -> MeasureOutcome {
        self.check_index(index);
        if let HeightMode::Fixed(_) = self.mode {
            return MeasureOutcome::Unchanged;
        }

        let outcome = match self.entries[index] {
            Entry::Estimated => {
                let prev = self.average;
                self.entries[index] = Entry::Measured { height, strikes: 0 };
                self.flags.add(index, 1);
                self.sums.add(index, height as i64);
                self.measured_count += 1;
                if self.deviates(prev, height) {
                    MeasureOutcome::Relayout
                } else if prev != height {
                    MeasureOutcome::Updated
                } else {
                    MeasureOutcome::Unchanged
                }
            }
            Entry::Measured {
                height: prev,
                strikes,
            } => {
                if prev != height {
                    self.sums.add(index, height as i64 - prev as i64);
                }
                let (strikes, outcome) = if self.deviates(prev, height) {
                    if strikes >= 1 {
                        (0, MeasureOutcome::Relayout)
                    } else {
                        (1, MeasureOutcome::Updated)
                    }
                } else if prev != height {
                    (0, MeasureOutcome::Updated)
                } else {
                    (0, MeasureOutcome::Unchanged)
                };
                self.entries[index] = Entry::Measured { height, strikes };
                outcome
            }
        };

        self.recompute_average();
        wtrace!(index, height, average = self.average, "record_measurement");
        outcome
    }

    /// Recomputes the estimate as the rounded mean of measured heights only.
    pub fn recompute_average(&mut self) {
        if self.measured_count == 0 {
            self.average = self.initial_estimate;
            return;
        }
        let n = self.measured_count as u64;
        let mean = (self.sums.total() + n / 2) / n;
        self.average = u32::try_from(mean).unwrap_or(u32::MAX).max(1);
    }

    fn deviates(&self, prev: u32, next: u32) -> bool {
        let diff = prev.abs_diff(next);
        if diff == 0 {
            return false;
        }
        if prev == 0 {
            return true;
        }
        diff as f32 > prev as f32 * self.threshold
    }

    fn check_index(&self, index: usize) {
        assert!(
            index < self.count,
            "height index out of bounds (index={index}, count={})",
            self.count
        );
    }
}
