use alloc::vec::Vec;
use core::cmp;

/// Binary indexed tree over per-index `u64` values.
///
/// The height registry keeps two of these side by side: one over measured heights (zero for
/// unmeasured slots) and one over "is measured" flags. Together with the running average this
/// yields any prefix offset in `O(log n)` without touching unmeasured entries when the average
/// moves.
#[derive(Clone, Debug)]
pub(crate) struct Fenwick {
    tree: Vec<u64>, // 1-indexed
    total: u64,
    max_bit: usize,
}

impl Fenwick {
    pub(crate) fn new(n: usize) -> Self {
        Self {
            tree: alloc::vec![0; n + 1],
            total: 0,
            max_bit: highest_power_of_two_leq(n),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.tree.len().saturating_sub(1)
    }

    pub(crate) fn add(&mut self, index: usize, delta: i64) {
        let n = self.len();
        assert!(index < n, "Fenwick index out of bounds (idx={index}, len={n})");
        if delta > 0 {
            self.total = self.total.saturating_add(delta as u64);
        } else if delta < 0 {
            self.total = self.total.saturating_sub(delta.unsigned_abs());
        }
        let mut i = index + 1;
        while i <= n {
            let cur = self.tree[i] as i128;
            let next = cur + delta as i128;
            debug_assert!(
                next >= 0,
                "Fenwick underflow (idx={i}, cur={cur}, delta={delta})"
            );
            self.tree[i] = next.clamp(0, u64::MAX as i128) as u64;
            i += lsb(i);
        }
    }

    /// Sum of the first `count` values.
    pub(crate) fn prefix_sum(&self, count: usize) -> u64 {
        let mut i = cmp::min(count, self.len());
        let mut sum = 0u64;
        while i > 0 {
            sum = sum.saturating_add(self.tree[i]);
            i &= i - 1;
        }
        sum
    }

    pub(crate) fn total(&self) -> u64 {
        self.total
    }
}

/// Returns the number of leading items whose combined height is `<= target`.
///
/// Item `i` weighs `sums[i]` when measured and `estimate` otherwise (`flags[i]` is 1 for
/// measured items). Both trees must have the same length. Because both share the same node
/// layout, one descent visits each level once and the whole lookup stays `O(log n)`.
pub(crate) fn lower_bound_blended(
    sums: &Fenwick,
    flags: &Fenwick,
    estimate: u64,
    mut target: u64,
) -> usize {
    let n = sums.len();
    debug_assert_eq!(n, flags.len(), "paired Fenwick trees must match in length");
    let mut idx = 0usize;
    let mut bit = sums.max_bit;
    while bit != 0 {
        let next = idx + bit;
        if next <= n {
            // During the descent `next` always covers exactly `bit` items.
            let unmeasured = (bit as u64).saturating_sub(flags.tree[next]);
            let block = sums.tree[next].saturating_add(unmeasured.saturating_mul(estimate));
            if block <= target {
                target -= block;
                idx = next;
            }
        }
        bit >>= 1;
    }
    idx
}

fn lsb(i: usize) -> usize {
    i & i.wrapping_neg()
}

fn highest_power_of_two_leq(n: usize) -> usize {
    if n == 0 {
        return 0;
    }
    let mut p = 1usize;
    while p <= n / 2 {
        p <<= 1;
    }
    p
}
