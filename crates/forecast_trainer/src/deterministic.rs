//! Seeded randomness and split ordering
//!
//! Fold assignment draws from [`LcgRng`]; the generator is the classic
//! glibc `rand()` recurrence so a seed maps to the same folds everywhere.

/// 31-bit linear congruential generator
#[derive(Clone, Debug)]
pub struct LcgRng {
    state: i64,
}

impl LcgRng {
    const A: i64 = 1_103_515_245;
    const C: i64 = 12_345;
    const MASK: i64 = (1 << 31) - 1;

    pub fn new(seed: i64) -> Self {
        Self {
            state: seed.wrapping_abs() & Self::MASK,
        }
    }

    /// Next value in `0..2^31`
    pub fn next_i64(&mut self) -> i64 {
        self.state = self.state.wrapping_mul(Self::A).wrapping_add(Self::C);
        self.state & Self::MASK
    }

    /// Next value in `0..bound`; always 0 when `bound` is 0
    pub fn next_range(&mut self, bound: usize) -> usize {
        match bound {
            0 => 0,
            n => (self.next_i64() as u64 % n as u64) as usize,
        }
    }

    /// Fisher-Yates shuffle of `0..n`
    pub fn permutation(&mut self, n: usize) -> Vec<usize> {
        let mut order: Vec<usize> = (0..n).collect();
        for i in (1..n).rev() {
            let j = self.next_range(i + 1);
            order.swap(i, j);
        }
        order
    }
}

/// Ordering among equal-gain splits: lower feature, then lower bin, then
/// lower node id wins
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SplitTieBreaker {
    pub feature_idx: usize,
    pub bin: usize,
    pub node_id: usize,
}

impl SplitTieBreaker {
    pub fn new(feature_idx: usize, bin: usize, node_id: usize) -> Self {
        Self {
            feature_idx,
            bin,
            node_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_stream() {
        let a: Vec<i64> = {
            let mut rng = LcgRng::new(7);
            (0..64).map(|_| rng.next_i64()).collect()
        };
        let b: Vec<i64> = {
            let mut rng = LcgRng::new(7);
            (0..64).map(|_| rng.next_i64()).collect()
        };
        assert_eq!(a, b);
        assert!(a.iter().all(|&v| (0..1 << 31).contains(&v)));
    }

    #[test]
    fn test_first_draw_matches_recurrence() {
        let mut rng = LcgRng::new(1);
        assert_eq!(rng.next_i64(), (1_103_515_245 + 12_345) & ((1 << 31) - 1));
    }

    #[test]
    fn test_bounded_draws() {
        let mut rng = LcgRng::new(3);
        assert!((0..200).all(|_| rng.next_range(6) < 6));
        assert_eq!(rng.next_range(0), 0);
        assert!(LcgRng::new(i64::MIN).next_i64() >= 0);
    }

    #[test]
    fn test_permutation_covers_every_row() {
        let first = LcgRng::new(1).permutation(50);
        assert_eq!(first, LcgRng::new(1).permutation(50));
        assert_ne!(first, LcgRng::new(2).permutation(50));

        let mut sorted = first;
        sorted.sort_unstable();
        assert_eq!(sorted, (0..50).collect::<Vec<_>>());
        assert!(LcgRng::new(1).permutation(0).is_empty());
    }

    #[test]
    fn test_tie_breaker_prefers_lower_feature() {
        let low_feature = SplitTieBreaker::new(0, 9, 4);
        let high_feature = SplitTieBreaker::new(1, 0, 0);
        let later_node = SplitTieBreaker::new(0, 9, 5);

        assert!(low_feature < high_feature);
        assert!(low_feature < later_node);
    }
}
