use oorandom::Rand64;


/// The greatest maximum level any jumplist may be configured with.
///
/// This bounds the size of every node's tower, the head sentinel's link array, and the
/// per-list probability table.
pub(crate) const MAX_LEVEL_LIMIT: usize = 64;


/// A simple PRNG trait, used for generating random heights for nodes in a jumplist.
pub(crate) trait Prng64 {
    /// Produces a random `f64` in the half-open range `[0, 1)`.
    ///
    /// (See [`oorandom::Rand64::rand_float`]; this function is the same interface.)
    #[must_use]
    fn rand_float(&mut self) -> f64;
}

impl Prng64 for Rand64 {
    #[inline]
    fn rand_float(&mut self) -> f64 {
        // Inherent impls take priority over traits, so this is the inherent method
        // of `Rand64` a.k.a. `Self`
        Self::rand_float(self)
    }
}

/// Per-level inclusion probabilities for one jumplist: entry `level` is the probability
/// that a freshly sampled tower reaches above `level`.
///
/// The table is `ratio.powi(level)` at each `level`, so entry `0` is `1.0` and the entries
/// strictly decrease. It is computed once at construction so that sampling a height never
/// has to exponentiate.
#[derive(Debug, Clone)]
pub(crate) struct ProbabilityTable {
    levels: Box<[f64]>,
}

impl ProbabilityTable {
    /// Callers must have validated `max_level` and `ratio`; see `JumplistOptions`.
    #[must_use]
    pub(crate) fn new(max_level: usize, ratio: f64) -> Self {
        debug_assert!(
            1 <= max_level && max_level <= MAX_LEVEL_LIMIT,
            "crate should not build a table for an unvalidated max level",
        );
        debug_assert!(
            0.0 < ratio && ratio < 1.0,
            "crate should not build a table for an unvalidated ratio",
        );

        let mut levels = Vec::with_capacity(max_level);
        let mut inclusion_probability = 1.0;

        for _ in 0..max_level {
            levels.push(inclusion_probability);
            inclusion_probability *= ratio;
        }

        Self { levels: levels.into_boxed_slice() }
    }

    /// The number of levels this table was built for; towers sampled from it span
    /// `1..=max_level()` levels.
    #[inline]
    #[must_use]
    pub(crate) fn max_level(&self) -> usize {
        self.levels.len()
    }

    /// # Panics
    /// Panics if `level` is greater than or equal to [`max_level`](Self::max_level).
    #[inline]
    #[must_use]
    fn inclusion_probability(&self, level: usize) -> f64 {
        #[expect(clippy::indexing_slicing, reason = "callers keep `level` below `max_level`")]
        self.levels[level]
    }
}

/// Return a random value in `1..=table.max_level()`, in a geometric distribution (higher
/// values are exponentially less likely).
///
/// A single uniform draw is compared against the precomputed table: `P(height >= k)` is
/// `ratio^(k - 1)`, for an expected height of `1 / (1 - ratio)`. With the default ratio of
/// `1/e` and maximum level of 18, one node per approximately 24 million entries reaches the
/// maximum height, and the expected height is about `1.58`.
///
/// Technically, `table.max_level()` is slightly more likely than it would be in an exact
/// and unbounded geometric distribution, since what would be higher values are capped to it.
pub(crate) fn random_node_height<P: Prng64>(prng: &mut P, table: &ProbabilityTable) -> usize {
    let draw = prng.rand_float();

    let mut height = 1;
    while height < table.max_level() && draw < table.inclusion_probability(height) {
        height += 1;
    }
    height
}


#[cfg(test)]
mod tests {
    use std::f64::consts::E;

    use oorandom::Rand64;

    use super::{random_node_height, ProbabilityTable};


    #[test]
    fn table_starts_at_one_and_strictly_decreases() {
        let table = ProbabilityTable::new(18, 1.0 / E);

        assert_eq!(table.max_level(), 18);
        assert_eq!(table.inclusion_probability(0), 1.0);

        for level in 1..table.max_level() {
            assert!(table.inclusion_probability(level) < table.inclusion_probability(level - 1));
        }
    }

    #[test]
    fn heights_stay_in_bounds() {
        let table = ProbabilityTable::new(4, 0.99);
        let mut prng = Rand64::new(3);

        for _ in 0..1024 {
            let height = random_node_height(&mut prng, &table);
            assert!(1 <= height && height <= 4);
        }
    }

    #[test]
    fn degenerate_table_always_samples_one() {
        let table = ProbabilityTable::new(1, 1.0 / E);
        let mut prng = Rand64::new(4);

        for _ in 0..256 {
            assert_eq!(random_node_height(&mut prng, &table), 1);
        }
    }

    /// Statistical, not exact: with ratio `1/e` the mean height should land near
    /// `1 / (1 - 1/e) ≈ 1.582`, and the observed maximum should stay well short of the cap.
    /// The prng is seeded, so the observed values are stable.
    #[test]
    fn height_distribution_sanity() {
        const SAMPLES: usize = 50_000;

        let table = ProbabilityTable::new(18, 1.0 / E);
        let mut prng = Rand64::new(0x_1234_5678);

        let mut total = 0_usize;
        let mut tallest = 0_usize;

        for _ in 0..SAMPLES {
            let height = random_node_height(&mut prng, &table);
            assert!(1 <= height && height <= 18);
            total += height;
            tallest = tallest.max(height);
        }

        let mean = (total as f64) / (SAMPLES as f64);
        assert!(1.5 < mean && mean < 1.67, "mean sampled height was {mean}");
        assert!(tallest < 15, "tallest sampled height was {tallest}");
    }
}
