//! Auditing the distribution of generated r-values.
//!
//! A correct generator, fed uniformly distributed trace IDs, produces `r = k` with probability `2^-(k+1)` for
//! `k <= 61`, and `r = 62` with probability `2^-62`. [`RValueHistogram`] tallies generated r-values and scores them
//! against that distribution with a Pearson chi-squared goodness-of-fit test.

use crate::RValue;

const BUCKETS: usize = RValue::MAX.get() as usize + 1;

/// Returns the probability that a correct generator produces exactly `r`.
pub fn expected_probability(r: RValue) -> f64 {
    if r.is_max() {
        // Everything past 61 leading zeroes collapses into the last bucket.
        tail_probability(r)
    } else {
        0.5f64.powi(i32::from(r.get()) + 1)
    }
}

/// Returns the probability that a correct generator produces an r-value of at least `r`.
///
/// This is also the sampling probability at which a trace with r-value `r` is just barely kept.
pub fn tail_probability(r: RValue) -> f64 {
    0.5f64.powi(i32::from(r.get()))
}

/// Result of a chi-squared goodness-of-fit test.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GoodnessOfFit {
    statistic: f64,
    degrees_of_freedom: u32,
    pooled_tail_start: RValue,
}

impl GoodnessOfFit {
    /// Returns the chi-squared statistic.
    pub fn statistic(&self) -> f64 {
        self.statistic
    }

    /// Returns the number of degrees of freedom: one less than the number of buckets compared.
    pub fn degrees_of_freedom(&self) -> u32 {
        self.degrees_of_freedom
    }

    /// Returns the smallest r-value that was pooled into the tail bucket.
    ///
    /// Every r-value below this one was compared individually.
    pub fn pooled_tail_start(&self) -> RValue {
        self.pooled_tail_start
    }

    /// Returns the critical value of the chi-squared distribution for the given upper-tail standard normal quantile.
    ///
    /// Uses the Wilson-Hilferty approximation, which is accurate to within a fraction of a percent for the degrees of
    /// freedom seen here. A `z` of 3.09 corresponds to a significance level of 0.001, 3.72 to 0.0001, and so on.
    pub fn critical_value(&self, z: f64) -> f64 {
        if self.degrees_of_freedom == 0 {
            return 0.0;
        }

        let k = f64::from(self.degrees_of_freedom);
        let a = 2.0 / (9.0 * k);
        k * (1.0 - a + z * a.sqrt()).powi(3)
    }

    /// Returns `true` if at least one r-value was compared and the statistic does not exceed the critical value for `z`.
    ///
    /// A fit with zero degrees of freedom compared nothing, so it never passes.
    pub fn passes(&self, z: f64) -> bool {
        self.degrees_of_freedom > 0 && self.statistic <= self.critical_value(z)
    }
}

/// A histogram of r-values.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RValueHistogram {
    counts: [u64; BUCKETS],
    total: u64,
}

impl RValueHistogram {
    /// Creates an empty `RValueHistogram`.
    pub fn new() -> Self {
        Self {
            counts: [0; BUCKETS],
            total: 0,
        }
    }

    /// Records a single r-value.
    pub fn record(&mut self, r: RValue) {
        self.counts[usize::from(r.get())] += 1;
        self.total += 1;
    }

    /// Records every r-value in `values`.
    pub fn record_all<I>(&mut self, values: I)
    where
        I: IntoIterator<Item = RValue>,
    {
        for r in values {
            self.record(r);
        }
    }

    /// Merges the counts of `other` into this histogram.
    pub fn merge(&mut self, other: &Self) {
        for (count, other_count) in self.counts.iter_mut().zip(other.counts.iter()) {
            *count += other_count;
        }
        self.total += other.total;
    }

    /// Returns the number of times `r` was recorded.
    pub fn count(&self, r: RValue) -> u64 {
        self.counts[usize::from(r.get())]
    }

    /// Returns the number of r-values recorded.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Returns the number of times `r` would be expected to be recorded by a correct generator, given the total.
    pub fn expected_count(&self, r: RValue) -> f64 {
        self.total as f64 * expected_probability(r)
    }

    /// Runs a chi-squared goodness-of-fit test against the expected distribution.
    ///
    /// Each r-value whose expected count is at least `min_expected` gets its own bucket, and all remaining r-values are
    /// pooled into a single tail bucket. Since expected counts halve from one r-value to the next, the tail bucket's
    /// expected count is then also at least `min_expected`. A `min_expected` of 5 is the usual rule of thumb.
    ///
    /// If every r-value ends up in the tail bucket, as with an empty or tiny histogram, there is nothing to compare: the
    /// result has zero degrees of freedom and a statistic of zero, and does not pass.
    pub fn goodness_of_fit(&self, min_expected: f64) -> GoodnessOfFit {
        let pooled_tail_start = RValue::all()
            .find(|r| r.is_max() || self.expected_count(*r) < min_expected)
            .unwrap_or(RValue::MAX);

        let mut statistic = 0.0;
        for r in RValue::all().take_while(|r| *r < pooled_tail_start) {
            statistic += chi_squared_term(self.count(r) as f64, self.expected_count(r));
        }

        let degrees_of_freedom = u32::from(pooled_tail_start.get());
        if degrees_of_freedom > 0 {
            let tail_observed = RValue::all()
                .skip_while(|r| *r < pooled_tail_start)
                .map(|r| self.count(r))
                .sum::<u64>();
            let tail_expected = self.total as f64 * tail_probability(pooled_tail_start);
            statistic += chi_squared_term(tail_observed as f64, tail_expected);
        }

        GoodnessOfFit {
            statistic,
            degrees_of_freedom,
            pooled_tail_start,
        }
    }

    /// Returns the ratio of the count of each r-value to the count of the next one.
    ///
    /// A correct generator halves the probability from one r-value to the next, so each ratio should be close to 2.
    /// Only ratios whose denominator was recorded at least `min_count` times are returned, since the rest are too noisy
    /// to be meaningful.
    pub fn halving_ratios(&self, min_count: u64) -> Vec<(RValue, f64)> {
        let min_count = min_count.max(1);
        RValue::all()
            .zip(RValue::all().skip(1))
            .filter(|(_, next)| self.count(*next) >= min_count)
            .map(|(r, next)| (r, self.count(r) as f64 / self.count(next) as f64))
            .collect()
    }
}

impl Default for RValueHistogram {
    fn default() -> Self {
        Self::new()
    }
}

impl Extend<RValue> for RValueHistogram {
    fn extend<I: IntoIterator<Item = RValue>>(&mut self, iter: I) {
        self.record_all(iter);
    }
}

impl FromIterator<RValue> for RValueHistogram {
    fn from_iter<I: IntoIterator<Item = RValue>>(iter: I) -> Self {
        let mut histogram = Self::new();
        histogram.record_all(iter);
        histogram
    }
}

fn chi_squared_term(observed: f64, expected: f64) -> f64 {
    let diff = observed - expected;
    diff * diff / expected
}
