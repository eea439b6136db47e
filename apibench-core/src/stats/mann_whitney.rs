use statrs::distribution::{ContinuousCDF, Normal};

use super::{TestOutcome, TwoSampleTest};

/// Largest group size for which the exact null distribution is used.
const EXACT_LIMIT: usize = 8;

/// Two-sided Mann-Whitney U rank-sum test.
///
/// The reported statistic is U for the first sample. Small tie-free samples
/// use the exact distribution of U; everything else uses the normal
/// approximation with tie and continuity correction.
#[derive(Debug, Clone, Default)]
pub struct MannWhitneyU;

impl MannWhitneyU {
    pub fn new() -> Self {
        Self
    }

    /// Average ranks (1-based) of the pooled samples plus the tie term
    /// `sum(t^3 - t)` over tie groups.
    fn ranks(pooled: &[f64]) -> (Vec<f64>, f64) {
        let mut order: Vec<usize> = (0..pooled.len()).collect();
        order.sort_by(|&i, &j| pooled[i].total_cmp(&pooled[j]));

        let mut ranks = vec![0.0; pooled.len()];
        let mut tie_term = 0.0;
        let mut start = 0;
        while start < order.len() {
            let mut end = start + 1;
            while end < order.len() && pooled[order[end]] == pooled[order[start]] {
                end += 1;
            }
            // positions start..end share the average of ranks start+1..=end
            let avg = (start + 1 + end) as f64 / 2.0;
            for &idx in &order[start..end] {
                ranks[idx] = avg;
            }
            let t = (end - start) as f64;
            tie_term += t * t * t - t;
            start = end;
        }
        (ranks, tie_term)
    }

    /// Number of arrangements giving each U value, for group sizes m and n.
    fn exact_counts(m: usize, n: usize) -> Vec<u64> {
        // table[i][j] holds the distribution for sizes (i, j)
        let mut table: Vec<Vec<Vec<u64>>> = vec![vec![Vec::new(); n + 1]; m + 1];
        for i in 0..=m {
            for j in 0..=n {
                table[i][j] = if i == 0 || j == 0 {
                    vec![1]
                } else {
                    let mut dist = vec![0u64; i * j + 1];
                    // the largest value comes from the first group: it beats all j
                    for (u, count) in table[i - 1][j].iter().enumerate() {
                        dist[u + j] += count;
                    }
                    for (u, count) in table[i][j - 1].iter().enumerate() {
                        dist[u] += count;
                    }
                    dist
                };
            }
        }
        std::mem::take(&mut table[m][n])
    }

    /// Two-sided exact p-value: `2 * P(U >= u_max)`.
    fn exact_p_value(u_max: f64, m: usize, n: usize) -> f64 {
        let counts = Self::exact_counts(m, n);
        let total: u64 = counts.iter().sum();
        let k = u_max.round() as usize;
        let upper: u64 = counts.iter().skip(k).sum();
        (2.0 * upper as f64 / total as f64).min(1.0)
    }

    fn asymptotic_p_value(u_max: f64, n1: usize, n2: usize, tie_term: f64) -> f64 {
        let n = (n1 + n2) as f64;
        let mu = (n1 * n2) as f64 / 2.0;
        let sigma =
            ((n1 * n2) as f64 / 12.0 * ((n + 1.0) - tie_term / (n * (n - 1.0)))).sqrt();
        if sigma == 0.0 {
            return 1.0;
        }
        let z = (u_max - mu - 0.5) / sigma;
        match Normal::new(0.0, 1.0) {
            Ok(normal) => (2.0 * normal.sf(z)).min(1.0),
            Err(_) => f64::NAN,
        }
    }
}

impl TwoSampleTest for MannWhitneyU {
    fn name(&self) -> &'static str {
        "Mann-Whitney U"
    }

    fn test(&self, a: &[f64], b: &[f64]) -> TestOutcome {
        let n1 = a.len();
        let n2 = b.len();
        if n1 == 0 || n2 == 0 {
            return TestOutcome::undefined();
        }

        let pooled: Vec<f64> = a.iter().chain(b.iter()).copied().collect();
        let (ranks, tie_term) = Self::ranks(&pooled);

        let rank_sum_a: f64 = ranks[..n1].iter().sum();
        let u1 = rank_sum_a - (n1 * (n1 + 1)) as f64 / 2.0;
        let u2 = (n1 * n2) as f64 - u1;
        let u_max = u1.max(u2);

        let p_value = if n1 <= EXACT_LIMIT && n2 <= EXACT_LIMIT && tie_term == 0.0 {
            Self::exact_p_value(u_max, n1, n2)
        } else {
            Self::asymptotic_p_value(u_max, n1, n2, tie_term)
        };

        TestOutcome {
            statistic: u1,
            p_value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_small_sample() {
        let result = MannWhitneyU.test(&[100.0, 200.0], &[50.0, 60.0]);

        assert_eq!(result.statistic, 4.0);
        assert!((result.p_value - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_exact_counts_are_symmetric() {
        let counts = MannWhitneyU::exact_counts(3, 4);
        assert_eq!(counts.len(), 13);
        assert_eq!(counts.iter().sum::<u64>(), 35); // C(7, 3)
        for u in 0..counts.len() {
            assert_eq!(counts[u], counts[counts.len() - 1 - u]);
        }
    }

    #[test]
    fn test_ranks_with_ties() {
        let (ranks, tie_term) = MannWhitneyU::ranks(&[3.0, 1.0, 3.0, 2.0]);
        assert_eq!(ranks, vec![3.5, 1.0, 3.5, 2.0]);
        assert_eq!(tie_term, 6.0);
    }

    #[test]
    fn test_separated_large_samples_are_significant() {
        let a: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let b: Vec<f64> = (0..30).map(|i| 10.0 + i as f64).collect();

        let result = MannWhitneyU.test(&a, &b);

        assert_eq!(result.statistic, 900.0);
        assert!(result.p_value < 1e-6);
    }

    #[test]
    fn test_identical_groups_not_significant() {
        let a = [5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0];
        let result = MannWhitneyU.test(&a, &a);

        assert_eq!(result.p_value, 1.0);
    }

    #[test]
    fn test_empty_group() {
        let result = MannWhitneyU.test(&[], &[1.0, 2.0]);
        assert!(result.p_value.is_nan());
    }
}
