use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};

use super::descriptive::{mean, variance};
use super::{TestOutcome, TwoSampleTest};

/// How the t-test estimates the standard error of the difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VarianceModel {
    /// Student's t-test: one pooled variance, n1 + n2 - 2 degrees of freedom.
    #[default]
    Pooled,
    /// Welch's t-test: separate variances, Welch-Satterthwaite degrees of freedom.
    Welch,
}

/// Two-sided independent two-sample t-test.
#[derive(Debug, Clone, Default)]
pub struct TTest {
    pub variance: VarianceModel,
}

impl TTest {
    pub fn new(variance: VarianceModel) -> Self {
        Self { variance }
    }

    pub fn pooled() -> Self {
        Self::new(VarianceModel::Pooled)
    }

    pub fn welch() -> Self {
        Self::new(VarianceModel::Welch)
    }

    /// Degrees of freedom from the Welch-Satterthwaite equation.
    ///
    /// df = (var1/n1 + var2/n2)^2 / ((var1/n1)^2/(n1-1) + (var2/n2)^2/(n2-1))
    fn welch_satterthwaite_df(var1: f64, n1: usize, var2: f64, n2: usize) -> f64 {
        let s1 = var1 / n1 as f64;
        let s2 = var2 / n2 as f64;
        let numerator = (s1 + s2).powi(2);
        let denominator = (s1.powi(2) / (n1 - 1) as f64) + (s2.powi(2) / (n2 - 1) as f64);

        if denominator == 0.0 {
            return (n1.min(n2) - 1) as f64;
        }

        numerator / denominator
    }

    /// Standard error of the mean difference and its degrees of freedom.
    fn standard_error(&self, var1: f64, n1: usize, var2: f64, n2: usize) -> (f64, f64) {
        match self.variance {
            VarianceModel::Pooled => {
                let df = (n1 + n2 - 2) as f64;
                let pooled = ((n1 - 1) as f64 * var1 + (n2 - 1) as f64 * var2) / df;
                let se = (pooled * (1.0 / n1 as f64 + 1.0 / n2 as f64)).sqrt();
                (se, df)
            }
            VarianceModel::Welch => {
                let se = (var1 / n1 as f64 + var2 / n2 as f64).sqrt();
                (se, Self::welch_satterthwaite_df(var1, n1, var2, n2))
            }
        }
    }
}

impl TwoSampleTest for TTest {
    fn name(&self) -> &'static str {
        match self.variance {
            VarianceModel::Pooled => "Student's t-test",
            VarianceModel::Welch => "Welch's t-test",
        }
    }

    fn test(&self, a: &[f64], b: &[f64]) -> TestOutcome {
        let n1 = a.len();
        let n2 = b.len();

        if n1 < 2 || n2 < 2 {
            return TestOutcome::undefined();
        }

        let mean1 = mean(a);
        let mean2 = mean(b);
        let var1 = variance(a);
        let var2 = variance(b);

        let (se, df) = self.standard_error(var1, n1, var2, n2);

        // Both groups constant: the difference is either exact or absent.
        if se == 0.0 {
            return if mean1 == mean2 {
                TestOutcome {
                    statistic: f64::NAN,
                    p_value: 1.0,
                }
            } else {
                TestOutcome {
                    statistic: (mean1 - mean2).signum() * f64::INFINITY,
                    p_value: 0.0,
                }
            };
        }

        let t_statistic = (mean1 - mean2) / se;

        let p_value = match StudentsT::new(0.0, 1.0, df) {
            Ok(t_dist) => 2.0 * t_dist.sf(t_statistic.abs()),
            Err(_) => f64::NAN,
        };

        TestOutcome {
            statistic: t_statistic,
            p_value: p_value.min(1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_samples() {
        let test = TTest::pooled();
        let result = test.test(&[100.0, 100.0, 100.0], &[100.0, 100.0, 100.0]);

        assert_eq!(result.p_value, 1.0);
        assert!(!result.is_significant(0.05));
    }

    #[test]
    fn test_clearly_different_samples() {
        let test = TTest::pooled();
        let a = [1000.0, 1001.0, 1002.0, 999.0, 1000.0];
        let b = [100.0, 101.0, 102.0, 99.0, 100.0];

        let result = test.test(&a, &b);

        assert!(result.statistic > 0.0);
        assert!(result.p_value < 0.001);
        assert!(result.is_significant(0.05));
    }

    #[test]
    fn test_pooled_known_value() {
        // mean 150 vs 55, pooled variance 2525, df = 2
        let result = TTest::pooled().test(&[100.0, 200.0], &[50.0, 60.0]);

        assert!((result.statistic - 1.890571).abs() < 1e-5);
        assert!((result.p_value - 0.199245).abs() < 1e-4);
    }

    #[test]
    fn test_welch_differs_from_pooled_on_unequal_sizes() {
        let a = [10.0, 12.0, 11.0, 13.0, 40.0, 38.0];
        let b = [9.0, 9.5];

        let pooled = TTest::pooled().test(&a, &b);
        let welch = TTest::welch().test(&a, &b);

        assert!((pooled.p_value - welch.p_value).abs() > 1e-6);
    }

    #[test]
    fn test_insufficient_samples() {
        let result = TTest::pooled().test(&[100.0], &[200.0]);

        assert!(result.statistic.is_nan());
        assert!(result.p_value.is_nan());
        assert!(!result.is_significant(0.05));
    }

    #[test]
    fn test_zero_variance_but_different_means() {
        let result = TTest::welch().test(&[200.0, 200.0, 200.0], &[100.0, 100.0, 100.0]);

        assert_eq!(result.p_value, 0.0);
        assert!(result.statistic.is_infinite() && result.statistic > 0.0);
    }

    #[test]
    fn test_names() {
        assert_eq!(TTest::pooled().name(), "Student's t-test");
        assert_eq!(TTest::welch().name(), "Welch's t-test");
    }
}
