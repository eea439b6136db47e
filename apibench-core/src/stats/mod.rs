use statrs::distribution::{ContinuousCDF, StudentsT};

/// Statistic and two-sided p-value of a two-sample test.
///
/// Both are NaN when a group is too small for the test to be defined.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TestOutcome {
    pub statistic: f64,
    pub p_value: f64,
}

impl TestOutcome {
    pub fn undefined() -> Self {
        Self {
            statistic: f64::NAN,
            p_value: f64::NAN,
        }
    }

    /// True when `p < alpha`; an undefined p-value is never significant.
    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }
}

/// Trait for tests comparing two independent samples.
pub trait TwoSampleTest: Send + Sync {
    fn name(&self) -> &'static str;

    fn test(&self, a: &[f64], b: &[f64]) -> TestOutcome;
}

/// Cohen's d using the mean of the two sample variances.
pub fn cohens_d(a: &[f64], b: &[f64]) -> f64 {
    let pooled = ((variance(a) + variance(b)) / 2.0).sqrt();
    (mean(a) - mean(b)) / pooled
}

/// Difference of `b`'s mean relative to `a`'s, in percent of `a`.
///
/// Positive when `b` is lower.
pub fn percent_difference(mean_a: f64, mean_b: f64) -> f64 {
    (mean_a - mean_b) / mean_a * 100.0
}

/// Conventional label for the magnitude of Cohen's d.
pub fn effect_magnitude(d: f64) -> &'static str {
    let d = d.abs();
    if d.is_nan() {
        "undefined"
    } else if d < 0.2 {
        "negligible"
    } else if d < 0.5 {
        "small"
    } else if d < 0.8 {
        "medium"
    } else {
        "large"
    }
}

/// Significance stars: `***` p<0.001, `**` p<0.01, `*` p<0.05.
pub fn significance_stars(p_value: f64) -> &'static str {
    if p_value < 0.001 {
        "***"
    } else if p_value < 0.01 {
        "**"
    } else if p_value < 0.05 {
        "*"
    } else {
        ""
    }
}

/// Half-width of the t-based confidence interval of the mean.
///
/// NaN below two values.
pub fn mean_ci_half_width(values: &[f64], confidence: f64) -> f64 {
    let n = values.len();
    if n < 2 {
        return f64::NAN;
    }
    let se = std_dev(values) / (n as f64).sqrt();
    match StudentsT::new(0.0, 1.0, (n - 1) as f64) {
        Ok(t) => t.inverse_cdf(0.5 + confidence / 2.0) * se,
        Err(_) => f64::NAN,
    }
}

mod descriptive;
mod kde;
mod mann_whitney;
mod shapiro;
mod ttest;

pub use descriptive::{
    mean, percentile_of_sorted, sorted, std_dev, variance, BoxStats, Summary,
};
pub use kde::GaussianKde;
pub use mann_whitney::MannWhitneyU;
pub use shapiro::{ShapiroWilk, MAX_SAMPLE as SHAPIRO_MAX_SAMPLE};
pub use ttest::{TTest, VarianceModel};
