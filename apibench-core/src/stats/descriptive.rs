use serde::Serialize;

/// Descriptive statistics for one group of values.
///
/// An empty group has `count == 0` and NaN for every other field, so a
/// missing subgroup is never mistaken for a measured zero. The standard
/// deviation is the sample (n-1) estimate and is NaN below two values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub median: f64,
    pub max: f64,
}

impl Summary {
    pub fn of(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self {
                count: 0,
                mean: f64::NAN,
                std_dev: f64::NAN,
                min: f64::NAN,
                median: f64::NAN,
                max: f64::NAN,
            };
        }

        let sorted = sorted(values);
        Self {
            count: values.len(),
            mean: mean(values),
            std_dev: std_dev(values),
            min: sorted[0],
            median: percentile_of_sorted(&sorted, 0.5),
            max: sorted[sorted.len() - 1],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample variance with Bessel's correction.
pub fn variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let sum_sq_diff: f64 = values.iter().map(|x| (x - m).powi(2)).sum();
    sum_sq_diff / (values.len() - 1) as f64
}

pub fn std_dev(values: &[f64]) -> f64 {
    variance(values).sqrt()
}

pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(f64::total_cmp);
    out
}

/// Linearly interpolated percentile of an ascending slice, `q` in [0, 1].
pub fn percentile_of_sorted(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let rank = q.clamp(0.0, 1.0) * (n - 1) as f64;
            let lo = rank.floor() as usize;
            let hi = rank.ceil() as usize;
            sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
        }
    }
}

/// Box-plot geometry: quartiles plus Tukey whiskers at 1.5 IQR.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub lower_whisker: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

impl BoxStats {
    /// Returns `None` for an empty group.
    pub fn of(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let sorted = sorted(values);
        let q1 = percentile_of_sorted(&sorted, 0.25);
        let median = percentile_of_sorted(&sorted, 0.5);
        let q3 = percentile_of_sorted(&sorted, 0.75);
        let iqr = q3 - q1;
        let lo_fence = q1 - 1.5 * iqr;
        let hi_fence = q3 + 1.5 * iqr;

        let inside = sorted.iter().copied().filter(|v| *v >= lo_fence && *v <= hi_fence);
        let lower_whisker = inside.clone().next().unwrap_or(q1);
        let upper_whisker = inside.last().unwrap_or(q3);
        let outliers = sorted
            .iter()
            .copied()
            .filter(|v| *v < lo_fence || *v > hi_fence)
            .collect();

        Some(Self {
            q1,
            median,
            q3,
            lower_whisker,
            upper_whisker,
            outliers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_basic() {
        let s = Summary::of(&[4.0, 1.0, 3.0, 2.0]);
        assert_eq!(s.count, 4);
        assert_eq!(s.mean, 2.5);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 4.0);
        assert_eq!(s.median, 2.5);
        assert!((s.std_dev - 1.2909944).abs() < 1e-6);
    }

    #[test]
    fn test_summary_empty_is_nan() {
        let s = Summary::of(&[]);
        assert!(s.is_empty());
        assert!(s.mean.is_nan());
        assert!(s.std_dev.is_nan());
        assert!(s.median.is_nan());
        assert!(s.min.is_nan());
        assert!(s.max.is_nan());
    }

    #[test]
    fn test_single_value_has_undefined_std() {
        let s = Summary::of(&[42.0]);
        assert_eq!(s.count, 1);
        assert_eq!(s.mean, 42.0);
        assert_eq!(s.median, 42.0);
        assert!(s.std_dev.is_nan());
    }

    #[test]
    fn test_percentile_interpolates() {
        let sorted = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(percentile_of_sorted(&sorted, 0.0), 1.0);
        assert_eq!(percentile_of_sorted(&sorted, 0.25), 2.0);
        assert_eq!(percentile_of_sorted(&sorted, 0.5), 3.0);
        assert_eq!(percentile_of_sorted(&sorted, 1.0), 5.0);
        assert_eq!(percentile_of_sorted(&[1.0, 2.0], 0.5), 1.5);
    }

    #[test]
    fn test_box_stats_outliers() {
        let values = [10.0, 11.0, 12.0, 13.0, 14.0, 100.0];
        let b = BoxStats::of(&values).unwrap();
        assert_eq!(b.outliers, vec![100.0]);
        assert_eq!(b.lower_whisker, 10.0);
        assert_eq!(b.upper_whisker, 14.0);
        assert!(b.q1 <= b.median && b.median <= b.q3);
    }

    #[test]
    fn test_box_stats_empty() {
        assert!(BoxStats::of(&[]).is_none());
    }
}
