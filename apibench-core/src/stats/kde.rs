use std::f64::consts::PI;

use super::descriptive::{std_dev, sorted};

/// Gaussian kernel density estimate with Scott's rule bandwidth.
#[derive(Debug, Clone)]
pub struct GaussianKde {
    values: Vec<f64>,
    bandwidth: f64,
}

impl GaussianKde {
    /// Returns `None` when fewer than two values or zero spread leave the
    /// bandwidth undefined.
    pub fn new(values: &[f64]) -> Option<Self> {
        let n = values.len();
        if n < 2 {
            return None;
        }
        let bandwidth = std_dev(values) * (n as f64).powf(-0.2);
        if !bandwidth.is_finite() || bandwidth <= 0.0 {
            return None;
        }
        Some(Self {
            values: values.to_vec(),
            bandwidth,
        })
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    pub fn density(&self, x: f64) -> f64 {
        let norm = 1.0 / ((2.0 * PI).sqrt() * self.bandwidth * self.values.len() as f64);
        self.values
            .iter()
            .map(|v| {
                let z = (x - v) / self.bandwidth;
                (-0.5 * z * z).exp()
            })
            .sum::<f64>()
            * norm
    }

    /// `points` evenly spaced (x, density) pairs spanning the data range
    /// padded by three bandwidths.
    pub fn curve(&self, points: usize) -> Vec<(f64, f64)> {
        let data = sorted(&self.values);
        let lo = data[0] - 3.0 * self.bandwidth;
        let hi = data[data.len() - 1] + 3.0 * self.bandwidth;
        self.curve_between(lo, hi, points)
    }

    pub fn curve_between(&self, lo: f64, hi: f64, points: usize) -> Vec<(f64, f64)> {
        let points = points.max(2);
        let step = (hi - lo) / (points - 1) as f64;
        (0..points)
            .map(|i| {
                let x = lo + step * i as f64;
                (x, self.density(x))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_density_integrates_to_one() {
        let kde = GaussianKde::new(&[1.0, 2.0, 2.5, 3.0, 7.0]).unwrap();
        let curve = kde.curve(2000);
        let step = curve[1].0 - curve[0].0;
        let area: f64 = curve.iter().map(|(_, y)| y * step).sum();
        assert!((area - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_peak_near_cluster() {
        let kde = GaussianKde::new(&[10.0, 10.1, 9.9, 10.0, 30.0]).unwrap();
        assert!(kde.density(10.0) > kde.density(20.0));
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(GaussianKde::new(&[1.0]).is_none());
        assert!(GaussianKde::new(&[4.0, 4.0, 4.0]).is_none());
    }
}
