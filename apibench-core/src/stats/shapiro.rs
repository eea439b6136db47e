//! Shapiro-Wilk normality test.
//!
//! Coefficients and the p-value come from Royston's (1995) approximation,
//! valid for 3 <= n <= 5000. Larger groups are down-sampled first with a
//! seeded generator so the statistic is reproducible.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use statrs::distribution::{ContinuousCDF, Normal};

use super::descriptive::sorted;

/// Largest sample the approximation supports.
pub const MAX_SAMPLE: usize = 5000;

const SMALL: f64 = 1e-19;

// Polynomial coefficients, lowest order first.
const C1: [f64; 6] = [0.0, 0.221157, -0.147981, -2.071190, 4.434685, -2.706056];
const C2: [f64; 6] = [0.0, 0.042981, -0.293762, -1.752461, 5.682633, -3.582633];
const C3: [f64; 4] = [0.5440, -0.39978, 0.025054, -6.714e-4];
const C4: [f64; 4] = [1.3822, -0.77857, 0.062767, -0.0020322];
const C5: [f64; 4] = [-1.5861, -0.31082, -0.083751, 0.0038915];
const C6: [f64; 3] = [-0.4803, -0.082676, 0.0030302];
const G: [f64; 2] = [-2.273, 0.459];

/// Result of a normality check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapiroWilk {
    /// The W statistic; NaN when the test is undefined.
    pub w: f64,
    pub p_value: f64,
    /// Number of values actually tested after sampling.
    pub n: usize,
}

impl ShapiroWilk {
    /// Test `values`, sampling down to `cap` values (at most [`MAX_SAMPLE`])
    /// with `seed` when the group is larger.
    pub fn test_sampled(values: &[f64], cap: usize, seed: u64) -> Self {
        let cap = cap.clamp(3, MAX_SAMPLE);
        if values.len() <= cap {
            return Self::test(values);
        }
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let sample: Vec<f64> = values.choose_multiple(&mut rng, cap).copied().collect();
        Self::test(&sample)
    }

    /// Test every value. Fewer than three values, more than [`MAX_SAMPLE`]
    /// or a constant sample give NaN.
    pub fn test(values: &[f64]) -> Self {
        let n = values.len();
        let undefined = Self {
            w: f64::NAN,
            p_value: f64::NAN,
            n,
        };
        if !(3..=MAX_SAMPLE).contains(&n) {
            return undefined;
        }

        let x = sorted(values);
        let range = x[n - 1] - x[0];
        if range < SMALL {
            return undefined;
        }

        let Ok(normal) = Normal::new(0.0, 1.0) else {
            return undefined;
        };

        let a = coefficients(n, &normal);

        // W as the squared correlation between x and the antisymmetric
        // coefficient vector, computed on range-scaled data.
        let coef = |i: usize| -> f64 {
            let j = n - 1 - i;
            match i.cmp(&j) {
                std::cmp::Ordering::Less => -a[i],
                std::cmp::Ordering::Greater => a[j],
                std::cmp::Ordering::Equal => 0.0,
            }
        };
        let nf = n as f64;
        let sa = (0..n).map(coef).sum::<f64>() / nf;
        let sx = x.iter().map(|v| v / range).sum::<f64>() / nf;
        let (mut ssa, mut ssx, mut sax) = (0.0, 0.0, 0.0);
        for (i, value) in x.iter().enumerate() {
            let asa = coef(i) - sa;
            let xsx = value / range - sx;
            ssa += asa * asa;
            ssx += xsx * xsx;
            sax += asa * xsx;
        }
        let ssassx = (ssa * ssx).sqrt();
        // rounding can push a perfect fit just past W = 1
        let w1 = ((ssassx - sax) * (ssassx + sax) / (ssa * ssx)).max(0.0);
        let w = 1.0 - w1;

        Self {
            w,
            p_value: p_value(w, w1, n, &normal),
            n,
        }
    }

    /// Whether normality is not rejected at `alpha`.
    pub fn is_normal(&self, alpha: f64) -> bool {
        self.p_value > alpha
    }
}

fn poly(coefs: &[f64], x: f64) -> f64 {
    coefs.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

/// The upper half of the coefficient vector, largest first.
fn coefficients(n: usize, normal: &Normal) -> Vec<f64> {
    let half = n / 2;
    if n == 3 {
        return vec![std::f64::consts::FRAC_1_SQRT_2];
    }

    let an25 = n as f64 + 0.25;
    let m: Vec<f64> = (1..=half)
        .map(|i| normal.inverse_cdf((i as f64 - 0.375) / an25))
        .collect();
    let summ2 = 2.0 * m.iter().map(|v| v * v).sum::<f64>();
    let ssumm2 = summ2.sqrt();
    let rsn = 1.0 / (n as f64).sqrt();
    let a1 = poly(&C1, rsn) - m[0] / ssumm2;

    let mut a = vec![0.0; half];
    a[0] = a1;
    let (first, fac) = if n > 5 {
        let a2 = -m[1] / ssumm2 + poly(&C2, rsn);
        a[1] = a2;
        let fac = ((summ2 - 2.0 * m[0].powi(2) - 2.0 * m[1].powi(2))
            / (1.0 - 2.0 * a1.powi(2) - 2.0 * a2.powi(2)))
        .sqrt();
        (2, fac)
    } else {
        let fac = ((summ2 - 2.0 * m[0].powi(2)) / (1.0 - 2.0 * a1.powi(2))).sqrt();
        (1, fac)
    };
    for i in first..half {
        a[i] = -m[i] / fac;
    }
    a
}

fn p_value(w: f64, w1: f64, n: usize, normal: &Normal) -> f64 {
    if n == 3 {
        const PI6: f64 = 6.0 / std::f64::consts::PI;
        const STQR: f64 = std::f64::consts::FRAC_PI_3;
        return (PI6 * (w.sqrt().asin() - STQR)).max(0.0);
    }

    let nf = n as f64;
    let mut y = w1.ln();
    let (m, s) = if n <= 11 {
        let gamma = poly(&G, nf);
        if y >= gamma {
            return 1e-99;
        }
        y = -(gamma - y).ln();
        (poly(&C3, nf), poly(&C4, nf).exp())
    } else {
        let xx = nf.ln();
        (poly(&C5, xx), poly(&C6, xx).exp())
    };

    normal.sf((y - m) / s)
}
