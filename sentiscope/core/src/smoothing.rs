//! Savitzky–Golay smoothing of the sentiment series.

use ndarray::{s, Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};

/// Default upper bound on the filter window.
pub const DEFAULT_MAX_WINDOW: usize = 200;
/// Default fitted polynomial order.
pub const DEFAULT_POLY_ORDER: usize = 3;

/// Local cubic (by default) least-squares smoother.
///
/// The window is `min(max_window, len)` rounded down to odd; when that is
/// not larger than the polynomial order the series is returned unchanged.
/// Edges are filled by evaluating the polynomial fitted to the first and
/// last full windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavitzkyGolay {
    /// Largest window considered.
    pub max_window: usize,
    /// Order of the fitted polynomial.
    pub poly_order: usize,
}

impl Default for SavitzkyGolay {
    fn default() -> Self {
        Self {
            max_window: DEFAULT_MAX_WINDOW,
            poly_order: DEFAULT_POLY_ORDER,
        }
    }
}

impl SavitzkyGolay {
    /// Creates a filter with explicit parameters.
    #[must_use]
    pub const fn new(max_window: usize, poly_order: usize) -> Self {
        Self {
            max_window,
            poly_order,
        }
    }

    /// Effective window for a series of `len` points, or `None` when the
    /// series is too short to smooth.
    #[must_use]
    pub fn window_for(&self, len: usize) -> Option<usize> {
        let mut window = self.max_window.min(len);
        if window % 2 == 0 {
            window = window.saturating_sub(1);
        }
        (window > self.poly_order).then_some(window)
    }

    /// Smooths `series`; the output always has the same length.
    #[must_use]
    pub fn smooth(&self, series: &[f64]) -> Vec<f64> {
        self.try_smooth(series)
            .unwrap_or_else(|| series.to_vec())
    }

    /// Like [`Self::smooth`] but reports whether the identity fallback was taken.
    #[must_use]
    pub fn try_smooth(&self, series: &[f64]) -> Option<Vec<f64>> {
        let n = series.len();
        let window = self.window_for(n)?;
        let half = window / 2;
        let values = ArrayView1::from(series);

        let center = fit_weights(window, self.poly_order, half)?;
        let mut out = vec![0.0; n];
        for i in half..n - half {
            out[i] = center.dot(&values.slice(s![i - half..i + half + 1]));
        }

        let head = values.slice(s![..window]);
        let tail = values.slice(s![n - window..]);
        for offset in 0..half {
            out[offset] = fit_weights(window, self.poly_order, offset)?.dot(&head);
            let tail_offset = window - 1 - offset;
            out[n - 1 - offset] = fit_weights(window, self.poly_order, tail_offset)?.dot(&tail);
        }
        Some(out)
    }
}

/// Least-squares weights that evaluate, at window position `at`, the
/// polynomial of order `order` fitted to a window of `window` samples.
/// Positions are rescaled to `[-1, 1]` for conditioning.
fn fit_weights(window: usize, order: usize, at: usize) -> Option<Array1<f64>> {
    let terms = order + 1;
    let half = (window / 2).max(1) as f64;
    let position = |k: usize| (k as f64 - (window / 2) as f64) / half;

    let design = Array2::from_shape_fn((window, terms), |(k, p)| power(position(k), p));
    let normal = design.t().dot(&design);
    let target = Array1::from_shape_fn(terms, |p| power(position(at), p));

    let z = solve(normal, target)?;
    Some(design.dot(&z))
}

fn power(x: f64, p: usize) -> f64 {
    i32::try_from(p).map_or(f64::NAN, |p| x.powi(p))
}

/// Gaussian elimination with partial pivoting; `None` when singular.
fn solve(mut matrix: Array2<f64>, mut rhs: Array1<f64>) -> Option<Array1<f64>> {
    let n = rhs.len();
    for col in 0..n {
        let pivot = (col..n).max_by(|&a, &b| {
            matrix[[a, col]].abs().total_cmp(&matrix[[b, col]].abs())
        })?;
        if matrix[[pivot, col]].abs() < 1e-12 {
            return None;
        }
        if pivot != col {
            for k in 0..n {
                matrix.swap([col, k], [pivot, k]);
            }
            rhs.swap(col, pivot);
        }
        for row in col + 1..n {
            let factor = matrix[[row, col]] / matrix[[col, col]];
            for k in col..n {
                matrix[[row, k]] -= factor * matrix[[col, k]];
            }
            rhs[row] -= factor * rhs[col];
        }
    }
    let mut solution = Array1::<f64>::zeros(n);
    for row in (0..n).rev() {
        let tail = matrix
            .slice(s![row, row + 1..])
            .dot(&solution.slice(s![row + 1..]));
        solution[row] = (rhs[row] - tail) / matrix[[row, row]];
    }
    Some(solution)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-9, "{actual:?} != {expected:?}");
        }
    }

    #[test]
    fn window_is_odd_and_bounded() {
        let filter = SavitzkyGolay::default();
        assert_eq!(filter.window_for(500), Some(199));
        assert_eq!(filter.window_for(50), Some(49));
        assert_eq!(filter.window_for(7), Some(7));
        assert_eq!(filter.window_for(5), Some(5));
        assert_eq!(filter.window_for(4), None);
        assert_eq!(filter.window_for(0), None);
    }

    #[test]
    fn short_series_fall_back_to_identity() {
        let filter = SavitzkyGolay::default();
        for series in [vec![], vec![0.4], vec![0.1, -0.3, 0.9, 0.0]] {
            assert_eq!(filter.smooth(&series), series);
            assert!(filter.try_smooth(&series).is_none());
        }
    }

    #[test]
    fn reproduces_cubics_exactly() {
        let series: Vec<f64> = (0..40)
            .map(|i| {
                let x = f64::from(i) / 10.0;
                0.02 * x * x * x - 0.1 * x * x + 0.3 * x - 0.5
            })
            .collect();
        let filter = SavitzkyGolay::new(11, 3);
        assert_close(&filter.smooth(&series), &series);
    }

    #[test]
    fn constant_series_stays_constant() {
        let series = vec![0.25; 9];
        assert_close(&SavitzkyGolay::default().smooth(&series), &series);
    }

    #[test]
    fn matches_classic_five_point_quadratic_weights() {
        // Savitzky–Golay 5-point order-2/3 centre weights: (-3, 12, 17, 12, -3) / 35.
        let weights = fit_weights(5, 3, 2).unwrap().to_vec();
        let expected: Vec<f64> = [-3.0, 12.0, 17.0, 12.0, -3.0]
            .iter()
            .map(|w| w / 35.0)
            .collect();
        assert_close(&weights, &expected);
    }

    #[test]
    fn damps_alternating_noise() {
        let series: Vec<f64> = (0..30).map(|i| if i % 2 == 0 { 0.5 } else { -0.5 }).collect();
        let smoothed = SavitzkyGolay::new(9, 3).smooth(&series);
        assert_eq!(smoothed.len(), series.len());
        let interior_peak = smoothed[5..25].iter().fold(0.0_f64, |m, v| m.max(v.abs()));
        assert!(interior_peak < 0.5);
    }

    #[test]
    fn edge_weights_reproduce_the_fitted_polynomial() {
        // Any window of a quadratic is fitted exactly, so the edge weights
        // must return the sample itself at every position.
        let window: Vec<f64> = (0..7).map(|k| f64::from(k * k) * 0.1 - 0.3).collect();
        let values = ArrayView1::from(window.as_slice());
        for at in 0..7 {
            let weights = fit_weights(7, 3, at).unwrap();
            assert_eq!(weights.len(), 7);
            assert!((weights.dot(&values) - window[at]).abs() < 1e-9);
        }
    }

    #[test]
    fn singular_systems_are_rejected() {
        let matrix = Array2::from_shape_vec((2, 2), vec![1.0, 2.0, 2.0, 4.0]).unwrap();
        assert!(solve(matrix, Array1::from(vec![1.0, 2.0])).is_none());
    }
}
