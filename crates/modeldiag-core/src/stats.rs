// =============================================================================
// Descriptive Statistics
// =============================================================================
//
// Small building blocks shared by every component: mean, population
// standard deviation, and interpolated percentiles. They all return NaN
// on empty input instead of panicking so that degenerate segments flow
// through to NaN report cells.
//
// PERCENTILE DEFINITION
// ---------------------
// Linear interpolation between order statistics:
//
//     rank = p / 100 × (N − 1)
//     value = sorted[⌊rank⌋] + (sorted[⌈rank⌉] − sorted[⌊rank⌋]) × frac(rank)
//
// so percentile([1, 2, 3, 4, 5], 20) = 1.8 and percentile(.., 80) = 4.2.
//
// =============================================================================

use ndarray::{Array1, ArrayView1};

/// Arithmetic mean; NaN when empty.
pub fn mean(values: ArrayView1<f64>) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.sum() / values.len() as f64
}

/// Population standard deviation (divides by N); NaN when empty.
pub fn std_pop(values: ArrayView1<f64>) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|&v| (v - m) * (v - m)).sum();
    (ss / values.len() as f64).sqrt()
}

/// Copy of `values` sorted ascending under IEEE total order, so NaNs sort
/// to the ends instead of scrambling the finite values.
pub fn sorted(values: ArrayView1<f64>) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(|a, b| a.total_cmp(b));
    out
}

/// Interpolated percentile of an already-sorted slice, `pct` in [0, 100].
pub fn percentile_sorted(sorted: &[f64], pct: f64) -> f64 {
    let n = sorted.len();
    if n == 0 || !(0.0..=100.0).contains(&pct) {
        return f64::NAN;
    }
    if n == 1 {
        return sorted[0];
    }

    let rank = pct / 100.0 * (n - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = (rank.ceil() as usize).min(n - 1);
    let frac = rank - lower as f64;

    if lower == upper {
        sorted[lower]
    } else {
        sorted[lower] + (sorted[upper] - sorted[lower]) * frac
    }
}

/// Interpolated percentile of unsorted values.
pub fn percentile(values: ArrayView1<f64>, pct: f64) -> f64 {
    percentile_sorted(&sorted(values), pct)
}

/// Median, i.e. the 50th percentile.
pub fn median(values: ArrayView1<f64>) -> f64 {
    percentile(values, 50.0)
}

/// Gather `values[i]` for every `i` in `indices`, preserving order.
pub fn select(values: ArrayView1<f64>, indices: &[usize]) -> Array1<f64> {
    indices.iter().map(|&i| values[i]).collect()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_mean_and_std() {
        let v = array![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_abs_diff_eq!(mean(v.view()), 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(std_pop(v.view()), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_is_nan() {
        let v: Array1<f64> = Array1::zeros(0);
        assert!(mean(v.view()).is_nan());
        assert!(std_pop(v.view()).is_nan());
        assert!(median(v.view()).is_nan());
    }

    #[test]
    fn test_percentile_interpolates() {
        let v = array![5.0, 1.0, 4.0, 2.0, 3.0];
        assert_abs_diff_eq!(percentile(v.view(), 20.0), 1.8, epsilon = 1e-12);
        assert_abs_diff_eq!(percentile(v.view(), 80.0), 4.2, epsilon = 1e-12);
        assert_abs_diff_eq!(percentile(v.view(), 0.0), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(percentile(v.view(), 100.0), 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_median_even_length() {
        let v = array![0.1, 0.3, 0.2, 0.0];
        assert_abs_diff_eq!(median(v.view()), 0.15, epsilon = 1e-12);
    }

    #[test]
    fn test_percentile_single_value() {
        assert_eq!(percentile_sorted(&[3.5], 95.0), 3.5);
    }

    #[test]
    fn test_sorted_moves_nan_past_finite_values() {
        let s = sorted(array![3.0, f64::NAN, 1.0, 2.0].view());
        assert_eq!(&s[..3], &[1.0, 2.0, 3.0]);
        assert!(s[3].is_nan());
    }

    #[test]
    fn test_select_keeps_order() {
        let v = array![10.0, 20.0, 30.0];
        assert_eq!(select(v.view(), &[2, 0]), array![30.0, 10.0]);
    }
}
