// =============================================================================
// Linear / Excess Decomposition
// =============================================================================
//
// Asks: how much of the actual outcome is explained by the linear part of
// the prediction, and how much by what the model adds on top of it?
//
// THE MODEL
// ---------
// Two synthetic regressors, no intercept:
//
//     x1 = y_linear               (linear component)
//     x2 = yhat − y_linear        (excess / non-linear component)
//     y  = y_actual
//
//     y ≈ b1·x1 + b2·x2
//
// CLOSED FORM
// -----------
// With only two regressors the normal equations are a 2×2 system we can
// invert by hand:
//
//     X'X = | Σx1²   Σx1x2 |      det = Σx1²·Σx2² − (Σx1x2)²
//           | Σx1x2  Σx2²  |
//
//     b1 = (Σx2²·Σyx1 − Σx1x2·Σyx2) / det
//     b2 = (Σx1²·Σyx2 − Σx1x2·Σyx1) / det
//
// Then σ² = RSS / (N − 2), Var(b) = σ² (X'X)⁻¹ and t = b / √Var(b).
//
// FAILURE MODES
// -------------
//   - N < 3:          no residual degrees of freedom → DegenerateSample
//   - det ≈ 0:        x2 ≡ 0 or x1 ∝ x2 → SingularMatrix
//   - length differs: LengthMismatch
//
// `decompose` reports these as errors; report builders swap in
// `DecompositionResult::nan()` for the affected segment.
//
// =============================================================================

use nalgebra::Matrix2;
use ndarray::ArrayView1;
use serde::Serialize;

use crate::error::{ModelDiagError, Result};
use crate::inference::CoefficientTest;

/// Relative tolerance for treating the normal-equations determinant as zero.
///
/// The determinant is compared against Σx1²·Σx2², its value when x1 ⟂ x2.
const SINGULAR_TOL: f64 = 1e-12;

/// Coefficients and test statistics of one decomposition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DecompositionResult {
    pub beta_linear: f64,
    pub beta_nonlinear: f64,
    pub t_linear: f64,
    pub t_nonlinear: f64,
    pub se_linear: f64,
    pub se_nonlinear: f64,
    pub p_linear: f64,
    pub p_nonlinear: f64,
    /// Residual degrees of freedom, N − 2.
    pub df: f64,
}

impl DecompositionResult {
    /// NaN sentinel for a segment that could not be decomposed.
    pub fn nan() -> Self {
        Self::from_tests(CoefficientTest::nan(), CoefficientTest::nan(), f64::NAN)
    }

    fn from_tests(linear: CoefficientTest, nonlinear: CoefficientTest, df: f64) -> Self {
        Self {
            beta_linear: linear.estimate,
            beta_nonlinear: nonlinear.estimate,
            t_linear: linear.t_stat,
            t_nonlinear: nonlinear.t_stat,
            se_linear: linear.std_error,
            se_nonlinear: nonlinear.std_error,
            p_linear: linear.p_value,
            p_nonlinear: nonlinear.p_value,
            df,
        }
    }

    pub fn linear(&self) -> CoefficientTest {
        CoefficientTest {
            estimate: self.beta_linear,
            std_error: self.se_linear,
            t_stat: self.t_linear,
            p_value: self.p_linear,
        }
    }

    pub fn nonlinear(&self) -> CoefficientTest {
        CoefficientTest {
            estimate: self.beta_nonlinear,
            std_error: self.se_nonlinear,
            t_stat: self.t_nonlinear,
            p_value: self.p_nonlinear,
        }
    }

    /// Significance codes for (linear, excess); empty for NaN p-values.
    pub fn stars(&self) -> [&'static str; 2] {
        [self.linear().stars(), self.nonlinear().stars()]
    }

    /// False for the NaN sentinel.
    pub fn is_finite(&self) -> bool {
        self.beta_linear.is_finite() && self.beta_nonlinear.is_finite()
    }
}

/// Regress `y_actual` on the linear and excess parts of `yhat`.
///
/// # Arguments
/// * `yhat` - Combined model prediction
/// * `y_linear` - Linear-only prediction
/// * `y_actual` - Observed outcome
///
/// # Errors
/// `LengthMismatch`, `DegenerateSample` (N < 3) or `SingularMatrix`.
pub fn decompose(
    yhat: ArrayView1<f64>,
    y_linear: ArrayView1<f64>,
    y_actual: ArrayView1<f64>,
) -> Result<DecompositionResult> {
    let n = y_actual.len();
    if yhat.len() != n || y_linear.len() != n {
        return Err(ModelDiagError::LengthMismatch(format!(
            "yhat has {} elements, y_linear has {}, y_actual has {}",
            yhat.len(),
            y_linear.len(),
            n
        )));
    }
    if n < 3 {
        return Err(ModelDiagError::DegenerateSample(format!(
            "decomposition needs at least 3 observations, got {}",
            n
        )));
    }

    // Sums of squares and cross-products
    let mut ssx1 = 0.0;
    let mut ssx2 = 0.0;
    let mut sx1x2 = 0.0;
    let mut syx1 = 0.0;
    let mut syx2 = 0.0;
    for ((&yh, &x1), &y) in yhat.iter().zip(y_linear.iter()).zip(y_actual.iter()) {
        let x2 = yh - x1;
        ssx1 += x1 * x1;
        ssx2 += x2 * x2;
        sx1x2 += x1 * x2;
        syx1 += y * x1;
        syx2 += y * x2;
    }

    let xtx = Matrix2::new(ssx1, sx1x2, sx1x2, ssx2);
    let det = xtx.determinant();
    if !det.is_finite() || det.abs() <= SINGULAR_TOL * ssx1 * ssx2 {
        return Err(ModelDiagError::SingularMatrix(format!(
            "X'X determinant {:e} is numerically zero",
            det
        )));
    }

    // Analytic inverse: adjugate / det
    let xtx_inv = Matrix2::new(ssx2, -sx1x2, -sx1x2, ssx1) / det;

    let b1 = (ssx2 * syx1 - sx1x2 * syx2) / det;
    let b2 = (ssx1 * syx2 - sx1x2 * syx1) / det;

    let rss: f64 = yhat
        .iter()
        .zip(y_linear.iter())
        .zip(y_actual.iter())
        .map(|((&yh, &x1), &y)| {
            let resid = y - (b1 * x1 + b2 * (yh - x1));
            resid * resid
        })
        .sum();

    let df = (n - 2) as f64;
    let varcov = xtx_inv * (rss / df);

    Ok(DecompositionResult::from_tests(
        CoefficientTest::new(b1, varcov[(0, 0)], df),
        CoefficientTest::new(b2, varcov[(1, 1)], df),
        df,
    ))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array1};

    fn yhat_from(x1: &Array1<f64>, x2: &Array1<f64>) -> Array1<f64> {
        x1 + x2
    }

    #[test]
    fn test_known_values() {
        let x1 = array![1.0, 2.0, 3.0, 4.0, 5.0];
        let x2 = array![0.5, -0.2, 0.1, 0.4, -0.3];
        let y = array![1.8, 3.9, 6.3, 8.4, 9.6];
        let yhat = yhat_from(&x1, &x2);

        let r = decompose(yhat.view(), x1.view(), y.view()).unwrap();

        assert_abs_diff_eq!(r.beta_linear, 1.998, epsilon = 1e-9);
        assert_abs_diff_eq!(r.beta_nonlinear, 0.42, epsilon = 1e-9);
        assert_abs_diff_eq!(r.t_linear, 42.38609982229806, epsilon = 1e-6);
        assert_abs_diff_eq!(r.t_nonlinear, 0.8909990953636244, epsilon = 1e-9);
        assert_abs_diff_eq!(r.se_nonlinear, 0.47138094997570684, epsilon = 1e-9);
        assert_eq!(r.df, 3.0);
        assert!(r.p_linear < 1e-3);
        assert!(r.p_nonlinear > 0.3 && r.p_nonlinear < 0.6);
        assert_eq!(r.stars(), ["***", ""]);
        assert_eq!(r.nonlinear().t_stat, r.t_nonlinear);
    }

    #[test]
    fn test_exact_reconstruction() {
        // y = 2·x1 + 3·x2 exactly
        let x1 = array![1.0, 2.0, 3.0, 4.0, 5.0];
        let x2 = array![1.0, 0.0, 1.0, 0.0, 1.0];
        let y = 2.0 * &x1 + 3.0 * &x2;
        let yhat = yhat_from(&x1, &x2);

        let r = decompose(yhat.view(), x1.view(), y.view()).unwrap();

        assert_abs_diff_eq!(r.beta_linear, 2.0, epsilon = 1e-10);
        assert_abs_diff_eq!(r.beta_nonlinear, 3.0, epsilon = 1e-10);
        let fitted = r.beta_linear * &x1 + r.beta_nonlinear * &x2;
        for (f, a) in fitted.iter().zip(y.iter()) {
            assert_abs_diff_eq!(*f, *a, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_zero_excess_is_singular() {
        let y_linear = array![1.0, 2.0, 3.0, 4.0];
        let r = decompose(y_linear.view(), y_linear.view(), y_linear.view());
        assert!(matches!(r, Err(ModelDiagError::SingularMatrix(_))));
    }

    #[test]
    fn test_excess_equal_to_linear_is_singular() {
        // yhat = 2·y_linear makes x2 identical to x1: det = 55·55 − 55² = 0
        let y_linear = array![1.0, 2.0, 3.0, 4.0, 5.0];
        let yhat = array![2.0, 4.0, 6.0, 8.0, 10.0];
        let y_actual = yhat.clone();
        let r = decompose(yhat.view(), y_linear.view(), y_actual.view());
        assert!(matches!(r, Err(ModelDiagError::SingularMatrix(_))));
    }

    #[test]
    fn test_too_few_observations() {
        let a = array![1.0, 2.0];
        let b = array![0.5, 1.5];
        let r = decompose(a.view(), b.view(), a.view());
        assert!(matches!(r, Err(ModelDiagError::DegenerateSample(_))));
    }

    #[test]
    fn test_length_mismatch() {
        let a = array![1.0, 2.0, 3.0];
        let b = array![1.0, 2.0];
        let r = decompose(a.view(), b.view(), a.view());
        assert!(matches!(r, Err(ModelDiagError::LengthMismatch(_))));
    }

    #[test]
    fn test_nan_sentinel() {
        let r = DecompositionResult::nan();
        assert!(!r.is_finite());
        assert!(r.t_linear.is_nan() && r.t_nonlinear.is_nan());
        assert!(r.linear().p_value.is_nan());
    }
}
