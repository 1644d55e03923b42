// =============================================================================
// Coefficient Inference
// =============================================================================
//
// Significance testing for the two decomposition coefficients.
//
// For each coefficient b with estimated variance Var(b) (a diagonal entry of
// σ² (X'X)⁻¹) we report:
//
//     se = √Var(b)
//     t  = b / se
//     p  = 2 · P(T_df > |t|)          T_df ~ Student's t, df = N − 2
//
// A large |t| on the excess component means the non-linear part of the
// prediction carries signal the linear part does not. A large |t| on the
// linear component alone means the model mostly restates a linear fit.
//
// =============================================================================

use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Two-tailed p-value of `t` under Student's t with `df` degrees of freedom.
///
/// NaN for non-positive df or a NaN statistic; 0 for an infinite statistic
/// (a perfect fit).
pub fn t_pvalue(t: f64, df: f64) -> f64 {
    if t.is_nan() || df.is_nan() || df <= 0.0 {
        return f64::NAN;
    }
    if t.is_infinite() {
        return 0.0;
    }
    match StudentsT::new(0.0, 1.0, df) {
        Ok(dist) => 2.0 * dist.sf(t.abs()),
        Err(_) => f64::NAN,
    }
}

/// Significance code for a p-value, as printed next to t-statistics.
///
/// `***` p < 0.001, `**` p < 0.01, `*` p < 0.05, `.` p < 0.1, otherwise
/// empty. NaN maps to empty.
pub fn significance_stars(p: f64) -> &'static str {
    match p {
        p if p < 0.001 => "***",
        p if p < 0.01 => "**",
        p if p < 0.05 => "*",
        p if p < 0.1 => ".",
        _ => "",
    }
}

/// Estimate, standard error, t-statistic and p-value of one coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CoefficientTest {
    pub estimate: f64,
    pub std_error: f64,
    pub t_stat: f64,
    pub p_value: f64,
}

impl CoefficientTest {
    /// Build from an estimate, its variance and the residual df.
    pub fn new(estimate: f64, variance: f64, df: f64) -> Self {
        let std_error = variance.sqrt();
        let t_stat = estimate / std_error;
        Self {
            estimate,
            std_error,
            t_stat,
            p_value: t_pvalue(t_stat, df),
        }
    }

    /// All fields NaN.
    pub fn nan() -> Self {
        Self {
            estimate: f64::NAN,
            std_error: f64::NAN,
            t_stat: f64::NAN,
            p_value: f64::NAN,
        }
    }

    pub fn stars(&self) -> &'static str {
        significance_stars(self.p_value)
    }
}
