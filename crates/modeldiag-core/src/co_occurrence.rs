// =============================================================================
// Informativeness-Weighted Co-Occurrence
// =============================================================================
//
// A correlation-like score of how often two vectors move in the same
// direction, weighted toward observations where they are jointly extreme.
//
//     z_a = (a − mean_a) / std_a        z_b = (b − mean_b) / std_b
//
//     info_i = ½ (z_a,i² + z_b,i²)                    informativeness
//     co_i   = z_a,i · z_b,i / info_i   (0 if info_i = 0)
//     w_i    = info_i / Σ info
//
//     score  = Σ w_i · co_i
//
// The score lies in [−1, 1]: +1 when every informative point agrees in
// sign and size, −1 when they are mirror images.
//
// BASELINES
// ---------
// By default each vector is z-scored against its own mean and population
// standard deviation. Callers may instead pass the mean/std of an ENCLOSING
// population, which keeps sub-segment scores on the parent's scale. The
// formula is symmetric in (a, b), but overriding only one side's baseline
// is not, so always pass matching pairs.
//
// =============================================================================

use ndarray::ArrayView1;
use serde::Serialize;

use crate::error::{ModelDiagError, Result};
use crate::stats::{mean, std_pop};

/// Centre and scale used to z-score one vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Baseline {
    pub mean: f64,
    pub std: f64,
}

impl Baseline {
    pub fn new(mean: f64, std: f64) -> Self {
        Self { mean, std }
    }

    /// Mean and population std of `values` (NaN when empty).
    pub fn of(values: ArrayView1<f64>) -> Self {
        Self {
            mean: mean(values),
            std: std_pop(values),
        }
    }

    /// Fill whichever of `mean`/`std` is missing from `values` itself.
    pub fn resolve(values: ArrayView1<f64>, mean_override: Option<f64>, std_override: Option<f64>) -> Self {
        Self {
            mean: mean_override.unwrap_or_else(|| mean(values)),
            std: std_override.unwrap_or_else(|| std_pop(values)),
        }
    }

    #[inline]
    fn z(&self, v: f64) -> f64 {
        (v - self.mean) / self.std
    }
}

/// Co-occurrence of `a` and `b`, each z-scored against itself.
pub fn iwco(a: ArrayView1<f64>, b: ArrayView1<f64>) -> Result<f64> {
    iwco_with_baselines(a, b, Baseline::of(a), Baseline::of(b))
}

/// Co-occurrence of `a` and `b` with explicit (possibly external) baselines.
///
/// # Returns
/// The score, or NaN when total informativeness is zero or not finite
/// (empty input, single point, zero-variance baseline).
///
/// # Errors
/// `LengthMismatch` if `a` and `b` differ in length.
pub fn iwco_with_baselines(
    a: ArrayView1<f64>,
    b: ArrayView1<f64>,
    base_a: Baseline,
    base_b: Baseline,
) -> Result<f64> {
    if a.len() != b.len() {
        return Err(ModelDiagError::LengthMismatch(format!(
            "a has {} elements but b has {}",
            a.len(),
            b.len()
        )));
    }

    let mut info = Vec::with_capacity(a.len());
    let mut co = Vec::with_capacity(a.len());
    for (&va, &vb) in a.iter().zip(b.iter()) {
        let za = base_a.z(va);
        let zb = base_b.z(vb);
        let inf = 0.5 * (za * za + zb * zb);
        info.push(inf);
        co.push(if inf == 0.0 { 0.0 } else { za * zb / inf });
    }

    let total: f64 = info.iter().sum();
    if total == 0.0 || !total.is_finite() {
        return Ok(f64::NAN);
    }

    Ok(info
        .iter()
        .zip(co.iter())
        .map(|(&inf, &c)| inf / total * c)
        .sum())
}

// =============================================================================
// Tests
// =============================================================================
