// =============================================================================
// Error Types
// =============================================================================
//
// One error enum for the whole engine. Two families of failure live here:
//
//   STRUCTURAL: the caller handed us inputs that can never work
//     - LengthMismatch:    vectors that should be aligned are not
//     - InvalidPercentile: cutoffs outside [0, 100] or low >= high
//
//   NUMERICAL: the inputs are fine but one particular segment cannot
//   support the statistic being asked of it
//     - EmptySegment:      the segment selected zero observations
//     - SingularMatrix:    X'X of the decomposition cannot be inverted
//     - DegenerateSample:  too few observations (e.g. N < 3 for OLS)
//
// The public functions return both kinds as errors. The report builder in
// `analysis` turns numerical errors into NaN cells and lets structural
// errors abort the call.
//
// =============================================================================

use thiserror::Error;

/// Errors raised by the diagnostic statistics engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelDiagError {
    /// Vectors that must share one index space have different lengths.
    #[error("length mismatch: {0}")]
    LengthMismatch(String),

    /// A segment selected zero observations.
    #[error("empty segment: {0}")]
    EmptySegment(String),

    /// The normal-equations determinant is (numerically) zero.
    #[error("singular matrix: {0}")]
    SingularMatrix(String),

    /// Not enough observations for the requested statistic.
    #[error("degenerate sample: {0}")]
    DegenerateSample(String),

    /// Percentile bounds are out of range or out of order.
    #[error("invalid percentile: {0}")]
    InvalidPercentile(String),
}

impl ModelDiagError {
    /// True for failures that are confined to a single segment and become
    /// NaN cells in the report rather than aborting it.
    pub fn is_numerical(&self) -> bool {
        matches!(
            self,
            ModelDiagError::EmptySegment(_)
                | ModelDiagError::SingularMatrix(_)
                | ModelDiagError::DegenerateSample(_)
        )
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ModelDiagError>;
