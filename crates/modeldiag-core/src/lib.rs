// =============================================================================
// ModelDiag Core Library
// =============================================================================
//
// Pure Rust engine behind the model diagnostic report. It answers one
// question about a fitted prediction: is its predictive power coming from a
// trivial linear signal, or from genuine non-linear structure, and does
// that hold across sub-populations (high/low prediction, high/low fit)?
//
// STRUCTURE:
// ----------
//   - stats:          mean, population std, interpolated percentiles
//   - segmentation:   High / Mid / Low index sets by percentile cutoffs
//   - decomposition:  two-regressor OLS of y_actual on linear + excess parts
//   - inference:      standard errors, t-statistics and p-values
//   - co_occurrence:  informativeness-weighted co-occurrence metric
//   - importance:     per-variable distribution of prediction weights
//   - analysis:       the four-table report built from all of the above
//   - error:          error types used throughout the library
//
// Every function is a pure, synchronous computation over borrowed inputs.
// Nothing is cached between calls, so independent calls can run on
// different threads without coordination.
//
// FOR MAINTAINERS:
// ----------------
// When adding new functionality:
//   1. Add it to the appropriate module (or create a new one)
//   2. Write tests in that module (see existing tests for examples)
//   3. Re-export public items here
//   4. Update the Python bindings in the `modeldiag` crate
//
// =============================================================================

pub mod analysis;
pub mod co_occurrence;
pub mod decomposition;
pub mod error;
pub mod importance;
pub mod inference;
pub mod segmentation;
pub mod stats;

pub use analysis::{model_analysis, AnalysisConfig, ModelAnalysisReport, Table};
pub use co_occurrence::{iwco, iwco_with_baselines, Baseline};
pub use decomposition::{decompose, DecompositionResult};
pub use error::{ModelDiagError, Result};
pub use importance::{variable_importance, VariableImportanceRow, VariableImportanceTable};
pub use segmentation::{segment, segment_subset, Segmentation, SegmentationMode};
