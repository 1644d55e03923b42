// =============================================================================
// ModelDiag Python Bindings
// =============================================================================
//
// Bridges the pure Rust engine in `modeldiag-core` to Python with PyO3.
// The reporting layer imports this as `modeldiag._modeldiag` and feeds it
// numpy arrays taken from prediction results.
//
// STRUCTURE:
// ----------
// - stats_py:     segment, decompose, iwco, variable_importance
// - analysis_py:  model_analysis, model_analysis_report and the parallel
//                 batch variant
//
// FOR MAINTAINERS:
// ----------------
// When adding new functionality:
// 1. Implement the logic in `modeldiag-core` first
// 2. Create a Python wrapper in the matching *_py module
// 3. Register it in the `_modeldiag` function at the bottom
//
// =============================================================================

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use modeldiag_core::ModelDiagError;

mod analysis_py;
mod stats_py;

use analysis_py::{model_analysis_batch_py, model_analysis_py, model_analysis_report_py};
use stats_py::{decompose_py, iwco_py, segment_py, variable_importance_py};

/// Every engine error surfaces in Python as ValueError.
pub(crate) fn to_py_err(e: ModelDiagError) -> PyErr {
    PyValueError::new_err(e.to_string())
}

// =============================================================================
// Module Registration
// =============================================================================

/// ModelDiag: diagnostic statistics for linear vs non-linear prediction
///
/// This is the internal Rust module. Users should import from the
/// Python wrapper: `import modeldiag`
#[pymodule]
fn _modeldiag(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Components
    m.add_function(wrap_pyfunction!(segment_py, m)?)?;
    m.add_function(wrap_pyfunction!(decompose_py, m)?)?;
    m.add_function(wrap_pyfunction!(iwco_py, m)?)?;
    m.add_function(wrap_pyfunction!(variable_importance_py, m)?)?;

    // Report
    m.add_function(wrap_pyfunction!(model_analysis_py, m)?)?;
    m.add_function(wrap_pyfunction!(model_analysis_report_py, m)?)?;
    m.add_function(wrap_pyfunction!(model_analysis_batch_py, m)?)?;

    Ok(())
}
