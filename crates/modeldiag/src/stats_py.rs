// =============================================================================
// Component Bindings
// =============================================================================
//
// PyO3 wrappers for the individual engine components: segmentation,
// decomposition, co-occurrence and variable importance.
// =============================================================================

use numpy::PyReadonlyArray1;
use pyo3::prelude::*;
use pyo3::types::PyDict;

use modeldiag_core::co_occurrence::{iwco_with_baselines, Baseline};
use modeldiag_core::decomposition::decompose;
use modeldiag_core::importance::variable_importance;
use modeldiag_core::segmentation::{segment_with_mode, SegmentationMode};

use crate::to_py_err;

/// Split values into (high, mid, low) index lists by percentile cutoffs.
///
/// Ties at a cutoff are included in high/low and excluded from mid, so the
/// three lists can overlap. Pass `strict=True` for an exact partition.
#[pyfunction]
#[pyo3(name = "segment", signature = (values, low_pct=20.0, high_pct=80.0, strict=false))]
pub fn segment_py(
    values: PyReadonlyArray1<f64>,
    low_pct: f64,
    high_pct: f64,
    strict: bool,
) -> PyResult<(Vec<usize>, Vec<usize>, Vec<usize>)> {
    let mode = if strict {
        SegmentationMode::StrictPartition
    } else {
        SegmentationMode::TieInclusive
    };
    let s = segment_with_mode(values.as_array(), low_pct, high_pct, mode).map_err(to_py_err)?;
    Ok((s.high, s.mid, s.low))
}

/// Regress y_actual on the linear and excess parts of yhat.
///
/// # Returns
/// Dict with beta_linear, beta_nonlinear, t_linear, t_nonlinear,
/// se_linear, se_nonlinear, p_linear, p_nonlinear, df
#[pyfunction]
#[pyo3(name = "decompose")]
pub fn decompose_py<'py>(
    py: Python<'py>,
    yhat: PyReadonlyArray1<'py, f64>,
    y_linear: PyReadonlyArray1<'py, f64>,
    y_actual: PyReadonlyArray1<'py, f64>,
) -> PyResult<Bound<'py, PyDict>> {
    let r = decompose(yhat.as_array(), y_linear.as_array(), y_actual.as_array()).map_err(to_py_err)?;

    let dict = PyDict::new_bound(py);
    dict.set_item("beta_linear", r.beta_linear)?;
    dict.set_item("beta_nonlinear", r.beta_nonlinear)?;
    dict.set_item("t_linear", r.t_linear)?;
    dict.set_item("t_nonlinear", r.t_nonlinear)?;
    dict.set_item("se_linear", r.se_linear)?;
    dict.set_item("se_nonlinear", r.se_nonlinear)?;
    dict.set_item("p_linear", r.p_linear)?;
    dict.set_item("p_nonlinear", r.p_nonlinear)?;
    dict.set_item("df", r.df)?;
    Ok(dict)
}

/// Informativeness-weighted co-occurrence of a and b.
///
/// Any mean/std left as None is computed from the vector itself.
#[pyfunction]
#[pyo3(name = "iwco", signature = (a, b, mean_a=None, std_a=None, mean_b=None, std_b=None))]
pub fn iwco_py(
    a: PyReadonlyArray1<f64>,
    b: PyReadonlyArray1<f64>,
    mean_a: Option<f64>,
    std_a: Option<f64>,
    mean_b: Option<f64>,
    std_b: Option<f64>,
) -> PyResult<f64> {
    let a = a.as_array();
    let b = b.as_array();
    iwco_with_baselines(
        a,
        b,
        Baseline::resolve(a, mean_a, std_a),
        Baseline::resolve(b, mean_b, std_b),
    )
    .map_err(to_py_err)
}

/// Per-variable median, std and percentiles of a weight grid.
///
/// # Returns
/// List of dicts sorted by descending median
#[pyfunction]
#[pyo3(name = "variable_importance")]
pub fn variable_importance_py(
    py: Python<'_>,
    weight_grid: Vec<Vec<f64>>,
    labels: Vec<String>,
) -> PyResult<Vec<PyObject>> {
    let table = variable_importance(&weight_grid, &labels).map_err(to_py_err)?;
    crate::analysis_py::importance_rows(py, &table)
}
