// =============================================================================
// Model Analysis Bindings
// =============================================================================
//
// `model_analysis` returns the four report tables as plain Python objects
// in their fixed order:
//
//   [y_actual_means, info_weighted_co_occurrence,
//    betas_and_t_statistics, variable_importance]
//
// The two segment tables are {label: value} dicts, the betas table is
// {"Beta" | "T-Statistic" | "P-Value" | "Significance":
//  {(segment, component): value}}, and variable importance is a list of row
// dicts. NaN cells stay NaN.
//
// `model_analysis_report` wraps the same tables in a dict together with the
// per-row observation counts and the percentile cutoffs of every
// segmentation, for renderers that print them beside each row.
//
// `model_analysis_batch` runs many independent analyses across threads
// with the GIL released.
// =============================================================================

use ndarray::Array1;
use numpy::PyReadonlyArray1;
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};
use rayon::prelude::*;
use tracing::debug;

use modeldiag_core::analysis::{
    model_analysis, AnalysisConfig, DecompositionTable, ModelAnalysisReport, SegmentTable,
};
use modeldiag_core::importance::VariableImportanceTable;
use modeldiag_core::Result as CoreResult;

use crate::to_py_err;

/// Run the full diagnostic report.
///
/// # Arguments
/// * `yhat`, `y_actual`, `y_linear`, `fit` - Aligned per-observation vectors
/// * `weight_grid` - One row of variable weights per observation
/// * `labels` - Variable names, one per weight column
/// * `low_pct`, `high_pct` - Percentile cutoffs (default 20 / 80)
#[pyfunction]
#[pyo3(name = "model_analysis", signature = (yhat, y_actual, y_linear, fit, weight_grid, labels, low_pct=20.0, high_pct=80.0))]
#[allow(clippy::too_many_arguments)]
pub fn model_analysis_py<'py>(
    py: Python<'py>,
    yhat: PyReadonlyArray1<'py, f64>,
    y_actual: PyReadonlyArray1<'py, f64>,
    y_linear: PyReadonlyArray1<'py, f64>,
    fit: PyReadonlyArray1<'py, f64>,
    weight_grid: Vec<Vec<f64>>,
    labels: Vec<String>,
    low_pct: f64,
    high_pct: f64,
) -> PyResult<Bound<'py, PyList>> {
    let config = AnalysisConfig::new(low_pct, high_pct).map_err(to_py_err)?;
    let report = model_analysis(
        yhat.as_array(),
        y_actual.as_array(),
        y_linear.as_array(),
        fit.as_array(),
        &weight_grid,
        &labels,
        &config,
    )
    .map_err(to_py_err)?;
    report_to_py(py, &report)
}

/// Run the diagnostic report and keep its counts and cutoffs.
///
/// # Returns
/// Dict with
/// * `tables` - the same four-table list `model_analysis` returns
/// * `counts` - {sheet name: {label: observations}} for the segment and
///   betas tables
/// * `cutoffs` - list of {population, variable, low_cutoff, high_cutoff}
#[pyfunction]
#[pyo3(name = "model_analysis_report", signature = (yhat, y_actual, y_linear, fit, weight_grid, labels, low_pct=20.0, high_pct=80.0))]
#[allow(clippy::too_many_arguments)]
pub fn model_analysis_report_py<'py>(
    py: Python<'py>,
    yhat: PyReadonlyArray1<'py, f64>,
    y_actual: PyReadonlyArray1<'py, f64>,
    y_linear: PyReadonlyArray1<'py, f64>,
    fit: PyReadonlyArray1<'py, f64>,
    weight_grid: Vec<Vec<f64>>,
    labels: Vec<String>,
    low_pct: f64,
    high_pct: f64,
) -> PyResult<Bound<'py, PyDict>> {
    let config = AnalysisConfig::new(low_pct, high_pct).map_err(to_py_err)?;
    let report = model_analysis(
        yhat.as_array(),
        y_actual.as_array(),
        y_linear.as_array(),
        fit.as_array(),
        &weight_grid,
        &labels,
        &config,
    )
    .map_err(to_py_err)?;

    let counts = PyDict::new_bound(py);
    counts.set_item("y_actual_means", segment_counts(py, &report.y_actual_means)?)?;
    counts.set_item("info_weighted_co_occurrence", segment_counts(py, &report.co_occurrence)?)?;
    let betas = PyDict::new_bound(py);
    for s in &report.betas_and_t_stats.segments {
        betas.set_item(&s.label, s.count)?;
    }
    counts.set_item("betas_and_t_statistics", betas)?;

    let cutoffs = report
        .cutoffs
        .iter()
        .map(|c| {
            let dict = PyDict::new_bound(py);
            dict.set_item("population", &c.population)?;
            dict.set_item("variable", &c.variable)?;
            dict.set_item("low_cutoff", c.low_cutoff)?;
            dict.set_item("high_cutoff", c.high_cutoff)?;
            Ok(dict.into_py(py))
        })
        .collect::<PyResult<Vec<PyObject>>>()?;

    let dict = PyDict::new_bound(py);
    dict.set_item("tables", report_to_py(py, &report)?)?;
    dict.set_item("counts", counts)?;
    dict.set_item("cutoffs", cutoffs)?;
    Ok(dict)
}

/// One run's inputs: (yhat, y_actual, y_linear, fit, weight_grid).
type RunInputs = (Array1<f64>, Array1<f64>, Array1<f64>, Array1<f64>, Vec<Vec<f64>>);

/// Run `model_analysis` for many prediction runs in parallel.
///
/// Each element of `runs` is a (yhat, y_actual, y_linear, fit, weight_grid)
/// tuple; all runs share `labels` and the percentile cutoffs. Any failing
/// run raises ValueError for the whole batch.
#[pyfunction]
#[pyo3(name = "model_analysis_batch", signature = (runs, labels, low_pct=20.0, high_pct=80.0))]
pub fn model_analysis_batch_py<'py>(
    py: Python<'py>,
    runs: Vec<(
        PyReadonlyArray1<'py, f64>,
        PyReadonlyArray1<'py, f64>,
        PyReadonlyArray1<'py, f64>,
        PyReadonlyArray1<'py, f64>,
        Vec<Vec<f64>>,
    )>,
    labels: Vec<String>,
    low_pct: f64,
    high_pct: f64,
) -> PyResult<Vec<Bound<'py, PyList>>> {
    let config = AnalysisConfig::new(low_pct, high_pct).map_err(to_py_err)?;

    // Copy out of numpy while we still hold the GIL
    let owned: Vec<RunInputs> = runs
        .into_iter()
        .map(|(yhat, y_actual, y_linear, fit, grid)| {
            (
                yhat.as_array().to_owned(),
                y_actual.as_array().to_owned(),
                y_linear.as_array().to_owned(),
                fit.as_array().to_owned(),
                grid,
            )
        })
        .collect();

    debug!(runs = owned.len(), "starting batch model analysis");

    let reports: CoreResult<Vec<ModelAnalysisReport>> = py.allow_threads(|| {
        owned
            .par_iter()
            .map(|(yhat, y_actual, y_linear, fit, grid)| {
                model_analysis(
                    yhat.view(),
                    y_actual.view(),
                    y_linear.view(),
                    fit.view(),
                    grid,
                    &labels,
                    &config,
                )
            })
            .collect()
    });

    reports
        .map_err(to_py_err)?
        .iter()
        .map(|report| report_to_py(py, report))
        .collect()
}

// =============================================================================
// Report → Python conversion
// =============================================================================

fn report_to_py<'py>(py: Python<'py>, report: &ModelAnalysisReport) -> PyResult<Bound<'py, PyList>> {
    let tables: Vec<PyObject> = vec![
        segment_table(py, &report.y_actual_means)?.into_py(py),
        segment_table(py, &report.co_occurrence)?.into_py(py),
        decomposition_table(py, &report.betas_and_t_stats)?.into_py(py),
        importance_rows(py, &report.variable_importance)?.into_py(py),
    ];
    Ok(PyList::new_bound(py, tables))
}

fn segment_table<'py>(py: Python<'py>, table: &SegmentTable) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new_bound(py);
    for row in &table.rows {
        dict.set_item(&row.label, row.value)?;
    }
    Ok(dict)
}

fn segment_counts<'py>(py: Python<'py>, table: &SegmentTable) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new_bound(py);
    for row in &table.rows {
        dict.set_item(&row.label, row.count)?;
    }
    Ok(dict)
}

fn decomposition_table<'py>(py: Python<'py>, table: &DecompositionTable) -> PyResult<Bound<'py, PyDict>> {
    let headers = table.column_headers();
    let beta = PyDict::new_bound(py);
    let t_stat = PyDict::new_bound(py);
    let p_value = PyDict::new_bound(py);
    let stars = PyDict::new_bound(py);
    let (betas, ts, ps, codes) = (table.beta_row(), table.t_row(), table.p_row(), table.stars_row());
    for (i, header) in headers.iter().enumerate() {
        beta.set_item(*header, betas[i])?;
        t_stat.set_item(*header, ts[i])?;
        p_value.set_item(*header, ps[i])?;
        stars.set_item(*header, codes[i])?;
    }

    let dict = PyDict::new_bound(py);
    dict.set_item("Beta", beta)?;
    dict.set_item("T-Statistic", t_stat)?;
    dict.set_item("P-Value", p_value)?;
    dict.set_item("Significance", stars)?;
    Ok(dict)
}

pub(crate) fn importance_rows(py: Python<'_>, table: &VariableImportanceTable) -> PyResult<Vec<PyObject>> {
    table
        .rows
        .iter()
        .map(|row| {
            let dict = PyDict::new_bound(py);
            dict.set_item("label", &row.label)?;
            dict.set_item("median", row.median)?;
            dict.set_item("std_dev", row.std_dev)?;
            dict.set_item("p5", row.p5)?;
            dict.set_item("p20", row.p20)?;
            dict.set_item("p50", row.p50)?;
            dict.set_item("p80", row.p80)?;
            dict.set_item("p95", row.p95)?;
            Ok(dict.into_py(py))
        })
        .collect()
}
