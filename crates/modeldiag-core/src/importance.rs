// =============================================================================
// Variable Importance
// =============================================================================
//
// Every prediction carries a vector of weights, one per input variable,
// describing how much that variable mattered for that observation. Stacking
// these rows gives an (R × V) grid; this module summarises each column:
//
//     median, population std, and the 5th / 20th / 50th / 80th / 95th
//     percentiles (same interpolation rule as segmentation)
//
// Rows of the output table are sorted by descending median, so the
// variables that matter most for a typical observation come first.
//
// =============================================================================

use ndarray::{Array2, ArrayView2, Axis};
use serde::Serialize;
use std::cmp::Ordering;

use crate::error::{ModelDiagError, Result};
use crate::stats::{percentile_sorted, sorted, std_pop};

/// Distribution summary for one variable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableImportanceRow {
    pub label: String,
    pub median: f64,
    pub std_dev: f64,
    pub p5: f64,
    pub p20: f64,
    pub p50: f64,
    pub p80: f64,
    pub p95: f64,
}

/// Rows sorted by descending median.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct VariableImportanceTable {
    pub rows: Vec<VariableImportanceRow>,
}

impl VariableImportanceTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Labels in table order.
    pub fn labels(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.label.as_str()).collect()
    }

    pub fn get(&self, label: &str) -> Option<&VariableImportanceRow> {
        self.rows.iter().find(|r| r.label == label)
    }
}

/// Stack per-observation weight rows into an (R × width) matrix.
///
/// # Errors
/// `LengthMismatch` if any row's length differs from `width`.
pub fn stack_rows(rows: &[Vec<f64>], width: usize) -> Result<Array2<f64>> {
    let mut flat = Vec::with_capacity(rows.len() * width);
    for (r, row) in rows.iter().enumerate() {
        if row.len() != width {
            return Err(ModelDiagError::LengthMismatch(format!(
                "weight row {} has {} entries but there are {} labels",
                r,
                row.len(),
                width
            )));
        }
        flat.extend_from_slice(row);
    }
    Array2::from_shape_vec((rows.len(), width), flat)
        .map_err(|e| ModelDiagError::LengthMismatch(e.to_string()))
}

/// Summarise a grid of weight rows, one output row per label.
///
/// An empty grid yields an empty table.
pub fn variable_importance<S: AsRef<str>>(
    weight_grid: &[Vec<f64>],
    labels: &[S],
) -> Result<VariableImportanceTable> {
    let grid = stack_rows(weight_grid, labels.len())?;
    variable_importance_matrix(grid.view(), labels)
}

/// Same as [`variable_importance`] for an already-stacked (R × V) matrix.
pub fn variable_importance_matrix<S: AsRef<str>>(
    grid: ArrayView2<f64>,
    labels: &[S],
) -> Result<VariableImportanceTable> {
    if grid.ncols() != labels.len() {
        return Err(ModelDiagError::LengthMismatch(format!(
            "weight grid has {} columns but there are {} labels",
            grid.ncols(),
            labels.len()
        )));
    }
    if grid.nrows() == 0 {
        return Ok(VariableImportanceTable::default());
    }

    let mut rows: Vec<VariableImportanceRow> = grid
        .axis_iter(Axis(1))
        .zip(labels.iter())
        .map(|(column, label)| {
            let order = sorted(column);
            let p = |q: f64| percentile_sorted(&order, q);
            VariableImportanceRow {
                label: label.as_ref().to_string(),
                median: p(50.0),
                std_dev: std_pop(column),
                p5: p(5.0),
                p20: p(20.0),
                p50: p(50.0),
                p80: p(80.0),
                p95: p(95.0),
            }
        })
        .collect();

    // Stable: equal medians keep label order; NaN medians sink to the bottom
    rows.sort_by(|a, b| match (a.median.is_nan(), b.median.is_nan()) {
        (false, false) => b.median.partial_cmp(&a.median).unwrap_or(Ordering::Equal),
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (true, true) => Ordering::Equal,
    });

    Ok(VariableImportanceTable { rows })
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_identical_rows() {
        let grid = vec![vec![0.1, 0.2, 0.7]; 5];
        let table = variable_importance(&grid, &["x1", "x2", "x3"]).unwrap();

        assert_eq!(table.labels(), vec!["x3", "x2", "x1"]);
        for row in &table.rows {
            assert_abs_diff_eq!(row.std_dev, 0.0, epsilon = 1e-15);
        }
        assert_abs_diff_eq!(table.get("x3").unwrap().median, 0.7, epsilon = 1e-15);
        assert_abs_diff_eq!(table.get("x2").unwrap().median, 0.2, epsilon = 1e-15);
        assert_abs_diff_eq!(table.get("x1").unwrap().median, 0.1, epsilon = 1e-15);
    }

    #[test]
    fn test_percentiles_and_spread() {
        let grid = vec![
            vec![0.1, 0.5, 0.4],
            vec![0.3, 0.3, 0.4],
            vec![0.2, 0.6, 0.2],
            vec![0.0, 0.4, 0.6],
        ];
        let table = variable_importance(&grid, &["a", "b", "c"]).unwrap();
        assert_eq!(table.labels(), vec!["b", "c", "a"]);

        let a = table.get("a").unwrap();
        assert_abs_diff_eq!(a.median, 0.15, epsilon = 1e-12);
        assert_abs_diff_eq!(a.std_dev, 0.11180339887498948, epsilon = 1e-12);
        assert_abs_diff_eq!(a.p5, 0.015, epsilon = 1e-12);
        assert_abs_diff_eq!(a.p20, 0.06, epsilon = 1e-12);
        assert_abs_diff_eq!(a.p80, 0.24, epsilon = 1e-12);
        assert_abs_diff_eq!(a.p95, 0.285, epsilon = 1e-12);

        let c = table.get("c").unwrap();
        assert_abs_diff_eq!(c.std_dev, 0.1414213562373095, epsilon = 1e-12);
        assert_abs_diff_eq!(c.p95, 0.57, epsilon = 1e-12);
    }

    #[test]
    fn test_equal_medians_keep_label_order() {
        let grid = vec![vec![0.5, 0.5, 0.9]];
        let table = variable_importance(&grid, &["first", "second", "top"]).unwrap();
        assert_eq!(table.labels(), vec!["top", "first", "second"]);
    }

    #[test]
    fn test_empty_grid() {
        let grid: Vec<Vec<f64>> = Vec::new();
        let table = variable_importance(&grid, &["x1", "x2"]).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_ragged_row_rejected() {
        let grid = vec![vec![0.1, 0.9], vec![0.2]];
        let err = variable_importance(&grid, &["x1", "x2"]).unwrap_err();
        assert!(matches!(err, ModelDiagError::LengthMismatch(_)));
    }
}
