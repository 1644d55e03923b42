// =============================================================================
// Model Analysis Pipeline
// =============================================================================
//
// Combines segmentation, decomposition, co-occurrence and variable
// importance into the four-table diagnostic report.
//
// POPULATIONS
// -----------
// `yhat` and `fit` are each segmented at (low_pct, high_pct). The
// "Prediction w/ Fit" rows use NESTED segmentation: `fit` is restricted to
// the High (or Low) Prediction indices and re-segmented with percentiles
// recomputed on that subset.
//
//     Full Sample
//     ├── High Fit / Mid Fit / Low Fit           (fit over the full sample)
//     ├── High Prediction
//     │   ├── High Prediction w/ High Fit        (fit within High Prediction)
//     │   └── High Prediction w/ Low Fit
//     └── Low Prediction
//         ├── Low Prediction w/ High Fit
//         └── Low Prediction w/ Low Fit
//
// CO-OCCURRENCE BASELINES
// -----------------------
// Each co-occurrence cell z-scores yhat and y_actual against the mean/std of
// the IMMEDIATELY ENCLOSING population in the tree above: Full Sample uses
// its own, High Fit / Low Fit / High Prediction / Low Prediction use the
// Full Sample's, and the "w/" rows use their Prediction branch's. The yhat
// baseline always goes with yhat and the y_actual baseline with y_actual.
//
// FAILURES
// --------
// Length mismatches, bad percentiles, ragged weight grids and non-finite
// yhat/fit values abort the call. A segment that is empty, too small or
// singular only turns its own cells into NaN (`ModelDiagError::is_numerical`).
//
// =============================================================================

mod report;

pub use report::*;

use ndarray::ArrayView1;
use serde::Serialize;
use tracing::{debug, trace};

use crate::co_occurrence::{iwco_with_baselines, Baseline};
use crate::decomposition::{decompose, DecompositionResult};
use crate::error::{ModelDiagError, Result};
use crate::importance::{stack_rows, variable_importance_matrix};
use crate::segmentation::{segment, segment_subset, validate_percentiles, Segmentation};
use crate::stats::{mean, select};

// =============================================================================
// Configuration
// =============================================================================

/// Percentile thresholds for every segmentation in the report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnalysisConfig {
    /// Values at or below this percentile are "Low".
    /// Default: 20
    pub low_pct: f64,

    /// Values at or above this percentile are "High".
    /// Default: 80
    pub high_pct: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            low_pct: 20.0,
            high_pct: 80.0,
        }
    }
}

impl AnalysisConfig {
    /// Validated configuration.
    pub fn new(low_pct: f64, high_pct: f64) -> Result<Self> {
        let config = Self { low_pct, high_pct };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        validate_percentiles(self.low_pct, self.high_pct)
    }
}

// =============================================================================
// Pipeline
// =============================================================================

/// Build the four-table diagnostic report.
///
/// # Arguments
/// * `yhat` - Combined prediction per observation
/// * `y_actual` - Observed outcome
/// * `y_linear` - Linear-only prediction
/// * `fit` - Fit quality score
/// * `weight_grid` - Per-observation variable weights, each row `labels.len()` wide
/// * `labels` - Variable names for the weight columns
/// * `config` - Percentile thresholds
///
/// # Errors
/// - `LengthMismatch` when the four vectors are not aligned or a weight row
///   has the wrong width
/// - `EmptySegment` when the vectors are empty
/// - `InvalidPercentile` for bad thresholds
/// - `DegenerateSample` when `yhat` or `fit` holds a non-finite value
pub fn model_analysis<'a, S: AsRef<str>>(
    yhat: ArrayView1<'a, f64>,
    y_actual: ArrayView1<'a, f64>,
    y_linear: ArrayView1<'a, f64>,
    fit: ArrayView1<f64>,
    weight_grid: &[Vec<f64>],
    labels: &[S],
    config: &AnalysisConfig,
) -> Result<ModelAnalysisReport> {
    // -------------------------------------------------------------------------
    // Step 0: Structural validation, all before any computation
    // -------------------------------------------------------------------------
    config.validate()?;

    let n = yhat.len();
    for (name, len) in [("y_actual", y_actual.len()), ("y_linear", y_linear.len()), ("fit", fit.len())] {
        if len != n {
            return Err(ModelDiagError::LengthMismatch(format!(
                "yhat has {} elements but {} has {}",
                n, name, len
            )));
        }
    }
    if n == 0 {
        return Err(ModelDiagError::EmptySegment("input vectors are empty".to_string()));
    }

    let grid = stack_rows(weight_grid, labels.len())?;

    // -------------------------------------------------------------------------
    // Step 1: Segment predictions and fit, then fit within each prediction tail
    // -------------------------------------------------------------------------
    let data = Columns {
        yhat,
        y_actual,
        y_linear,
    };
    let (low, high) = (config.low_pct, config.high_pct);

    let pred = segment(yhat, low, high)?;
    let fit_seg = segment(fit, low, high)?;
    let high_pred_fit = nested_segment(fit, &pred.high, low, high, HIGH_PREDICTION)?;
    let low_pred_fit = nested_segment(fit, &pred.low, low, high, LOW_PREDICTION)?;

    let cutoffs = vec![
        SegmentCutoffs::of(FULL_SAMPLE, YHAT, &pred),
        SegmentCutoffs::of(FULL_SAMPLE, FIT, &fit_seg),
        SegmentCutoffs::of(HIGH_PREDICTION, FIT, &high_pred_fit),
        SegmentCutoffs::of(LOW_PREDICTION, FIT, &low_pred_fit),
    ];

    let full: Vec<usize> = (0..n).collect();

    // -------------------------------------------------------------------------
    // Step 2: Mean outcome per population
    // -------------------------------------------------------------------------
    let mut y_actual_means = SegmentTable::new("y_actual Mean");
    for (label, idx) in [
        (FULL_SAMPLE, &full),
        (HIGH_PREDICTION, &pred.high),
        (HIGH_PREDICTION_HIGH_FIT, &high_pred_fit.high),
        (HIGH_PREDICTION_LOW_FIT, &high_pred_fit.low),
        (LOW_PREDICTION, &pred.low),
        (LOW_PREDICTION_HIGH_FIT, &low_pred_fit.high),
        (LOW_PREDICTION_LOW_FIT, &low_pred_fit.low),
    ] {
        y_actual_means.push(label, data.mean_actual(idx), idx.len());
    }

    // -------------------------------------------------------------------------
    // Step 3: Co-occurrence, z-scored against the enclosing population
    // -------------------------------------------------------------------------
    let full_base = data.baselines(&full);
    let high_pred_base = data.baselines(&pred.high);
    let low_pred_base = data.baselines(&pred.low);

    let mut co_occurrence = SegmentTable::new("Informativeness Weighted Co-Occurrence");
    for (label, idx, base) in [
        (FULL_SAMPLE, &full, full_base),
        (HIGH_FIT, &fit_seg.high, full_base),
        (LOW_FIT, &fit_seg.low, full_base),
        (HIGH_PREDICTION, &pred.high, full_base),
        (HIGH_PREDICTION_HIGH_FIT, &high_pred_fit.high, high_pred_base),
        (HIGH_PREDICTION_LOW_FIT, &high_pred_fit.low, high_pred_base),
        (LOW_PREDICTION, &pred.low, full_base),
        (LOW_PREDICTION_HIGH_FIT, &low_pred_fit.high, low_pred_base),
        (LOW_PREDICTION_LOW_FIT, &low_pred_fit.low, low_pred_base),
    ] {
        co_occurrence.push(label, data.co_occurrence(label, idx, base)?, idx.len());
    }

    // -------------------------------------------------------------------------
    // Step 4: Linear / excess decomposition per fit segment
    // -------------------------------------------------------------------------
    let segments = [
        (FULL_SAMPLE, &full),
        (HIGH_FIT, &fit_seg.high),
        (MID_FIT, &fit_seg.mid),
        (LOW_FIT, &fit_seg.low),
    ]
    .into_iter()
    .map(|(label, idx)| {
        let result = data.decompose(label, idx)?;
        Ok(SegmentDecomposition {
            label: label.to_string(),
            count: idx.len(),
            stars: result.stars(),
            result,
        })
    })
    .collect::<Result<Vec<_>>>()?;
    let betas_and_t_stats = DecompositionTable { segments };

    // -------------------------------------------------------------------------
    // Step 5: Variable importance over the whole grid
    // -------------------------------------------------------------------------
    let variable_importance = variable_importance_matrix(grid.view(), labels)?;

    Ok(ModelAnalysisReport {
        config: *config,
        cutoffs,
        y_actual_means,
        co_occurrence,
        betas_and_t_stats,
        variable_importance,
    })
}

/// Re-segment `fit` inside `parent`. An empty parent gives an empty
/// segmentation so every dependent cell becomes NaN.
fn nested_segment(
    fit: ArrayView1<f64>,
    parent: &[usize],
    low: f64,
    high: f64,
    parent_label: &str,
) -> Result<Segmentation> {
    match segment_subset(fit, parent, low, high) {
        Ok(seg) => {
            trace!(
                parent = parent_label,
                high = seg.high.len(),
                mid = seg.mid.len(),
                low = seg.low.len(),
                "nested fit segmentation"
            );
            Ok(seg)
        }
        Err(e) if e.is_numerical() => {
            debug!(parent = parent_label, error = %e, "nested fit segmentation degenerated");
            Ok(Segmentation::empty())
        }
        Err(e) => Err(e),
    }
}

/// The aligned input vectors, with per-segment cell computations.
struct Columns<'a> {
    yhat: ArrayView1<'a, f64>,
    y_actual: ArrayView1<'a, f64>,
    y_linear: ArrayView1<'a, f64>,
}

impl Columns<'_> {
    fn mean_actual(&self, idx: &[usize]) -> f64 {
        mean(select(self.y_actual, idx).view())
    }

    /// (yhat, y_actual) baselines over `idx`.
    fn baselines(&self, idx: &[usize]) -> (Baseline, Baseline) {
        (
            Baseline::of(select(self.yhat, idx).view()),
            Baseline::of(select(self.y_actual, idx).view()),
        )
    }

    fn co_occurrence(
        &self,
        label: &str,
        idx: &[usize],
        (base_yhat, base_actual): (Baseline, Baseline),
    ) -> Result<f64> {
        let a = select(self.yhat, idx);
        let b = select(self.y_actual, idx);
        let score = iwco_with_baselines(a.view(), b.view(), base_yhat, base_actual)?;
        if score.is_nan() {
            debug!(segment = label, n = idx.len(), "co-occurrence has zero informativeness");
        }
        Ok(score)
    }

    /// Decomposition over `idx`; segment-local failures become the NaN
    /// sentinel, anything else propagates.
    fn decompose(&self, label: &str, idx: &[usize]) -> Result<DecompositionResult> {
        let outcome = if idx.is_empty() {
            Err(ModelDiagError::EmptySegment(format!("{} selects no observations", label)))
        } else {
            let yhat = select(self.yhat, idx);
            let y_linear = select(self.y_linear, idx);
            let y_actual = select(self.y_actual, idx);
            decompose(yhat.view(), y_linear.view(), y_actual.view())
        };
        match outcome {
            Ok(result) => Ok(result),
            Err(e) if e.is_numerical() => {
                debug!(segment = label, error = %e, "decomposition degenerated");
                Ok(DecompositionResult::nan())
            }
            Err(e) => Err(e),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
