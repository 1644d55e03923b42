// =============================================================================
// Report Tables
// =============================================================================
//
// The four tables produced by `model_analysis`, in their fixed order:
//
//   0. y_actual_means               mean outcome per population
//   1. info_weighted_co_occurrence  c(yhat, y_actual) per population
//   2. betas_and_t_statistics       decomposition per fit segment
//   3. variable_importance          weight distribution per variable
//
// Renderers address rows by label ("Full Sample", "High Prediction w/ High
// Fit", ...) and rely on the order above. Cells that could not be computed
// hold NaN, which serializes to JSON `null`. The report also keeps the
// percentile cutoffs of every segmentation so they can be printed beside
// the rows they produced.
//
// =============================================================================

use serde::Serialize;

use super::AnalysisConfig;
use crate::decomposition::DecompositionResult;
use crate::importance::VariableImportanceTable;
use crate::segmentation::Segmentation;

pub const FULL_SAMPLE: &str = "Full Sample";
pub const HIGH_FIT: &str = "High Fit";
pub const MID_FIT: &str = "Mid Fit";
pub const LOW_FIT: &str = "Low Fit";
pub const HIGH_PREDICTION: &str = "High Prediction";
pub const HIGH_PREDICTION_HIGH_FIT: &str = "High Prediction w/ High Fit";
pub const HIGH_PREDICTION_LOW_FIT: &str = "High Prediction w/ Low Fit";
pub const LOW_PREDICTION: &str = "Low Prediction";
pub const LOW_PREDICTION_HIGH_FIT: &str = "Low Prediction w/ High Fit";
pub const LOW_PREDICTION_LOW_FIT: &str = "Low Prediction w/ Low Fit";

pub const LINEAR_COMPONENT: &str = "Linear Component";
pub const EXCESS_COMPONENT: &str = "Excess Component";

pub const YHAT: &str = "yhat";
pub const FIT: &str = "fit";

/// Cutoffs of one segmentation: `variable` split within `population`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentCutoffs {
    pub population: String,
    pub variable: String,
    pub low_cutoff: f64,
    pub high_cutoff: f64,
}

impl SegmentCutoffs {
    pub(crate) fn of(population: &str, variable: &str, seg: &Segmentation) -> Self {
        Self {
            population: population.to_string(),
            variable: variable.to_string(),
            low_cutoff: seg.low_cutoff,
            high_cutoff: seg.high_cutoff,
        }
    }
}

/// One labelled population and its statistic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentRow {
    pub label: String,
    pub value: f64,
    /// Observations in the population.
    pub count: usize,
}

/// Single-statistic table keyed by population label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentTable {
    pub statistic: String,
    pub rows: Vec<SegmentRow>,
}

impl SegmentTable {
    pub(crate) fn new(statistic: &str) -> Self {
        Self {
            statistic: statistic.to_string(),
            rows: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, label: &str, value: f64, count: usize) {
        self.rows.push(SegmentRow {
            label: label.to_string(),
            value,
            count,
        });
    }

    /// Value for `label`, if the row exists.
    pub fn get(&self, label: &str) -> Option<f64> {
        self.row(label).map(|r| r.value)
    }

    pub fn row(&self, label: &str) -> Option<&SegmentRow> {
        self.rows.iter().find(|r| r.label == label)
    }

    pub fn labels(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.label.as_str()).collect()
    }
}

/// Decomposition of one fit segment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentDecomposition {
    pub label: String,
    pub count: usize,
    /// Significance codes for (linear, excess).
    pub stars: [&'static str; 2],
    pub result: DecompositionResult,
}

/// Betas and t-statistics: rows {Beta, T-Statistic}, one
/// (Linear Component, Excess Component) column pair per segment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecompositionTable {
    pub segments: Vec<SegmentDecomposition>,
}

impl DecompositionTable {
    pub fn get(&self, label: &str) -> Option<&DecompositionResult> {
        self.segments
            .iter()
            .find(|s| s.label == label)
            .map(|s| &s.result)
    }

    /// (segment, component) header for every column, left to right.
    pub fn column_headers(&self) -> Vec<(&str, &'static str)> {
        self.segments
            .iter()
            .flat_map(|s| [(s.label.as_str(), LINEAR_COMPONENT), (s.label.as_str(), EXCESS_COMPONENT)])
            .collect()
    }

    /// The "Beta" row, aligned with `column_headers`.
    pub fn beta_row(&self) -> Vec<f64> {
        self.segments
            .iter()
            .flat_map(|s| [s.result.beta_linear, s.result.beta_nonlinear])
            .collect()
    }

    /// The "T-Statistic" row, aligned with `column_headers`.
    pub fn t_row(&self) -> Vec<f64> {
        self.segments
            .iter()
            .flat_map(|s| [s.result.t_linear, s.result.t_nonlinear])
            .collect()
    }

    /// Two-tailed p-values, aligned with `column_headers`.
    pub fn p_row(&self) -> Vec<f64> {
        self.segments
            .iter()
            .flat_map(|s| [s.result.p_linear, s.result.p_nonlinear])
            .collect()
    }

    /// Significance codes, aligned with `column_headers`.
    pub fn stars_row(&self) -> Vec<&'static str> {
        self.segments.iter().flat_map(|s| s.stars).collect()
    }
}

/// A report table tagged with its kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Table {
    YActualMeans(SegmentTable),
    CoOccurrence(SegmentTable),
    BetasAndTStats(DecompositionTable),
    VariableImportance(VariableImportanceTable),
}

impl Table {
    /// Sheet name used by the report renderers.
    pub fn name(&self) -> &'static str {
        match self {
            Table::YActualMeans(_) => "y_actual_means",
            Table::CoOccurrence(_) => "info_weighted_co_occurrence",
            Table::BetasAndTStats(_) => "betas_and_t_statistics",
            Table::VariableImportance(_) => "variable_importance",
        }
    }
}

/// The complete diagnostic report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelAnalysisReport {
    pub config: AnalysisConfig,
    /// yhat over the full sample, fit over the full sample, then fit within
    /// High Prediction and within Low Prediction.
    pub cutoffs: Vec<SegmentCutoffs>,
    pub y_actual_means: SegmentTable,
    pub co_occurrence: SegmentTable,
    pub betas_and_t_stats: DecompositionTable,
    pub variable_importance: VariableImportanceTable,
}

impl ModelAnalysisReport {
    /// The four tables in their fixed order.
    pub fn into_tables(self) -> [Table; 4] {
        [
            Table::YActualMeans(self.y_actual_means),
            Table::CoOccurrence(self.co_occurrence),
            Table::BetasAndTStats(self.betas_and_t_stats),
            Table::VariableImportance(self.variable_importance),
        ]
    }

    /// Cutoffs used to split `variable` within `population`.
    pub fn cutoffs_for(&self, population: &str, variable: &str) -> Option<&SegmentCutoffs> {
        self.cutoffs
            .iter()
            .find(|c| c.population == population && c.variable == variable)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
