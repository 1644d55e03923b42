// =============================================================================
// Percentile Segmentation
// =============================================================================
//
// Splits a vector into High / Mid / Low index sets by comparing every value
// against two percentile cutoffs:
//
//     High = { i : v[i] ≥ high_cutoff }
//     Low  = { i : v[i] ≤ low_cutoff }
//     Mid  = { i : low_cutoff < v[i] < high_cutoff }
//
// BOUNDARY TIES
// -------------
// Ties at a cutoff go to High/Low and never to Mid. When both cutoffs are
// equal (e.g. a constant vector) an index can sit in High AND Low at once,
// so the three sets are not a partition. Historical reports were validated
// against exactly this behaviour, so it is the default. The opt-in
// `SegmentationMode::StrictPartition` assigns every index to exactly one set.
//
// Index sets are returned in ascending order and always refer to the index
// space of the vector that was passed in (also for `segment_subset`).
//
// =============================================================================

use ndarray::ArrayView1;
use serde::Serialize;
use tracing::trace;

use crate::error::{ModelDiagError, Result};
use crate::stats::{percentile_sorted, select, sorted};

/// How boundary ties are assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SegmentationMode {
    /// High and Low both include ties; sets may overlap.
    #[default]
    TieInclusive,
    /// Every index lands in exactly one set. High wins over Low, Low over Mid.
    StrictPartition,
}

/// Result of segmenting one vector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segmentation {
    pub high: Vec<usize>,
    pub mid: Vec<usize>,
    pub low: Vec<usize>,
    /// Value at `low_pct`; NaN for an empty segmentation.
    pub low_cutoff: f64,
    /// Value at `high_pct`; NaN for an empty segmentation.
    pub high_cutoff: f64,
}

impl Segmentation {
    /// Segmentation that selects nothing. Used when the parent population
    /// is itself empty so that downstream cells degrade to NaN.
    pub fn empty() -> Self {
        Self {
            high: Vec::new(),
            mid: Vec::new(),
            low: Vec::new(),
            low_cutoff: f64::NAN,
            high_cutoff: f64::NAN,
        }
    }
}

/// Check `0 ≤ low_pct < high_pct ≤ 100`.
pub fn validate_percentiles(low_pct: f64, high_pct: f64) -> Result<()> {
    let in_range = |p: f64| p.is_finite() && (0.0..=100.0).contains(&p);
    if !in_range(low_pct) || !in_range(high_pct) {
        return Err(ModelDiagError::InvalidPercentile(format!(
            "percentiles must lie in [0, 100], got low={} high={}",
            low_pct, high_pct
        )));
    }
    if low_pct >= high_pct {
        return Err(ModelDiagError::InvalidPercentile(format!(
            "low percentile {} must be below high percentile {}",
            low_pct, high_pct
        )));
    }
    Ok(())
}

/// Segment `values` into (High, Mid, Low) with tie-inclusive boundaries.
///
/// # Errors
/// - `InvalidPercentile` for out-of-range or unordered percentiles
/// - `EmptySegment` when `values` is empty
/// - `DegenerateSample` when `values` holds NaN or ±∞
///
/// # Example
/// ```
/// use ndarray::array;
/// use modeldiag_core::segmentation::segment;
///
/// let s = segment(array![1.0, 2.0, 3.0, 4.0, 5.0].view(), 20.0, 80.0).unwrap();
/// assert_eq!(s.high, vec![4]);
/// assert_eq!(s.mid, vec![1, 2, 3]);
/// assert_eq!(s.low, vec![0]);
/// ```
pub fn segment(values: ArrayView1<f64>, low_pct: f64, high_pct: f64) -> Result<Segmentation> {
    segment_with_mode(values, low_pct, high_pct, SegmentationMode::TieInclusive)
}

/// Segment `values` using an explicit tie-handling mode.
pub fn segment_with_mode(
    values: ArrayView1<f64>,
    low_pct: f64,
    high_pct: f64,
    mode: SegmentationMode,
) -> Result<Segmentation> {
    validate_percentiles(low_pct, high_pct)?;

    if values.is_empty() {
        return Err(ModelDiagError::EmptySegment(
            "cannot compute percentiles of an empty vector".to_string(),
        ));
    }
    if let Some(bad) = values.iter().position(|v| !v.is_finite()) {
        return Err(ModelDiagError::DegenerateSample(format!(
            "value {} at index {} has no percentile rank",
            values[bad], bad
        )));
    }

    let order = sorted(values);
    let low_cutoff = percentile_sorted(&order, low_pct);
    let high_cutoff = percentile_sorted(&order, high_pct);

    let mut high = Vec::new();
    let mut mid = Vec::new();
    let mut low = Vec::new();

    for (i, &v) in values.iter().enumerate() {
        let is_high = v >= high_cutoff;
        let is_low = v <= low_cutoff;
        match mode {
            SegmentationMode::TieInclusive => {
                if is_high {
                    high.push(i);
                }
                if is_low {
                    low.push(i);
                }
                if v > low_cutoff && v < high_cutoff {
                    mid.push(i);
                }
            }
            SegmentationMode::StrictPartition => {
                if is_high {
                    high.push(i);
                } else if is_low {
                    low.push(i);
                } else {
                    mid.push(i);
                }
            }
        }
    }

    trace!(
        n = values.len(),
        low_cutoff,
        high_cutoff,
        high = high.len(),
        mid = mid.len(),
        low = low.len(),
        "segmented vector"
    );

    Ok(Segmentation {
        high,
        mid,
        low,
        low_cutoff,
        high_cutoff,
    })
}

/// Segment `values` restricted to `subset`, with percentiles recomputed on
/// the subset only. Returned indices are positions in `values`, not in
/// `subset`.
///
/// This is the nested segmentation used for rows such as
/// "High Prediction w/ High Fit".
pub fn segment_subset(
    values: ArrayView1<f64>,
    subset: &[usize],
    low_pct: f64,
    high_pct: f64,
) -> Result<Segmentation> {
    if let Some(&bad) = subset.iter().find(|&&i| i >= values.len()) {
        return Err(ModelDiagError::LengthMismatch(format!(
            "subset index {} out of bounds for vector of length {}",
            bad,
            values.len()
        )));
    }

    let restricted = select(values, subset);
    let inner = segment(restricted.view(), low_pct, high_pct)?;
    let remap = |local: Vec<usize>| local.into_iter().map(|j| subset[j]).collect::<Vec<_>>();

    Ok(Segmentation {
        high: remap(inner.high),
        mid: remap(inner.mid),
        low: remap(inner.low),
        low_cutoff: inner.low_cutoff,
        high_cutoff: inner.high_cutoff,
    })
}

// =============================================================================
// Tests
// =============================================================================
