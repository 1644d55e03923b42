use modeldiag_core::analysis::{FULL_SAMPLE, HIGH_FIT, LOW_FIT, MID_FIT};
use modeldiag_core::segmentation::segment_with_mode;
use modeldiag_core::{iwco, model_analysis, segment, AnalysisConfig, SegmentationMode};
use ndarray::Array1;
use proptest::prelude::*;

const TOL: f64 = 1e-9;

fn values(len: std::ops::Range<usize>) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-100.0f64..100.0, len)
}

fn percentile_pair() -> impl Strategy<Value = (f64, f64)> {
    (0.0f64..50.0, 50.0f64..100.0)
}

proptest! {
    #[test]
    fn segmentation_covers_every_index((lo, hi) in percentile_pair(), v in values(1..60)) {
        let arr = Array1::from_vec(v);
        let s = segment(arr.view(), lo, hi).unwrap();

        for i in 0..arr.len() {
            let hits = [&s.high, &s.mid, &s.low].iter().filter(|set| set.contains(&i)).count();
            prop_assert!(hits >= 1, "index {} not assigned", i);
            // Mid never overlaps High or Low
            if s.mid.contains(&i) {
                prop_assert!(!s.high.contains(&i) && !s.low.contains(&i));
            }
        }
    }

    #[test]
    fn strict_partition_is_exact((lo, hi) in percentile_pair(), v in values(1..60)) {
        let arr = Array1::from_vec(v);
        let s = segment_with_mode(arr.view(), lo, hi, SegmentationMode::StrictPartition).unwrap();
        prop_assert_eq!(s.high.len() + s.mid.len() + s.low.len(), arr.len());
    }

    #[test]
    fn iwco_is_symmetric_and_bounded(pairs in prop::collection::vec((-50.0f64..50.0, -50.0f64..50.0), 2..40)) {
        let a: Array1<f64> = pairs.iter().map(|p| p.0).collect();
        let b: Array1<f64> = pairs.iter().map(|p| p.1).collect();
        let ab = iwco(a.view(), b.view()).unwrap();
        let ba = iwco(b.view(), a.view()).unwrap();
        if ab.is_nan() {
            prop_assert!(ba.is_nan());
        } else {
            prop_assert!((ab - ba).abs() < TOL);
            prop_assert!((-1.0 - TOL..=1.0 + TOL).contains(&ab));
        }
    }

    #[test]
    fn model_analysis_is_idempotent(
        rows in prop::collection::vec((-10.0f64..10.0, -1.0f64..1.0, -10.0f64..10.0, 0.0f64..1.0), 4..40)
    ) {
        let y_linear: Array1<f64> = rows.iter().map(|r| r.0).collect();
        let yhat: Array1<f64> = rows.iter().map(|r| r.0 + r.1).collect();
        let y_actual: Array1<f64> = rows.iter().map(|r| r.2).collect();
        let fit: Array1<f64> = rows.iter().map(|r| r.3).collect();
        let grid: Vec<Vec<f64>> = rows.iter().map(|r| vec![r.3, 1.0 - r.3]).collect();
        let labels = ["x1", "x2"];
        let config = AnalysisConfig::default();

        let first = model_analysis(yhat.view(), y_actual.view(), y_linear.view(), fit.view(), &grid, &labels, &config).unwrap();
        let second = model_analysis(yhat.view(), y_actual.view(), y_linear.view(), fit.view(), &grid, &labels, &config).unwrap();

        // Bit-identical, NaN cells included
        prop_assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
        let labels: Vec<&str> = first.betas_and_t_stats.segments.iter().map(|s| s.label.as_str()).collect();
        prop_assert_eq!(labels, vec![FULL_SAMPLE, HIGH_FIT, MID_FIT, LOW_FIT]);
    }
}
