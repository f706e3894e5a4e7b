//! The fixed metric suite and its accumulator.

use crate::error::{Error, Result};
use crate::postprocess::MIN_DEPTH;

/// Number of metrics in the suite.
pub const METRIC_COUNT: usize = 10;

/// The ten error/accuracy metrics, in reporting order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MetricKind {
    AbsRelDiff,
    SqrRelDiff,
    Rmse,
    RmseLog,
    Simse,
    Log10,
    Mvn,
    Delta1,
    Delta2,
    Delta3,
}

impl MetricKind {
    pub const ALL: [MetricKind; METRIC_COUNT] = [
        MetricKind::AbsRelDiff,
        MetricKind::SqrRelDiff,
        MetricKind::Rmse,
        MetricKind::RmseLog,
        MetricKind::Simse,
        MetricKind::Log10,
        MetricKind::Mvn,
        MetricKind::Delta1,
        MetricKind::Delta2,
        MetricKind::Delta3,
    ];

    pub fn title(self) -> &'static str {
        match self {
            MetricKind::AbsRelDiff => "AbsRelDiff",
            MetricKind::SqrRelDiff => "SqrRelDiff",
            MetricKind::Rmse => "RMSE",
            MetricKind::RmseLog => "RMSELog",
            MetricKind::Simse => "SIMSE",
            MetricKind::Log10 => "Log10",
            MetricKind::Mvn => "MVN",
            MetricKind::Delta1 => "Threshold 1.25",
            MetricKind::Delta2 => "Threshold 1.25^2",
            MetricKind::Delta3 => "Threshold 1.25^3",
        }
    }

    /// The three thresholded accuracies rank descending; everything else is
    /// an error metric and ranks ascending.
    pub fn higher_is_better(self) -> bool {
        matches!(self, MetricKind::Delta1 | MetricKind::Delta2 | MetricKind::Delta3)
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// One evaluation's worth of metric values, ordered as [`MetricKind::ALL`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MetricVector(pub [f64; METRIC_COUNT]);

impl MetricVector {
    pub fn get(&self, kind: MetricKind) -> f64 {
        self.0[kind.index()]
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }
}

/// Computes the metric suite over a prediction and a ground truth of equal
/// length. Both planes are multiplied by `scale` first; every logarithm and
/// division clamps its operand to the minimum valid depth.
pub fn evaluate(pred: &[f32], gt: &[f32], scale: f32) -> Result<MetricVector> {
    if pred.len() != gt.len() {
        return Err(Error::shape(format!(
            "prediction has {} values, ground truth has {}",
            pred.len(),
            gt.len()
        )));
    }
    if pred.is_empty() {
        return Err(Error::shape("cannot evaluate empty planes".to_string()));
    }

    let n = pred.len() as f64;
    let min_depth = MIN_DEPTH as f64;

    let mut abs_rel = 0.0;
    let mut sqr_rel = 0.0;
    let mut sq_diff = 0.0;
    let mut log_diff_sum = 0.0;
    let mut log_diff_sq = 0.0;
    let mut log10_diff = 0.0;
    let mut within = [0.0f64; 3];

    let mut sum_p = 0.0;
    let mut sum_g = 0.0;
    let mut sum_pp = 0.0;
    let mut sum_gg = 0.0;
    let mut sum_pg = 0.0;

    for (&p, &g) in pred.iter().zip(gt.iter()) {
        let p = ((p * scale) as f64).max(min_depth);
        let g = ((g * scale) as f64).max(min_depth);
        let diff = p - g;

        abs_rel += diff.abs() / g;
        sqr_rel += diff * diff / g;
        sq_diff += diff * diff;

        let log_diff = p.ln() - g.ln();
        log_diff_sum += log_diff;
        log_diff_sq += log_diff * log_diff;
        log10_diff += log_diff.abs() / std::f64::consts::LN_10;

        let ratio = (p / g).max(g / p);
        for (slot, threshold) in within.iter_mut().zip([1.25, 1.5625, 1.953125]) {
            if ratio < threshold {
                *slot += 1.0;
            }
        }

        sum_p += p;
        sum_g += g;
        sum_pp += p * p;
        sum_gg += g * g;
        sum_pg += p * g;
    }

    let mean_p = sum_p / n;
    let mean_g = sum_g / n;
    let var_p = (sum_pp / n - mean_p * mean_p).max(0.0);
    let var_g = (sum_gg / n - mean_g * mean_g).max(0.0);
    let std_p = var_p.sqrt();
    let std_g = var_g.sqrt();

    // RMSE between the mean/variance-normalized planes. For a correlation
    // coefficient r this reduces to sqrt(2 - 2r); a constant plane has no
    // shape to compare, so its MVN error is zero.
    let mvn = if std_p > f64::EPSILON && std_g > f64::EPSILON {
        let corr = (sum_pg / n - mean_p * mean_g) / (std_p * std_g);
        (2.0 - 2.0 * corr.clamp(-1.0, 1.0)).max(0.0).sqrt()
    } else {
        0.0
    };

    let simse = (log_diff_sq / n - (log_diff_sum / n).powi(2)).max(0.0);

    Ok(MetricVector([
        abs_rel / n,
        sqr_rel / n,
        (sq_diff / n).sqrt(),
        (log_diff_sq / n).sqrt(),
        simse,
        log10_diff / n,
        mvn,
        within[0] / n,
        within[1] / n,
        within[2] / n,
    ]))
}

/// Running sum of per-image metric vectors.
#[derive(Debug, Default, Clone)]
pub struct MetricAccumulator {
    sum: [f64; METRIC_COUNT],
    count: usize,
}

impl MetricAccumulator {
    pub fn add(&mut self, vector: &MetricVector) {
        for (slot, value) in self.sum.iter_mut().zip(vector.0.iter()) {
            *slot += value;
        }
        self.count += 1;
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Averaged metrics: summed vectors divided by the number of images.
    pub fn mean(&self) -> MetricVector {
        if self.count == 0 {
            return MetricVector::default();
        }
        let mut mean = self.sum;
        for slot in mean.iter_mut() {
            *slot /= self.count as f64;
        }
        MetricVector(mean)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_maps_reduce_to_bias() {
        // With zero variance on both sides, RMSE is the absolute scaled
        // mean difference.
        let pred = vec![0.2f32; 64];
        let gt = vec![0.5f32; 64];

        let metrics = evaluate(&pred, &gt, 10.0).unwrap();
        assert!((metrics.get(MetricKind::Rmse) - 3.0).abs() < 1e-9);
        assert!((metrics.get(MetricKind::AbsRelDiff) - 0.6).abs() < 1e-9);
        assert!((metrics.get(MetricKind::Simse)).abs() < 1e-9);
        assert_eq!(metrics.get(MetricKind::Mvn), 0.0);
        // Ratio 2.5 exceeds every threshold.
        assert_eq!(metrics.get(MetricKind::Delta3), 0.0);
    }

    #[test]
    fn identical_maps_score_perfectly() {
        let plane: Vec<f32> = (1..=64).map(|i| i as f32 / 10.0).collect();
        let metrics = evaluate(&plane, &plane, 10.0).unwrap();

        for kind in [
            MetricKind::AbsRelDiff,
            MetricKind::SqrRelDiff,
            MetricKind::Rmse,
            MetricKind::RmseLog,
            MetricKind::Simse,
            MetricKind::Log10,
        ] {
            assert!(metrics.get(kind).abs() < 1e-6, "{}", kind.title());
        }
        assert!(metrics.get(MetricKind::Mvn).abs() < 1e-6);
        assert_eq!(metrics.get(MetricKind::Delta1), 1.0);
        assert_eq!(metrics.get(MetricKind::Delta3), 1.0);
    }

    #[test]
    fn scale_invariant_mse_ignores_constant_log_offset() {
        let gt: Vec<f32> = (1..=64).map(|i| i as f32 / 10.0).collect();
        let pred: Vec<f32> = gt.iter().map(|&v| v * 2.0).collect();

        let metrics = evaluate(&pred, &gt, 10.0).unwrap();
        // Doubling is a constant shift in log space.
        assert!(metrics.get(MetricKind::Simse).abs() < 1e-9);
        assert!(metrics.get(MetricKind::RmseLog) > 0.1);
    }

    #[test]
    fn threshold_metrics_rank_descending() {
        for kind in MetricKind::ALL {
            assert_eq!(kind.higher_is_better(), kind.index() > 6);
        }
    }

    #[test]
    fn evaluate_rejects_length_mismatch() {
        let result = evaluate(&[1.0, 2.0], &[1.0], 10.0);
        assert!(matches!(result, Err(Error::Shape(_))));
    }

    #[test]
    fn accumulator_mean_is_sum_over_count() {
        let mut acc = MetricAccumulator::default();
        acc.add(&MetricVector([1.0; METRIC_COUNT]));
        acc.add(&MetricVector([3.0; METRIC_COUNT]));

        assert_eq!(acc.count(), 2);
        let mean = acc.mean();
        for value in mean.0 {
            assert!((value - 2.0).abs() < 1e-12);
        }
    }
}
