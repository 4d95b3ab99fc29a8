//! Threshold sweep over gold-labeled samples. Scores are fixed; only
//! the cutoff moves, so the whole sweep is pure arithmetic.

use picketline_store::EvalSample;

/// Confusion counts for one candidate threshold.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Confusion {
    pub true_pos: u64,
    pub false_pos: u64,
    pub true_neg: u64,
    pub false_neg: u64,
}

impl Confusion {
    /// Tallies predictions against gold labels at the given cutoff.
    /// Samples whose label is neither 0 nor 1 are left uncounted.
    pub fn tally(samples: &[EvalSample], threshold: f64) -> Self {
        let mut c = Self::default();
        for sample in samples {
            let pred = sample.score >= threshold;
            match (sample.human_label, pred) {
                (1, true) => c.true_pos += 1,
                (0, true) => c.false_pos += 1,
                (0, false) => c.true_neg += 1,
                (1, false) => c.false_neg += 1,
                _ => {}
            }
        }
        c
    }

    pub fn total(&self) -> u64 {
        self.true_pos + self.false_pos + self.true_neg + self.false_neg
    }
}

/// Standard binary-classification metrics plus F0.5, which weights
/// precision over recall.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Metrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub f05: f64,
}

impl Metrics {
    pub fn from_confusion(c: &Confusion) -> Self {
        let tp = c.true_pos as f64;
        let tn = c.true_neg as f64;
        let fp = c.false_pos as f64;
        let fneg = c.false_neg as f64;

        let total = tp + fp + tn + fneg;
        let accuracy = if total > 0.0 { (tp + tn) / total } else { 0.0 };
        let precision = if tp + fp > 0.0 { tp / (tp + fp) } else { 0.0 };
        let recall = if tp + fneg > 0.0 { tp / (tp + fneg) } else { 0.0 };
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        // F-beta with beta = 0.5, so beta^2 = 0.25.
        let beta2 = 0.25;
        let denom = beta2 * precision + recall;
        let f05 = if denom > 0.0 {
            (1.0 + beta2) * precision * recall / denom
        } else {
            0.0
        };

        Self {
            accuracy,
            precision,
            recall,
            f1,
            f05,
        }
    }
}

/// Sweep bounds, inclusive on both ends.
#[derive(Debug, Clone, Copy)]
pub struct SweepConfig {
    pub start: f64,
    pub end: f64,
    pub step: f64,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            start: 0.05,
            end: 0.90,
            step: 0.01,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SweepPoint {
    pub threshold: f64,
    pub confusion: Confusion,
    pub metrics: Metrics,
}

#[derive(Debug)]
pub struct SweepReport {
    pub points: Vec<SweepPoint>,
    /// Point with the highest F0.5. Ties keep the lowest threshold.
    pub best: Option<SweepPoint>,
    pub samples: usize,
}

/// Evaluates every threshold in the configured range and picks the
/// F0.5 maximum. Thresholds are computed by integer step count and
/// rounded, so accumulated float error cannot shift a `score >= t`
/// comparison at a boundary.
pub fn run_sweep(samples: &[EvalSample], config: SweepConfig) -> SweepReport {
    let steps = if config.step > 0.0 && config.end >= config.start {
        ((config.end - config.start) / config.step).round() as i64
    } else {
        0
    };

    let mut points = Vec::with_capacity(steps as usize + 1);
    let mut best: Option<SweepPoint> = None;

    for i in 0..=steps {
        let raw = config.start + i as f64 * config.step;
        let threshold = (raw * 1e9).round() / 1e9;

        let confusion = Confusion::tally(samples, threshold);
        let metrics = Metrics::from_confusion(&confusion);
        let point = SweepPoint {
            threshold,
            confusion,
            metrics,
        };
        points.push(point);

        let beaten = best.map(|b| metrics.f05 > b.metrics.f05).unwrap_or(true);
        if beaten {
            best = Some(point);
        }
    }

    SweepReport {
        points,
        best,
        samples: samples.len(),
    }
}

impl std::fmt::Display for SweepReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Loaded {} samples with human_label + score.",
            self.samples
        )?;
        for p in &self.points {
            writeln!(
                f,
                "t={:.2}  F0.5={:.3}  P={:.3}  R={:.3}  F1={:.3}  Acc={:.3}  (TP={}, FP={}, TN={}, FN={})",
                p.threshold,
                p.metrics.f05,
                p.metrics.precision,
                p.metrics.recall,
                p.metrics.f1,
                p.metrics.accuracy,
                p.confusion.true_pos,
                p.confusion.false_pos,
                p.confusion.true_neg,
                p.confusion.false_neg,
            )?;
        }
        if let Some(best) = &self.best {
            writeln!(f, "\n=== Best threshold (max F0.5) ===")?;
            writeln!(f, "Best t = {:.2}", best.threshold)?;
            writeln!(
                f,
                "TP={} FP={} TN={} FN={}",
                best.confusion.true_pos,
                best.confusion.false_pos,
                best.confusion.true_neg,
                best.confusion.false_neg,
            )?;
            writeln!(
                f,
                "Accuracy={:.3} Precision={:.3} Recall={:.3} F1={:.3} F0.5={:.3}",
                best.metrics.accuracy,
                best.metrics.precision,
                best.metrics.recall,
                best.metrics.f1,
                best.metrics.f05,
            )?;
        }
        Ok(())
    }
}
