//! The threshold decision and its audit trail. Everything here is a
//! pure function of (score, threshold) so labels can be recomputed
//! without touching the scorer.

pub const PROTEST: &str = "PROTEST";
pub const NOT_PROTEST: &str = "NOT PROTEST";

pub const DEFAULT_THRESHOLD: f64 = 0.65;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub label: i32,
    pub label_name: &'static str,
}

/// `score >= threshold` is PROTEST. Equality counts as protest, so a
/// record scoring exactly the threshold is kept.
pub fn decide(score: f64, threshold: f64) -> Decision {
    if score >= threshold {
        Decision {
            label: 1,
            label_name: PROTEST,
        }
    } else {
        Decision {
            label: 0,
            label_name: NOT_PROTEST,
        }
    }
}

/// Rebuild the reason string. The long form carries the top-1 label
/// when one is stored; the short form covers records scored before the
/// top fields existed.
pub fn build_reason(
    top: Option<(&str, f64)>,
    probability: f64,
    threshold: f64,
    label_name: &str,
) -> String {
    match top {
        Some((top_label, top_score)) => format!(
            "Top='{top_label}' ({top_score:.3}); P(PROTEST)={probability:.3}; threshold={threshold:.2} -> {label_name}"
        ),
        None => {
            format!("P(PROTEST)={probability:.3}; threshold={threshold:.2} -> {label_name}")
        }
    }
}
