//! Zero-shot protest classification over stored articles: scoring,
//! threshold decisions, cheap relabeling, and threshold optimization.

pub mod decision;
pub mod keywords;
pub mod missing;
pub mod relabel;
pub mod scorer;
pub mod sweep;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use decision::{build_reason, decide, Decision, DEFAULT_THRESHOLD, NOT_PROTEST, PROTEST};
pub use keywords::{KeywordMarker, KeywordStats};
pub use missing::{ClassifyParams, ClassifyStats, MissingClassifier};
pub use relabel::{RelabelParams, RelabelStats, Relabeler};
pub use scorer::{
    ProtestScorer, ScoreOutcome, ScoreResult, ZeroShotClient, DEFAULT_MAX_CHARS,
    DEFAULT_MIN_LENGTH, OTHER_LABEL, PROTEST_LABEL,
};
pub use sweep::{run_sweep, Confusion, Metrics, SweepConfig, SweepPoint, SweepReport};
