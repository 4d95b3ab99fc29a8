//! Article harvesting: candidate loading, frontier construction, and a
//! bounded-concurrency fetch pool that writes one Record per URL.

pub mod candidates;
pub mod extractor;
pub mod frontier;
pub mod harvest;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use candidates::{load_candidates, Candidate};
pub use extractor::{ArticleExtractor, ExtractError, HttpExtractor};
pub use frontier::{build_frontier, Frontier};
pub use harvest::{HarvestParams, HarvestStats, Harvester};
