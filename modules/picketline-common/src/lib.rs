pub mod config;
pub mod paper;
pub mod url;

pub use config::Config;
pub use paper::infer_paper;
pub use url::canonical_url;
