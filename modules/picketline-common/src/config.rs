use std::env;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Postgres
    pub database_url: String,

    // Zero-shot scorer endpoint
    pub scorer_api_key: String,
    pub scorer_base_url: String,
    pub scorer_model: String,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing.
    pub fn from_env() -> Self {
        Self {
            database_url: required_env("DATABASE_URL"),
            scorer_api_key: required_env("SCORER_API_KEY"),
            scorer_base_url: env::var("SCORER_BASE_URL")
                .unwrap_or_else(|_| "https://api-inference.huggingface.co".to_string()),
            scorer_model: env::var("SCORER_MODEL")
                .unwrap_or_else(|_| "facebook/bart-large-mnli".to_string()),
        }
    }

    /// Load a store-only config for stages that never call the scorer.
    pub fn store_from_env() -> Self {
        Self {
            database_url: required_env("DATABASE_URL"),
            scorer_api_key: String::new(),
            scorer_base_url: String::new(),
            scorer_model: String::new(),
        }
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}
