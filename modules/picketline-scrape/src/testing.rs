// Test mocks for the harvest pipeline.
//
// MockExtractor is HashMap-based: register bodies and failure modes per
// URL with the builder methods, then inspect `calls()` to see which
// URLs the pool actually fetched. Unregistered URLs return HTTP 404.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use anyhow::anyhow;
use async_trait::async_trait;

use crate::extractor::{ArticleExtractor, ExtractError};

pub struct MockExtractor {
    pages: HashMap<String, String>,
    empty: HashSet<String>,
    blocked: HashSet<String>,
    broken: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl MockExtractor {
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
            empty: HashSet::new(),
            blocked: HashSet::new(),
            broken: HashSet::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Register an article body for a URL.
    pub fn on(mut self, url: &str, text: &str) -> Self {
        self.pages.insert(url.to_string(), text.to_string());
        self
    }

    /// URL that fetches fine but yields no readable text.
    pub fn empty(mut self, url: &str) -> Self {
        self.empty.insert(url.to_string());
        self
    }

    /// URL the origin refuses with HTTP 403.
    pub fn blocked(mut self, url: &str) -> Self {
        self.blocked.insert(url.to_string());
        self
    }

    /// URL whose fetch blows up with an unexpected error.
    pub fn broken(mut self, url: &str) -> Self {
        self.broken.insert(url.to_string());
        self
    }

    /// URLs extracted so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ArticleExtractor for MockExtractor {
    async fn extract(&self, url: &str) -> Result<String, ExtractError> {
        self.calls.lock().unwrap().push(url.to_string());

        if self.empty.contains(url) {
            return Err(ExtractError::Empty);
        }
        if self.blocked.contains(url) {
            return Err(ExtractError::Blocked(403));
        }
        if self.broken.contains(url) {
            return Err(ExtractError::Other(anyhow!("mock extractor exploded")));
        }
        match self.pages.get(url) {
            Some(text) => Ok(text.clone()),
            None => Err(ExtractError::Status(404)),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
