// Test mocks for the classification passes.
//
// MockScorer is keyed by article text: register a probability per body
// with the builder methods, then inspect `calls()` to see which texts
// were actually sent for inference. Unregistered texts return an error
// so a test cannot silently score a row it never set up.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::scorer::{ProtestScorer, ScoreOutcome, ScoreResult, OTHER_LABEL, PROTEST_LABEL};

pub struct MockScorer {
    scores: HashMap<String, f64>,
    broken: HashSet<String>,
    min_length: usize,
    calls: Mutex<Vec<String>>,
}

impl MockScorer {
    pub fn new() -> Self {
        Self {
            scores: HashMap::new(),
            broken: HashSet::new(),
            min_length: 0,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Register the protest probability returned for a body.
    pub fn on(mut self, text: &str, probability: f64) -> Self {
        self.scores.insert(text.to_string(), probability);
        self
    }

    /// Body whose scoring call blows up.
    pub fn broken(mut self, text: &str) -> Self {
        self.broken.insert(text.to_string());
        self
    }

    /// Enable short-text skipping below the given char count.
    pub fn with_min_length(mut self, min_length: usize) -> Self {
        self.min_length = min_length;
        self
    }

    /// Bodies scored so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockScorer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProtestScorer for MockScorer {
    async fn score(&self, _title: Option<&str>, text: &str) -> Result<ScoreOutcome> {
        self.calls.lock().unwrap().push(text.to_string());

        if text.trim().chars().count() < self.min_length {
            return Ok(ScoreOutcome::SkippedShortText {
                min_length: self.min_length,
            });
        }
        if self.broken.contains(text) {
            return Err(anyhow!("mock scorer exploded"));
        }
        match self.scores.get(text) {
            Some(&probability) => {
                let (top_label, top_score) = if probability >= 0.5 {
                    (PROTEST_LABEL, probability)
                } else {
                    (OTHER_LABEL, 1.0 - probability)
                };
                Ok(ScoreOutcome::Scored(ScoreResult {
                    probability,
                    top_label: top_label.to_string(),
                    top_score,
                    model: "mock-zsc".to_string(),
                }))
            }
            None => Err(anyhow!("no score registered for text: {text:?}")),
        }
    }

    fn model(&self) -> &str {
        "mock-zsc"
    }
}
