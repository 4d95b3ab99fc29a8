use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Candidate label wordings. Descriptive phrases score far better than
/// bare class names with NLI-based zero-shot models.
pub const PROTEST_LABEL: &str = "a concrete real-world protest event";
pub const OTHER_LABEL: &str = "something else (no specific protest event)";

const HYPOTHESIS_TEMPLATE: &str = "The main focus of this article is {}.";

/// Bodies are cut here before inference; past the model's context
/// window extra text only dilutes the entailment signal.
pub const DEFAULT_MAX_CHARS: usize = 4000;
/// Bodies shorter than this are too thin to classify meaningfully.
pub const DEFAULT_MIN_LENGTH: usize = 200;

/// One successful zero-shot inference.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreResult {
    /// P(PROTEST): probability of the protest label, regardless of
    /// which candidate label ranked first.
    pub probability: f64,
    /// Top-1 candidate label, verbatim.
    pub top_label: String,
    pub top_score: f64,
    pub model: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScoreOutcome {
    Scored(ScoreResult),
    /// Text below the scorer's minimum length; recorded, never scored.
    SkippedShortText { min_length: usize },
}

// --- ProtestScorer trait ---

#[async_trait]
pub trait ProtestScorer: Send + Sync {
    async fn score(&self, title: Option<&str>, text: &str) -> Result<ScoreOutcome>;
    fn model(&self) -> &str;
}

// --- Hosted zero-shot inference client ---

const INFERENCE_API_URL: &str = "https://api-inference.huggingface.co";

#[derive(Debug, Clone, Serialize)]
struct ZeroShotRequest {
    inputs: String,
    parameters: ZeroShotParameters,
}

#[derive(Debug, Clone, Serialize)]
struct ZeroShotParameters {
    candidate_labels: Vec<String>,
    hypothesis_template: String,
    multi_label: bool,
}

/// Labels come back sorted by descending score, so index 0 is top-1.
#[derive(Debug, Clone, Deserialize)]
struct ZeroShotResponse {
    labels: Vec<String>,
    scores: Vec<f64>,
}

pub struct ZeroShotClient {
    api_key: String,
    http: reqwest::Client,
    base_url: String,
    model: String,
    min_length: usize,
    max_chars: usize,
}

impl ZeroShotClient {
    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            http: reqwest::Client::new(),
            base_url: INFERENCE_API_URL.to_string(),
            model: model.to_string(),
            min_length: DEFAULT_MIN_LENGTH,
            max_chars: DEFAULT_MAX_CHARS,
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    pub fn with_limits(mut self, min_length: usize, max_chars: usize) -> Self {
        self.min_length = min_length;
        self.max_chars = max_chars;
        self
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }
}

#[async_trait]
impl ProtestScorer for ZeroShotClient {
    async fn score(&self, title: Option<&str>, text: &str) -> Result<ScoreOutcome> {
        if text.trim().chars().count() < self.min_length {
            return Ok(ScoreOutcome::SkippedShortText {
                min_length: self.min_length,
            });
        }

        let request = ZeroShotRequest {
            inputs: build_sequence(title, text, self.max_chars),
            parameters: ZeroShotParameters {
                candidate_labels: vec![PROTEST_LABEL.to_string(), OTHER_LABEL.to_string()],
                hypothesis_template: HYPOTHESIS_TEMPLATE.to_string(),
                multi_label: false,
            },
        };

        let url = format!("{}/models/{}", self.base_url, self.model);
        debug!(model = %self.model, chars = request.inputs.len(), "Zero-shot request");

        let response = self
            .http
            .post(&url)
            .headers(self.headers()?)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(anyhow!("Scorer API error ({}): {}", status, error_text));
        }

        let parsed: ZeroShotResponse = response.json().await?;
        if parsed.labels.is_empty() || parsed.labels.len() != parsed.scores.len() {
            return Err(anyhow!(
                "Unexpected scorer output: {} labels, {} scores",
                parsed.labels.len(),
                parsed.scores.len()
            ));
        }

        let probability = parsed
            .labels
            .iter()
            .zip(&parsed.scores)
            .find(|(label, _)| label.as_str() == PROTEST_LABEL)
            .map(|(_, score)| *score)
            .ok_or_else(|| anyhow!("Protest label missing from scorer output"))?;

        Ok(ScoreOutcome::Scored(ScoreResult {
            probability,
            top_label: parsed.labels[0].clone(),
            top_score: parsed.scores[0],
            model: self.model.clone(),
        }))
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Assemble the model input: title header plus the body truncated to
/// `max_chars` characters.
pub fn build_sequence(title: Option<&str>, text: &str, max_chars: usize) -> String {
    let truncated: String = text.chars().take(max_chars).collect();
    format!("Title: {}\n\nArticle:\n{}", title.unwrap_or(""), truncated)
}
