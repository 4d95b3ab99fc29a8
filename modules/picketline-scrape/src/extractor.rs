use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use spider_transformations::transformation::content::{
    transform_content_input, ReturnFormat, TransformConfig, TransformInput,
};
use tracing::{info, warn};

/// Desktop browser identity for origins that reject unknown clients.
pub const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/110.0.0.0 Safari/537.36";

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Extractions shorter than this are navigation shells, not articles.
const MIN_TEXT_CHARS: usize = 100;

/// How a single fetch went wrong. `Empty`, `Blocked`, `Status` and
/// `Network` are clean failures the next run retries; `Other` marks the
/// Record as errored for inspection.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("no article text after readability extraction")]
    Empty,
    #[error("blocked by origin (HTTP {0})")]
    Blocked(u16),
    #[error("HTTP {0}")]
    Status(u16),
    #[error(transparent)]
    Network(#[from] reqwest::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// --- ArticleExtractor trait ---

#[async_trait]
pub trait ArticleExtractor: Send + Sync {
    /// Fetch a URL and return the readable article body.
    async fn extract(&self, url: &str) -> Result<String, ExtractError>;
    fn name(&self) -> &str;
}

// --- Plain HTTP + Readability extractor ---

/// Fetches pages with a plain GET and strips them down to the main
/// article body via Readability. No JS rendering; the target papers
/// serve full article HTML to desktop user agents.
pub struct HttpExtractor {
    client: reqwest::Client,
}

impl HttpExtractor {
    pub fn new() -> Result<Self, ExtractError> {
        let client = reqwest::Client::builder()
            .user_agent(DESKTOP_USER_AGENT)
            .timeout(FETCH_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ArticleExtractor for HttpExtractor {
    async fn extract(&self, url: &str) -> Result<String, ExtractError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS {
            warn!(url, status = status.as_u16(), "Origin blocked the fetch");
            return Err(ExtractError::Blocked(status.as_u16()));
        }
        if !status.is_success() {
            return Err(ExtractError::Status(status.as_u16()));
        }

        let html = response.text().await?;

        let parsed_url = url::Url::parse(url).ok();
        let config = TransformConfig {
            readability: true,
            main_content: true,
            return_format: ReturnFormat::Markdown,
            filter_images: true,
            filter_svg: true,
            clean_html: true,
        };
        let input = TransformInput {
            url: parsed_url.as_ref(),
            content: html.as_bytes(),
            screenshot_bytes: None,
            encoding: None,
            selector_config: None,
            ignore_tags: None,
        };

        let text = transform_content_input(input, &config);
        let text = text.trim();

        if text.chars().count() < MIN_TEXT_CHARS {
            return Err(ExtractError::Empty);
        }

        info!(url, bytes = text.len(), "Extracted article body");
        Ok(text.to_string())
    }

    fn name(&self) -> &str {
        "http"
    }
}
