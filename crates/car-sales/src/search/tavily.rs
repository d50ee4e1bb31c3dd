//! Tavily Search Client
//!
//! `POST /search` with a bearer key. Image entries come back either as bare
//! URLs or as `{url, description}` objects depending on account options.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{SearchClient, SearchItem, SearchRequest, SearchResponse};
use crate::error::{Result, SalesError};

/// Official Tavily endpoint
pub const TAVILY_API_BASE: &str = "https://api.tavily.com";

/// Tavily client configuration
#[derive(Clone, Debug)]
pub struct TavilyConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout_secs: u64,
    pub max_results: u8,
}

impl TavilyConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: TAVILY_API_BASE.into(),
            timeout_secs: 30,
            max_results: 5,
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Tavily web search client
pub struct TavilyClient {
    client: reqwest::Client,
    config: TavilyConfig,
}

impl TavilyClient {
    pub fn from_config(config: TavilyConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    /// Decode a response body; anything but a JSON object is malformed
    fn parse_response(body: &str) -> Result<SearchResponse> {
        let value: serde_json::Value = serde_json::from_str(body)
            .map_err(|e| SalesError::MalformedResponse(e.to_string()))?;

        if !value.is_object() {
            return Err(SalesError::MalformedResponse(format!(
                "expected an object, got {}",
                value
            )));
        }

        let parsed: TavilyResponse = serde_json::from_value(value)?;

        Ok(SearchResponse {
            items: parsed
                .results
                .into_iter()
                .map(|r| SearchItem { content: r.content, url: r.url })
                .collect(),
            images: parsed.images.into_iter().map(TavilyImage::into_url).collect(),
        })
    }
}

#[async_trait]
impl SearchClient for TavilyClient {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        let url = format!("{}/search", self.config.base_url.trim_end_matches('/'));
        let body = TavilyRequest {
            query: &request.query,
            include_images: request.include_images,
            max_results: self.config.max_results,
        };

        tracing::debug!(query = %request.query, images = request.include_images, "Tavily search");

        let response = self.client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(SalesError::SearchStatus {
                status: status.as_u16(),
                body: text,
            });
        }

        Self::parse_response(&text)
    }

    /// Tavily has no free ping endpoint; a configured key is the best signal
    async fn health_check(&self) -> bool {
        !self.config.api_key.trim().is_empty()
    }

    fn name(&self) -> &str {
        "Tavily"
    }
}

#[derive(Debug, Serialize)]
struct TavilyRequest<'a> {
    query: &'a str,
    include_images: bool,
    max_results: u8,
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
    #[serde(default)]
    images: Vec<TavilyImage>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TavilyImage {
    Url(String),
    Described { url: String },
}

impl TavilyImage {
    fn into_url(self) -> String {
        match self {
            TavilyImage::Url(url) | TavilyImage::Described { url } => url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_results_and_images() {
        let body = r#"{
            "query": "audi a4 price comparison",
            "results": [
                {"title": "A4 deals", "url": "https://cars.example/a4", "content": "From $41,000", "score": 0.9},
                {"title": "More", "url": "https://cars.example/more", "content": "Other", "score": 0.4}
            ],
            "images": ["https://img.example/1.jpg", {"url": "https://img.example/2.jpg", "description": "side view"}]
        }"#;

        let response = TavilyClient::parse_response(body).unwrap();
        assert_eq!(response.items.len(), 2);
        assert_eq!(response.first().unwrap().url, "https://cars.example/a4");
        assert_eq!(
            response.images,
            vec!["https://img.example/1.jpg".to_string(), "https://img.example/2.jpg".to_string()]
        );
    }

    #[test]
    fn test_parse_empty_object() {
        let response = TavilyClient::parse_response("{}").unwrap();
        assert!(response.is_empty());
    }

    #[test]
    fn test_non_object_is_malformed() {
        for body in [r#""rate limited""#, "[1, 2]", "not json"] {
            let err = TavilyClient::parse_response(body).unwrap_err();
            assert!(matches!(err, SalesError::MalformedResponse(_)), "{body}");
        }
    }

    #[test]
    fn test_request_body() {
        let body = TavilyRequest { query: "mini cooper car", include_images: true, max_results: 5 };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["query"], "mini cooper car");
        assert_eq!(json["include_images"], true);
    }

    #[tokio::test]
    async fn test_unreachable_service_is_an_error() {
        let client = TavilyClient::from_config(TavilyConfig::new("key").with_base_url("http://127.0.0.1:9")).unwrap();
        let result = client.search(&SearchRequest::new("anything")).await;
        assert!(matches!(result, Err(SalesError::Network(_))));
        assert!(client.health_check().await);
    }
}
