//! Web Search Integration
//!
//! The search service is an external collaborator: we send a query and get
//! back ranked text snippets with links, plus optional image URLs.

mod mock;
mod tavily;

pub use mock::{MockBehavior, MockSearchClient};
pub use tavily::{TavilyClient, TavilyConfig};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A search query
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,

    /// Ask the service for related image URLs as well
    pub include_images: bool,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            include_images: false,
        }
    }

    #[must_use]
    pub fn with_images(mut self) -> Self {
        self.include_images = true;
        self
    }
}

/// One ranked hit
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchItem {
    pub content: String,
    pub url: String,
}

/// Hits and images, best first. Both may be empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub items: Vec<SearchItem>,
    pub images: Vec<String>,
}

impl SearchResponse {
    /// Top hit, if any
    pub fn first(&self) -> Option<&SearchItem> {
        self.items.first()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.images.is_empty()
    }
}

/// Search client trait (Strategy pattern)
#[async_trait]
pub trait SearchClient: Send + Sync {
    /// Run a single query
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse>;

    /// Check if the service is usable
    async fn health_check(&self) -> bool;

    /// Service name
    fn name(&self) -> &str;
}
