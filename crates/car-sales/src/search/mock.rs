//! In-memory search client for tests and offline runs

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use super::{SearchClient, SearchItem, SearchRequest, SearchResponse};
use crate::error::{Result, SalesError};

/// What the mock answers with
#[derive(Clone, Debug)]
pub enum MockBehavior {
    /// Canned hit derived from the query
    Echo,
    /// Fixed response for every query
    Respond(SearchResponse),
    /// No hits, no images
    Empty,
    /// Every query fails
    Fail(String),
}

/// Search client that records every request it receives
#[derive(Debug)]
pub struct MockSearchClient {
    behavior: MockBehavior,
    requests: Mutex<Vec<SearchRequest>>,
}

impl MockSearchClient {
    pub fn new() -> Self {
        Self::with_behavior(MockBehavior::Echo)
    }

    pub fn with_behavior(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn responding(response: SearchResponse) -> Self {
        Self::with_behavior(MockBehavior::Respond(response))
    }

    pub fn empty() -> Self {
        Self::with_behavior(MockBehavior::Empty)
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_behavior(MockBehavior::Fail(message.into()))
    }

    /// Requests seen so far, oldest first
    pub fn requests(&self) -> Vec<SearchRequest> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn echo(request: &SearchRequest) -> SearchResponse {
        let slug = request.query.trim().to_lowercase().replace(' ', "-");
        let images = if request.include_images {
            vec![format!("https://images.example.com/{}.jpg", slug)]
        } else {
            Vec::new()
        };

        SearchResponse {
            items: vec![SearchItem {
                content: format!("Results for {}", request.query),
                url: format!("https://search.example.com/{}", slug),
            }],
            images,
        }
    }
}

impl Default for MockSearchClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchClient for MockSearchClient {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        match &self.behavior {
            MockBehavior::Echo => Ok(Self::echo(request)),
            MockBehavior::Respond(response) => Ok(response.clone()),
            MockBehavior::Empty => Ok(SearchResponse::default()),
            MockBehavior::Fail(message) => Err(SalesError::Search(message.clone())),
        }
    }

    async fn health_check(&self) -> bool {
        !matches!(self.behavior, MockBehavior::Fail(_))
    }

    fn name(&self) -> &str {
        "Mock"
    }
}
