//! Compare Prices Tool
//!
//! Asks the web what other dealers charge for a model. Only the top hit is
//! quoted.

use std::sync::Arc;

use async_trait::async_trait;

use agent_core::{Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema};

use super::{SalesToolOutput, CAR_MODEL_PARAM};
use crate::registry::SalesToolKind;
use crate::search::{SearchClient, SearchRequest};

/// Reply when the search came back without hits
pub const NO_PRICE_INFO: &str = "Could not retrieve competitor price information at this time.";

/// Tool for comparing our price with other dealers
pub struct ComparePricesTool {
    search: Arc<dyn SearchClient>,
}

impl ComparePricesTool {
    pub fn new(search: Arc<dyn SearchClient>) -> Self {
        Self { search }
    }

    /// Look up competitor prices. Search failures become the reply text.
    pub async fn compare(&self, car_model: &str) -> SalesToolOutput {
        let car_model = car_model.trim();
        let request = SearchRequest::new(format!("{} price comparison", car_model));

        match self.search.search(&request).await {
            Ok(response) => match response.first() {
                Some(hit) => SalesToolOutput::text(format!(
                    "Other dealers are selling the {} at these prices: {} Check it out here: [{}]({})",
                    car_model, hit.content, hit.url, hit.url
                )),
                None => SalesToolOutput::text(NO_PRICE_INFO),
            },
            Err(e) => {
                tracing::warn!(model = car_model, error = %e, "price search failed");
                SalesToolOutput::text(format!("Error during price search: {}", e))
            }
        }
    }
}

#[async_trait]
impl Tool for ComparePricesTool {
    fn schema(&self) -> ToolSchema {
        SalesToolKind::ComparePrices.schema()
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let car_model = call.text_argument(CAR_MODEL_PARAM).unwrap_or_default();
        Ok(self
            .compare(&car_model)
            .await
            .into_tool_result(SalesToolKind::ComparePrices))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{MockSearchClient, SearchItem, SearchResponse};

    fn tool_with(client: MockSearchClient) -> (ComparePricesTool, Arc<MockSearchClient>) {
        let client = Arc::new(client);
        (ComparePricesTool::new(client.clone()), client)
    }

    #[tokio::test]
    async fn test_quotes_top_hit() {
        let (tool, client) = tool_with(MockSearchClient::responding(SearchResponse {
            items: vec![
                SearchItem { content: "Around $41,500.".into(), url: "https://dealer.example/a4".into() },
                SearchItem { content: "ignored".into(), url: "https://other.example".into() },
            ],
            images: Vec::new(),
        }));

        let output = tool.compare("Audi A4").await;
        assert_eq!(
            output,
            SalesToolOutput::text(
                "Other dealers are selling the Audi A4 at these prices: Around $41,500. \
                 Check it out here: [https://dealer.example/a4](https://dealer.example/a4)"
            )
        );

        let requests = client.requests();
        assert_eq!(requests[0].query, "Audi A4 price comparison");
        assert!(!requests[0].include_images);
    }

    #[tokio::test]
    async fn test_no_hits() {
        let (tool, _) = tool_with(MockSearchClient::empty());
        assert_eq!(tool.compare("Audi A4").await.message(), NO_PRICE_INFO);
    }

    #[tokio::test]
    async fn test_search_failure_is_reported_as_text() {
        let (tool, _) = tool_with(MockSearchClient::failing("quota exceeded"));
        let output = tool.compare("Audi A4").await;

        assert!(matches!(output, SalesToolOutput::Text(_)));
        assert!(output.message().starts_with("Error during price search:"));
        assert!(output.message().contains("quota exceeded"));
    }

    #[tokio::test]
    async fn test_execute_reads_car_model() {
        let (tool, client) = tool_with(MockSearchClient::new());
        let call = ToolCall::new("ComparePrices").with_argument(CAR_MODEL_PARAM, "Mini Cooper");

        let result = tool.execute(&call).await.unwrap();
        assert!(result.success);
        assert_eq!(result.name, "ComparePrices");
        assert_eq!(client.requests()[0].query, "Mini Cooper price comparison");
    }
}
