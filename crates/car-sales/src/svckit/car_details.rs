//! Car Details Tool
//!
//! Stock lookup plus a picture search. Pictures are best effort and only
//! shown for cars we actually have.

use std::sync::Arc;

use async_trait::async_trait;

use agent_core::{Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema};

use super::{SalesToolOutput, CAR_MODEL_PARAM};
use crate::catalog::{capitalize, format_price, Catalog};
use crate::registry::SalesToolKind;
use crate::search::{SearchClient, SearchRequest};

/// Tool for describing a car in stock
pub struct CarDetailsTool {
    catalog: Arc<Catalog>,
    search: Arc<dyn SearchClient>,
}

impl CarDetailsTool {
    pub fn new(catalog: Arc<Catalog>, search: Arc<dyn SearchClient>) -> Self {
        Self { catalog, search }
    }

    /// Describe `car_model`, with pictures when it is in stock
    pub async fn details(&self, car_model: &str) -> SalesToolOutput {
        let car_model = car_model.trim();
        let images = self.fetch_images(car_model).await;
        let display = capitalize(car_model);

        match self.catalog.lookup(car_model) {
            Some(entry) => SalesToolOutput::TextWithImages {
                details: format!(
                    "Absolutely! We have a {} available. Details: {}. Price: {}. Benefits: {}.",
                    display,
                    without_final_period(&entry.details),
                    format_price(entry.price),
                    without_final_period(&entry.benefits),
                ),
                images,
            },
            None => {
                tracing::debug!(model = car_model, "not in stock");
                SalesToolOutput::TextWithImages {
                    details: format!("Sorry, the {} is not currently in our stock.", display),
                    images: Vec::new(),
                }
            }
        }
    }

    async fn fetch_images(&self, car_model: &str) -> Vec<String> {
        let request = SearchRequest::new(format!("{} car", car_model)).with_images();
        match self.search.search(&request).await {
            Ok(response) => response.images,
            Err(e) => {
                tracing::warn!(model = car_model, error = %e, "image search failed");
                Vec::new()
            }
        }
    }
}

/// The sentence template supplies its own period
fn without_final_period(text: &str) -> &str {
    text.strip_suffix('.').unwrap_or(text)
}

#[async_trait]
impl Tool for CarDetailsTool {
    fn schema(&self) -> ToolSchema {
        SalesToolKind::GetCarDetails.schema()
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let car_model = call.text_argument(CAR_MODEL_PARAM).unwrap_or_default();
        Ok(self
            .details(&car_model)
            .await
            .into_tool_result(SalesToolKind::GetCarDetails))
    }
}
