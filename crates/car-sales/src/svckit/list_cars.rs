//! List Available Cars Tool

use std::sync::Arc;

use async_trait::async_trait;

use agent_core::{Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema};

use super::SalesToolOutput;
use crate::catalog::{capitalize, Catalog};
use crate::registry::SalesToolKind;

/// Reply for a catalog with no cars
pub const EMPTY_STOCK: &str = "Our stock is currently empty.";

/// Tool for listing every model in stock
pub struct ListAvailableCarsTool {
    catalog: Arc<Catalog>,
}

impl ListAvailableCarsTool {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    pub fn list(&self) -> SalesToolOutput {
        if self.catalog.is_empty() {
            return SalesToolOutput::text(EMPTY_STOCK);
        }

        let cars = self
            .catalog
            .list_all()
            .into_iter()
            .map(capitalize)
            .collect::<Vec<_>>()
            .join(", ");

        SalesToolOutput::text(format!("We currently have the following cars in stock: {}.", cars))
    }
}

#[async_trait]
impl Tool for ListAvailableCarsTool {
    fn schema(&self) -> ToolSchema {
        SalesToolKind::ListAvailableCars.schema()
    }

    // Arguments are ignored
    async fn execute(&self, _call: &ToolCall) -> CoreResult<ToolResult> {
        Ok(self.list().into_tool_result(SalesToolKind::ListAvailableCars))
    }
}
