//! Collect Client Info Tool
//!
//! Reads whatever the customer has typed into the contact form. The tool never
//! prompts; an unfilled form is reported back so the model can ask.

use std::sync::Arc;

use async_trait::async_trait;

use agent_core::{Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema};

use super::SalesToolOutput;
use crate::contact::{format_client_info, ClientInfoSource};
use crate::registry::SalesToolKind;

/// Tool for handing the customer's contact details to the model
pub struct CollectClientInfoTool {
    source: Arc<dyn ClientInfoSource>,
}

impl CollectClientInfoTool {
    pub fn new(source: Arc<dyn ClientInfoSource>) -> Self {
        Self { source }
    }

    pub fn collect(&self) -> SalesToolOutput {
        match format_client_info(&self.source.current()) {
            Some(text) => SalesToolOutput::Text(text),
            None => SalesToolOutput::Incomplete,
        }
    }
}

#[async_trait]
impl Tool for CollectClientInfoTool {
    fn schema(&self) -> ToolSchema {
        SalesToolKind::CollectClientInfo.schema()
    }

    async fn execute(&self, _call: &ToolCall) -> CoreResult<ToolResult> {
        let output = self.collect();
        if output.is_incomplete() {
            tracing::debug!("contact form incomplete");
        }
        Ok(output.into_tool_result(SalesToolKind::CollectClientInfo))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contact::{ClientInfo, ContactForm, ContactUpdate};
    use crate::svckit::INCOMPLETE_CONTACT_MESSAGE;

    #[test]
    fn test_incomplete_until_every_field_is_set() {
        let form = ContactForm::new();
        let tool = CollectClientInfoTool::new(Arc::new(form.clone()));
        assert_eq!(tool.collect(), SalesToolOutput::Incomplete);

        form.update(ContactUpdate {
            name: Some("Ana".into()),
            email: Some("ana@example.com".into()),
            ..Default::default()
        });
        assert_eq!(tool.collect(), SalesToolOutput::Incomplete);

        form.update(ContactUpdate { phone: Some("555-0101".into()), ..Default::default() });
        assert_eq!(
            tool.collect(),
            SalesToolOutput::text("Client info: Name: Ana, Email: ana@example.com, Phone: 555-0101")
        );
    }

    #[tokio::test]
    async fn test_execute_incomplete_observation() {
        let tool = CollectClientInfoTool::new(Arc::new(ClientInfo::new("Ana", "", "555-0101")));
        let result = tool.execute(&ToolCall::new("CollectClientInfo")).await.unwrap();

        assert!(result.success);
        assert_eq!(result.output, INCOMPLETE_CONTACT_MESSAGE);
        assert_eq!(result.data, Some(serde_json::json!({ "complete": false })));
    }
}
