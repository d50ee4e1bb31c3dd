//! Tool System
//!
//! Tools are registered once and invoked by the reasoning loop when the model
//! asks for them. The registry only describes and runs tools; choosing one is
//! the model's job.

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{AgentError, Result};

/// Argument key used when the model passes a bare string instead of an object
pub const INPUT_ARGUMENT: &str = "input";

/// Tool call request from the LLM
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolCall {
    /// Tool identifier
    #[serde(alias = "tool")]
    pub name: String,

    /// Arguments as key-value pairs
    #[serde(default, deserialize_with = "deserialize_arguments")]
    pub arguments: HashMap<String, serde_json::Value>,

    /// Optional call ID for tracking
    #[serde(default)]
    pub id: Option<String>,
}

/// Accept `{"arguments": {...}}`, `{"arguments": "text"}` and `{"arguments": null}`.
fn deserialize_arguments<'de, D>(deserializer: D) -> std::result::Result<HashMap<String, serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Object(map) => map.into_iter().collect(),
        serde_json::Value::Null => HashMap::new(),
        other => HashMap::from([(INPUT_ARGUMENT.to_string(), other)]),
    })
}

impl ToolCall {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: HashMap::new(),
            id: None,
        }
    }

    #[must_use]
    pub fn with_argument(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }

    /// Read a textual argument.
    ///
    /// Falls back to the bare `input` argument, then to the only argument
    /// when exactly one was given. Numbers are rendered as text.
    pub fn text_argument(&self, key: &str) -> Option<String> {
        let value = self
            .arguments
            .get(key)
            .or_else(|| self.arguments.get(INPUT_ARGUMENT))
            .or_else(|| {
                if self.arguments.len() == 1 {
                    self.arguments.values().next()
                } else {
                    None
                }
            })?;

        match value {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// Result from tool execution
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolResult {
    /// Tool that was called
    pub name: String,

    /// Call ID (if provided in request)
    pub id: Option<String>,

    /// Whether execution succeeded
    pub success: bool,

    /// Output (observation text or error)
    pub output: String,

    /// Image URLs to show next to the output
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,

    /// Structured data (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl ToolResult {
    pub fn success(name: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            success: true,
            output: output.into(),
            images: Vec::new(),
            data: None,
        }
    }

    pub fn failure(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            success: false,
            output: error.into(),
            images: Vec::new(),
            data: None,
        }
    }

    #[must_use]
    pub fn with_images(mut self, images: Vec<String>) -> Self {
        self.images = images;
        self
    }

    #[must_use]
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Parameter definition for tool schema
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParameterSchema {
    /// Parameter name
    pub name: String,

    /// JSON Schema type (string, number, boolean, object, array)
    #[serde(rename = "type")]
    pub param_type: String,

    /// Human-readable description
    pub description: String,

    /// Whether this parameter is required
    #[serde(default)]
    pub required: bool,
}

impl ParameterSchema {
    /// Required string parameter
    pub fn required_string(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            param_type: "string".into(),
            description: description.into(),
            required: true,
        }
    }
}

/// Tool definition schema (what the model sees)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Unique tool identifier
    pub name: String,

    /// Human-readable description (shown to LLM)
    pub description: String,

    /// Parameter definitions
    pub parameters: Vec<ParameterSchema>,

    /// Category for grouping
    #[serde(default)]
    pub category: Option<String>,

    /// Whether tool has side effects
    #[serde(default)]
    pub has_side_effects: bool,
}

/// Tool trait - implement to add new capabilities
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool's schema for the model
    fn schema(&self) -> ToolSchema;

    /// Execute the tool with given arguments
    async fn execute(&self, call: &ToolCall) -> Result<ToolResult>;

    /// Validate arguments before execution
    fn validate(&self, call: &ToolCall) -> Result<()> {
        let schema = self.schema();

        for param in &schema.parameters {
            if param.required && call.text_argument(&param.name).is_none() {
                return Err(AgentError::ToolValidation(format!(
                    "Missing required parameter: {}",
                    param.name
                )));
            }
        }

        Ok(())
    }
}

/// Registry for available tools
///
/// Keeps registration order so the prompt section is stable.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new tool
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        self.register_boxed(Arc::new(tool));
    }

    /// Register a shared tool; a tool with the same name is replaced in place
    pub fn register_boxed(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.schema().name;
        if let Some(&pos) = self.index.get(&name) {
            self.tools[pos] = tool;
        } else {
            self.index.insert(name, self.tools.len());
            self.tools.push(tool);
        }
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.index.get(name).map(|&pos| Arc::clone(&self.tools[pos]))
    }

    /// Execute a tool call
    pub async fn execute(&self, call: &ToolCall) -> Result<ToolResult> {
        let tool = self
            .get(&call.name)
            .ok_or_else(|| AgentError::ToolNotFound(call.name.clone()))?;

        tool.validate(call)?;

        tool.execute(call).await
    }

    /// Get all tool schemas in registration order
    pub fn schemas(&self) -> Vec<ToolSchema> {
        self.tools.iter().map(|t| t.schema()).collect()
    }

    /// Get tool names in registration order
    pub fn names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.schema().name).collect()
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Generate system prompt section describing available tools
    pub fn generate_prompt_section(&self) -> String {
        let mut prompt = String::from("## Available Tools\n\n");
        prompt.push_str("You can use the following tools by responding with a JSON block:\n\n");
        prompt.push_str("```tool\n{\"tool\": \"tool_name\", \"arguments\": {\"arg\": \"value\"}}\n```\n\n");

        for schema in self.schemas() {
            prompt.push_str(&format!("### {}\n", schema.name));
            prompt.push_str(&format!("{}\n", schema.description));

            if !schema.parameters.is_empty() {
                prompt.push_str("**Parameters:**\n");
                for param in &schema.parameters {
                    let required = if param.required { " (required)" } else { "" };
                    prompt.push_str(&format!(
                        "- `{}` ({}){}: {}\n",
                        param.name, param.param_type, required, param.description
                    ));
                }
            }
            prompt.push('\n');
        }

        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn schema(&self) -> ToolSchema {
            ToolSchema {
                name: "echo".into(),
                description: "Repeats the text it is given".into(),
                parameters: vec![ParameterSchema::required_string("text", "Text to repeat")],
                category: None,
                has_side_effects: false,
            }
        }

        async fn execute(&self, call: &ToolCall) -> Result<ToolResult> {
            let text = call.text_argument("text").unwrap_or_default();
            Ok(ToolResult::success("echo", text))
        }
    }

    struct PingTool;

    #[async_trait]
    impl Tool for PingTool {
        fn schema(&self) -> ToolSchema {
            ToolSchema {
                name: "ping".into(),
                description: "Answers pong".into(),
                parameters: Vec::new(),
                category: None,
                has_side_effects: false,
            }
        }

        async fn execute(&self, _call: &ToolCall) -> Result<ToolResult> {
            Ok(ToolResult::success("ping", "pong"))
        }
    }

    #[test]
    fn test_tool_registry_order() {
        let mut registry = ToolRegistry::new();
        registry.register(PingTool);
        registry.register(EchoTool);
        registry.register(PingTool);

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.names(), vec!["ping".to_string(), "echo".to_string()]);
        assert!(registry.get("echo").is_some());
        assert!(registry.get("unknown").is_none());
    }

    #[test]
    fn test_tool_call_parsing_variants() {
        let call: ToolCall = serde_json::from_str(r#"{"tool": "echo", "arguments": {"text": "hi"}}"#).unwrap();
        assert_eq!(call.name, "echo");
        assert_eq!(call.text_argument("text").as_deref(), Some("hi"));

        let bare: ToolCall = serde_json::from_str(r#"{"tool": "echo", "arguments": "hello"}"#).unwrap();
        assert_eq!(bare.text_argument("text").as_deref(), Some("hello"));

        let none: ToolCall = serde_json::from_str(r#"{"name": "ping"}"#).unwrap();
        assert!(none.arguments.is_empty());
        assert!(none.text_argument("text").is_none());
    }

    #[test]
    fn test_text_argument_single_fallback() {
        let call = ToolCall::new("echo").with_argument("car_model", "Audi A4");
        assert_eq!(call.text_argument("model").as_deref(), Some("Audi A4"));

        let ambiguous = ToolCall::new("echo")
            .with_argument("a", "x")
            .with_argument("b", "y");
        assert!(ambiguous.text_argument("model").is_none());
    }

    #[tokio::test]
    async fn test_registry_execute_and_validate() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool);

        let ok = registry
            .execute(&ToolCall::new("echo").with_argument("text", "hi"))
            .await
            .unwrap();
        assert_eq!(ok.output, "hi");

        let missing = registry.execute(&ToolCall::new("echo")).await;
        assert!(matches!(missing, Err(AgentError::ToolValidation(_))));

        let unknown = registry.execute(&ToolCall::new("nope")).await;
        assert!(matches!(unknown, Err(AgentError::ToolNotFound(_))));
    }

    #[test]
    fn test_prompt_section_lists_tools() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool);
        let prompt = registry.generate_prompt_section();
        assert!(prompt.contains("### echo"));
        assert!(prompt.contains("`text` (string) (required)"));
    }
}
