//! Reasoning Loop
//!
//! ReAct-style turn handling: the model either answers directly or asks for a
//! tool with a fenced block; the agent runs the tool, feeds the observation
//! back and asks again. A turn may use at most `max_tool_calls` tools.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{AgentError, Result};
use crate::message::{Conversation, Message};
use crate::provider::{GenerationOptions, LlmProvider};
use crate::session::Session;
use crate::tool::{ToolCall, ToolRegistry, ToolResult};

/// Agent configuration
#[derive(Clone, Debug)]
pub struct AgentConfig {
    /// System prompt template
    pub system_prompt: String,

    /// Tool invocations allowed per turn
    pub max_tool_calls: usize,

    /// Generation options
    pub generation: GenerationOptions,

    /// Whether to append tool descriptions to system prompt
    pub inject_tool_descriptions: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.into(),
            max_tool_calls: 1,
            generation: GenerationOptions::default(),
            inject_tool_descriptions: true,
        }
    }
}

const DEFAULT_SYSTEM_PROMPT: &str = r#"You are a helpful AI assistant.

When you need to use a tool, respond with a JSON block in this exact format:
```tool
{"tool": "tool_name", "arguments": {"arg1": "value1"}}
```

After receiving tool results, synthesize them into a helpful response.
If you can answer directly without tools, do so.
Be concise and accurate."#;

const TOOL_FENCE: &str = "```tool";
const FENCE: &str = "```";

/// Final answer of one turn
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AgentReply {
    /// Text plus images to render beneath it
    Rich { details: String, images: Vec<String> },
    /// Plain text
    Text(String),
}

impl AgentReply {
    /// Text to display
    pub fn content(&self) -> &str {
        match self {
            AgentReply::Text(text) => text,
            AgentReply::Rich { details, .. } => details,
        }
    }

    /// Images to display (empty for plain text)
    pub fn images(&self) -> &[String] {
        match self {
            AgentReply::Text(_) => &[],
            AgentReply::Rich { images, .. } => images,
        }
    }

    /// Interpret the model's final text.
    ///
    /// A JSON object carrying an `images` key is taken as a structured reply.
    /// Otherwise, images from the turn's last tool observation are attached.
    fn from_final(content: &str, observation: Option<&ToolResult>) -> Self {
        if let Some(structured) = parse_structured_reply(content) {
            return structured;
        }

        match observation {
            Some(result) if !result.images.is_empty() => AgentReply::Rich {
                details: content.trim().to_string(),
                images: result.images.clone(),
            },
            _ => AgentReply::Text(content.trim().to_string()),
        }
    }
}

#[derive(Deserialize)]
struct StructuredReply {
    #[serde(default)]
    details: String,
    images: Vec<String>,
}

fn parse_structured_reply(content: &str) -> Option<AgentReply> {
    let trimmed = content.trim();
    let body = trimmed
        .strip_prefix("```json")
        .and_then(|rest| rest.strip_suffix(FENCE))
        .unwrap_or(trimmed)
        .trim();

    if !body.starts_with('{') {
        return None;
    }

    serde_json::from_str::<StructuredReply>(body)
        .ok()
        .map(|r| AgentReply::Rich { details: r.details, images: r.images })
}

/// What the presentation layer shows for a processed turn
#[derive(Clone, Debug, Serialize)]
pub struct TurnOutcome {
    /// Assistant text (or the error notice)
    pub content: String,

    /// Images to render beneath the text
    pub images: Vec<String>,

    /// Whether the agent failed and `content` is an error notice
    pub failed: bool,
}

/// The main Agent struct
pub struct Agent {
    provider: Arc<dyn LlmProvider>,
    tools: Arc<ToolRegistry>,
    config: AgentConfig,
}

impl Agent {
    /// Create a new agent
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        tools: Arc<ToolRegistry>,
        config: AgentConfig,
    ) -> Self {
        Self {
            provider,
            tools,
            config,
        }
    }

    /// Build the full system prompt including tool descriptions
    fn build_system_prompt(&self) -> String {
        let mut prompt = self.config.system_prompt.clone();

        if self.config.inject_tool_descriptions && !self.tools.is_empty() {
            prompt.push_str("\n\n");
            prompt.push_str(&self.tools.generate_prompt_section());
        }

        prompt
    }

    /// Run the agent over a conversation whose last message is the user input
    pub async fn run(&self, conversation: &mut Conversation) -> Result<AgentReply> {
        if !conversation.has_system_prompt() {
            conversation.set_system_prompt(self.build_system_prompt());
        }

        let mut tool_calls = 0;
        let mut observation: Option<ToolResult> = None;

        loop {
            conversation.truncate_to_fit();

            let completion = self.provider
                .complete(conversation.messages(), &self.config.generation)
                .await?;

            let content = completion.content;
            conversation.push(Message::assistant(&content));

            let Some(tool_call) = self.parse_tool_call(&content) else {
                return Ok(AgentReply::from_final(&content, observation.as_ref()));
            };

            if tool_calls >= self.config.max_tool_calls {
                tracing::warn!(
                    tool = %tool_call.name,
                    limit = self.config.max_tool_calls,
                    "Tool budget for this turn is spent, answering without it"
                );
                let text = strip_tool_block(&content);
                let text = if text.is_empty() {
                    observation.as_ref().map(|o| o.output.clone()).unwrap_or_default()
                } else {
                    text
                };
                return Ok(AgentReply::from_final(&text, observation.as_ref()));
            }

            tracing::debug!(tool = %tool_call.name, "Executing tool");
            tool_calls += 1;

            let result = self.execute_tool(&tool_call).await;
            conversation.push(Message::tool(
                self.format_tool_result(&result),
                result.name.clone(),
                tool_call.id.clone(),
            ));
            observation = Some(result);
        }
    }

    /// Run with a simple string input (creates temporary conversation)
    pub async fn ask(&self, question: &str) -> Result<AgentReply> {
        let mut conversation = Conversation::with_system_prompt(self.build_system_prompt());
        conversation.push(Message::user(question));
        self.run(&mut conversation).await
    }

    /// Process one user turn against a session.
    ///
    /// The user input is appended before the agent runs and the reply after.
    /// Agent failures never escape: they become an error notice that is
    /// appended like any other reply.
    pub async fn respond(&self, session: &mut Session, input: &str) -> TurnOutcome {
        session.record_user(input);

        match self.run(session.memory_mut()).await {
            Ok(reply) => {
                session.record_assistant(reply.content(), false);
                TurnOutcome {
                    content: reply.content().to_string(),
                    images: reply.images().to_vec(),
                    failed: false,
                }
            }
            Err(e) => {
                tracing::error!(session = %session.id, error = %e, "Agent turn failed");
                let content = format!("An error occurred: {}", e);
                session.record_assistant(&content, true);
                TurnOutcome {
                    content,
                    images: Vec::new(),
                    failed: true,
                }
            }
        }
    }

    /// Parse a tool call from LLM response
    fn parse_tool_call(&self, content: &str) -> Option<ToolCall> {
        if let Some(start_idx) = content.find(TOOL_FENCE) {
            let after_marker = &content[start_idx + TOOL_FENCE.len()..];
            if let Some(end_idx) = after_marker.find(FENCE) {
                let json_str = after_marker[..end_idx].trim();

                if let Ok(call) = serde_json::from_str::<ToolCall>(json_str) {
                    return Some(self.assign_call_id(call));
                }
            }
        }

        // Fallback: raw JSON with a "tool" key
        self.parse_inline_tool_call(content)
            .map(|call| self.assign_call_id(call))
    }

    fn assign_call_id(&self, mut call: ToolCall) -> ToolCall {
        if call.id.is_none() {
            call.id = Some(uuid::Uuid::new_v4().to_string());
        }
        call
    }

    /// Try to parse inline JSON tool call
    fn parse_inline_tool_call(&self, content: &str) -> Option<ToolCall> {
        if !content.contains(r#""tool""#) {
            return None;
        }

        let start = content.find('{')?;
        let end = content.rfind('}')?;

        if end <= start {
            return None;
        }

        let call = serde_json::from_str::<ToolCall>(&content[start..=end]).ok()?;
        self.tools.get(&call.name).map(|_| call)
    }

    /// Execute a tool call; every failure becomes a failed observation
    async fn execute_tool(&self, call: &ToolCall) -> ToolResult {
        match self.tools.execute(call).await {
            Ok(mut result) => {
                result.id = call.id.clone();
                result
            }
            Err(e) => {
                tracing::warn!(tool = %call.name, error = %e, "Tool call failed");
                ToolResult {
                    name: call.name.clone(),
                    id: call.id.clone(),
                    success: false,
                    output: format!("Error: {}", e),
                    images: Vec::new(),
                    data: None,
                }
            }
        }
    }

    /// Format tool result for conversation
    fn format_tool_result(&self, result: &ToolResult) -> String {
        let mut text = if result.success {
            format!("[Tool '{}' returned]\n{}", result.name, result.output)
        } else {
            format!("[Tool '{}' failed]\n{}", result.name, result.output)
        };

        if !result.images.is_empty() {
            text.push_str(&format!(
                "\n({} image(s) will be shown to the user alongside your answer)",
                result.images.len()
            ));
        }

        text
    }

    /// Get the tool registry
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Get configuration
    pub const fn config(&self) -> &AgentConfig {
        &self.config
    }
}

/// Remove a fenced tool block, keeping the text around it
fn strip_tool_block(content: &str) -> String {
    let Some(start) = content.find(TOOL_FENCE) else {
        return content.trim().to_string();
    };
    let after = &content[start + TOOL_FENCE.len()..];
    let rest = after.find(FENCE).map_or("", |end| &after[end + FENCE.len()..]);

    format!("{}{}", &content[..start], rest).trim().to_string()
}

/// Builder for Agent configuration
pub struct AgentBuilder {
    provider: Option<Arc<dyn LlmProvider>>,
    tools: ToolRegistry,
    config: AgentConfig,
}

impl Default for AgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            tools: ToolRegistry::new(),
            config: AgentConfig::default(),
        }
    }

    #[must_use]
    pub fn provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    #[must_use]
    pub fn tool<T: crate::tool::Tool + 'static>(mut self, tool: T) -> Self {
        self.tools.register(tool);
        self
    }

    #[must_use]
    pub fn tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    #[must_use]
    pub fn config(mut self, config: AgentConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = prompt.into();
        self
    }

    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.generation.model = model.into();
        self
    }

    #[must_use]
    pub fn temperature(mut self, temp: f32) -> Self {
        self.config.generation.temperature = temp;
        self
    }

    #[must_use]
    pub fn max_tool_calls(mut self, max: usize) -> Self {
        self.config.max_tool_calls = max;
        self
    }

    pub fn build(self) -> Result<Agent> {
        let provider = self.provider
            .ok_or_else(|| AgentError::Config("Provider is required".into()))?;

        Ok(Agent::new(provider, Arc::new(self.tools), self.config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::message::Role;
    use crate::provider::{Completion, ModelInfo, ProviderInfo};
    use crate::tool::{ParameterSchema, Tool, ToolSchema};

    /// Replays canned completions and records every prompt it was sent
    struct ScriptedProvider {
        replies: Mutex<VecDeque<Result<String>>>,
        seen: Mutex<Vec<Vec<Message>>>,
    }

    impl ScriptedProvider {
        fn new(replies: Vec<Result<String>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.seen.lock().unwrap().len()
        }

        fn last_prompt(&self) -> Vec<Message> {
            self.seen.lock().unwrap().last().cloned().unwrap_or_default()
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        async fn info(&self) -> Result<ProviderInfo> {
            Ok(ProviderInfo { name: "scripted".into(), models: Vec::new(), supports_tools: false })
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        async fn complete(&self, messages: &[Message], options: &GenerationOptions) -> Result<Completion> {
            self.seen.lock().unwrap().push(messages.to_vec());
            let next = self.replies.lock().unwrap().pop_front();
            match next {
                Some(Ok(text)) => Ok(Completion::text(text, options.model.clone())),
                Some(Err(e)) => Err(e),
                None => Err(AgentError::Provider("script exhausted".into())),
            }
        }

        async fn list_models(&self) -> Result<Vec<ModelInfo>> {
            Ok(Vec::new())
        }
    }

    struct StockTool;

    #[async_trait]
    impl Tool for StockTool {
        fn schema(&self) -> ToolSchema {
            ToolSchema {
                name: "stock".into(),
                description: "Looks up a car".into(),
                parameters: vec![ParameterSchema::required_string("car_model", "Car model")],
                category: None,
                has_side_effects: false,
            }
        }

        async fn execute(&self, call: &ToolCall) -> Result<ToolResult> {
            let model = call.text_argument("car_model").unwrap_or_default();
            Ok(ToolResult::success("stock", format!("{model} is in stock"))
                .with_images(vec!["https://img.example/1.jpg".into()]))
        }
    }

    fn agent_with(provider: Arc<ScriptedProvider>) -> Agent {
        AgentBuilder::new()
            .provider(provider)
            .tool(StockTool)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_direct_answer() {
        let provider = ScriptedProvider::new(vec![Ok("Hello! How can I help?".into())]);
        let agent = agent_with(provider.clone());

        let reply = agent.ask("hi").await.unwrap();
        assert_eq!(reply, AgentReply::Text("Hello! How can I help?".into()));
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_tool_call_round_trip_attaches_images() {
        let provider = ScriptedProvider::new(vec![
            Ok("Let me check.\n```tool\n{\"tool\": \"stock\", \"arguments\": {\"car_model\": \"Audi A4\"}}\n```".into()),
            Ok("Good news, the Audi A4 is available.".into()),
        ]);
        let agent = agent_with(provider.clone());

        let reply = agent.ask("Do you have an Audi A4?").await.unwrap();
        assert_eq!(reply.content(), "Good news, the Audi A4 is available.");
        assert_eq!(reply.images(), ["https://img.example/1.jpg".to_string()]);

        let prompt = provider.last_prompt();
        let observation = prompt.iter().find(|m| m.role == Role::Tool).unwrap();
        assert!(observation.content.contains("Audi A4 is in stock"));
        assert!(observation.content.contains("1 image(s)"));
    }

    #[tokio::test]
    async fn test_second_tool_call_is_not_executed() {
        let provider = ScriptedProvider::new(vec![
            Ok("```tool\n{\"tool\": \"stock\", \"arguments\": {\"car_model\": \"Audi A4\"}}\n```".into()),
            Ok("```tool\n{\"tool\": \"stock\", \"arguments\": {\"car_model\": \"BMW 3 Series\"}}\n```".into()),
        ]);
        let agent = agent_with(provider.clone());

        let reply = agent.ask("Audi or BMW?").await.unwrap();
        assert_eq!(provider.calls(), 2);
        // Nothing but a tool block: fall back to the last observation
        assert_eq!(reply.content(), "Audi A4 is in stock");
    }

    #[tokio::test]
    async fn test_unknown_tool_becomes_failed_observation() {
        let provider = ScriptedProvider::new(vec![
            Ok("```tool\n{\"tool\": \"teleport\", \"arguments\": {}}\n```".into()),
            Ok("Sorry, I can't do that.".into()),
        ]);
        let agent = agent_with(provider.clone());

        let reply = agent.ask("teleport me").await.unwrap();
        assert_eq!(reply.content(), "Sorry, I can't do that.");

        let prompt = provider.last_prompt();
        let observation = prompt.iter().find(|m| m.role == Role::Tool).unwrap();
        assert!(observation.content.starts_with("[Tool 'teleport' failed]"));
    }

    #[tokio::test]
    async fn test_structured_final_reply() {
        let provider = ScriptedProvider::new(vec![Ok(
            r#"{"details": "Here it is", "images": ["https://img.example/a.png"]}"#.into(),
        )]);
        let agent = agent_with(provider);

        let reply = agent.ask("show me").await.unwrap();
        assert_eq!(
            reply,
            AgentReply::Rich {
                details: "Here it is".into(),
                images: vec!["https://img.example/a.png".into()],
            }
        );
    }

    #[tokio::test]
    async fn test_respond_appends_both_turns() {
        let provider = ScriptedProvider::new(vec![Ok("We have plenty of cars.".into())]);
        let agent = agent_with(provider);
        let mut session = Session::new();

        let outcome = agent.respond(&mut session, "What do you have?").await;
        assert!(!outcome.failed);
        assert_eq!(outcome.content, "We have plenty of cars.");

        let transcript = session.transcript();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[0].role, Role::User);
        assert_eq!(transcript[1].content, "We have plenty of cars.");
        assert!(session.memory().has_system_prompt());
    }

    #[tokio::test]
    async fn test_respond_converts_failure_to_notice() {
        let provider = ScriptedProvider::new(vec![Err(AgentError::ProviderUnavailable("timeout".into()))]);
        let agent = agent_with(provider);
        let mut session = Session::new();

        let outcome = agent.respond(&mut session, "hello").await;
        assert!(outcome.failed);
        assert!(outcome.content.starts_with("An error occurred:"));
        assert!(outcome.content.contains("timeout"));
        assert_eq!(session.transcript().len(), 2);
    }

    #[test]
    fn test_strip_tool_block() {
        let text = "Sure.\n```tool\n{\"tool\": \"x\"}\n```\nAnything else?";
        assert_eq!(strip_tool_block(text), "Sure.\n\nAnything else?");
        assert_eq!(strip_tool_block("  plain  "), "plain");
    }

    #[test]
    fn test_builder_requires_provider() {
        assert!(matches!(AgentBuilder::new().build(), Err(AgentError::Config(_))));
    }
}
