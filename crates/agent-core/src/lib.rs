//! # agent-core
//!
//! Core agent logic with provider-agnostic LLM abstraction and a tool registry.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Agent                                 │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────┐  │
//! │  │  Reasoning  │  │    Tools    │  │   LlmProvider       │  │
//! │  │    Loop     │──│   Registry  │──│   (Strategy)        │  │
//! │  └─────────────┘  └─────────────┘  └─────────────────────┘  │
//! │         │                                                    │
//! │  ┌─────────────┐                                             │
//! │  │   Session   │  transcript (user/assistant) + memory       │
//! │  └─────────────┘                                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `LlmProvider` trait keeps the agent independent of the model service.
//! Which tool to call, and when to stop, is decided by the model; the agent
//! only parses the request, runs the tool and feeds the observation back.

pub mod provider;
pub mod tool;
pub mod reasoning;
pub mod message;
pub mod error;
pub mod session;

pub use error::{AgentError, Result};
pub use message::{Conversation, Message, Role};
pub use provider::LlmProvider;
pub use reasoning::{Agent, AgentBuilder, AgentConfig, AgentReply, TurnOutcome};
pub use session::{Session, SessionId};
pub use tool::{ParameterSchema, Tool, ToolCall, ToolRegistry, ToolResult, ToolSchema};
