//! # agent-runtime
//!
//! Model-service providers for the car sales agent.
//!
//! ## Providers
//!
//! - **Gemini** (default): Google Generative Language API over HTTPS
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_runtime::gemini::{GeminiConfig, GeminiProvider};
//!
//! let provider = GeminiProvider::from_config(GeminiConfig::new(api_key))?;
//! let agent = AgentBuilder::new()
//!     .provider(Arc::new(provider))
//!     .build()?;
//! ```

#[cfg(feature = "gemini")]
pub mod gemini;

#[cfg(feature = "gemini")]
pub use gemini::{GeminiConfig, GeminiProvider};

// Re-export core types for convenience
pub use agent_core::{
    Agent, AgentError, LlmProvider, Message, Result, Role, Session, Tool, ToolRegistry,
};
