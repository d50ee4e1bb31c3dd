//! Session Management
//!
//! A session is created when a user starts chatting and dropped when they
//! leave. It owns two histories:
//!
//! - the **transcript**: user and assistant turns exactly as displayed,
//!   append-only;
//! - the **memory**: the agent's working conversation, including the system
//!   prompt and tool observations, which may be truncated to fit the context.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::message::{Conversation, Message, Role};

/// Unique session identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A complete agent session
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Session {
    /// Unique identifier
    pub id: SessionId,

    /// Displayed turns (user/assistant only)
    transcript: Vec<Message>,

    /// Agent working memory
    #[serde(skip)]
    memory: Conversation,

    /// Session title (user-set)
    pub title: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last activity timestamp
    pub updated_at: DateTime<Utc>,

    /// Whether session is active
    pub active: bool,
}

impl Session {
    /// Create a new session
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: SessionId::new(),
            transcript: Vec::new(),
            memory: Conversation::new(),
            title: None,
            created_at: now,
            updated_at: now,
            active: true,
        }
    }

    /// Create with specific ID
    pub fn with_id(id: SessionId) -> Self {
        let mut session = Self::new();
        session.id = id;
        session
    }

    /// Update the activity timestamp
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Append a user turn to both the transcript and the memory
    pub fn record_user(&mut self, content: impl Into<String>) {
        let msg = Message::user(content);
        self.memory.push(msg.clone());
        self.transcript.push(msg);
        self.touch();
    }

    /// Append an assistant turn to the transcript.
    ///
    /// The memory already holds the model's own messages; only replies the
    /// agent did not produce itself (errors) are mirrored there.
    pub fn record_assistant(&mut self, content: impl Into<String>, mirror_to_memory: bool) {
        let msg = Message::assistant(content);
        if mirror_to_memory {
            self.memory.push(msg.clone());
        }
        self.transcript.push(msg);
        self.touch();
    }

    /// Displayed turns, oldest first
    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    /// Agent working memory
    pub fn memory(&self) -> &Conversation {
        &self.memory
    }

    /// Mutable agent working memory (the reasoning loop appends to it)
    pub fn memory_mut(&mut self) -> &mut Conversation {
        &mut self.memory
    }

    /// Get or generate title
    pub fn title(&self) -> String {
        self.title.clone().unwrap_or_else(|| {
            self.transcript
                .iter()
                .find(|m| m.role == Role::User)
                .map_or_else(
                    || format!("Session {}", self.id.0.chars().take(8).collect::<String>()),
                    |m| {
                        let preview: String = m.content.chars().take(50).collect();
                        if m.content.chars().count() > 50 {
                            format!("{}...", preview)
                        } else {
                            preview
                        }
                    },
                )
        })
    }

    /// End the session
    pub fn end(&mut self) {
        self.active = false;
        self.touch();
    }

    /// Number of displayed turns
    pub fn message_count(&self) -> usize {
        self.transcript.len()
    }

    /// Duration since creation
    pub fn duration(&self) -> chrono::Duration {
        self.updated_at - self.created_at
    }

    /// Time since the last recorded activity
    pub fn idle_for(&self) -> chrono::Duration {
        Utc::now() - self.updated_at
    }

    /// No activity for at least `timeout`. A timeout too large to represent never expires.
    pub fn is_idle(&self, timeout: std::time::Duration) -> bool {
        chrono::Duration::from_std(timeout).is_ok_and(|limit| self.idle_for() >= limit)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
