//! Application State

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};

use agent_core::{Agent, AgentConfig, LlmProvider, Session, SessionId, ToolSchema};
use car_sales::search::SearchClient;
use car_sales::{Catalog, ContactForm, SalesToolKind, SalesToolbox};

/// One customer conversation with its own contact form and agent
pub struct SalesSession {
    pub session: Session,
    pub contact: ContactForm,
    pub agent: Agent,
}

pub type SessionHandle = Arc<Mutex<SalesSession>>;

/// Sessions untouched for this long are dropped
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Model service (Gemini, or a double in tests)
    pub provider: Arc<dyn LlmProvider>,

    /// Web search service
    pub search: Arc<dyn SearchClient>,

    /// Stock list, fixed for the life of the process
    pub catalog: Arc<Catalog>,

    /// Prompt and generation options for every session's agent
    pub agent_config: AgentConfig,

    /// Inactivity after which a session is evicted
    pub idle_timeout: Duration,

    sessions: Arc<RwLock<HashMap<SessionId, SessionHandle>>>,
}

impl AppState {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        search: Arc<dyn SearchClient>,
        catalog: Arc<Catalog>,
        agent_config: AgentConfig,
    ) -> Self {
        Self {
            provider,
            search,
            catalog,
            agent_config,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    #[must_use]
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Start a session; its tools read its own contact form.
    /// Idle sessions are swept first.
    pub async fn create_session(&self) -> (SessionId, SessionHandle) {
        self.evict_idle().await;

        let contact = ContactForm::new();
        let tools = SalesToolbox::new(
            Arc::clone(&self.catalog),
            Arc::clone(&self.search),
            Arc::new(contact.clone()),
        )
        .into_registry();

        let agent = Agent::new(Arc::clone(&self.provider), Arc::new(tools), self.agent_config.clone());
        let session = Session::new();
        let id = session.id.clone();

        let handle = Arc::new(Mutex::new(SalesSession { session, contact, agent }));
        self.sessions.write().await.insert(id.clone(), Arc::clone(&handle));

        tracing::info!(session = %id, "session started");
        (id, handle)
    }

    pub async fn session(&self, id: &SessionId) -> Option<SessionHandle> {
        self.sessions.read().await.get(id).cloned()
    }

    /// End and forget a session. Returns false if it did not exist.
    pub async fn end_session(&self, id: &SessionId) -> bool {
        let removed = self.sessions.write().await.remove(id);
        match removed {
            Some(handle) => {
                handle.lock().await.session.end();
                tracing::info!(session = %id, "session ended");
                true
            }
            None => false,
        }
    }

    /// End and drop every session idle past `idle_timeout`. A session in the
    /// middle of a turn is locked and always kept.
    pub async fn evict_idle(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();

        sessions.retain(|id, handle| match handle.try_lock() {
            Ok(mut sales) if sales.session.is_idle(self.idle_timeout) => {
                sales.session.end();
                tracing::debug!(session = %id, "idle session evicted");
                false
            }
            _ => true,
        });

        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::info!(evicted, remaining = sessions.len(), "evicted idle sessions");
        }
        evicted
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub fn tool_schemas(&self) -> Vec<ToolSchema> {
        SalesToolKind::ALL.into_iter().map(SalesToolKind::schema).collect()
    }
}
