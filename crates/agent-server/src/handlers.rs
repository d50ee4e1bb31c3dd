//! HTTP Handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use agent_core::{Role, SessionId, ToolSchema};
use car_sales::ContactUpdate;

use crate::state::{AppState, SessionHandle};

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub model_connected: bool,
    pub search_service: String,
    pub search_available: bool,
    pub cars_in_stock: usize,
    pub active_sessions: usize,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub session_id: String,
    pub role: Role,
    pub content: String,
    pub images: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SessionCreated {
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct TranscriptEntry {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub session_id: String,
    pub title: String,
    pub active: bool,
    pub messages: Vec<TranscriptEntry>,
    pub contact_complete: bool,
}

#[derive(Debug, Serialize)]
pub struct ContactStatus {
    pub session_id: String,
    pub complete: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, code: &str, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            code: code.into(),
        }),
    )
}

fn session_not_found(id: &SessionId) -> ApiError {
    api_error(StatusCode::NOT_FOUND, "SESSION_NOT_FOUND", format!("No session with id {}", id))
}

async fn find_session(state: &AppState, id: &SessionId) -> Result<SessionHandle, ApiError> {
    state.session(id).await.ok_or_else(|| session_not_found(id))
}

// ============================================================================
// Router
// ============================================================================

/// API routes with state applied
pub fn router(state: AppState) -> Router {
    Router::new()
        // Health & info
        .route("/health", get(health_check))
        .route("/api/tools", get(list_tools))

        // Sessions
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/{id}", get(get_session).delete(delete_session))
        .route("/api/sessions/{id}/contact", put(update_contact))

        // Agent API
        .route("/api/chat", post(chat_handler))

        .with_state(state)
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let model_connected = state.provider.health_check().await.unwrap_or(false);
    let search_available = state.search.health_check().await;

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        model_connected,
        search_service: state.search.name().to_string(),
        search_available,
        cars_in_stock: state.catalog.len(),
        active_sessions: state.session_count().await,
    })
}

/// Tool descriptors in registration order
pub async fn list_tools(State(state): State<AppState>) -> Json<Vec<ToolSchema>> {
    Json(state.tool_schemas())
}

pub async fn create_session(State(state): State<AppState>) -> (StatusCode, Json<SessionCreated>) {
    let (id, _) = state.create_session().await;
    (StatusCode::CREATED, Json(SessionCreated { session_id: id.to_string() }))
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    let id = SessionId::from_string(id);
    let handle = find_session(&state, &id).await?;
    let sales = handle.lock().await;

    Ok(Json(SessionView {
        session_id: id.to_string(),
        title: sales.session.title(),
        active: sales.session.active,
        messages: sales
            .session
            .transcript()
            .iter()
            .map(|m| TranscriptEntry { role: m.role, content: m.content.clone() })
            .collect(),
        contact_complete: sales.contact.is_complete(),
    }))
}

pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = SessionId::from_string(id);
    if state.end_session(&id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(session_not_found(&id))
    }
}

/// Fill in the contact form the `CollectClientInfo` tool reads
pub async fn update_contact(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<ContactUpdate>,
) -> Result<Json<ContactStatus>, ApiError> {
    let id = SessionId::from_string(id);
    let handle = find_session(&state, &id).await?;
    let sales = handle.lock().await;

    sales.contact.update(update);

    Ok(Json(ContactStatus {
        session_id: id.to_string(),
        complete: sales.contact.is_complete(),
    }))
}

/// Run one conversational turn
pub async fn chat_handler(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let message = payload.message.trim();
    if message.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "EMPTY_MESSAGE", "Message must not be empty"));
    }

    let (id, handle) = match payload.session_id {
        Some(raw) => {
            let id = SessionId::from_string(raw);
            let handle = find_session(&state, &id).await?;
            (id, handle)
        }
        None => state.create_session().await,
    };

    // Turns of one session run one at a time
    let mut guard = handle.lock().await;
    let sales = &mut *guard;
    let outcome = sales.agent.respond(&mut sales.session, message).await;

    Ok(Json(ChatResponse {
        session_id: id.to_string(),
        role: Role::Assistant,
        content: outcome.content,
        images: outcome.images,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    use agent_core::provider::{Completion, GenerationOptions, ModelInfo, ProviderInfo};
    use agent_core::{AgentConfig, AgentError, Message};
    use car_sales::search::MockSearchClient;
    use car_sales::{Catalog, CAR_SALES_PROMPT};

    /// Replays canned model replies in order
    struct ScriptedProvider {
        replies: Mutex<VecDeque<String>>,
    }

    impl ScriptedProvider {
        fn new(replies: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.iter().map(|r| (*r).to_string()).collect()),
            })
        }
    }

    #[async_trait]
    impl agent_core::LlmProvider for ScriptedProvider {
        async fn info(&self) -> agent_core::Result<ProviderInfo> {
            Ok(ProviderInfo { name: "scripted".into(), models: Vec::new(), supports_tools: false })
        }

        async fn health_check(&self) -> agent_core::Result<bool> {
            Ok(true)
        }

        async fn complete(&self, _messages: &[Message], options: &GenerationOptions) -> agent_core::Result<Completion> {
            let next = self.replies.lock().unwrap().pop_front();
            next.map(|text| Completion::text(text, options.model.clone()))
                .ok_or_else(|| AgentError::ProviderUnavailable("model service down".into()))
        }

        async fn list_models(&self) -> agent_core::Result<Vec<ModelInfo>> {
            Ok(Vec::new())
        }
    }

    fn app(replies: &[&str]) -> (Router, AppState) {
        let config = AgentConfig {
            system_prompt: CAR_SALES_PROMPT.into(),
            ..Default::default()
        };
        let state = AppState::new(
            ScriptedProvider::new(replies),
            Arc::new(MockSearchClient::new()),
            Arc::new(Catalog::default_stock()),
            config,
        );
        (router(state.clone()), state)
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<serde_json::Value>) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _) = app(&[]);
        let (status, body) = send(&app, "GET", "/health", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["cars_in_stock"], 20);
        assert_eq!(body["search_available"], true);
    }

    #[tokio::test]
    async fn test_list_tools() {
        let (app, _) = app(&[]);
        let (status, body) = send(&app, "GET", "/api/tools", None).await;

        assert_eq!(status, StatusCode::OK);
        let names: Vec<&str> = body.as_array().unwrap().iter().map(|t| t["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["ComparePrices", "GetCarDetails", "ListAvailableCars", "CollectClientInfo"]);
    }

    #[tokio::test]
    async fn test_chat_with_tool_and_images() {
        let (app, _) = app(&[
            "```tool\n{\"tool\": \"GetCarDetails\", \"arguments\": {\"car_model\": \"Audi A4\"}}\n```",
            "We have the Audi A4 for $43,000.",
        ]);

        let (status, body) = send(&app, "POST", "/api/chat", Some(serde_json::json!({"message": "Tell me about the Audi A4"}))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["role"], "assistant");
        assert_eq!(body["content"], "We have the Audi A4 for $43,000.");
        assert_eq!(body["images"].as_array().unwrap().len(), 1);

        let id = body["session_id"].as_str().unwrap().to_string();
        let (status, view) = send(&app, "GET", &format!("/api/sessions/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);

        let messages = view["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "user");
        assert_eq!(messages[1]["content"], "We have the Audi A4 for $43,000.");
    }

    #[tokio::test]
    async fn test_agent_failure_is_a_reply() {
        let (app, _) = app(&[]);
        let (status, body) = send(&app, "POST", "/api/chat", Some(serde_json::json!({"message": "hi"}))).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["content"].as_str().unwrap().starts_with("An error occurred:"));
    }

    #[tokio::test]
    async fn test_unknown_session_is_404() {
        let (app, _) = app(&["hello"]);

        let (status, body) = send(&app, "POST", "/api/chat", Some(serde_json::json!({"message": "hi", "session_id": "nope"}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "SESSION_NOT_FOUND");

        let (status, _) = send(&app, "GET", "/api/sessions/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_empty_message_is_rejected() {
        let (app, _) = app(&[]);
        let (status, _) = send(&app, "POST", "/api/chat", Some(serde_json::json!({"message": "   "}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_contact_form_feeds_collect_client_info() {
        let (app, state) = app(&[
            "```tool\n{\"tool\": \"CollectClientInfo\", \"arguments\": {}}\n```",
            "Thanks Ana, we will be in touch.",
        ]);

        let (status, body) = send(&app, "POST", "/api/sessions", None).await;
        assert_eq!(status, StatusCode::CREATED);
        let id = body["session_id"].as_str().unwrap().to_string();

        let (status, body) = send(
            &app,
            "PUT",
            &format!("/api/sessions/{id}/contact"),
            Some(serde_json::json!({"name": "Ana", "email": "ana@example.com", "phone": "555-0101"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["complete"], true);

        let (status, body) = send(&app, "POST", "/api/chat", Some(serde_json::json!({"message": "Please contact me", "session_id": id}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["content"], "Thanks Ana, we will be in touch.");

        let handle = state.session(&SessionId::from_string(id)).await.unwrap();
        let sales = handle.lock().await;
        let observation = sales
            .session
            .memory()
            .messages()
            .iter()
            .find(|m| m.role == Role::Tool)
            .map(|m| m.content.clone())
            .unwrap();
        assert!(observation.contains("Client info: Name: Ana, Email: ana@example.com, Phone: 555-0101"));
    }

    #[tokio::test]
    async fn test_delete_session() {
        let (app, state) = app(&[]);
        let (_, body) = send(&app, "POST", "/api/sessions", None).await;
        let id = body["session_id"].as_str().unwrap().to_string();

        let (status, _) = send(&app, "DELETE", &format!("/api/sessions/{id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(state.session_count().await, 0);

        let (status, _) = send(&app, "DELETE", &format!("/api/sessions/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_idle_sessions_are_evicted() {
        let (app, state) = app(&[]);
        let mut handles = Vec::new();
        for _ in 0..3 {
            let (_, body) = send(&app, "POST", "/api/sessions", None).await;
            let id = SessionId::from_string(body["session_id"].as_str().unwrap());
            handles.push((id.clone(), state.session(&id).await.unwrap()));
        }
        assert_eq!(state.session_count().await, 3);

        for (_, handle) in &handles[..2] {
            handle.lock().await.session.updated_at = chrono::Utc::now() - chrono::Duration::hours(2);
        }

        assert_eq!(state.evict_idle().await, 2);
        assert_eq!(state.session_count().await, 1);
        assert!(!handles[0].1.lock().await.session.active);

        let (status, _) = send(&app, "GET", &format!("/api/sessions/{}", handles[0].0), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&app, "GET", &format!("/api/sessions/{}", handles[2].0), None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_busy_session_survives_sweep() {
        let (_, state) = app(&[]);
        let state = state.with_idle_timeout(Duration::ZERO);
        let (_, handle) = state.create_session().await;

        let guard = handle.lock().await;
        assert_eq!(state.evict_idle().await, 0);
        drop(guard);

        assert_eq!(state.evict_idle().await, 1);
        assert_eq!(state.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_one_shot_chats_do_not_accumulate() {
        let replies = vec!["hello"; 50];
        let state = AppState::new(
            ScriptedProvider::new(&replies),
            Arc::new(MockSearchClient::new()),
            Arc::new(Catalog::default_stock()),
            AgentConfig::default(),
        )
        .with_idle_timeout(Duration::ZERO);
        let app = router(state.clone());

        for _ in 0..50 {
            let (status, body) = send(&app, "POST", "/api/chat", Some(serde_json::json!({"message": "hi"}))).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["content"], "hello");
        }

        assert_eq!(state.session_count().await, 1);
    }
}
