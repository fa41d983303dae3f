//! HTTP surface of the assistant backend.

pub mod chat;
pub mod health;
pub mod reports;

use crate::llm::Message;
use crate::state::AppState;
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::health_check))
        .route("/chat", post(chat::chat_handler))
        .route("/create-check-in-report", post(reports::check_in_report))
        .route("/create-take-leave-report", post(reports::take_leave_report))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Role-tagged message as accepted on the wire.
#[derive(Debug, Deserialize)]
pub struct WireMessage {
    pub role: WireRole,
    pub content: String,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WireRole {
    Ai,
    Human,
    System,
}

/// Request body shared by the chat and report endpoints.
#[derive(Debug, Deserialize)]
pub struct RequestMessage {
    pub messages: Vec<WireMessage>,
}

impl RequestMessage {
    /// Conversation turns for the report pipeline (human/ai only; system
    /// turns are supplied by the pipeline itself).
    #[must_use]
    pub fn conversation(&self) -> Vec<Message> {
        self.messages
            .iter()
            .filter_map(|m| match m.role {
                WireRole::Human => Some(Message::human(m.content.clone())),
                WireRole::Ai => Some(Message::ai(m.content.clone())),
                WireRole::System => None,
            })
            .collect()
    }

    /// Full mapping including system turns, for free-form chat.
    #[must_use]
    pub fn full(&self) -> Vec<Message> {
        self.messages
            .iter()
            .map(|m| match m.role {
                WireRole::Human => Message::human(m.content.clone()),
                WireRole::Ai => Message::ai(m.content.clone()),
                WireRole::System => Message::system(m.content.clone()),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Role;

    #[test]
    fn test_request_message_deserializes() {
        let body = r#"{
            "messages": [
                { "role": "human", "content": "ขอรายงานการเข้างานกลุ่ม Back Office ปี 2024" },
                { "role": "ai", "content": "ได้ครับ" }
            ]
        }"#;
        let request: RequestMessage = serde_json::from_str(body).unwrap();
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, WireRole::Human);
    }

    #[test]
    fn test_conversation_drops_system_turns() {
        let request = RequestMessage {
            messages: vec![
                WireMessage {
                    role: WireRole::System,
                    content: "secret instructions".to_string(),
                },
                WireMessage {
                    role: WireRole::Human,
                    content: "hello".to_string(),
                },
            ],
        };

        let conversation = request.conversation();
        assert_eq!(conversation.len(), 1);
        assert_eq!(conversation[0].role, Role::Human);
    }

    #[test]
    fn test_full_keeps_system_turns() {
        let request = RequestMessage {
            messages: vec![WireMessage {
                role: WireRole::System,
                content: "context".to_string(),
            }],
        };

        let full = request.full();
        assert_eq!(full.len(), 1);
        assert_eq!(full[0].role, Role::System);
    }
}
