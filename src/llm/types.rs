use serde::{Deserialize, Serialize};

/// Role of a conversation message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    Human,
    Ai,
    Tool,
}

/// One conversation message.
///
/// Ordering is significant and append-only within a session; a message is
/// never mutated after creation. Tool-role messages carry the call id and
/// the originating tool name so results stay correlated with requests.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    /// Correlation id, set on tool-role messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    /// Originating tool, set on tool-role messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    /// Tool calls requested by an ai-role message.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCallRequest>,
}

impl Message {
    #[must_use]
    pub fn system(text: impl Into<String>) -> Self {
        Self::plain(Role::System, text)
    }

    #[must_use]
    pub fn human(text: impl Into<String>) -> Self {
        Self::plain(Role::Human, text)
    }

    #[must_use]
    pub fn ai(text: impl Into<String>) -> Self {
        Self::plain(Role::Ai, text)
    }

    #[must_use]
    pub fn tool_result(
        tool_call_id: impl Into<String>,
        tool_name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            role: Role::Tool,
            content: content.into(),
            tool_call_id: Some(tool_call_id.into()),
            tool_name: Some(tool_name.into()),
            tool_calls: Vec::new(),
        }
    }

    /// Build the ai-role message to append for a model reply.
    #[must_use]
    pub fn from_reply(reply: &Reply) -> Self {
        match reply {
            Reply::Plain(text) => Self::ai(text.clone()),
            Reply::ToolRequest(calls) => Self {
                role: Role::Ai,
                content: String::new(),
                tool_call_id: None,
                tool_name: None,
                tool_calls: calls.clone(),
            },
        }
    }

    fn plain(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            content: text.into(),
            tool_call_id: None,
            tool_name: None,
            tool_calls: Vec::new(),
        }
    }
}

/// A structured tool invocation requested by the model.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolCallRequest {
    pub id: String,
    pub name: String,
    pub args: serde_json::Value,
}

/// Tool definition advertised to the model.
#[derive(Clone, Debug, Serialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

/// One model invocation. The same message shape is used whether or not
/// tools are bound.
#[derive(Clone, Debug)]
pub struct ChatRequest {
    pub system: String,
    pub messages: Vec<Message>,
    pub tools: Option<Vec<ToolSpec>>,
    pub max_tokens: u32,
}

/// What the model answered with.
///
/// Tagged so callers branch on the shape instead of probing optional
/// attributes on the response object.
#[derive(Clone, Debug)]
pub enum Reply {
    /// Natural-language content only.
    Plain(String),
    /// One or more tool invocations.
    ToolRequest(Vec<ToolCallRequest>),
}

impl Reply {
    #[must_use]
    pub const fn requests_tools(&self) -> bool {
        matches!(self, Self::ToolRequest(_))
    }

    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Plain(text) => Some(text),
            Self::ToolRequest(_) => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ChatResponse {
    pub id: String,
    pub model: String,
    pub reply: Reply,
    pub usage: Usage,
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Provider-level outcome of one chat call. Rate limits and server errors
/// are distinguished from hard failures so the caller can retry them.
#[derive(Clone, Debug)]
pub enum ChatOutcome {
    Success(ChatResponse),
    RateLimited,
    InvalidRequest(String),
    ServerError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_string(&Role::Human).unwrap(), "\"human\"");
        assert_eq!(serde_json::to_string(&Role::Ai).unwrap(), "\"ai\"");
        assert_eq!(serde_json::to_string(&Role::Tool).unwrap(), "\"tool\"");
    }

    #[test]
    fn test_tool_result_message_carries_correlation() {
        let msg = Message::tool_result("call_1", "check_in_data_year", "{}");
        assert_eq!(msg.role, Role::Tool);
        assert_eq!(msg.tool_call_id.as_deref(), Some("call_1"));
        assert_eq!(msg.tool_name.as_deref(), Some("check_in_data_year"));
    }

    #[test]
    fn test_from_reply_plain() {
        let msg = Message::from_reply(&Reply::Plain("hello".to_string()));
        assert_eq!(msg.role, Role::Ai);
        assert_eq!(msg.content, "hello");
        assert!(msg.tool_calls.is_empty());
    }

    #[test]
    fn test_from_reply_tool_request() {
        let calls = vec![ToolCallRequest {
            id: "a".to_string(),
            name: "echo".to_string(),
            args: json!({"message": "hi"}),
        }];
        let msg = Message::from_reply(&Reply::ToolRequest(calls));
        assert_eq!(msg.role, Role::Ai);
        assert!(msg.content.is_empty());
        assert_eq!(msg.tool_calls.len(), 1);
        assert_eq!(msg.tool_calls[0].id, "a");
    }

    #[test]
    fn test_reply_helpers() {
        let plain = Reply::Plain("text".to_string());
        assert!(!plain.requests_tools());
        assert_eq!(plain.text(), Some("text"));

        let request = Reply::ToolRequest(Vec::new());
        assert!(request.requests_tools());
        assert!(request.text().is_none());
    }
}
