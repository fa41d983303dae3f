//! `OpenAI` API provider implementation.
//!
//! Implements [`LlmProvider`] for the `OpenAI` Chat Completions API and for
//! `OpenAI`-compatible gateways via the `with_base_url` constructor (the
//! deployment this backend targets routes through such a gateway).

use crate::llm::{
    ChatOutcome, ChatRequest, ChatResponse, LlmProvider, Reply, Role, ToolCallRequest, ToolSpec,
    Usage,
};
use anyhow::Result;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

pub const MODEL_GPT41_MINI: &str = "gpt-4.1-mini";
pub const MODEL_GPT4O_MINI: &str = "gpt-4o-mini";

/// `OpenAI` LLM provider using the Chat Completions API.
#[derive(Clone)]
pub struct OpenAIProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAIProvider {
    /// Create a new `OpenAI` provider with the specified API key and model.
    #[must_use]
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
            base_url: DEFAULT_BASE_URL.to_owned(),
        }
    }

    /// Create a new provider with a custom base URL for OpenAI-compatible APIs.
    #[must_use]
    pub fn with_base_url(api_key: String, model: String, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
            base_url,
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAIProvider {
    async fn chat(&self, request: ChatRequest) -> Result<ChatOutcome> {
        let messages = build_api_messages(&request);
        let tools: Option<Vec<ApiTool>> = request
            .tools
            .map(|ts| ts.into_iter().map(convert_tool).collect());

        let api_request = ApiChatRequest {
            model: &self.model,
            messages: &messages,
            max_completion_tokens: Some(request.max_tokens),
            tools: tools.as_deref(),
        };

        tracing::debug!(
            model = %self.model,
            num_messages = messages.len(),
            tools_bound = tools.is_some(),
            "OpenAI LLM request"
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&api_request)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("request failed: {e}"))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| anyhow::anyhow!("failed to read response body: {e}"))?;

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Ok(ChatOutcome::RateLimited);
        }

        if status.is_server_error() {
            let body = String::from_utf8_lossy(&bytes);
            tracing::error!(status = %status, body = %body, "OpenAI server error");
            return Ok(ChatOutcome::ServerError(body.into_owned()));
        }

        if status.is_client_error() {
            let body = String::from_utf8_lossy(&bytes);
            tracing::warn!(status = %status, body = %body, "OpenAI client error");
            return Ok(ChatOutcome::InvalidRequest(body.into_owned()));
        }

        let api_response: ApiChatResponse = serde_json::from_slice(&bytes)
            .map_err(|e| anyhow::anyhow!("failed to parse response: {e}"))?;

        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("no choices in response"))?;

        Ok(ChatOutcome::Success(ChatResponse {
            id: api_response.id,
            model: api_response.model,
            reply: build_reply(choice.message),
            usage: Usage {
                input_tokens: api_response.usage.prompt_tokens,
                output_tokens: api_response.usage.completion_tokens,
            },
        }))
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn provider(&self) -> &'static str {
        "openai"
    }
}

fn build_api_messages(request: &ChatRequest) -> Vec<ApiMessage> {
    let mut messages = Vec::new();

    // The system instruction travels as a separate leading message.
    if !request.system.is_empty() {
        messages.push(ApiMessage {
            role: ApiRole::System,
            content: Some(request.system.clone()),
            tool_calls: None,
            tool_call_id: None,
        });
    }

    for msg in &request.messages {
        match msg.role {
            Role::System => messages.push(ApiMessage {
                role: ApiRole::System,
                content: Some(msg.content.clone()),
                tool_calls: None,
                tool_call_id: None,
            }),
            Role::Human => messages.push(ApiMessage {
                role: ApiRole::User,
                content: Some(msg.content.clone()),
                tool_calls: None,
                tool_call_id: None,
            }),
            Role::Ai => {
                let tool_calls: Vec<ApiToolCall> = msg
                    .tool_calls
                    .iter()
                    .map(|call| ApiToolCall {
                        id: call.id.clone(),
                        r#type: "function".to_owned(),
                        function: ApiFunctionCall {
                            name: call.name.clone(),
                            arguments: serde_json::to_string(&call.args)
                                .unwrap_or_else(|_| "{}".to_owned()),
                        },
                    })
                    .collect();

                messages.push(ApiMessage {
                    role: ApiRole::Assistant,
                    content: if msg.content.is_empty() {
                        None
                    } else {
                        Some(msg.content.clone())
                    },
                    tool_calls: if tool_calls.is_empty() {
                        None
                    } else {
                        Some(tool_calls)
                    },
                    tool_call_id: None,
                });
            }
            Role::Tool => messages.push(ApiMessage {
                role: ApiRole::Tool,
                content: Some(msg.content.clone()),
                tool_calls: None,
                tool_call_id: msg.tool_call_id.clone(),
            }),
        }
    }

    messages
}

fn convert_tool(t: ToolSpec) -> ApiTool {
    ApiTool {
        r#type: "function".to_owned(),
        function: ApiFunction {
            name: t.name,
            description: t.description,
            parameters: t.input_schema,
        },
    }
}

fn build_reply(message: ApiResponseMessage) -> Reply {
    let tool_calls = message.tool_calls.unwrap_or_default();
    if tool_calls.is_empty() {
        return Reply::Plain(message.content.unwrap_or_default());
    }

    let calls = tool_calls
        .into_iter()
        .map(|tc| {
            let args: serde_json::Value =
                serde_json::from_str(&tc.function.arguments).unwrap_or(serde_json::Value::Null);
            ToolCallRequest {
                id: tc.id,
                name: tc.function.name,
                args,
            }
        })
        .collect();
    Reply::ToolRequest(calls)
}

// ============================================================================
// API Request Types
// ============================================================================

#[derive(Serialize)]
struct ApiChatRequest<'a> {
    model: &'a str,
    messages: &'a [ApiMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    max_completion_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [ApiTool]>,
}

#[derive(Serialize)]
struct ApiMessage {
    role: ApiRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<ApiToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum ApiRole {
    System,
    User,
    Assistant,
    Tool,
}

#[derive(Serialize)]
struct ApiToolCall {
    id: String,
    r#type: String,
    function: ApiFunctionCall,
}

#[derive(Serialize)]
struct ApiFunctionCall {
    name: String,
    arguments: String,
}

#[derive(Serialize)]
struct ApiTool {
    r#type: String,
    function: ApiFunction,
}

#[derive(Serialize)]
struct ApiFunction {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

// ============================================================================
// API Response Types
// ============================================================================

#[derive(Deserialize)]
struct ApiChatResponse {
    id: String,
    choices: Vec<ApiChoice>,
    model: String,
    usage: ApiUsage,
}

#[derive(Deserialize)]
struct ApiChoice {
    message: ApiResponseMessage,
}

#[derive(Deserialize)]
struct ApiResponseMessage {
    content: Option<String>,
    tool_calls: Option<Vec<ApiResponseToolCall>>,
}

#[derive(Deserialize)]
struct ApiResponseToolCall {
    id: String,
    function: ApiResponseFunctionCall,
}

#[derive(Deserialize)]
struct ApiResponseFunctionCall {
    name: String,
    arguments: String,
}

#[derive(Deserialize)]
struct ApiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Message;

    #[test]
    fn test_new_creates_provider_with_custom_model() {
        let provider = OpenAIProvider::new("test-api-key".to_string(), "custom-model".to_string());

        assert_eq!(provider.model(), "custom-model");
        assert_eq!(provider.provider(), "openai");
        assert_eq!(provider.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_with_base_url_creates_provider_with_custom_url() {
        let provider = OpenAIProvider::with_base_url(
            "test-api-key".to_string(),
            MODEL_GPT41_MINI.to_string(),
            "http://gateway:4000/v1".to_string(),
        );

        assert_eq!(provider.model(), "gpt-4.1-mini");
        assert_eq!(provider.base_url, "http://gateway:4000/v1");
    }

    #[test]
    fn test_api_role_serialization() {
        assert_eq!(serde_json::to_string(&ApiRole::System).unwrap(), "\"system\"");
        assert_eq!(serde_json::to_string(&ApiRole::User).unwrap(), "\"user\"");
        assert_eq!(
            serde_json::to_string(&ApiRole::Assistant).unwrap(),
            "\"assistant\""
        );
        assert_eq!(serde_json::to_string(&ApiRole::Tool).unwrap(), "\"tool\"");
    }

    #[test]
    fn test_build_api_messages_with_system() {
        let request = ChatRequest {
            system: "You are helpful.".to_string(),
            messages: vec![Message::human("Hello")],
            tools: None,
            max_tokens: 1024,
        };

        let api_messages = build_api_messages(&request);
        assert_eq!(api_messages.len(), 2);
        assert_eq!(api_messages[0].role, ApiRole::System);
        assert_eq!(api_messages[1].role, ApiRole::User);
        assert_eq!(api_messages[1].content, Some("Hello".to_string()));
    }

    #[test]
    fn test_build_api_messages_tool_round_trip() {
        let calls = vec![ToolCallRequest {
            id: "call_1".to_string(),
            name: "check_in_data_year".to_string(),
            args: serde_json::json!({"group": "Back Office"}),
        }];
        let request = ChatRequest {
            system: String::new(),
            messages: vec![
                Message::human("report please"),
                Message::from_reply(&Reply::ToolRequest(calls)),
                Message::tool_result("call_1", "check_in_data_year", "{\"rows\": []}"),
            ],
            tools: None,
            max_tokens: 1024,
        };

        let api_messages = build_api_messages(&request);
        assert_eq!(api_messages.len(), 3);

        assert_eq!(api_messages[1].role, ApiRole::Assistant);
        let tool_calls = api_messages[1].tool_calls.as_ref().unwrap();
        assert_eq!(tool_calls[0].id, "call_1");
        assert_eq!(tool_calls[0].function.name, "check_in_data_year");

        assert_eq!(api_messages[2].role, ApiRole::Tool);
        assert_eq!(api_messages[2].tool_call_id, Some("call_1".to_string()));
    }

    #[test]
    fn test_build_reply_plain() {
        let message = ApiResponseMessage {
            content: Some("Hello!".to_string()),
            tool_calls: None,
        };

        let reply = build_reply(message);
        assert_eq!(reply.text(), Some("Hello!"));
    }

    #[test]
    fn test_build_reply_with_tool_calls() {
        let message = ApiResponseMessage {
            content: None,
            tool_calls: Some(vec![ApiResponseToolCall {
                id: "call_abc".to_string(),
                function: ApiResponseFunctionCall {
                    name: "execute_select_or_show".to_string(),
                    arguments: "{\"query\": \"SELECT 1\"}".to_string(),
                },
            }]),
        };

        let reply = build_reply(message);
        let Reply::ToolRequest(calls) = reply else {
            panic!("expected tool request");
        };
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].id, "call_abc");
        assert_eq!(calls[0].args["query"], "SELECT 1");
    }

    #[test]
    fn test_api_response_deserialization() {
        let json = r#"{
            "id": "chatcmpl-123",
            "choices": [
                {
                    "message": {
                        "content": null,
                        "tool_calls": [
                            {
                                "id": "call_abc",
                                "type": "function",
                                "function": {
                                    "name": "leave_data_year",
                                    "arguments": "{\"group\": \"R&D\", \"year\": \"employee_2024\"}"
                                }
                            }
                        ]
                    },
                    "finish_reason": "tool_calls"
                }
            ],
            "model": "gpt-4.1-mini",
            "usage": {
                "prompt_tokens": 150,
                "completion_tokens": 30
            }
        }"#;

        let response: ApiChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.id, "chatcmpl-123");
        assert_eq!(response.usage.prompt_tokens, 150);
        let tool_calls = response.choices[0].message.tool_calls.as_ref().unwrap();
        assert_eq!(tool_calls[0].function.name, "leave_data_year");
    }
}
