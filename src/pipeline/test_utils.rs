use crate::llm::{
    ChatOutcome, ChatRequest, ChatResponse, LlmProvider, Reply, ToolCallRequest, Usage,
};
use crate::tools::{Tool, ToolContext, ToolName};
use crate::types::ToolResult;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

// ===================
// Mock LLM Providers
// ===================

/// Provider that replays a scripted list of outcomes in order.
pub struct MockProvider {
    responses: RwLock<Vec<ChatOutcome>>,
    call_count: AtomicUsize,
}

impl MockProvider {
    pub fn new(responses: Vec<ChatOutcome>) -> Self {
        Self {
            responses: RwLock::new(responses),
            call_count: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    pub fn plain(text: &str) -> ChatOutcome {
        ChatOutcome::Success(ChatResponse {
            id: "msg_1".to_string(),
            model: "mock-model".to_string(),
            reply: Reply::Plain(text.to_string()),
            usage: Usage {
                input_tokens: 10,
                output_tokens: 20,
            },
        })
    }

    pub fn tool_use(id: &str, name: &str, args: serde_json::Value) -> ChatOutcome {
        Self::tool_uses(vec![(id, name, args)])
    }

    pub fn tool_uses(calls: Vec<(&str, &str, serde_json::Value)>) -> ChatOutcome {
        let calls = calls
            .into_iter()
            .map(|(id, name, args)| ToolCallRequest {
                id: id.to_string(),
                name: name.to_string(),
                args,
            })
            .collect();

        ChatOutcome::Success(ChatResponse {
            id: "msg_1".to_string(),
            model: "mock-model".to_string(),
            reply: Reply::ToolRequest(calls),
            usage: Usage {
                input_tokens: 10,
                output_tokens: 20,
            },
        })
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    async fn chat(&self, _request: ChatRequest) -> Result<ChatOutcome> {
        let idx = self.call_count.fetch_add(1, Ordering::SeqCst);
        let responses = self.responses.read().expect("lock poisoned");
        if idx < responses.len() {
            Ok(responses[idx].clone())
        } else {
            // Default: end conversation
            Ok(Self::plain("Done"))
        }
    }

    fn model(&self) -> &'static str {
        "mock-model"
    }

    fn provider(&self) -> &'static str {
        "mock"
    }
}

/// Provider that requests a tool on every tool-bound call and answers
/// plainly on every non-tool-bound call. Used to exercise the revision
/// ceiling.
#[derive(Default)]
pub struct ToolHungryProvider {
    tool_bound_calls: AtomicUsize,
    plain_calls: AtomicUsize,
}

impl ToolHungryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tool_bound_calls(&self) -> usize {
        self.tool_bound_calls.load(Ordering::SeqCst)
    }

    pub fn plain_calls(&self) -> usize {
        self.plain_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmProvider for ToolHungryProvider {
    async fn chat(&self, request: ChatRequest) -> Result<ChatOutcome> {
        if request.tools.is_some() {
            let n = self.tool_bound_calls.fetch_add(1, Ordering::SeqCst);
            Ok(MockProvider::tool_use(
                &format!("call_{n}"),
                "echo",
                json!({ "message": format!("round {n}") }),
            ))
        } else {
            self.plain_calls.fetch_add(1, Ordering::SeqCst);
            Ok(MockProvider::plain("synthesized"))
        }
    }

    fn model(&self) -> &'static str {
        "mock-model"
    }

    fn provider(&self) -> &'static str {
        "mock"
    }
}

// ===================
// Mock Tools
// ===================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestToolName {
    Echo,
    Failing,
    SlowEcho,
    CheckInDataYear,
}

impl ToolName for TestToolName {}

/// Echoes its input and counts invocations.
pub struct EchoTool {
    pub invocations: Arc<AtomicUsize>,
}

impl EchoTool {
    pub fn new() -> (Self, Arc<AtomicUsize>) {
        let invocations = Arc::new(AtomicUsize::new(0));
        (
            Self {
                invocations: Arc::clone(&invocations),
            },
            invocations,
        )
    }
}

impl Tool<()> for EchoTool {
    type Name = TestToolName;

    fn name(&self) -> TestToolName {
        TestToolName::Echo
    }

    fn description(&self) -> &'static str {
        "Echo the input message"
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "message": { "type": "string" }
            },
            "required": ["message"]
        })
    }

    async fn execute(&self, _ctx: &ToolContext<()>, input: serde_json::Value) -> Result<ToolResult> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        let message = input
            .get("message")
            .and_then(|v| v.as_str())
            .unwrap_or("no message");
        Ok(ToolResult::success(format!("Echo: {message}")))
    }
}

/// Always fails inside the tool body.
pub struct FailingTool;

impl Tool<()> for FailingTool {
    type Name = TestToolName;

    fn name(&self) -> TestToolName {
        TestToolName::Failing
    }

    fn description(&self) -> &'static str {
        "A tool that always raises"
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({ "type": "object" })
    }

    async fn execute(
        &self,
        _ctx: &ToolContext<()>,
        _input: serde_json::Value,
    ) -> Result<ToolResult> {
        Err(anyhow::anyhow!("boom"))
    }
}

/// Echoes after a delay, for completion-order tests.
pub struct SlowEchoTool {
    pub delay: Duration,
}

impl Tool<()> for SlowEchoTool {
    type Name = TestToolName;

    fn name(&self) -> TestToolName {
        TestToolName::SlowEcho
    }

    fn description(&self) -> &'static str {
        "Echo the input message after a delay"
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "message": { "type": "string" }
            }
        })
    }

    async fn execute(&self, _ctx: &ToolContext<()>, input: serde_json::Value) -> Result<ToolResult> {
        tokio::time::sleep(self.delay).await;
        let message = input
            .get("message")
            .and_then(|v| v.as_str())
            .unwrap_or("no message");
        Ok(ToolResult::success(format!("SlowEcho: {message}")))
    }
}

/// Returns a fixed set of employee attendance records as JSON.
pub struct EmployeeRecordsTool;

impl Tool<()> for EmployeeRecordsTool {
    type Name = TestToolName;

    fn name(&self) -> TestToolName {
        TestToolName::CheckInDataYear
    }

    fn description(&self) -> &'static str {
        "Summarize check-in data for a group and year"
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "group": { "type": "string" },
                "year": { "type": "string" }
            },
            "required": ["group", "year"]
        })
    }

    async fn execute(
        &self,
        _ctx: &ToolContext<()>,
        _input: serde_json::Value,
    ) -> Result<ToolResult> {
        let payload = json!({
            "status": "สำเร็จ",
            "employees": [
                { "employee_id": 101, "employee_name": "สมชาย", "total_work_hours": 1650.5 },
                { "employee_id": 102, "employee_name": "สมหญิง", "total_work_hours": 1702.0 },
                { "employee_id": 103, "employee_name": "Arthit", "total_work_hours": 1588.25 }
            ]
        });
        Ok(ToolResult::success(payload.to_string()))
    }
}
