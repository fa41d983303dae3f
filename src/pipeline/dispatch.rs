//! Tool dispatch for one TOOLS stage.

use crate::hooks::{AgentHooks, ToolDecision};
use crate::llm::ToolCallRequest;
use crate::tools::{ToolContext, ToolError, ToolRegistry};
use crate::types::ToolResult;
use futures::future::join_all;
use serde_json::json;
use std::time::Instant;
use tracing::{debug, warn};

/// Outcome of one dispatched tool call, correlated by the originating id.
pub(super) struct CompletedCall {
    pub id: String,
    pub name: String,
    pub result: ToolResult,
}

impl CompletedCall {
    /// Payload fed back into the conversation: the tool output on success,
    /// an `{"error": ...}` object on failure.
    pub fn payload(&self) -> String {
        if self.result.success {
            self.result.output.clone()
        } else {
            json!({ "error": self.result.output }).to_string()
        }
    }
}

/// Dispatch every tool call of one TOOLS stage.
///
/// Invocations are independent and run concurrently, but results come back
/// in the order of `calls` so message-append order stays deterministic and
/// transcripts are reproducible.
pub(super) async fn dispatch_tool_calls<Ctx, H>(
    calls: &[ToolCallRequest],
    tools: &ToolRegistry<Ctx>,
    hooks: &H,
    ctx: &ToolContext<Ctx>,
) -> Vec<CompletedCall>
where
    Ctx: Send + Sync + 'static,
    H: AgentHooks,
{
    join_all(
        calls
            .iter()
            .map(|call| execute_tool_call(call, tools, hooks, ctx)),
    )
    .await
}

/// Execute a single call. Every failure mode (blocked, unknown name, tool
/// body error) is captured as an error result; nothing here is fatal to
/// the session.
async fn execute_tool_call<Ctx, H>(
    call: &ToolCallRequest,
    tools: &ToolRegistry<Ctx>,
    hooks: &H,
    ctx: &ToolContext<Ctx>,
) -> CompletedCall
where
    Ctx: Send + Sync + 'static,
    H: AgentHooks,
{
    if let ToolDecision::Block(reason) = hooks.pre_tool_use(&call.name, &call.args).await {
        warn!(tool = %call.name, id = %call.id, %reason, "Tool call blocked");
        return CompletedCall {
            id: call.id.clone(),
            name: call.name.clone(),
            result: ToolResult::error(format!("blocked: {reason}")),
        };
    }

    let tool = match tools.resolve(&call.name) {
        Ok(tool) => tool,
        Err(error) => {
            warn!(tool = %call.name, id = %call.id, "Unknown tool requested");
            return CompletedCall {
                id: call.id.clone(),
                name: call.name.clone(),
                result: ToolResult::error(error.to_string()),
            };
        }
    };

    let start = Instant::now();
    let result = match tool.execute(ctx, call.args.clone()).await {
        Ok(result) => result.with_duration(millis_to_u64(start.elapsed().as_millis())),
        Err(error) => {
            let error = ToolError::Invocation {
                name: call.name.clone(),
                message: error.to_string(),
            };
            ToolResult::error(error.to_string())
                .with_duration(millis_to_u64(start.elapsed().as_millis()))
        }
    };

    hooks.post_tool_use(&call.name, &result).await;
    debug!(
        tool = %call.name,
        id = %call.id,
        success = result.success,
        duration_ms = result.duration_ms,
        "Tool call finished"
    );

    CompletedCall {
        id: call.id.clone(),
        name: call.name.clone(),
        result,
    }
}

/// Convert u128 milliseconds to u64, capping at `u64::MAX`
#[allow(clippy::cast_possible_truncation)]
const fn millis_to_u64(millis: u128) -> u64 {
    if millis > u64::MAX as u128 {
        u64::MAX
    } else {
        millis as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_millis_to_u64() {
        assert_eq!(millis_to_u64(0), 0);
        assert_eq!(millis_to_u64(1000), 1000);
        assert_eq!(millis_to_u64(u128::from(u64::MAX) + 1), u64::MAX);
    }

    #[test]
    fn test_error_payload_is_structured() {
        let call = CompletedCall {
            id: "a".to_string(),
            name: "echo".to_string(),
            result: ToolResult::error("unknown tool: echo"),
        };
        let payload: serde_json::Value = serde_json::from_str(&call.payload()).unwrap();
        assert_eq!(payload["error"], "unknown tool: echo");
    }

    #[test]
    fn test_success_payload_is_raw_output() {
        let call = CompletedCall {
            id: "a".to_string(),
            name: "echo".to_string(),
            result: ToolResult::success("{\"rows\": []}"),
        };
        assert_eq!(call.payload(), "{\"rows\": []}");
    }
}
