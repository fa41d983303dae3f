//! Lifecycle hooks around tool execution.
//!
//! - [`AgentHooks::pre_tool_use`] - gate tool execution
//! - [`AgentHooks::post_tool_use`] - react to tool completion
//!
//! # Built-in Implementations
//!
//! - [`DefaultHooks`] - allow everything, observe nothing
//! - [`LoggingHooks`] - log every tool call via `tracing`

use crate::types::ToolResult;
use async_trait::async_trait;
use serde_json::Value;

/// Decision returned by pre-tool hooks
#[derive(Debug, Clone)]
pub enum ToolDecision {
    /// Allow the tool to execute
    Allow,
    /// Block the tool execution with a message
    Block(String),
}

/// Lifecycle hooks for the pipeline.
/// Implement this trait to customize tool dispatch behavior.
#[async_trait]
pub trait AgentHooks: Send + Sync {
    /// Called before a tool is executed.
    /// Return `ToolDecision::Allow` to proceed. A block is fed back to the
    /// model as an error payload, not raised.
    async fn pre_tool_use(&self, _tool_name: &str, _input: &Value) -> ToolDecision {
        ToolDecision::Allow
    }

    /// Called after a tool completes execution.
    async fn post_tool_use(&self, _tool_name: &str, _result: &ToolResult) {
        // Default: no-op
    }
}

/// Default hooks implementation: every tool call is allowed.
pub struct DefaultHooks;

#[async_trait]
impl AgentHooks for DefaultHooks {}

/// Hooks that log all tool calls (useful for debugging)
pub struct LoggingHooks;

#[async_trait]
impl AgentHooks for LoggingHooks {
    async fn pre_tool_use(&self, tool_name: &str, input: &Value) -> ToolDecision {
        tracing::debug!(tool = tool_name, ?input, "Pre-tool use");
        ToolDecision::Allow
    }

    async fn post_tool_use(&self, tool_name: &str, result: &ToolResult) {
        tracing::debug!(
            tool = tool_name,
            success = result.success,
            duration_ms = result.duration_ms,
            "Post-tool use"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_default_hooks_allow() {
        let decision = DefaultHooks
            .pre_tool_use("any_tool", &serde_json::json!({}))
            .await;
        assert!(matches!(decision, ToolDecision::Allow));
    }
}
