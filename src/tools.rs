//! Tool definition and registry.
//!
//! Tools are the operations the model may request during the QUERY stage.
//! This module provides:
//!
//! - [`Tool`] trait - define a callable operation with a schema
//! - [`ToolName`] trait - marker trait for strongly-typed tool names
//! - [`ToolRegistry`] - collection of available tools, resolved by name
//!   at dispatch time
//! - [`ToolContext`] - request-scoped context passed to tool execution
//! - [`ToolError`] - dispatch failures (unknown name, invocation failure)

use crate::llm::ToolSpec;
use crate::types::ToolResult;
use anyhow::Result;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use thiserror::Error;

/// Failure to dispatch a named tool.
///
/// Never fatal to a session: the dispatcher converts it into an error
/// payload that is fed back to the model.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("unknown tool: {0}")]
    NotFound(String),

    #[error("tool '{name}' failed: {message}")]
    Invocation { name: String, message: String },
}

/// Marker trait for tool names.
///
/// Tool names must be serializable (for the model protocol) and
/// deserializable (for parsing from model responses). The string
/// representation is derived from serde serialization.
pub trait ToolName: Send + Sync + Serialize + DeserializeOwned + 'static {}

/// Helper to get the string representation of a tool name via serde.
///
/// # Panics
///
/// Panics if the tool name cannot be serialized to a string. This should
/// never happen with properly implemented `ToolName` types that use
/// `#[derive(Serialize)]`.
#[must_use]
pub fn tool_name_to_string<N: ToolName>(name: &N) -> String {
    serde_json::to_string(name)
        .expect("ToolName must serialize to string")
        .trim_matches('"')
        .to_string()
}

/// Request-scoped context passed to tool execution.
///
/// Each incoming request constructs its own context; nothing here is
/// shared across concurrent sessions.
pub struct ToolContext<Ctx> {
    /// Application-specific context (e.g., the database pool)
    pub app: Ctx,
    /// Tool-specific metadata
    pub metadata: HashMap<String, Value>,
}

impl<Ctx> ToolContext<Ctx> {
    #[must_use]
    pub fn new(app: Ctx) -> Self {
        Self {
            app,
            metadata: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// Definition of a tool the model can call.
///
/// Uses Rust's native async functions in traits; implementors do not need
/// the `async_trait` crate.
pub trait Tool<Ctx>: Send + Sync {
    /// The type of name for this tool.
    type Name: ToolName;

    /// Returns the tool's strongly-typed name.
    fn name(&self) -> Self::Name;

    /// Human-readable description of what the tool does.
    fn description(&self) -> &'static str;

    /// JSON schema for the tool's input parameters.
    fn input_schema(&self) -> Value;

    /// Execute the tool with the given input.
    ///
    /// # Errors
    /// Returns an error if tool execution fails.
    fn execute(
        &self,
        ctx: &ToolContext<Ctx>,
        input: Value,
    ) -> impl Future<Output = Result<ToolResult>> + Send;
}

/// Type-erased tool trait for registry storage.
///
/// Allows tools with different `Name` associated types to live in the same
/// registry by erasing the type information.
#[async_trait]
pub trait ErasedTool<Ctx>: Send + Sync {
    /// Get the tool name as a string.
    fn name_str(&self) -> &str;
    /// Get the tool description.
    fn description(&self) -> &'static str;
    /// Get the JSON schema for tool inputs.
    fn input_schema(&self) -> Value;
    /// Execute the tool with the given input.
    async fn execute(&self, ctx: &ToolContext<Ctx>, input: Value) -> Result<ToolResult>;
}

/// Wrapper that erases the Name associated type from a Tool.
struct ToolWrapper<T, Ctx>
where
    T: Tool<Ctx>,
{
    inner: T,
    name_cache: String,
    _marker: PhantomData<Ctx>,
}

impl<T, Ctx> ToolWrapper<T, Ctx>
where
    T: Tool<Ctx>,
{
    fn new(tool: T) -> Self {
        let name_cache = tool_name_to_string(&tool.name());
        Self {
            inner: tool,
            name_cache,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<T, Ctx> ErasedTool<Ctx> for ToolWrapper<T, Ctx>
where
    T: Tool<Ctx> + 'static,
    Ctx: Send + Sync + 'static,
{
    fn name_str(&self) -> &str {
        &self.name_cache
    }

    fn description(&self) -> &'static str {
        self.inner.description()
    }

    fn input_schema(&self) -> Value {
        self.inner.input_schema()
    }

    async fn execute(&self, ctx: &ToolContext<Ctx>, input: Value) -> Result<ToolResult> {
        self.inner.execute(ctx, input).await
    }
}

/// Registry of available tools.
///
/// Tools are stored with their names erased and looked up by string at
/// dispatch time; an absent name surfaces as [`ToolError::NotFound`]
/// rather than a panic.
pub struct ToolRegistry<Ctx> {
    tools: HashMap<String, Arc<dyn ErasedTool<Ctx>>>,
}

impl<Ctx> Clone for ToolRegistry<Ctx> {
    fn clone(&self) -> Self {
        Self {
            tools: self.tools.clone(),
        }
    }
}

impl<Ctx: Send + Sync + 'static> Default for ToolRegistry<Ctx> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Ctx: Send + Sync + 'static> ToolRegistry<Ctx> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool in the registry.
    ///
    /// The tool's name is converted to a string via serde serialization
    /// and used as the lookup key.
    pub fn register<T>(&mut self, tool: T) -> &mut Self
    where
        T: Tool<Ctx> + 'static,
    {
        let wrapper = ToolWrapper::new(tool);
        let name = wrapper.name_str().to_string();
        self.tools.insert(name, Arc::new(wrapper));
        self
    }

    /// Get a tool by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<dyn ErasedTool<Ctx>>> {
        self.tools.get(name)
    }

    /// Resolve a tool by name, surfacing an absent name as an error.
    ///
    /// # Errors
    /// Returns [`ToolError::NotFound`] if no tool with that name exists.
    pub fn resolve(&self, name: &str) -> Result<&Arc<dyn ErasedTool<Ctx>>, ToolError> {
        self.tools
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))
    }

    /// Get all registered tools.
    pub fn all(&self) -> impl Iterator<Item = &Arc<dyn ErasedTool<Ctx>>> {
        self.tools.values()
    }

    /// Get the number of registered tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Convert all tools to the definitions advertised to the model.
    #[must_use]
    pub fn to_specs(&self) -> Vec<ToolSpec> {
        self.tools
            .values()
            .map(|tool| ToolSpec {
                name: tool.name_str().to_string(),
                description: tool.description().to_string(),
                input_schema: tool.input_schema(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    enum TestToolName {
        MockTool,
        AnotherTool,
    }

    impl ToolName for TestToolName {}

    struct MockTool;

    impl Tool<()> for MockTool {
        type Name = TestToolName;

        fn name(&self) -> TestToolName {
            TestToolName::MockTool
        }

        fn description(&self) -> &'static str {
            "A mock tool for testing"
        }

        fn input_schema(&self) -> Value {
            serde_json::json!({
                "type": "object",
                "properties": {
                    "message": { "type": "string" }
                }
            })
        }

        async fn execute(&self, _ctx: &ToolContext<()>, input: Value) -> Result<ToolResult> {
            let message = input
                .get("message")
                .and_then(|v| v.as_str())
                .unwrap_or("no message");
            Ok(ToolResult::success(format!("Received: {message}")))
        }
    }

    struct AnotherTool;

    impl Tool<()> for AnotherTool {
        type Name = TestToolName;

        fn name(&self) -> TestToolName {
            TestToolName::AnotherTool
        }

        fn description(&self) -> &'static str {
            "Another tool for testing"
        }

        fn input_schema(&self) -> Value {
            serde_json::json!({ "type": "object" })
        }

        async fn execute(&self, _ctx: &ToolContext<()>, _input: Value) -> Result<ToolResult> {
            Ok(ToolResult::success("Done"))
        }
    }

    #[test]
    fn test_tool_name_serialization() {
        assert_eq!(tool_name_to_string(&TestToolName::MockTool), "mock_tool");
    }

    #[test]
    fn test_registry_lookup() {
        let mut registry = ToolRegistry::new();
        registry.register(MockTool);

        assert_eq!(registry.len(), 1);
        assert!(registry.get("mock_tool").is_some());
        assert!(registry.get("nonexistent").is_none());
    }

    #[test]
    fn test_resolve_unknown_name_is_not_found() {
        let registry: ToolRegistry<()> = ToolRegistry::new();
        let Err(err) = registry.resolve("missing") else {
            panic!("expected NotFound");
        };
        assert!(matches!(err, ToolError::NotFound(name) if name == "missing"));
    }

    #[test]
    fn test_to_specs() {
        let mut registry = ToolRegistry::new();
        registry.register(MockTool);
        registry.register(AnotherTool);

        let specs = registry.to_specs();
        assert_eq!(specs.len(), 2);
        assert!(specs.iter().any(|s| s.name == "mock_tool"));
        assert!(specs.iter().any(|s| s.name == "another_tool"));
    }

    #[tokio::test]
    async fn test_erased_execution() -> Result<()> {
        let mut registry = ToolRegistry::new();
        registry.register(MockTool);

        let ctx = ToolContext::new(());
        let tool = registry.resolve("mock_tool").unwrap();
        let result = tool
            .execute(&ctx, serde_json::json!({"message": "hi"}))
            .await?;
        assert!(result.success);
        assert_eq!(result.output, "Received: hi");
        Ok(())
    }
}
