//! Core types shared across the crate.
//!
//! - [`SessionId`]: unique identifier for one report-generation session
//! - [`PipelineConfig`]: configuration for the agent pipeline
//! - [`RetryConfig`]: bounded retry for transient model errors
//! - [`TokenUsage`]: accumulated token consumption
//! - [`ToolResult`]: result returned from tool execution
//! - [`PipelineError`]: failures that abort a pipeline run

use crate::llm::Usage;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for one report-generation session.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
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

/// Configuration for the report pipeline.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Upper bound on QUERY-stage iterations per session. Once the
    /// revision counter reaches this value the pipeline terminates even
    /// if the model still requests tools.
    pub revision_ceiling: u32,
    /// Maximum tokens per model response.
    pub max_tokens: u32,
    /// Upper bound on free-form chat turns.
    pub chat_turn_limit: u32,
    /// Retry configuration for transient model errors.
    pub retry: RetryConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            revision_ceiling: 5,
            max_tokens: 4096,
            chat_turn_limit: 10,
            retry: RetryConfig::default(),
        }
    }
}

/// Configuration for retry behavior on transient model errors.
#[derive(Clone, Debug)]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Base delay in milliseconds for exponential backoff
    pub base_delay_ms: u64,
    /// Maximum delay cap in milliseconds
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            base_delay_ms: 1000,
            max_delay_ms: 120_000,
        }
    }
}

impl RetryConfig {
    /// Create a retry config with no retries (for testing)
    #[must_use]
    pub const fn no_retry() -> Self {
        Self {
            max_retries: 0,
            base_delay_ms: 0,
            max_delay_ms: 0,
        }
    }

    /// Create a retry config with fast retries (for testing)
    #[must_use]
    pub const fn fast() -> Self {
        Self {
            max_retries: 5,
            base_delay_ms: 10,
            max_delay_ms: 100,
        }
    }
}

/// Token usage accumulated over one session.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl TokenUsage {
    /// Fold one model response's usage into the running total.
    pub fn record(&mut self, usage: &Usage) {
        self.input_tokens += usage.input_tokens;
        self.output_tokens += usage.output_tokens;
    }
}

/// Result of a tool execution
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolResult {
    /// Whether the tool execution succeeded
    pub success: bool,
    /// Output content (fed back to the model)
    pub output: String,
    /// Duration of the tool execution in milliseconds
    pub duration_ms: Option<u64>,
}

impl ToolResult {
    #[must_use]
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
            duration_ms: None,
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            output: message.into(),
            duration_ms: None,
        }
    }

    #[must_use]
    pub const fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }
}

/// Error that aborts a pipeline run.
///
/// Tool-level failures never appear here: they are captured per call and
/// fed back into the conversation as error payloads.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The model call failed (transport, auth, invalid request, or the
    /// retry budget for transient errors was exhausted).
    #[error("model invocation failed: {0}")]
    Model(String),

    /// Free-form chat exceeded its turn budget.
    #[error("maximum turns ({0}) reached")]
    TurnLimit(u32),
}
