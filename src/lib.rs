//! HR attendance assistant backend.
//!
//! An HTTP service that lets a user chat with an LLM-driven assistant over
//! an HR attendance database and produce structured Thai-language
//! check-in/leave reports. The core is a small agent pipeline:
//!
//! - a PLAN stage that drafts the report plan,
//! - a QUERY stage that binds the tool registry and lets the model pull
//!   data from MySQL,
//! - a bounded TOOLS/QUERY loop that feeds results back into the
//!   conversation, and
//! - a synthesis step that organizes everything into the final report.
//!
//! # Example
//!
//! ```ignore
//! use attendance_agent::{
//!     hooks::DefaultHooks,
//!     pipeline::{ReportKind, ReportPipeline},
//!     providers::OpenAIProvider,
//!     tools::ToolContext,
//!     types::PipelineConfig,
//! };
//!
//! let provider = OpenAIProvider::new(api_key, "gpt-4.1-mini".into());
//! let pipeline = ReportPipeline::new(
//!     Arc::new(provider),
//!     Arc::new(hr_tools::registry()),
//!     Arc::new(DefaultHooks),
//!     PipelineConfig::default(),
//! );
//!
//! let session = pipeline.run(ReportKind::CheckIn, messages, &tool_context).await?;
//! let bundle = session.finalize();
//! println!("{}", bundle.report);
//! ```

#![forbid(unsafe_code)]

pub mod config;
pub mod errors;
pub mod hooks;
pub mod hr_tools;
pub mod llm;
pub mod logging;
pub mod pipeline;
pub mod providers;
pub mod routes;
pub mod state;
pub mod tools;
pub mod types;

pub use hooks::{AgentHooks, DefaultHooks, LoggingHooks, ToolDecision};
pub use llm::LlmProvider;
pub use pipeline::{ReportBundle, ReportKind, ReportPipeline, ReportSession, NOTHING_GENERATED};
pub use tools::{Tool, ToolContext, ToolError, ToolName, ToolRegistry};
pub use types::{
    PipelineConfig, PipelineError, RetryConfig, SessionId, TokenUsage, ToolResult,
};
