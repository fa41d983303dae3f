pub mod types;

pub use types::*;

use anyhow::Result;
use async_trait::async_trait;

/// Provider-agnostic language-model interface.
///
/// Implementations must accept the same message-list shape in tool-bound
/// and non-tool-bound mode; the only difference is the advertised tool set.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn chat(&self, request: ChatRequest) -> Result<ChatOutcome>;
    fn model(&self) -> &str;
    fn provider(&self) -> &'static str;
}
