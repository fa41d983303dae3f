//! Model invocation with bounded retry.

use crate::llm::{ChatOutcome, ChatRequest, ChatResponse, LlmProvider};
use crate::types::{PipelineError, RetryConfig};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, warn};

/// Call the model, retrying rate limits and server errors with exponential
/// backoff. Transport failures and invalid requests abort immediately;
/// whatever survives the retry budget propagates as
/// [`PipelineError::Model`] and fails the whole run.
pub(super) async fn call_with_retry<P>(
    provider: &P,
    request: ChatRequest,
    retry: &RetryConfig,
) -> Result<ChatResponse, PipelineError>
where
    P: LlmProvider + ?Sized,
{
    let mut attempt = 0u32;

    loop {
        let outcome = provider
            .chat(request.clone())
            .await
            .map_err(|e| PipelineError::Model(format!("transport error: {e}")))?;

        match outcome {
            ChatOutcome::Success(response) => return Ok(response),
            ChatOutcome::RateLimited => {
                attempt += 1;
                if attempt > retry.max_retries {
                    error!("Rate limited by LLM provider after {} retries", retry.max_retries);
                    return Err(PipelineError::Model(format!(
                        "rate limited after {} retries",
                        retry.max_retries
                    )));
                }
                let delay = backoff_delay(attempt, retry);
                warn!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "Rate limited, retrying after backoff"
                );
                sleep(delay).await;
            }
            ChatOutcome::InvalidRequest(msg) => {
                error!("Invalid request to LLM: {msg}");
                return Err(PipelineError::Model(format!("invalid request: {msg}")));
            }
            ChatOutcome::ServerError(msg) => {
                attempt += 1;
                if attempt > retry.max_retries {
                    error!("LLM server error after {} retries: {msg}", retry.max_retries);
                    return Err(PipelineError::Model(format!(
                        "server error after {} retries: {msg}",
                        retry.max_retries
                    )));
                }
                let delay = backoff_delay(attempt, retry);
                warn!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %msg,
                    "Server error, retrying after backoff"
                );
                sleep(delay).await;
            }
        }
    }
}

/// Exponential backoff with jitter: `base * 2^(attempt-1) + jitter`,
/// capped at the configured maximum. Jitter avoids thundering herd.
fn backoff_delay(attempt: u32, config: &RetryConfig) -> Duration {
    let base_delay = config
        .base_delay_ms
        .saturating_mul(1u64 << (attempt.saturating_sub(1)));

    let max_jitter = config.base_delay_ms.min(1000);
    let jitter = if max_jitter > 0 {
        u64::from(
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .subsec_nanos(),
        ) % max_jitter
    } else {
        0
    };

    let delay_ms = base_delay.saturating_add(jitter).min(config.max_delay_ms);
    Duration::from_millis(delay_ms)
}
