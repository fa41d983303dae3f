//! The pipeline state machine.

use super::dispatch::dispatch_tool_calls;
use super::llm::call_with_retry;
use super::prompts::{self, ReportKind};
use super::session::ReportSession;
use crate::hooks::AgentHooks;
use crate::llm::{ChatRequest, LlmProvider, Message, Reply, ToolCallRequest};
use crate::tools::{ToolContext, ToolRegistry};
use crate::types::{PipelineConfig, PipelineError, TokenUsage};
use std::sync::Arc;
use time::OffsetDateTime;
use tracing::{debug, info};

/// Orchestrates `PLAN → QUERY → (TOOLS → QUERY)* → DONE` for one report
/// request, and the free-form assistant loop for chat requests.
///
/// One instance serves one request; all state lives in the
/// [`ReportSession`] it returns. Suspension happens only at the external
/// call boundaries (model invocations, tool invocations).
pub struct ReportPipeline<Ctx, P, H> {
    provider: Arc<P>,
    tools: Arc<ToolRegistry<Ctx>>,
    hooks: Arc<H>,
    config: PipelineConfig,
}

impl<Ctx, P, H> ReportPipeline<Ctx, P, H>
where
    Ctx: Send + Sync + 'static,
    P: LlmProvider,
    H: AgentHooks,
{
    #[must_use]
    pub fn new(
        provider: Arc<P>,
        tools: Arc<ToolRegistry<Ctx>>,
        hooks: Arc<H>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            provider,
            tools,
            hooks,
            config,
        }
    }

    /// Run one report session to DONE.
    ///
    /// `initial` holds the prior conversation turns (human/ai only; it may
    /// be empty but conventionally contains at least one human message
    /// stating the report request). The returned session is finished;
    /// callers project the deliverables with [`ReportSession::finalize`].
    ///
    /// # Errors
    /// Returns [`PipelineError::Model`] if a model invocation fails; tool
    /// failures never abort the run.
    pub async fn run(
        &self,
        kind: ReportKind,
        initial: Vec<Message>,
        tool_context: &ToolContext<Ctx>,
    ) -> Result<ReportSession, PipelineError> {
        let mut session = ReportSession::new(initial);
        let mut usage = TokenUsage::default();
        info!(
            session = %session.id(),
            kind = kind.as_str(),
            "Report pipeline started"
        );

        self.plan_stage(kind, &mut session, &mut usage).await?;

        loop {
            let reply = self.query_stage(&mut session, &mut usage).await?;
            match reply {
                Reply::ToolRequest(calls)
                    if session.revision() < self.config.revision_ceiling =>
                {
                    self.tools_stage(&calls, &mut session, tool_context).await;
                    session.bump_revision();
                }
                Reply::ToolRequest(calls) => {
                    // Ceiling reached with calls still pending: drop them so
                    // the session always terminates.
                    debug!(
                        session = %session.id(),
                        dropped = calls.len(),
                        "Revision ceiling reached, dropping pending tool calls"
                    );
                    break;
                }
                Reply::Plain(_) => break,
            }
        }

        let elapsed = OffsetDateTime::now_utc() - session.started_at();
        info!(
            session = %session.id(),
            revision = session.revision(),
            input_tokens = usage.input_tokens,
            output_tokens = usage.output_tokens,
            elapsed_ms = elapsed.whole_milliseconds() as i64,
            "Report pipeline done"
        );
        Ok(session)
    }

    fn bound_tools(&self) -> Option<Vec<crate::llm::ToolSpec>> {
        if self.tools.is_empty() {
            None
        } else {
            Some(self.tools.to_specs())
        }
    }

    /// PLAN stage: one non-tool-bound call producing the report plan.
    async fn plan_stage(
        &self,
        kind: ReportKind,
        session: &mut ReportSession,
        usage: &mut TokenUsage,
    ) -> Result<(), PipelineError> {
        let request = ChatRequest {
            system: kind.plan_instruction().to_string(),
            messages: session.messages().to_vec(),
            tools: None,
            max_tokens: self.config.max_tokens,
        };
        let response = call_with_retry(self.provider.as_ref(), request, &self.config.retry).await?;
        usage.record(&response.usage);

        match response.reply {
            Reply::Plain(text) => {
                session.set_plan(text.clone());
                session.push(Message::ai(text));
            }
            // No tools are bound at this stage; stray tool calls are ignored.
            Reply::ToolRequest(_) => session.push(Message::ai("")),
        }
        Ok(())
    }

    /// QUERY stage: one tool-bound call, then consolidation of every tool
    /// result seen so far into an organized summary via a synthesis call.
    async fn query_stage(
        &self,
        session: &mut ReportSession,
        usage: &mut TokenUsage,
    ) -> Result<Reply, PipelineError> {
        let plan = session.plan().unwrap_or_default().to_string();
        let request = ChatRequest {
            system: prompts::query_instruction(&plan),
            messages: session.messages().to_vec(),
            tools: self.bound_tools(),
            max_tokens: self.config.max_tokens,
        };
        let response = call_with_retry(self.provider.as_ref(), request, &self.config.retry).await?;
        usage.record(&response.usage);

        let reply = response.reply.clone();
        session.push(Message::from_reply(&reply));

        let records = session.tool_records();
        if !records.is_empty() {
            debug!(
                session = %session.id(),
                records = records.len(),
                "Synthesizing organized query result"
            );
            self.synthesis_call(&plan, &records, session, usage).await?;
        }

        Ok(reply)
    }

    /// One non-tool-bound call turning the collected tool results into the
    /// organized report text, governed by the plan.
    async fn synthesis_call(
        &self,
        plan: &str,
        records: &[super::session::ToolRecord],
        session: &mut ReportSession,
        usage: &mut TokenUsage,
    ) -> Result<(), PipelineError> {
        let serialized =
            serde_json::to_string_pretty(records).unwrap_or_else(|_| "[]".to_string());
        let request = ChatRequest {
            system: prompts::synthesis_instruction(plan),
            messages: vec![Message::human(serialized)],
            tools: None,
            max_tokens: self.config.max_tokens,
        };
        let response = call_with_retry(self.provider.as_ref(), request, &self.config.retry).await?;
        usage.record(&response.usage);

        if let Reply::Plain(text) = response.reply {
            session.record_synthesis(text);
        }
        Ok(())
    }

    /// TOOLS stage: dispatch every pending call, append the correlated
    /// results, then append one consolidated human message so the next
    /// QUERY prompt sees a single digestible block instead of N separate
    /// tool messages.
    async fn tools_stage(
        &self,
        calls: &[ToolCallRequest],
        session: &mut ReportSession,
        tool_context: &ToolContext<Ctx>,
    ) {
        let completed =
            dispatch_tool_calls(calls, &self.tools, self.hooks.as_ref(), tool_context).await;

        let mut texts = Vec::with_capacity(completed.len());
        for call in completed {
            let payload = call.payload();
            texts.push(payload.clone());
            session.push(Message::tool_result(call.id, call.name, payload));
        }
        session.push(Message::human(texts.join("\n\n")));
    }

    /// Free-form assistant loop over the same tool registry (serves the
    /// chat endpoint): call the model with tools bound, execute whatever it
    /// requests, and return the first plain reply.
    ///
    /// # Errors
    /// Returns [`PipelineError::Model`] on model failure, or
    /// [`PipelineError::TurnLimit`] when the turn budget is exhausted
    /// without a plain reply.
    pub async fn chat(
        &self,
        initial: Vec<Message>,
        tool_context: &ToolContext<Ctx>,
    ) -> Result<String, PipelineError> {
        let mut messages = initial;

        for turn in 0..self.config.chat_turn_limit {
            let request = ChatRequest {
                system: prompts::DATABASE_ADMIN.to_string(),
                messages: messages.clone(),
                tools: self.bound_tools(),
                max_tokens: self.config.max_tokens,
            };
            let response =
                call_with_retry(self.provider.as_ref(), request, &self.config.retry).await?;

            match response.reply {
                Reply::Plain(text) => {
                    debug!(turn, "Chat completed");
                    return Ok(text);
                }
                Reply::ToolRequest(calls) => {
                    messages.push(Message::from_reply(&Reply::ToolRequest(calls.clone())));
                    let completed =
                        dispatch_tool_calls(&calls, &self.tools, self.hooks.as_ref(), tool_context)
                            .await;

                    let mut texts = Vec::with_capacity(completed.len());
                    for call in completed {
                        let payload = call.payload();
                        texts.push(payload.clone());
                        messages.push(Message::tool_result(call.id, call.name, payload));
                    }
                    messages.push(Message::human(texts.join("\n\n")));
                }
            }
        }

        Err(PipelineError::TurnLimit(self.config.chat_turn_limit))
    }
}
