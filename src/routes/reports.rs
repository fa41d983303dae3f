//! Report-generation endpoints.

use super::RequestMessage;
use crate::errors::AppError;
use crate::hooks::LoggingHooks;
use crate::hr_tools::{self, HrContext};
use crate::pipeline::{ReportKind, ReportPipeline};
use crate::state::AppState;
use crate::tools::ToolContext;
use crate::types::PipelineConfig;
use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

/// Deliverables of one report run, as returned to the caller.
#[derive(Debug, Serialize)]
pub struct AgentResponse {
    pub response: String,
    pub plan: String,
    pub query: String,
    pub report: String,
}

pub async fn check_in_report(
    State(state): State<AppState>,
    Json(request): Json<RequestMessage>,
) -> Result<Json<AgentResponse>, AppError> {
    run_report(state, ReportKind::CheckIn, request).await
}

pub async fn take_leave_report(
    State(state): State<AppState>,
    Json(request): Json<RequestMessage>,
) -> Result<Json<AgentResponse>, AppError> {
    run_report(state, ReportKind::Leave, request).await
}

async fn run_report(
    state: AppState,
    kind: ReportKind,
    request: RequestMessage,
) -> Result<Json<AgentResponse>, AppError> {
    let pipeline = ReportPipeline::new(
        Arc::clone(&state.provider),
        Arc::new(hr_tools::registry()),
        Arc::new(LoggingHooks),
        PipelineConfig::default(),
    );
    // Request-scoped tool context: nothing is shared across sessions.
    let tool_context = ToolContext::new(HrContext {
        pool: state.pool.clone(),
    });

    let session = pipeline
        .run(kind, request.conversation(), &tool_context)
        .await?;
    let bundle = session.finalize();

    Ok(Json(AgentResponse {
        response: bundle.report.clone(),
        plan: bundle.plan,
        query: bundle.query_summary,
        report: bundle.report,
    }))
}
