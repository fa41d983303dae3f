//! Free-form chat endpoint.

use super::RequestMessage;
use crate::errors::AppError;
use crate::hooks::LoggingHooks;
use crate::hr_tools::{self, HrContext};
use crate::pipeline::ReportPipeline;
use crate::state::AppState;
use crate::tools::ToolContext;
use crate::types::PipelineConfig;
use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub response: String,
}

pub async fn chat_handler(
    State(state): State<AppState>,
    Json(request): Json<RequestMessage>,
) -> Result<Json<ChatReply>, AppError> {
    let pipeline = ReportPipeline::new(
        Arc::clone(&state.provider),
        Arc::new(hr_tools::registry()),
        Arc::new(LoggingHooks),
        PipelineConfig::default(),
    );
    let tool_context = ToolContext::new(HrContext {
        pool: state.pool.clone(),
    });

    let response = pipeline.chat(request.full(), &tool_context).await?;
    Ok(Json(ChatReply { response }))
}
