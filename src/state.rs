//! Shared application state for the HTTP layer.
//!
//! Everything here is cheap to clone and immutable across requests; each
//! request builds its own pipeline and tool context on top.

use crate::providers::OpenAIProvider;
use sqlx::MySqlPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<OpenAIProvider>,
    pub pool: MySqlPool,
}
