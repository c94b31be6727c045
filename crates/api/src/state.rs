use std::sync::Arc;

use questsmith_core::generation::TextGenerator;

use crate::config::ServerConfig;
use crate::jobs::JobRegistry;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Process-wide registry of generation jobs.
    pub jobs: Arc<JobRegistry>,
    /// Provider that turns prompts into adventure text.
    pub generator: Arc<dyn TextGenerator>,
}
