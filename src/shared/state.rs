use std::sync::Arc;

use crate::config::AppConfig;
use crate::pipeline::MessagePipeline;
use crate::storage::ChatStore;

/// Shared application state handed to every handler.
pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<dyn ChatStore>,
    pub pipeline: Arc<MessagePipeline>,
}
