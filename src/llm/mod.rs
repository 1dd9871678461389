use async_trait::async_trait;
use serde::Serialize;

use crate::shared::models::Classification;

pub mod conversational;
pub mod orchestrator;
pub mod remote;
pub mod validity;

pub use conversational::{ConversationalGenerator, RandomPicker, VariantPicker};
pub use orchestrator::ResponseOrchestrator;
pub use remote::RemoteProvider;

/// A generated reply together with the classification of the text it
/// answers. `reply_text` is non-empty whenever generation succeeds.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    #[serde(flatten)]
    pub classification: Classification,
    pub reply_text: String,
    /// Which strategy produced the reply ("remote", "conversational").
    pub strategy: &'static str,
}

/// Failures a reply strategy can report. None of these ever reach the
/// end user; the orchestrator absorbs them all by falling back.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("remote provider not configured")]
    Unavailable,
    #[error("remote provider rate limited (429)")]
    RateLimited,
    #[error("remote provider rejected credentials (401)")]
    AuthRejected,
    #[error("remote provider returned an empty completion")]
    EmptyOutput,
    #[error("transport error: {0}")]
    Transport(String),
}

/// One reply-producing capability. Strategies are tried in order by the
/// orchestrator; adding a provider means adding an entry to that list.
#[async_trait]
pub trait ReplyStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn produce_reply(&self, text: &str) -> Result<GenerationResult, ProviderError>;
}
