//! Strategy chain for reply generation.
//!
//! Strategies are tried in registration order, one attempt each, no
//! retries. Remote output additionally passes the validity filter. The
//! conversational generator is the terminal step and cannot fail, so
//! `respond` is total.

use std::sync::Arc;

use log::{info, warn};

use super::conversational::ConversationalGenerator;
use super::{validity, GenerationResult, ReplyStrategy};

pub struct ResponseOrchestrator {
    strategies: Vec<Arc<dyn ReplyStrategy>>,
    fallback: ConversationalGenerator,
}

impl ResponseOrchestrator {
    pub fn new(strategies: Vec<Arc<dyn ReplyStrategy>>, fallback: ConversationalGenerator) -> Self {
        Self { strategies, fallback }
    }

    /// Produce a reply for `text`. Always succeeds.
    pub async fn respond(&self, text: &str) -> GenerationResult {
        for strategy in &self.strategies {
            match strategy.produce_reply(text).await {
                Ok(result) => {
                    if validity::is_valid(&result.reply_text, text) {
                        info!("reply produced by strategy '{}'", strategy.name());
                        return result;
                    }
                    warn!(
                        "strategy '{}' produced an unusable reply, falling through",
                        strategy.name()
                    );
                }
                Err(e) => {
                    warn!("strategy '{}' failed: {e}", strategy.name());
                }
            }
        }

        self.fallback.generate(text)
    }
}
