//! OpenAI-compatible chat-completions provider.
//!
//! One outbound call per reply, bounded by the configured timeout. The
//! classification attached to the result is always computed locally —
//! the remote model is only asked for the reply text.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::Value;

use super::{GenerationResult, ProviderError, ReplyStrategy};
use crate::config::ProviderConfig;
use crate::sentiment;

const SYSTEM_INSTRUCTION: &str = "Eres un asistente virtual empático y profesional \
especializado en apoyo emocional y consejería. Responde de manera natural, comprensiva \
y útil. Si el usuario tiene problemas, ofrece consejos prácticos y alternativas \
concretas. Sé conciso pero útil (2-4 oraciones).";

pub struct RemoteProvider {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
    timeout: Duration,
}

impl RemoteProvider {
    pub fn new(config: &ProviderConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    pub fn is_available(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl ReplyStrategy for RemoteProvider {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn produce_reply(&self, text: &str) -> Result<GenerationResult, ProviderError> {
        let api_key = self.api_key.as_deref().ok_or(ProviderError::Unavailable)?;

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .timeout(self.timeout)
            .json(&serde_json::json!({
                "model": self.model,
                "messages": [
                    {"role": "system", "content": SYSTEM_INSTRUCTION},
                    {"role": "user", "content": text}
                ],
                "temperature": 0.7,
                "max_tokens": 500,
                "top_p": 0.9
            }))
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        match response.status().as_u16() {
            401 => return Err(ProviderError::AuthRejected),
            429 => return Err(ProviderError::RateLimited),
            status if !(200..300).contains(&status) => {
                return Err(ProviderError::Transport(format!(
                    "unexpected status {status}"
                )));
            }
            _ => {}
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        let content = body["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or("")
            .trim()
            .to_string();

        if content.is_empty() {
            return Err(ProviderError::EmptyOutput);
        }

        debug!("remote provider produced {} chars", content.len());
        Ok(GenerationResult {
            classification: sentiment::classify(text),
            reply_text: content,
            strategy: "remote",
        })
    }
}
