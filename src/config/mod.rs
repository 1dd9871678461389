//! Environment-driven configuration. `.env` is loaded in `main` before
//! this module reads anything; every knob has a working default so a
//! bare `cargo run` starts a usable development server.

use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database_url: Option<String>,
    pub provider: ProviderConfig,
    pub gateway: GatewayConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
    pub use_remote: bool,
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Chat that socket messages land in when the event carries no chat.
    pub default_chat_id: i32,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig {
                host: env_or("SERVER_HOST", "127.0.0.1"),
                port: parsed_env("SERVER_PORT", 8080),
            },
            database_url: env::var("DATABASE_URL").ok().filter(|v| !v.is_empty()),
            provider: ProviderConfig {
                base_url: env_or("PROVIDER_BASE_URL", "https://api.groq.com/openai/v1"),
                api_key: env::var("GROQ_API_KEY").ok().filter(|v| !v.is_empty()),
                model: env_or("PROVIDER_MODEL", "llama-3.1-8b-instant"),
                timeout_secs: parsed_env("PROVIDER_TIMEOUT_SECS", 30),
                use_remote: parsed_env("USE_REMOTE_PROVIDER", true),
            },
            gateway: GatewayConfig {
                default_chat_id: parsed_env("DEFAULT_CHAT_ID", 1),
            },
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).ok().filter(|v| !v.is_empty()).unwrap_or_else(|| default.to_string())
}

fn parsed_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
