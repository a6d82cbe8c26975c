use log::warn;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub llm: LlmConfig,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Clone, Debug)]
pub struct LlmConfig {
    pub api_key: String,
    /// Overrides the completion endpoint; used by tests and self-hosted gateways.
    pub base_url: Option<String>,
    pub model: String,
}

fn get_str(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn get_u16(key: &str, default: u16) -> u16 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl AppConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let api_key = get_str("OPENAI_API_KEY", "");
        if api_key.is_empty() {
            warn!("OPENAI_API_KEY is not set; AI generation will fall back to canned text");
        }
        Ok(AppConfig {
            server: ServerConfig {
                host: get_str("SERVER_HOST", "0.0.0.0"),
                port: get_u16("SERVER_PORT", 5000),
            },
            llm: LlmConfig {
                api_key,
                base_url: std::env::var("OPENAI_BASE_URL")
                    .ok()
                    .filter(|v| !v.is_empty()),
                model: get_str("OPENAI_MODEL", "gpt-4o"),
            },
        })
    }
}
