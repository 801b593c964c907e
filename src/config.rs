use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Main configuration structure loaded from frame_audit.toml and environment variables
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub llm: LlmConfig,
    pub rate_limit: RateLimitConfig,
    pub input: InputConfig,
    /// Runtime configuration loaded from environment variables
    #[serde(skip)]
    pub runtime: RuntimeConfig,
}

/// Provider settings for the generation backend
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: String,
    pub model: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub request_timeout_ms: u64,
    /// Only ever read from the environment, never from the config file
    #[serde(skip)]
    pub api_key: Option<String>,
}

/// Sliding-window admission control settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub window_ms: u64,
    pub max_requests: usize,
}

/// Scenario length bounds (in characters, after trimming)
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct InputConfig {
    pub min_length: usize,
    pub max_length: usize,
}

/// Runtime configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub http_bind: SocketAddr,
    pub log_level: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: "gemini-2.5-flash".to_string(),
            temperature: 0.3,
            max_output_tokens: 8000,
            request_timeout_ms: 30_000,
            api_key: None,
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_ms: 3_600_000,
            max_requests: 10,
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            min_length: 1,
            max_length: 1500,
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            http_bind: "127.0.0.1:3001"
                .parse()
                .expect("default bind address should parse"),
            log_level: "frame_audit=info".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            rate_limit: RateLimitConfig::default(),
            input: InputConfig::default(),
            runtime: RuntimeConfig::default(),
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

impl Config {
    /// Load configuration from an optional TOML file and environment variables.
    /// The file path comes from FRAME_AUDIT_CONFIG, defaulting to "frame_audit.toml";
    /// env values override file values (env-first).
    pub fn load() -> anyhow::Result<Self> {
        let config_path = std::env::var("FRAME_AUDIT_CONFIG")
            .unwrap_or_else(|_| "frame_audit.toml".to_string());

        let mut config: Config = if let Ok(content) = std::fs::read_to_string(&config_path) {
            toml::from_str(&content)?
        } else {
            tracing::warn!("Config file {} not found, using defaults", config_path);
            Self::default()
        };

        if let Ok(provider) = std::env::var("FRAME_LLM_PROVIDER") {
            config.llm.provider = provider;
        }
        if let Ok(model) = std::env::var("FRAME_LLM_MODEL") {
            config.llm.model = model;
        }
        if let Some(temperature) = env_parse::<f32>("FRAME_LLM_TEMPERATURE") {
            config.llm.temperature = temperature;
        }
        if let Some(max_tokens) = env_parse::<u32>("FRAME_LLM_MAX_TOKENS") {
            config.llm.max_output_tokens = max_tokens;
        }
        if let Some(timeout_ms) = env_parse::<u64>("FRAME_LLM_TIMEOUT_MS") {
            config.llm.request_timeout_ms = timeout_ms;
        }
        config.llm.api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());

        if let Some(window_ms) = env_parse::<u64>("FRAME_RATE_WINDOW_MS") {
            config.rate_limit.window_ms = window_ms;
        }
        if let Some(max_requests) = env_parse::<usize>("FRAME_RATE_MAX_REQUESTS") {
            config.rate_limit.max_requests = max_requests;
        }

        if let Some(min_length) = env_parse::<usize>("FRAME_INPUT_MIN_LENGTH") {
            config.input.min_length = min_length;
        }
        if let Some(max_length) = env_parse::<usize>("FRAME_INPUT_MAX_LENGTH") {
            config.input.max_length = max_length;
        }

        config.runtime = RuntimeConfig::load_from_env();

        config.validate()?;
        Ok(config)
    }

    /// Validate and clamp configuration values, warning on suspect settings
    fn validate(&mut self) -> anyhow::Result<()> {
        if !(0.0..=1.0).contains(&self.llm.temperature) {
            tracing::warn!(
                "temperature {} outside [0.0, 1.0], clamping (recommended range is 0.2-0.4)",
                self.llm.temperature
            );
            self.llm.temperature = self.llm.temperature.clamp(0.0, 1.0);
        }
        if self.llm.request_timeout_ms == 0 {
            tracing::warn!("request_timeout_ms of 0 is not usable, resetting to 30000");
            self.llm.request_timeout_ms = 30_000;
        }

        if self.rate_limit.max_requests == 0 {
            tracing::warn!("rate limit of 0 requests would deny everything, clamping to 1");
            self.rate_limit.max_requests = 1;
        }
        if self.rate_limit.window_ms == 0 {
            anyhow::bail!("FRAME_RATE_WINDOW_MS must be greater than 0");
        }

        if self.input.min_length == 0 {
            self.input.min_length = 1;
        }
        if self.input.max_length < self.input.min_length {
            anyhow::bail!(
                "FRAME_INPUT_MAX_LENGTH ({}) must be >= FRAME_INPUT_MIN_LENGTH ({})",
                self.input.max_length,
                self.input.min_length
            );
        }

        if self.llm.provider == "gemini" && self.llm.api_key.is_none() {
            tracing::warn!("GEMINI_API_KEY not set; generation calls will fail");
        }

        Ok(())
    }
}

impl RuntimeConfig {
    /// Load runtime configuration from environment variables
    pub fn load_from_env() -> Self {
        Self {
            http_bind: std::env::var("FRAME_HTTP_BIND")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(|| {
                    "127.0.0.1:3001"
                        .parse()
                        .expect("default bind address should parse")
                }),
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "frame_audit=info".to_string()),
        }
    }
}
