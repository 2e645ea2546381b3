use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{ReadmeAiError, Result};

pub const API_KEY_ENV: &str = "GOOGLE_GENERATIVE_AI_API_KEY";
pub const PORT_ENV: &str = "PORT";
pub const SERVER_URL_ENV: &str = "README_AI_SERVER_URL";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Gateway listener settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Per-client quota on the generate endpoint
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Generation backend settings
    #[serde(default)]
    pub llm: LlmConfig,

    /// Settings for talking to a remote gateway
    #[serde(default)]
    pub client: ClientConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind
    pub host: String,

    /// Listening port
    pub port: u16,

    /// Reverse proxies in front of the gateway. The client identity is the
    /// X-Forwarded-For entry appended by the outermost trusted proxy; 0 uses
    /// the socket peer address only.
    pub trusted_proxy_hops: usize,

    /// Maximum accepted JSON body size (in bytes)
    pub body_limit_bytes: usize,

    /// Name reported by the health endpoint
    pub service_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Window length in seconds
    pub window_secs: u64,

    /// Requests allowed per client per window
    pub max_requests: u32,

    /// Minimum time between sweeps of expired client entries (in seconds)
    pub sweep_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Backend provider (only "gemini" is supported)
    pub provider: String,

    /// Model name (e.g., "gemini-2.0-flash")
    pub model: String,

    /// API key, usually supplied through the environment
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Base URL override (for proxies or tests)
    pub base_url: Option<String>,

    /// Maximum tokens for the generated document
    pub max_output_tokens: Option<u32>,

    /// Sampling temperature (0.0 to 1.0)
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the gateway used by `generate`
    pub server_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            trusted_proxy_hops: 1,
            body_limit_bytes: 10 * 1024 * 1024, // 10MB
            service_name: "readme-ai".to_string(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_secs: 15 * 60,
            max_requests: 10,
            sweep_interval_secs: 60,
        }
    }
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: "gemini-2.0-flash".to_string(),
            api_key: None,
            base_url: None,
            max_output_tokens: None,
            temperature: None,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:3001".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            rate_limit: RateLimitConfig::default(),
            llm: LlmConfig::default(),
            client: ClientConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config =
            toml::from_str(&content).map_err(|e| ReadmeAiError::Config(e.to_string()))?;
        Ok(config)
    }

    /// Load configuration with fallback to default
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        match path {
            Some(p) => {
                if p.as_ref().exists() {
                    Self::load(p)
                } else {
                    Ok(Self::default())
                }
            }
            None => {
                let candidates = ["readme-ai.toml", ".readme-ai.toml"];

                for candidate in &candidates {
                    if Path::new(candidate).exists() {
                        return Self::load(candidate);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    /// Overlay values taken from the process environment
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    fn apply_vars<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            self.llm.api_key = Some(key);
        }

        if let Some(port) = lookup(PORT_ENV) {
            self.server.port = port.trim().parse().map_err(|_| {
                ReadmeAiError::Config(format!("{} must be a port number, got '{}'", PORT_ENV, port))
            })?;
        }

        if let Some(url) = lookup(SERVER_URL_ENV).filter(|u| !u.trim().is_empty()) {
            self.client.server_url = url;
        }

        Ok(())
    }

    /// The generation credential; its absence is fatal for anything that calls the backend
    pub fn require_api_key(&self) -> Result<&str> {
        self.llm
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                ReadmeAiError::Config(format!("{} environment variable is required!", API_KEY_ENV))
            })
    }
}
