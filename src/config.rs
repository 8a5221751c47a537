//! Configuration management for the research agent.
//!
//! Configuration can be set via environment variables (a `.env` file in the
//! working directory is loaded first, see [`load_dotenv`]):
//! - `GROQ_API_KEY` - Required. Your Groq API key.
//! - `GROQ_MODEL` - Optional. The hosted model to use. Defaults to `llama-3.3-70b-versatile`.
//! - `GROQ_BASE_URL` - Optional. OpenAI-compatible API root. Defaults to `https://api.groq.com/openai/v1`.
//! - `MAX_ITERATIONS` - Optional. Maximum agent loop iterations. Defaults to `25`.
//! - `REQUEST_TIMEOUT_SECS` - Optional. HTTP request timeout. Defaults to `60`.
//! - `TEMPERATURE` - Optional. Sampling temperature. Provider default when unset.
//! - `USE_SYSTEM_PROMPT` - Optional. Prepend the research assistant prompt. Defaults to `false`.

use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Agent configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Groq API key
    pub api_key: String,

    /// Hosted model identifier
    pub model: String,

    /// OpenAI-compatible API root, without trailing slash
    pub base_url: String,

    /// Maximum iterations for the agent loop
    pub max_iterations: usize,

    /// Timeout applied to each model request
    pub request_timeout: Duration,

    /// Sampling temperature override
    pub temperature: Option<f32>,

    /// Whether to prepend the research assistant system prompt
    pub use_system_prompt: bool,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if `GROQ_API_KEY` is not set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string());

        let api_key = var("GROQ_API_KEY")
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("GROQ_API_KEY".to_string()))?;

        let model = var("GROQ_MODEL")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let base_url = var("GROQ_BASE_URL")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let max_iterations: usize = var("MAX_ITERATIONS")
            .unwrap_or_else(|| "25".to_string())
            .parse()
            .map_err(|e| ConfigError::InvalidValue("MAX_ITERATIONS".to_string(), format!("{}", e)))?;
        if max_iterations == 0 {
            return Err(ConfigError::InvalidValue(
                "MAX_ITERATIONS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let timeout_secs: u64 = var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|| "60".to_string())
            .parse()
            .map_err(|e| {
                ConfigError::InvalidValue("REQUEST_TIMEOUT_SECS".to_string(), format!("{}", e))
            })?;

        let temperature = var("TEMPERATURE")
            .map(|v| {
                parse_temperature(&v)
                    .map_err(|e| ConfigError::InvalidValue("TEMPERATURE".to_string(), e))
            })
            .transpose()?;

        let use_system_prompt = var("USE_SYSTEM_PROMPT")
            .map(|v| {
                parse_bool(&v).map_err(|e| ConfigError::InvalidValue("USE_SYSTEM_PROMPT".to_string(), e))
            })
            .transpose()?
            .unwrap_or(false);

        Ok(Self {
            api_key,
            model,
            base_url,
            max_iterations,
            request_timeout: Duration::from_secs(timeout_secs),
            temperature,
            use_system_prompt,
        })
    }

    /// Create a config with custom values (useful for testing).
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            base_url: DEFAULT_BASE_URL.to_string(),
            max_iterations: 25,
            request_timeout: Duration::from_secs(60),
            temperature: None,
            use_system_prompt: false,
        }
    }
}

/// Load `.env` from the working directory into the process environment.
/// Returns the file that was loaded, if any.
pub fn load_dotenv() -> Option<PathBuf> {
    load_dotenv_from(Path::new(".env"))
}

/// Load the dotenv file at `path`. A missing file is not an error; an
/// unreadable or malformed one is logged and skipped.
pub fn load_dotenv_from(path: &Path) -> Option<PathBuf> {
    match dotenvy::from_path(path) {
        Ok(()) => {
            tracing::debug!("Loaded environment from {}", path.display());
            Some(path.to_path_buf())
        }
        Err(e) if e.not_found() => None,
        Err(e) => {
            tracing::warn!("Ignoring unreadable .env file {}: {}", path.display(), e);
            None
        }
    }
}

/// Sampling temperature must be a finite, non-negative number.
fn parse_temperature(value: &str) -> Result<f32, String> {
    let t: f32 = value.parse().map_err(|e| format!("{}", e))?;
    if !t.is_finite() || t < 0.0 {
        return Err(format!("expected a finite non-negative number, got: {}", value));
    }
    Ok(t)
}

fn parse_bool(value: &str) -> Result<bool, String> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "t" | "yes" | "y" | "on" => Ok(true),
        "0" | "false" | "f" | "no" | "n" | "off" => Ok(false),
        other => Err(format!("expected boolean-like value, got: {}", other)),
    }
}
