//! Configuration types.
//!
//! Everything is read from the environment once at startup and then
//! shared read-only. Missing variables fall back to defaults; present but
//! unparseable ones are rejected.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;
use crate::inference::GenerationParams;
use crate::pipeline::labels::{LabelMap, LabelPreset};
use crate::pipeline::rules::{KeywordPreset, KeywordScorer};

pub const DEFAULT_CLASSIFY_URL: &str =
    "https://api-inference.huggingface.co/models/cardiffnlp/twitter-roberta-base-sentiment-latest";
pub const DEFAULT_GENERATE_URL: &str =
    "https://api-inference.huggingface.co/models/microsoft/DialoGPT-medium";

/// Per-call timeout for both remote endpoints.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Remote inference endpoints and credentials.
#[derive(Debug, Clone)]
pub struct InferenceConfig {
    /// Bearer token. Requests go out unauthenticated when unset.
    pub api_key: Option<SecretString>,
    pub classify_url: String,
    pub generate_url: String,
    pub timeout: Duration,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            classify_url: DEFAULT_CLASSIFY_URL.to_string(),
            generate_url: DEFAULT_GENERATE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Where the keyword scorer's rule table comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeywordSource {
    Preset(KeywordPreset),
    File(PathBuf),
}

impl KeywordSource {
    /// Build the scorer. Called once at startup.
    pub fn load(&self) -> Result<KeywordScorer, ConfigError> {
        match self {
            Self::Preset(preset) => KeywordScorer::from_preset(*preset),
            Self::File(path) => KeywordScorer::from_json_file(path),
        }
    }
}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub inference: InferenceConfig,
    pub generation: GenerationParams,
    pub labels: LabelMap,
    pub keywords: KeywordSource,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            inference: InferenceConfig::default(),
            generation: GenerationParams::default(),
            labels: LabelMap::from_preset(LabelPreset::Sentiment),
            keywords: KeywordSource::Preset(KeywordPreset::Weighted),
        }
    }
}

impl ServiceConfig {
    /// Load from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = get("INBOX_TRIAGE_HOST").unwrap_or(defaults.host);
        let port = parse_or(&get, "INBOX_TRIAGE_PORT", defaults.port)?;

        let timeout_secs = parse_or(&get, "HF_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "HF_TIMEOUT_SECS".into(),
                message: "timeout must be at least one second".into(),
            });
        }

        let inference = InferenceConfig {
            api_key: get("HF_API_KEY").map(SecretString::from),
            classify_url: get("HF_CLASSIFY_URL").unwrap_or(defaults.inference.classify_url),
            generate_url: get("HF_GENERATE_URL").unwrap_or(defaults.inference.generate_url),
            timeout: Duration::from_secs(timeout_secs),
        };

        let generation = GenerationParams {
            max_length: parse_or(&get, "REPLY_MAX_LENGTH", defaults.generation.max_length)?,
            temperature: parse_or(&get, "REPLY_TEMPERATURE", defaults.generation.temperature)?,
        };

        let labels = match get("TRIAGE_LABEL_MAP") {
            Some(pairs) => LabelMap::parse(&pairs)?,
            None => {
                let preset = match get("TRIAGE_LABEL_PRESET") {
                    Some(name) => {
                        LabelPreset::parse(&name).ok_or_else(|| ConfigError::InvalidValue {
                            key: "TRIAGE_LABEL_PRESET".into(),
                            message: format!("unknown preset '{name}' (sentiment|priority)"),
                        })?
                    }
                    None => LabelPreset::Sentiment,
                };
                LabelMap::from_preset(preset)
            }
        };

        let keywords = match get("TRIAGE_KEYWORD_RULES") {
            Some(path) => KeywordSource::File(PathBuf::from(path)),
            None => match get("TRIAGE_KEYWORD_PRESET") {
                Some(name) => KeywordSource::Preset(KeywordPreset::parse(&name).ok_or_else(
                    || ConfigError::InvalidValue {
                        key: "TRIAGE_KEYWORD_PRESET".into(),
                        message: format!("unknown preset '{name}' (weighted|uniform)"),
                    },
                )?),
                None => defaults.keywords,
            },
        };

        Ok(Self {
            host,
            port,
            inference,
            generation,
            labels,
            keywords,
        })
    }

    /// Socket address to bind the HTTP server to.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ConfigError::InvalidValue {
                key: "INBOX_TRIAGE_HOST".into(),
                message: format!("{}:{} is not a socket address: {e}", self.host, self.port),
            })
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("'{raw}': {e}"),
            }),
        None => Ok(default),
    }
}
