use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use memo_core::KeywordPolicy;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_TIMEOUT_MS: u64 = 4_000;
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 250;
/// A model call gets at most one retry before the keyword fallback takes over.
pub const MAX_RETRIES: u32 = 1;

/// Everything the classifier needs, passed in at construction. Only
/// [`ClassifierConfig::from_env`] reads process state.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
    pub max_retries: u32,
    pub retry_backoff: Duration,
    pub temperature: f32,
    pub policy: KeywordPolicy,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            max_retries: MAX_RETRIES,
            retry_backoff: Duration::from_millis(DEFAULT_RETRY_BACKOFF_MS),
            temperature: 0.1,
            policy: KeywordPolicy::default(),
        }
    }
}

impl ClassifierConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let api_key = env::var("MEMO_OPENAI_API_KEY")
            .ok()
            .filter(|value| !value.trim().is_empty());
        let model = env::var("MEMO_OPENAI_MODEL").unwrap_or(defaults.model);
        let base_url = env::var("MEMO_OPENAI_BASE_URL").unwrap_or(defaults.base_url);
        let timeout = env::var("MEMO_CLASSIFIER_TIMEOUT_MS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.timeout);
        let max_retries = env::var("MEMO_CLASSIFIER_MAX_RETRIES")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .map(|value| value.min(MAX_RETRIES))
            .unwrap_or(defaults.max_retries);

        let policy = match env::var("MEMO_POLICY_FILE") {
            Ok(path) => KeywordPolicy::from_json_file(&path)
                .with_context(|| format!("failed loading keyword policy from {path}"))?,
            Err(_) => defaults.policy,
        };

        Ok(Self {
            api_key,
            model,
            base_url,
            timeout,
            max_retries,
            retry_backoff: defaults.retry_backoff,
            temperature: defaults.temperature,
            policy,
        })
    }

    pub fn offline(mut self) -> Self {
        self.api_key = None;
        self
    }

    pub fn model_enabled(&self) -> bool {
        self.api_key.is_some()
    }
}
