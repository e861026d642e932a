//! Model client configuration.

use serde::{Deserialize, Serialize};

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const API_KEY_VAR: &str = "GEMINI_API_KEY";
const MODEL_VAR: &str = "BILLGUARD_MODEL";
const BASE_URL_VAR: &str = "BILLGUARD_API_BASE";

/// Connection and generation settings for the hosted model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// `None` until configured; requests fail with `NotConfigured` without it.
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub top_p: f32,
    pub max_output_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            temperature: 0.1,
            top_p: 0.8,
            max_output_tokens: 4096,
            timeout_secs: 60,
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by `GEMINI_API_KEY`, `BILLGUARD_MODEL` and `BILLGUARD_API_BASE`.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let mut config = Self::default();
        config.api_key = var(API_KEY_VAR);
        if let Some(model) = var(MODEL_VAR) {
            config.model = model;
        }
        if let Some(base_url) = var(BASE_URL_VAR) {
            config.base_url = base_url;
        }
        config
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// `generateContent` endpoint for the configured model, without the key.
    pub fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}
