//! Model clients and the analyze pipeline.

use billguard_core::{normalize, DocumentAnalysis, NormalizationError};
use thiserror::Error;
use tracing::debug;

use crate::request::AnalysisRequest;

/// Analysis errors.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Analysis service not configured")]
    NotConfigured,

    #[error("Model service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error(transparent)]
    Normalization(#[from] NormalizationError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AnalysisError {
    /// Message suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            AnalysisError::InvalidRequest(message) => message.clone(),
            AnalysisError::NotConfigured => "Analysis service not configured".into(),
            AnalysisError::ServiceUnavailable(_) | AnalysisError::Json(_) => {
                "Analysis service temporarily unavailable. Please try again.".into()
            }
            AnalysisError::Normalization(e) => e.user_message(),
        }
    }
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Something that turns a document photo into raw model reply text.
pub trait ModelClient {
    fn generate(&self, request: &AnalysisRequest) -> AnalysisResult<String>;
}

/// Send a request through `client` and normalize the reply.
pub fn analyze(client: &dyn ModelClient, request: &AnalysisRequest) -> AnalysisResult<DocumentAnalysis> {
    let raw_text = client.generate(request)?;
    debug!(chars = raw_text.len(), mime_type = %request.mime_type, "received model reply");
    Ok(normalize(&raw_text)?)
}

/// Client returning a canned reply, for tests and offline demos.
pub struct MockClient {
    reply: String,
}

impl MockClient {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
        }
    }
}

impl ModelClient for MockClient {
    fn generate(&self, _request: &AnalysisRequest) -> AnalysisResult<String> {
        Ok(self.reply.clone())
    }
}

#[cfg(feature = "gemini")]
pub use gemini::GeminiClient;

#[cfg(feature = "gemini")]
mod gemini {
    use super::*;
    use tracing::warn;

    use crate::config::ClientConfig;
    use crate::request::{build_generate_request, response_text_from_body};

    /// Blocking client for the hosted `generateContent` API.
    pub struct GeminiClient {
        config: ClientConfig,
        client: reqwest::blocking::Client,
    }

    impl GeminiClient {
        pub fn new(config: ClientConfig) -> AnalysisResult<Self> {
            let client = reqwest::blocking::Client::builder()
                .timeout(std::time::Duration::from_secs(config.timeout_secs))
                .build()
                .map_err(|e| AnalysisError::ServiceUnavailable(e.to_string()))?;
            Ok(Self { config, client })
        }

        pub fn from_env() -> AnalysisResult<Self> {
            Self::new(ClientConfig::from_env())
        }
    }

    impl ModelClient for GeminiClient {
        fn generate(&self, request: &AnalysisRequest) -> AnalysisResult<String> {
            let api_key = self
                .config
                .api_key
                .as_deref()
                .ok_or(AnalysisError::NotConfigured)?;
            let body = build_generate_request(request, &self.config);

            let response = self
                .client
                .post(self.config.endpoint())
                .query(&[("key", api_key)])
                .json(&body)
                .send()
                .map_err(|e| {
                    warn!(error = %e, "model request failed");
                    if e.is_timeout() {
                        AnalysisError::ServiceUnavailable(format!(
                            "Request timed out after {}s",
                            self.config.timeout_secs
                        ))
                    } else {
                        AnalysisError::ServiceUnavailable(e.to_string())
                    }
                })?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().unwrap_or_default();
                warn!(status = status.as_u16(), body = %body, "model service returned an error");
                return Err(AnalysisError::ServiceUnavailable(format!(
                    "HTTP {}",
                    status.as_u16()
                )));
            }

            let body = response
                .text()
                .map_err(|e| AnalysisError::ServiceUnavailable(e.to_string()))?;
            response_text_from_body(&body)
        }
    }

}
