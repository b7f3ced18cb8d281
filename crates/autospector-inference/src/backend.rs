use crate::config::InferenceConfig;
use crate::schema::{extract_text, GenerateRequest, GenerateResponse};
use crate::InferenceError;
use async_trait::async_trait;
use std::fmt;

/// Something that answers a `generateContent` request with the model's text.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, InferenceError>;
}

/// Error bodies are cut to this many chars before they reach logs.
const MAX_ERROR_BODY: usize = 512;

pub struct GeminiBackend {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl GeminiBackend {
    pub fn new(api_key: impl Into<String>, cfg: &InferenceConfig) -> Result<Self, InferenceError> {
        let http = reqwest::Client::builder().timeout(cfg.timeout).build()?;
        Ok(Self {
            http,
            endpoint: cfg.endpoint(),
            api_key: api_key.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl fmt::Debug for GeminiBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiBackend")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl InferenceBackend for GeminiBackend {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, InferenceError> {
        tracing::debug!(endpoint = %self.endpoint, "sending generateContent request");
        let resp = self
            .http
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(InferenceError::Status {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY).collect(),
            });
        }

        let parsed: GenerateResponse = resp.json().await?;
        extract_text(&parsed)
    }
}
