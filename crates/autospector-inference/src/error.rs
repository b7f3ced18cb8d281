use thiserror::Error;

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("request to inference backend failed")]
    Http(#[from] reqwest::Error),
    #[error("inference backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("inference backend returned no text")]
    EmptyResponse,
    #[error("response does not match the report shape")]
    Parse(#[from] serde_json::Error),
}
