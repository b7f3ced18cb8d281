//! Damage inference: credential detection, the Gemini request/response shapes,
//! the HTTP backend, and a client that always produces a report.

pub mod backend;
pub mod client;
pub mod config;
pub mod schema;

mod error;

pub use backend::{GeminiBackend, InferenceBackend};
pub use client::{parse_report, InferenceClient};
pub use config::{api_key_from_env, resolve_api_key, InferenceConfig};
pub use error::InferenceError;
