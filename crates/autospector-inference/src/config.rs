use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Checked in order; the first usable value wins.
pub const API_KEY_VARS: [&str; 2] = ["API_KEY", "GEMINI_API_KEY"];

const PLACEHOLDERS: [&str; 2] = ["YOUR_API_KEY", "INSERT_KEY"];

#[derive(Debug, Clone)]
pub struct InferenceConfig {
    pub model: String,
    pub api_base: String,
    pub temperature: f32,
    /// Simulated latency when no credential is configured.
    pub demo_delay: Duration,
    /// Pause before the fallback report after a failed live call.
    pub fallback_delay: Duration,
    pub timeout: Duration,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            temperature: 0.2,
            demo_delay: Duration::from_millis(2000),
            fallback_delay: Duration::from_millis(1500),
            timeout: Duration::from_secs(60),
        }
    }
}

impl InferenceConfig {
    /// Defaults with `AUTOSPECTOR_MODEL` / `AUTOSPECTOR_API_BASE` applied.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Some(model) = non_blank_var("AUTOSPECTOR_MODEL") {
            cfg.model = model;
        }
        if let Some(base) = non_blank_var("AUTOSPECTOR_API_BASE") {
            cfg.api_base = base.trim_end_matches('/').to_string();
        }
        cfg
    }

    pub fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.api_base.trim_end_matches('/'),
            self.model
        )
    }
}

/// `None` for absent, blank, or placeholder keys.
pub fn resolve_api_key(raw: Option<&str>) -> Option<String> {
    let key = raw?.trim();
    if key.is_empty() || PLACEHOLDERS.iter().any(|p| key.contains(p)) {
        return None;
    }
    Some(key.to_string())
}

pub fn api_key_from_env() -> Option<String> {
    API_KEY_VARS
        .iter()
        .find_map(|var| resolve_api_key(std::env::var(var).ok().as_deref()))
}

fn non_blank_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
