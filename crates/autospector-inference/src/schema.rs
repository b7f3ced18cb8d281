//! Wire shapes for the `generateContent` endpoint.

use crate::config::InferenceConfig;
use crate::InferenceError;
use autospector_core::media::{strip_data_uri_prefix, EncodedImage};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const APPRAISER_INSTRUCTION: &str = "You are an expert car insurance appraiser. Analyze the car image to detect damages.

INSTRUCTIONS:
1. Detect ALL damages (scratches, dents, cracks, rust, broken parts).
2. For each damage, return a TIGHT bounding box [ymin, xmin, ymax, xmax] (0-1000 scale).
3. Estimate severity (Minor/Moderate/Severe).
4. If the car is perfect, return empty damages list.";

/// Structured-output schema the model must answer with.
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "damages": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "label": {
                            "type": "STRING",
                            "description": "Type of damage (e.g., Scratch, Dent, Rust, Crack, Broken Glass, Bumper Damage)"
                        },
                        "severity": {
                            "type": "STRING",
                            "enum": ["Minor", "Moderate", "Severe"],
                            "description": "Estimated severity of the damage"
                        },
                        "confidence": {
                            "type": "NUMBER",
                            "description": "Confidence score between 0.0 and 1.0"
                        },
                        "description": {
                            "type": "STRING",
                            "description": "Brief description of the specific damage instance"
                        },
                        "box_2d": {
                            "type": "ARRAY",
                            "items": { "type": "INTEGER" },
                            "description": "Bounding box coordinates [ymin, xmin, ymax, xmax] normalized to a 1000x1000 grid."
                        }
                    },
                    "required": ["label", "severity", "confidence", "box_2d", "description"]
                }
            },
            "summary": {
                "type": "STRING",
                "description": "A professional summary of the vehicle's condition."
            },
            "vehicle_parts_visible": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "List of vehicle parts visible in the image (e.g., hood, door, bumper)"
            },
            "total_severity_score": {
                "type": "INTEGER",
                "description": "An overall score from 0 (perfect) to 100 (totaled) representing the vehicle's damage level."
            }
        },
        "required": ["damages", "summary", "vehicle_parts_visible", "total_severity_score"]
    })
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

impl GenerateRequest {
    /// One user turn: the instruction text followed by the inline image.
    pub fn for_image(image: &EncodedImage, cfg: &InferenceConfig) -> Self {
        Self {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![
                    Part::Text {
                        text: APPRAISER_INSTRUCTION.to_string(),
                    },
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: image.mime.clone(),
                            data: strip_data_uri_prefix(&image.base64).to_string(),
                        },
                    },
                ],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: response_schema(),
                temperature: cfg.temperature,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_mime_type: String,
    pub response_schema: Value,
    pub temperature: f32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<CandidatePart>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CandidatePart {
    #[serde(default)]
    pub text: Option<String>,
}

/// Concatenated text of the first candidate.
pub fn extract_text(resp: &GenerateResponse) -> Result<String, InferenceError> {
    let text: String = resp
        .candidates
        .first()
        .and_then(|c| c.content.as_ref())
        .map(|c| c.parts.iter().filter_map(|p| p.text.as_deref()).collect())
        .unwrap_or_default();
    if text.trim().is_empty() {
        return Err(InferenceError::EmptyResponse);
    }
    Ok(text)
}
