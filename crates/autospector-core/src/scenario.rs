//! Canned reports used when the inference backend is unavailable.

use crate::model::{DamageItem, DamageReport, Severity, DEMO_ID_PREFIX};
use crate::normalize::fresh_id;
use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Summary used when a live call failed and a scenario stands in for it.
pub const FALLBACK_SUMMARY: &str =
    "DEMO MODE (Fallback): API connection failed or key is invalid. Showing simulated results.";

/// Marker every demo summary starts with.
pub const DEMO_MARKER: &str = "DEMO";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoReason {
    /// No usable credential was configured.
    NoCredential,
    /// A credential exists but the live call failed.
    Fallback,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("scenario catalog is empty")]
    Empty,
    #[error("parse scenario catalog")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemoScenario {
    pub key: String,
    /// Description without the demo marker.
    pub summary: String,
    pub vehicle_parts_visible: Vec<String>,
    pub total_severity_score: i64,
    pub damages: Vec<DamageItem>,
}

/// Immutable, never empty.
#[derive(Debug, Clone)]
pub struct ScenarioCatalog {
    scenarios: Vec<DemoScenario>,
}

impl ScenarioCatalog {
    pub fn new(scenarios: Vec<DemoScenario>) -> Result<Self, CatalogError> {
        if scenarios.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(Self { scenarios })
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        Self::new(serde_json::from_str(json)?)
    }

    pub fn scenarios(&self) -> &[DemoScenario] {
        &self.scenarios
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Uniformly random scenario turned into a fresh report.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R, reason: DemoReason) -> DamageReport {
        let idx = rng.gen_range(0..self.scenarios.len());
        self.instantiate(idx, reason)
    }

    /// Report for scenario `idx` (wrapped into range) with new ids.
    pub fn instantiate(&self, idx: usize, reason: DemoReason) -> DamageReport {
        let scenario = &self.scenarios[idx % self.scenarios.len()];
        let id = fresh_id(&format!("{}{}", DEMO_ID_PREFIX, scenario.key));
        let reference = id.rsplit('-').next().unwrap_or_default();

        let summary = match reason {
            DemoReason::NoCredential => format!(
                "{DEMO_MARKER}: {} (Simulated inspection {}.)",
                scenario.summary,
                &reference[..reference.len().min(8)]
            ),
            DemoReason::Fallback => FALLBACK_SUMMARY.to_string(),
        };

        let damages = scenario
            .damages
            .iter()
            .map(|d| DamageItem {
                id: fresh_id("demo-dmg"),
                ..d.clone()
            })
            .collect();

        DamageReport {
            id: Some(id),
            date: Some(Utc::now()),
            damages,
            summary,
            vehicle_parts_visible: scenario.vehicle_parts_visible.clone(),
            total_severity_score: scenario.total_severity_score,
            image_url: None,
        }
    }

    pub fn builtin() -> Self {
        Self {
            scenarios: vec![
                scenario(
                    "minor",
                    "Vehicle shows signs of minor cosmetic wear. A few surface scratches detected on the front bumper and fender.",
                    &["Front Bumper", "Left Fender", "Headlights"],
                    15,
                    vec![
                        damage(
                            "Scratch",
                            Severity::Minor,
                            0.94,
                            "Deep clear coat scratch detected on the front left fender.",
                            [300, 200, 450, 400],
                        ),
                        damage(
                            "Paint Chip",
                            Severity::Minor,
                            0.88,
                            "Small paint chip on the bumper.",
                            [600, 300, 650, 350],
                        ),
                    ],
                ),
                scenario(
                    "moderate",
                    "Moderate damage detected. Impact dent visible on the hood panel with associated paint damage.",
                    &["Hood", "Windshield", "Front Grille"],
                    45,
                    vec![
                        damage(
                            "Dent",
                            Severity::Moderate,
                            0.92,
                            "Impact dent visible on the hood panel near the center line.",
                            [400, 400, 600, 600],
                        ),
                        damage(
                            "Crack",
                            Severity::Minor,
                            0.85,
                            "Hairline crack on front grille plastic.",
                            [650, 400, 750, 600],
                        ),
                    ],
                ),
                scenario(
                    "severe",
                    "CRITICAL DAMAGE. Front collision impact visible with structural bumper damage and potential frame misalignment.",
                    &["Front Bumper", "Hood", "Headlights"],
                    85,
                    vec![
                        damage(
                            "Bumper Damage",
                            Severity::Severe,
                            0.98,
                            "Major structural damage and detachment of front bumper.",
                            [600, 100, 900, 900],
                        ),
                        damage(
                            "Broken Glass",
                            Severity::Moderate,
                            0.95,
                            "Shattered headlight casing on right side.",
                            [500, 700, 600, 850],
                        ),
                    ],
                ),
                scenario(
                    "clean",
                    "Vehicle appears to be in excellent condition. No significant damages detected by the system.",
                    &["Side Profile", "Doors", "Windows"],
                    0,
                    Vec::new(),
                ),
            ],
        }
    }
}

impl Default for ScenarioCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn scenario(
    key: &str,
    summary: &str,
    parts: &[&str],
    score: i64,
    damages: Vec<DamageItem>,
) -> DemoScenario {
    DemoScenario {
        key: key.to_string(),
        summary: summary.to_string(),
        vehicle_parts_visible: parts.iter().map(|p| p.to_string()).collect(),
        total_severity_score: score,
        damages,
    }
}

fn damage(
    label: &str,
    severity: Severity,
    confidence: f64,
    description: &str,
    bbox: [i64; 4],
) -> DamageItem {
    DamageItem {
        id: String::new(),
        label: label.to_string(),
        severity,
        confidence,
        description: description.to_string(),
        bbox: bbox.to_vec(),
    }
}
