use crate::geom::{BoxError, NormBox};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix carried by the id of every synthetic report.
pub const DEMO_ID_PREFIX: &str = "demo-";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Minor,
    Moderate,
    Severe,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Minor => "Minor",
            Severity::Moderate => "Moderate",
            Severity::Severe => "Severe",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageItem {
    #[serde(default)]
    pub id: String,
    pub label: String,
    pub severity: Severity,
    pub confidence: f64,
    pub description: String,
    #[serde(rename = "box_2d")]
    pub bbox: Vec<i64>,
}

impl DamageItem {
    pub fn norm_box(&self) -> Result<NormBox, BoxError> {
        NormBox::from_slice(&self.bbox)
    }
}

/// Overall condition derived from `total_severity_score` for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Condition {
    Excellent,
    Fair,
    Critical,
}

impl Condition {
    pub fn from_score(score: i64) -> Self {
        if score < 20 {
            Condition::Excellent
        } else if score < 50 {
            Condition::Fair
        } else {
            Condition::Critical
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::Excellent => "Excellent",
            Condition::Fair => "Fair",
            Condition::Critical => "Critical",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    pub damages: Vec<DamageItem>,
    pub summary: String,
    pub vehicle_parts_visible: Vec<String>,
    pub total_severity_score: i64,
    #[serde(rename = "imageUrl", default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl DamageReport {
    pub fn is_demo(&self) -> bool {
        self.id
            .as_deref()
            .is_some_and(|id| id.starts_with(DEMO_ID_PREFIX))
    }

    /// Short human reference: the last `-` separated segment of the id.
    pub fn short_ref(&self) -> Option<&str> {
        self.id.as_deref().and_then(|id| id.rsplit('-').next())
    }

    pub fn score(&self) -> i64 {
        self.total_severity_score.clamp(0, 100)
    }

    pub fn condition(&self) -> Condition {
        Condition::from_score(self.score())
    }

    pub fn issue_count(&self) -> usize {
        self.damages.len()
    }

    /// First `n` visible parts joined with ", ", with a trailing "..." when
    /// more were listed.
    pub fn parts_preview(&self, n: usize) -> String {
        let mut s = self
            .vehicle_parts_visible
            .iter()
            .take(n)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        if self.vehicle_parts_visible.len() > n {
            s.push_str("...");
        }
        s
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    pub name: String,
}
