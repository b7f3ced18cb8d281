use crate::geom::{BoxError, NormBox, PercentRect};
use crate::model::{DamageItem, Severity};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// How one severity tier is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierStyle {
    pub stroke: Rgb,
    /// Fill uses the stroke color at this opacity.
    pub fill_alpha: f32,
    pub stroke_width: f32,
    /// Always-visible marker in addition to the hover label.
    pub marker: bool,
}

pub fn tier_style(severity: Severity) -> TierStyle {
    match severity {
        Severity::Severe => TierStyle {
            stroke: Rgb::new(0xDC, 0x26, 0x26),
            fill_alpha: 0.3,
            stroke_width: 3.0,
            marker: true,
        },
        Severity::Moderate => TierStyle {
            stroke: Rgb::new(0xF9, 0x73, 0x16),
            fill_alpha: 0.3,
            stroke_width: 2.0,
            marker: false,
        },
        Severity::Minor => TierStyle {
            stroke: Rgb::new(0xFA, 0xCC, 0x15),
            fill_alpha: 0.3,
            stroke_width: 2.0,
            marker: false,
        },
    }
}

/// `0.94` -> `"94%"` with `decimals = 0`, `"94.0%"` with `decimals = 1`.
pub fn confidence_percent(confidence: f64, decimals: usize) -> String {
    let v = if confidence.is_finite() {
        confidence.clamp(0.0, 1.0) * 100.0
    } else {
        0.0
    };
    format!("{v:.decimals$}%")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub damage_id: String,
    pub rect: PercentRect,
    pub severity: Severity,
    pub style: TierStyle,
    pub label: String,
    pub confidence: String,
}

impl Annotation {
    /// Text shown on demand (hover / tap).
    pub fn tooltip(&self) -> String {
        format!("{}\n{} confidence", self.label, self.confidence)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedAnnotation {
    pub damage_id: String,
    pub reason: BoxError,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overlay {
    /// Detection order.
    pub annotations: Vec<Annotation>,
    pub skipped: Vec<SkippedAnnotation>,
}

impl Overlay {
    /// Paint order: lower tiers first so severe boxes end up on top.
    pub fn draw_order(&self) -> Vec<&Annotation> {
        let mut v: Vec<&Annotation> = self.annotations.iter().collect();
        v.sort_by_key(|a| a.severity);
        v
    }

    /// Topmost annotation under a point given in container percentages.
    pub fn hit(&self, x_pct: f64, y_pct: f64) -> Option<&Annotation> {
        self.draw_order()
            .into_iter()
            .rev()
            .find(|a| a.rect.contains(x_pct, y_pct))
    }
}

pub fn annotate(item: &DamageItem) -> Result<Annotation, BoxError> {
    let b = NormBox::clamped(&item.bbox)?;
    Ok(Annotation {
        damage_id: item.id.clone(),
        rect: b.to_percent(),
        severity: item.severity,
        style: tier_style(item.severity),
        label: item.label.clone(),
        confidence: confidence_percent(item.confidence, 0),
    })
}

/// One annotation per damage. A bad box only drops its own annotation.
pub fn build_overlay(damages: &[DamageItem]) -> Overlay {
    let mut overlay = Overlay::default();
    for item in damages {
        match annotate(item) {
            Ok(a) => overlay.annotations.push(a),
            Err(reason) => {
                tracing::debug!(damage = %item.id, %reason, "skipping annotation");
                overlay.skipped.push(SkippedAnnotation {
                    damage_id: item.id.clone(),
                    reason,
                });
            }
        }
    }
    overlay
}

/// Damage highlighted across the photo and the damage list. Hovers reported
/// during a frame take effect at [`Highlight::end_frame`]; a frame with no
/// hover clears it.
#[derive(Debug, Clone, Default)]
pub struct Highlight {
    current: Option<String>,
    next: Option<String>,
}

impl Highlight {
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// First hover reported in a frame wins.
    pub fn hover(&mut self, damage_id: Option<&str>) {
        if self.next.is_none() {
            self.next = damage_id.map(str::to_string);
        }
    }

    pub fn end_frame(&mut self) {
        self.current = self.next.take();
    }

    pub fn clear(&mut self) {
        self.current = None;
        self.next = None;
    }
}
