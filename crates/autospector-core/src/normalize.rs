use crate::geom::NormBox;
use crate::media::EncodedImage;
use crate::model::DamageReport;
use chrono::Utc;
use std::collections::HashSet;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct NormalizeConfig {
    pub report_id_prefix: String,
    pub damage_id_prefix: String,
    pub repair_boxes: bool,
    pub drop_invalid_boxes: bool,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            report_id_prefix: "report".to_string(),
            damage_id_prefix: "damage".to_string(),
            repair_boxes: true,
            drop_invalid_boxes: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeStats {
    pub assigned_report_id: bool,
    pub assigned_damage_ids: usize,
    pub repaired_boxes: usize,
    pub dropped_damages: usize,
}

/// `{prefix}-{uuid}`. The uuid has no dashes so the last segment is the
/// whole random part.
pub fn fresh_id(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}

/// Makes a freshly inferred report ready for display and storage.
pub fn normalize_in_place(
    report: &mut DamageReport,
    image: Option<&EncodedImage>,
    cfg: &NormalizeConfig,
) -> NormalizeStats {
    let mut stats = NormalizeStats::default();

    if report.id.as_deref().map_or(true, |id| id.trim().is_empty()) {
        report.id = Some(fresh_id(&cfg.report_id_prefix));
        stats.assigned_report_id = true;
    }
    report.date = Some(Utc::now());

    if cfg.repair_boxes || cfg.drop_invalid_boxes {
        let before = report.damages.len();
        report.damages.retain_mut(|d| {
            if cfg.repair_boxes {
                match NormBox::repaired(&d.bbox) {
                    Ok((b, changed)) => {
                        if changed {
                            d.bbox = b.to_array().to_vec();
                            stats.repaired_boxes += 1;
                        }
                        true
                    }
                    Err(_) => !cfg.drop_invalid_boxes,
                }
            } else {
                d.norm_box().is_ok()
            }
        });
        stats.dropped_damages = before - report.damages.len();
    }

    let mut seen = HashSet::new();
    for d in &mut report.damages {
        if d.id.trim().is_empty() || !seen.insert(d.id.clone()) {
            d.id = fresh_id(&cfg.damage_id_prefix);
            seen.insert(d.id.clone());
            stats.assigned_damage_ids += 1;
        }
    }

    if let Some(image) = image {
        report.image_url = Some(image.to_data_uri());
    }

    if stats.dropped_damages > 0 {
        tracing::debug!(
            dropped = stats.dropped_damages,
            "dropped damages with unusable boxes"
        );
    }

    stats
}
