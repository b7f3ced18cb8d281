use autospector_core::geom::BoxError;
use autospector_core::model::{DamageItem, Severity};
use autospector_core::overlay::{build_overlay, confidence_percent, tier_style, Highlight};

fn item(id: &str, severity: Severity, confidence: f64, bbox: Vec<i64>) -> DamageItem {
    DamageItem {
        id: id.to_string(),
        label: format!("label-{id}"),
        severity,
        confidence,
        description: String::new(),
        bbox,
    }
}

#[test]
fn severe_damage_gets_the_highest_tier() {
    let overlay = build_overlay(&[
        item("a", Severity::Minor, 0.5, vec![0, 0, 100, 100]),
        item("b", Severity::Severe, 0.98, vec![600, 100, 900, 900]),
    ]);
    let severe = &overlay.annotations[1];
    assert_eq!(Severity::Severe, severe.severity);
    assert_eq!(tier_style(Severity::Severe), severe.style);
    assert!(severe.style.marker);
    assert!(severe.style.stroke_width > tier_style(Severity::Moderate).stroke_width);
}

#[test]
fn tiers_have_distinct_colors() {
    let minor = tier_style(Severity::Minor).stroke;
    let moderate = tier_style(Severity::Moderate).stroke;
    let severe = tier_style(Severity::Severe).stroke;
    assert_ne!(minor, moderate);
    assert_ne!(moderate, severe);
    assert_ne!(minor, severe);
}

#[test]
fn a_bad_box_only_skips_its_own_annotation() {
    let overlay = build_overlay(&[
        item("ok-1", Severity::Minor, 0.9, vec![100, 100, 200, 200]),
        item("short", Severity::Severe, 0.9, vec![1, 2]),
        item("flat", Severity::Moderate, 0.9, vec![300, 300, 300, 400]),
        item("ok-2", Severity::Moderate, 0.9, vec![250, 250, 750, 750]),
    ]);

    let ids: Vec<_> = overlay.annotations.iter().map(|a| a.damage_id.as_str()).collect();
    assert_eq!(vec!["ok-1", "ok-2"], ids);
    assert_eq!(2, overlay.skipped.len());
    assert_eq!(BoxError::WrongArity(2), overlay.skipped[0].reason);
    assert_eq!("flat", overlay.skipped[1].damage_id);

    let r = overlay.annotations[1].rect;
    assert_eq!((25.0, 25.0, 50.0, 50.0), (r.top, r.left, r.width, r.height));
}

#[test]
fn out_of_range_boxes_are_clamped() {
    let overlay = build_overlay(&[item("a", Severity::Minor, 0.9, vec![-50, 900, 500, 1400])]);
    let r = overlay.annotations[0].rect;
    assert_eq!(0.0, r.top);
    assert_eq!(90.0, r.left);
    assert_eq!(10.0, r.width);
    assert_eq!(50.0, r.height);
}

#[test]
fn labels_show_name_and_rounded_confidence() {
    let overlay = build_overlay(&[item("a", Severity::Minor, 0.946, vec![0, 0, 10, 10])]);
    let a = &overlay.annotations[0];
    assert_eq!("95%", a.confidence);
    assert_eq!("label-a\n95% confidence", a.tooltip());

    assert_eq!("94.6%", confidence_percent(0.946, 1));
    assert_eq!("100%", confidence_percent(1.7, 0));
    assert_eq!("0%", confidence_percent(f64::NAN, 0));
}

#[test]
fn severe_is_painted_last_and_wins_hit_tests() {
    let overlay = build_overlay(&[
        item("severe", Severity::Severe, 0.9, vec![0, 0, 500, 500]),
        item("minor", Severity::Minor, 0.9, vec![0, 0, 500, 500]),
    ]);
    let order: Vec<_> = overlay.draw_order().iter().map(|a| a.damage_id.as_str()).collect();
    assert_eq!(vec!["minor", "severe"], order);
    assert_eq!("severe", overlay.hit(10.0, 10.0).unwrap().damage_id);
    assert!(overlay.hit(80.0, 80.0).is_none());
}

#[test]
fn highlight_follows_the_pointer_and_clears_when_it_leaves() {
    let mut h = Highlight::default();

    h.hover(None);
    h.hover(Some("d2"));
    h.end_frame();
    assert_eq!(Some("d2"), h.current());

    // Canvas and list both report; the first one wins.
    h.hover(Some("d1"));
    h.hover(Some("d3"));
    h.end_frame();
    assert_eq!(Some("d1"), h.current());

    // Pointer left both surfaces.
    h.hover(None);
    h.hover(None);
    h.end_frame();
    assert_eq!(None, h.current());

    h.hover(Some("d1"));
    h.end_frame();
    h.clear();
    assert_eq!(None, h.current());
}
