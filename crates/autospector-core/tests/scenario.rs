use autospector_core::model::DEMO_ID_PREFIX;
use autospector_core::scenario::{
    CatalogError, DemoReason, ScenarioCatalog, DEMO_MARKER, FALLBACK_SUMMARY,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;

#[test]
fn builtin_catalog_has_the_four_scenarios() {
    let catalog = ScenarioCatalog::builtin();
    let keys: Vec<_> = catalog.scenarios().iter().map(|s| s.key.as_str()).collect();
    assert_eq!(vec!["minor", "moderate", "severe", "clean"], keys);
    for s in catalog.scenarios() {
        assert!((0..=100).contains(&s.total_severity_score));
        assert!(s.damages.iter().all(|d| d.norm_box().is_ok()));
    }
}

#[test]
fn draws_are_marked_as_demo_and_fresh() {
    let catalog = ScenarioCatalog::builtin();
    let mut rng = StdRng::seed_from_u64(7);

    let a = catalog.draw(&mut rng, DemoReason::NoCredential);
    let b = catalog.draw(&mut rng, DemoReason::NoCredential);

    for r in [&a, &b] {
        assert!(r.is_demo());
        assert!(r.id.as_deref().unwrap().starts_with(DEMO_ID_PREFIX));
        assert!(r.summary.starts_with(DEMO_MARKER));
        assert!(r.date.is_some());
    }
    assert_ne!(a.id, b.id);
    assert_ne!(a.summary, b.summary);

    let ids: HashSet<_> = a.damages.iter().chain(&b.damages).map(|d| d.id.clone()).collect();
    assert_eq!(a.damages.len() + b.damages.len(), ids.len());
}

#[test]
fn fallback_draws_use_the_fallback_notice() {
    let catalog = ScenarioCatalog::builtin();
    let r = catalog.instantiate(2, DemoReason::Fallback);
    assert_eq!(FALLBACK_SUMMARY, r.summary);
    assert!(r.is_demo());
    assert_eq!(85, r.total_severity_score);
}

#[test]
fn draws_cover_every_scenario() {
    let catalog = ScenarioCatalog::builtin();
    let mut rng = StdRng::seed_from_u64(42);
    let mut seen = HashSet::new();
    for _ in 0..200 {
        let r = catalog.draw(&mut rng, DemoReason::NoCredential);
        seen.insert(r.total_severity_score);
    }
    assert_eq!(4, seen.len());
}

#[test]
fn empty_catalog_is_rejected() {
    assert!(matches!(ScenarioCatalog::new(Vec::new()), Err(CatalogError::Empty)));
    assert!(matches!(ScenarioCatalog::from_json("[]"), Err(CatalogError::Empty)));
}

#[test]
fn catalog_loads_from_json() {
    let json = r#"[{
        "key": "hail",
        "summary": "Hail dents across the roof.",
        "vehicle_parts_visible": ["Roof"],
        "total_severity_score": 40,
        "damages": [{
            "label": "Dent",
            "severity": "Moderate",
            "confidence": 0.8,
            "description": "Hail dent.",
            "box_2d": [0, 0, 200, 1000]
        }]
    }]"#;
    let catalog = ScenarioCatalog::from_json(json).unwrap();
    let r = catalog.instantiate(0, DemoReason::NoCredential);
    assert!(r.id.as_deref().unwrap().starts_with("demo-hail-"));
    assert_eq!(1, r.damages.len());
    assert!(!r.damages[0].id.is_empty());
}
