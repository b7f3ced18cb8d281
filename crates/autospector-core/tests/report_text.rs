use autospector_core::model::{Condition, DamageItem, DamageReport, Severity};
use autospector_core::report_text::render_text;

#[test]
fn renders_issues_score_and_parts() {
    let report = DamageReport {
        id: Some("demo-severe-abc123".to_string()),
        date: None,
        damages: vec![DamageItem {
            id: "d1".to_string(),
            label: "Bumper Damage".to_string(),
            severity: Severity::Severe,
            confidence: 0.98,
            description: "Bumper detached.".to_string(),
            bbox: vec![600, 100, 900, 900],
        }],
        summary: "DEMO: Front collision.".to_string(),
        vehicle_parts_visible: vec!["Front Bumper".to_string(), "Hood".to_string()],
        total_severity_score: 85,
        image_url: None,
    };

    let text = render_text(&report);
    assert!(text.contains("ID: #abc123"));
    assert!(text.contains("Mode: Demo"));
    assert!(text.contains("Severity score: 85/100 (Critical)"));
    assert!(text.contains("1 Issues Found"));
    assert!(text.contains("1. Bumper Damage [Severe] confidence 98.0%"));
    assert!(text.contains("Front Bumper, Hood"));
}

#[test]
fn condition_thresholds() {
    assert_eq!(Condition::Excellent, Condition::from_score(19));
    assert_eq!(Condition::Fair, Condition::from_score(20));
    assert_eq!(Condition::Fair, Condition::from_score(49));
    assert_eq!(Condition::Critical, Condition::from_score(50));
}

#[test]
fn clean_report_lists_every_section_in_order() {
    let report = DamageReport {
        id: Some("report-f00d".to_string()),
        date: None,
        damages: Vec::new(),
        summary: "No damage.".to_string(),
        vehicle_parts_visible: Vec::new(),
        total_severity_score: 0,
        image_url: None,
    };

    let text = render_text(&report);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        vec![
            "Vehicle Inspection Report",
            "ID: #f00d",
            "Severity score: 0/100 (Excellent)",
            "",
            "Summary",
            "  No damage.",
            "",
            "Inspection Results: Passed",
            "  No visible damage detected.",
            "",
            "Parts Inspected",
            "  (none listed)",
        ],
        lines
    );
}
