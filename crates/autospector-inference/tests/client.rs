use async_trait::async_trait;
use autospector_core::media::EncodedImage;
use autospector_core::scenario::{ScenarioCatalog, FALLBACK_SUMMARY};
use autospector_inference::schema::GenerateRequest;
use autospector_inference::{parse_report, InferenceBackend, InferenceClient, InferenceConfig, InferenceError};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn fast() -> InferenceConfig {
    InferenceConfig {
        demo_delay: Duration::ZERO,
        fallback_delay: Duration::ZERO,
        ..InferenceConfig::default()
    }
}

fn image() -> EncodedImage {
    EncodedImage::new("image/png", "iVBORw0KGgo=")
}

const LIVE_ANSWER: &str = r#"{
  "damages": [
    {"label": "Dent", "severity": "Moderate", "confidence": 0.91,
     "description": "Door dent.", "box_2d": [400, 100, 600, 300]},
    {"label": "Scratch", "severity": "Minor", "confidence": 0.7,
     "description": "Swapped corners.", "box_2d": [500, 500, 450, 400]},
    {"label": "Ghost", "severity": "Severe", "confidence": 0.4,
     "description": "Flat box.", "box_2d": [100, 100, 100, 900]}
  ],
  "summary": "Moderate side damage.",
  "vehicle_parts_visible": ["Door", "Fender"],
  "total_severity_score": 40
}"#;

struct Canned {
    answer: Result<String, u16>,
    calls: AtomicUsize,
    seen: Mutex<Vec<String>>,
}

impl Canned {
    fn ok(text: &str) -> Arc<Self> {
        Arc::new(Self {
            answer: Ok(text.to_string()),
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn status(code: u16) -> Arc<Self> {
        Arc::new(Self {
            answer: Err(code),
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl InferenceBackend for Canned {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, InferenceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen
            .lock()
            .unwrap()
            .push(serde_json::to_string(request).unwrap());
        match &self.answer {
            Ok(text) => Ok(text.clone()),
            Err(code) => Err(InferenceError::Status {
                status: *code,
                body: "denied".to_string(),
            }),
        }
    }
}

#[tokio::test]
async fn no_credential_gives_marked_demo_report() {
    let client = InferenceClient::new(fast(), None).unwrap();
    assert!(client.is_demo());

    let report = client.analyze(&image()).await;
    assert!(report.is_demo());
    assert!(report.id.as_deref().unwrap().starts_with("demo-"));
    assert!(report.summary.contains("DEMO"));
    assert_ne!(FALLBACK_SUMMARY, report.summary);
    assert!((0..=100).contains(&report.total_severity_score));
    assert_eq!(Some(image().to_data_uri()), report.image_url);
    assert!(report.date.is_some());
    for d in &report.damages {
        assert!(d.norm_box().is_ok());
    }
}

#[tokio::test]
async fn damage_ids_are_unique_across_back_to_back_calls() {
    let client = InferenceClient::demo(fast()).with_rng_seed(3);
    let mut ids = HashSet::new();
    let mut report_ids = HashSet::new();
    for _ in 0..20 {
        let report = client.analyze(&image()).await;
        assert!(report_ids.insert(report.id.clone().unwrap()));
        for d in report.damages {
            assert!(ids.insert(d.id), "duplicate damage id");
        }
    }
}

#[tokio::test]
async fn live_answer_is_normalized() {
    let backend = Canned::ok(LIVE_ANSWER);
    let client = InferenceClient::with_backend(backend.clone(), fast());
    let report = client.analyze(&image()).await;

    assert_eq!(1, backend.calls.load(Ordering::SeqCst));
    assert!(!report.is_demo());
    assert_eq!("Moderate side damage.", report.summary);
    assert_eq!(40, report.total_severity_score);
    // Swapped box repaired, zero-height box dropped.
    assert_eq!(2, report.damages.len());
    assert_eq!(vec![450, 400, 500, 500], report.damages[1].bbox);
    assert!(report.damages.iter().all(|d| d.id.starts_with("damage-")));
    assert_ne!(report.damages[0].id, report.damages[1].id);
    assert_eq!(Some(image().to_data_uri()), report.image_url);
}

#[tokio::test]
async fn request_carries_image_and_schema() {
    let backend = Canned::ok(LIVE_ANSWER);
    let client = InferenceClient::with_backend(backend.clone(), fast());
    client.analyze(&image()).await;

    let sent = backend.seen.lock().unwrap()[0].clone();
    let body: serde_json::Value = serde_json::from_str(&sent).unwrap();
    let parts = &body["contents"][0]["parts"];
    assert_eq!("user", body["contents"][0]["role"]);
    assert!(parts[0]["text"].as_str().unwrap().contains("car insurance appraiser"));
    assert_eq!("image/png", parts[1]["inlineData"]["mimeType"]);
    assert_eq!("iVBORw0KGgo=", parts[1]["inlineData"]["data"]);

    let gen = &body["generationConfig"];
    assert_eq!("application/json", gen["responseMimeType"]);
    assert!((gen["temperature"].as_f64().unwrap() - 0.2).abs() < 1e-6);
    assert_eq!(
        serde_json::json!(["Minor", "Moderate", "Severe"]),
        gen["responseSchema"]["properties"]["damages"]["items"]["properties"]["severity"]["enum"]
    );
}

#[tokio::test]
async fn backend_error_falls_back_once_without_retry() {
    let backend = Canned::status(403);
    let client = InferenceClient::with_backend(backend.clone(), fast());
    let report = client.analyze(&image()).await;

    assert_eq!(1, backend.calls.load(Ordering::SeqCst));
    assert!(report.is_demo());
    assert_eq!(FALLBACK_SUMMARY, report.summary);
}

#[tokio::test]
async fn unparseable_answer_falls_back() {
    let client = InferenceClient::with_backend(Canned::ok("I see a car."), fast());
    let report = client.analyze(&image()).await;
    assert_eq!(FALLBACK_SUMMARY, report.summary);

    let client = InferenceClient::with_backend(Canned::ok(r#"{"summary": "no damages key"}"#), fast());
    let report = client.analyze(&image()).await;
    assert_eq!(FALLBACK_SUMMARY, report.summary);
}

#[tokio::test]
async fn model_cannot_claim_a_demo_id() {
    let answer = LIVE_ANSWER.replacen('{', r#"{"id": "demo-spoof","#, 1);
    let client = InferenceClient::with_backend(Canned::ok(&answer), fast());
    let report = client.analyze(&image()).await;
    assert!(!report.is_demo());
}

#[tokio::test]
async fn custom_catalog_is_drawn_from() {
    let catalog = ScenarioCatalog::from_json(
        r#"[{
            "key": "hail",
            "summary": "Hail dents across the roof.",
            "vehicle_parts_visible": ["Roof"],
            "total_severity_score": 60,
            "damages": [{"label": "Dent", "severity": "Moderate", "confidence": 0.8,
                         "description": "Roof dent.", "box_2d": [50, 100, 200, 900]}]
        }]"#,
    )
    .unwrap();
    let client = InferenceClient::demo(fast()).with_catalog(catalog);

    let report = client.analyze(&image()).await;
    assert!(report.id.as_deref().unwrap().starts_with("demo-hail-"));
    assert!(report.summary.contains("Hail dents across the roof."));
    assert_eq!(60, report.total_severity_score);
    assert_eq!(vec!["Roof".to_string()], report.vehicle_parts_visible);
    assert_eq!(1, report.damages.len());
}

#[test]
fn fenced_json_is_accepted() {
    let fenced = format!("```json\n{LIVE_ANSWER}\n```");
    let report = parse_report(&fenced).unwrap();
    assert_eq!(3, report.damages.len());
}

#[test]
fn blank_text_is_empty_response() {
    assert!(matches!(parse_report("  \n"), Err(InferenceError::EmptyResponse)));
}
