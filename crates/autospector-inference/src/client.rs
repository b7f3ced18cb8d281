use crate::backend::{GeminiBackend, InferenceBackend};
use crate::config::{api_key_from_env, InferenceConfig};
use crate::schema::GenerateRequest;
use crate::InferenceError;
use autospector_core::media::EncodedImage;
use autospector_core::model::DamageReport;
use autospector_core::normalize::{fresh_id, normalize_in_place, NormalizeConfig};
use autospector_core::scenario::{DemoReason, ScenarioCatalog};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::{Arc, Mutex, PoisonError};

/// Turns an image into a [`DamageReport`].
///
/// Without a backend every call is answered from the scenario catalog after
/// the demo delay. With one, a failed call is answered from the catalog with
/// the fallback summary. [`InferenceClient::analyze`] therefore always
/// returns a normalized report.
pub struct InferenceClient {
    backend: Option<Arc<dyn InferenceBackend>>,
    catalog: ScenarioCatalog,
    cfg: InferenceConfig,
    normalize: NormalizeConfig,
    rng: Mutex<StdRng>,
}

impl InferenceClient {
    /// Live client when `api_key` is usable, demo client otherwise.
    pub fn new(cfg: InferenceConfig, api_key: Option<String>) -> Result<Self, InferenceError> {
        let backend: Option<Arc<dyn InferenceBackend>> = match api_key {
            Some(key) => Some(Arc::new(GeminiBackend::new(key, &cfg)?)),
            None => None,
        };
        Ok(Self::build(backend, cfg))
    }

    pub fn from_env() -> Result<Self, InferenceError> {
        Self::new(InferenceConfig::from_env(), api_key_from_env())
    }

    pub fn demo(cfg: InferenceConfig) -> Self {
        Self::build(None, cfg)
    }

    pub fn with_backend(backend: Arc<dyn InferenceBackend>, cfg: InferenceConfig) -> Self {
        Self::build(Some(backend), cfg)
    }

    fn build(backend: Option<Arc<dyn InferenceBackend>>, cfg: InferenceConfig) -> Self {
        Self {
            backend,
            catalog: ScenarioCatalog::builtin(),
            cfg,
            normalize: NormalizeConfig::default(),
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn with_catalog(mut self, catalog: ScenarioCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Deterministic scenario draws.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    pub fn is_demo(&self) -> bool {
        self.backend.is_none()
    }

    pub async fn analyze(&self, image: &EncodedImage) -> DamageReport {
        let mut report = match &self.backend {
            None => {
                tracing::info!("no usable API key, answering with a simulated inspection");
                tokio::time::sleep(self.cfg.demo_delay).await;
                self.draw(DemoReason::NoCredential)
            }
            Some(backend) => match self.live(backend.as_ref(), image).await {
                Ok(report) => report,
                Err(err) => {
                    tracing::warn!(error = %err, model = %self.cfg.model, "live analysis failed, falling back to demo");
                    tokio::time::sleep(self.cfg.fallback_delay).await;
                    self.draw(DemoReason::Fallback)
                }
            },
        };

        let stats = normalize_in_place(&mut report, Some(image), &self.normalize);
        tracing::info!(
            report = report.id.as_deref().unwrap_or_default(),
            damages = report.damages.len(),
            score = report.total_severity_score,
            repaired = stats.repaired_boxes,
            dropped = stats.dropped_damages,
            "analysis complete"
        );
        report
    }

    async fn live(
        &self,
        backend: &dyn InferenceBackend,
        image: &EncodedImage,
    ) -> Result<DamageReport, InferenceError> {
        let request = GenerateRequest::for_image(image, &self.cfg);
        let text = backend.generate(&request).await?;
        let mut report = parse_report(&text)?;

        // Ids are ours to assign, whatever the model echoed back.
        report.id = None;
        report.image_url = None;
        for d in &mut report.damages {
            d.id = fresh_id(&self.normalize.damage_id_prefix);
        }
        Ok(report)
    }

    fn draw(&self, reason: DemoReason) -> DamageReport {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        self.catalog.draw(&mut *rng, reason)
    }
}

/// Parses model output into a report. Tolerates a surrounding markdown fence.
pub fn parse_report(text: &str) -> Result<DamageReport, InferenceError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(InferenceError::EmptyResponse);
    }
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|s| s.strip_suffix("```"))
        .unwrap_or(trimmed);
    Ok(serde_json::from_str(body.trim())?)
}
