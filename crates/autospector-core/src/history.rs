use crate::model::DamageReport;
use crate::store::{KeyValueStore, StoreError, HISTORY_KEY};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("serialize history")]
    Serialize(#[from] serde_json::Error),
}

/// Shrinks a report image before it is persisted.
pub trait Thumbnailer: Send + Sync {
    /// `None` when the image could not be decoded; the original is kept then.
    fn thumbnail(&self, data_uri: &str) -> Option<String>;
}

/// Keeps images as they are.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepOriginal;

impl Thumbnailer for KeepOriginal {
    fn thumbnail(&self, _data_uri: &str) -> Option<String> {
        None
    }
}

/// Newest-first list of past reports with shrunk images.
pub struct HistoryStore<S> {
    store: S,
    thumbnailer: Box<dyn Thumbnailer>,
    reports: Vec<DamageReport>,
}

impl<S: KeyValueStore> HistoryStore<S> {
    /// Reads the persisted history. Unreadable or corrupt data resets it to
    /// empty and removes the stored value.
    pub fn load(store: S, thumbnailer: Box<dyn Thumbnailer>) -> Self {
        let reports = match store.get(HISTORY_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<DamageReport>>(&raw) {
                Ok(reports) => reports,
                Err(err) => {
                    tracing::error!(error = %err, "failed to parse history, discarding it");
                    if let Err(err) = store.remove(HISTORY_KEY) {
                        tracing::warn!(error = %err, "failed to remove corrupt history");
                    }
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(err) => {
                tracing::error!(error = %err, "failed to read history");
                Vec::new()
            }
        };

        Self {
            store,
            thumbnailer,
            reports,
        }
    }

    pub fn list(&self) -> &[DamageReport] {
        &self.reports
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&DamageReport> {
        self.reports.iter().find(|r| r.id.as_deref() == Some(id))
    }

    /// Persists a copy of `report` with its image thumbnailed and puts it at
    /// the front. On error nothing changes, in memory or on disk.
    pub fn append(&mut self, report: &DamageReport) -> Result<DamageReport, HistoryError> {
        let mut saved = report.clone();
        if let Some(image) = &report.image_url {
            if let Some(thumb) = self.thumbnailer.thumbnail(image) {
                saved.image_url = Some(thumb);
            }
        }

        let mut updated = Vec::with_capacity(self.reports.len() + 1);
        updated.push(saved.clone());
        updated.extend(self.reports.iter().cloned());

        let json = serde_json::to_string(&updated)?;
        self.store.set(HISTORY_KEY, &json)?;
        self.reports = updated;
        Ok(saved)
    }

    /// [`HistoryStore::append`] that logs and skips on failure.
    pub fn record(&mut self, report: &DamageReport) -> bool {
        match self.append(report) {
            Ok(_) => true,
            Err(err) => {
                tracing::error!(error = %err, report = ?report.id, "failed to save history");
                false
            }
        }
    }

    pub fn clear(&mut self) -> Result<(), HistoryError> {
        self.store.remove(HISTORY_KEY)?;
        self.reports.clear();
        Ok(())
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
