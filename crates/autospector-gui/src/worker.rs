//! Runs analyses off the UI thread. Each submission gets its own channel so
//! results can be matched to their generation.

use anyhow::{Context, Result};
use autospector_core::media::EncodedImage;
use autospector_core::model::DamageReport;
use autospector_inference::InferenceClient;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;

pub enum Outcome {
    Finished { generation: u64, report: DamageReport },
    /// The task ended without sending anything.
    Died { generation: u64 },
}

struct Pending {
    generation: u64,
    rx: Receiver<DamageReport>,
}

pub struct AnalysisWorker {
    runtime: tokio::runtime::Runtime,
    client: Arc<InferenceClient>,
    pending: Vec<Pending>,
}

impl AnalysisWorker {
    pub fn new(client: InferenceClient) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .context("start analysis runtime")?;
        Ok(Self {
            runtime,
            client: Arc::new(client),
            pending: Vec::new(),
        })
    }

    pub fn is_demo(&self) -> bool {
        self.client.is_demo()
    }

    pub fn submit(&mut self, generation: u64, image: EncodedImage, ctx: &egui::Context) {
        let (tx, rx) = mpsc::channel();
        let client = self.client.clone();
        let ctx = ctx.clone();
        self.runtime.spawn(async move {
            let report = client.analyze(&image).await;
            let _ = tx.send(report);
            ctx.request_repaint();
        });
        self.pending.push(Pending { generation, rx });
    }

    /// Everything that finished since the last call, stale generations included.
    pub fn poll(&mut self) -> Vec<Outcome> {
        let mut done = Vec::new();
        self.pending.retain(|p| match p.rx.try_recv() {
            Ok(report) => {
                done.push(Outcome::Finished {
                    generation: p.generation,
                    report,
                });
                false
            }
            Err(TryRecvError::Empty) => true,
            Err(TryRecvError::Disconnected) => {
                done.push(Outcome::Died {
                    generation: p.generation,
                });
                false
            }
        });
        done
    }

    pub fn busy(&self) -> bool {
        !self.pending.is_empty()
    }
}
