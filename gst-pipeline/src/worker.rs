//! Parse queue worker (C8): polls `ClaimQueued`, dispatches one task per
//! claimed document under a bounded concurrency semaphore, and stops
//! claiming new work on shutdown without waiting for in-flight tasks.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Semaphore};

use gst_core::TenantId;

use crate::pipeline::{parse_document, PipelineDeps};

pub struct WorkerConfig {
    pub poll_interval: Duration,
    pub max_retries: i32,
    pub concurrency: usize,
}

pub struct Worker {
    deps: Arc<PipelineDeps>,
    config: WorkerConfig,
    semaphore: Arc<Semaphore>,
}

impl Worker {
    pub fn new(deps: Arc<PipelineDeps>, config: WorkerConfig) -> Self {
        let semaphore = Arc::new(Semaphore::new(config.concurrency));
        Self {
            deps,
            config,
            semaphore,
        }
    }

    /// Runs until `shutdown` fires. Returns promptly on shutdown; any tasks
    /// already spawned keep running to completion in the background.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        loop {
            if *shutdown.borrow() {
                return;
            }

            let claimed = self
                .deps
                .store
                .documents
                .claim_queued(self.config.concurrency as i64)
                .await;

            let documents = match claimed {
                Ok(docs) => docs,
                Err(e) => {
                    tracing::warn!(error = %e, "claim_queued failed, backing off");
                    Vec::new()
                }
            };

            if documents.is_empty() {
                tokio::select! {
                    _ = tokio::time::sleep(self.config.poll_interval) => {}
                    _ = shutdown.changed() => {
                        if *shutdown.borrow() {
                            return;
                        }
                    }
                }
                continue;
            }

            for doc in documents {
                let permit = match self.semaphore.clone().acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return,
                };
                let deps = Arc::clone(&self.deps);
                let tenant_id: TenantId = doc.tenant_id;
                let doc_id = doc.id;
                let max_retries = self.config.max_retries;
                tokio::spawn(async move {
                    let _permit = permit;
                    if let Err(e) = parse_document(&deps, tenant_id, doc_id, max_retries).await {
                        tracing::error!(%doc_id, error = %e, "parse_document failed");
                    }
                });
            }
        }
    }
}
