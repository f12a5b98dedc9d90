//! Export controller: admits one in-flight export at a time.
//!
//! The busy flag is cleared by a drop guard, so it resets on success, on
//! failure and if the export future is dropped midway. A request made while
//! busy fails fast with [`BuilderError::ExportInProgress`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::backends::{Artifact, ResumeRenderer};
use crate::compose::ComposeOptions;
use crate::errors::{BuilderError, Result};
use crate::models::resume::ResumeRecord;

/// How long a notice stays visible.
pub const NOTICE_DURATION: Duration = Duration::from_secs(3);

/// Transient, non-blocking outcome of an export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Notice {
    Success { filename: String },
    Failed { message: String },
}

impl Notice {
    pub fn from_result(result: &Result<Artifact>) -> Self {
        match result {
            Ok(artifact) => Notice::Success {
                filename: artifact.filename.clone(),
            },
            Err(e) => Notice::Failed {
                message: e.to_string(),
            },
        }
    }

    pub fn expires_after(&self) -> Duration {
        NOTICE_DURATION
    }
}

struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[derive(Clone)]
pub struct ExportController {
    renderer: Arc<dyn ResumeRenderer>,
    busy: Arc<AtomicBool>,
}

impl ExportController {
    pub fn new(renderer: Arc<dyn ResumeRenderer>) -> Self {
        Self {
            renderer,
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn renderer(&self) -> &Arc<dyn ResumeRenderer> {
        &self.renderer
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    fn acquire(&self) -> Result<BusyGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| BusyGuard(self.busy.clone()))
            .map_err(|_| BuilderError::ExportInProgress)
    }

    /// Renders `record` on the blocking pool with the configured backend.
    pub async fn export(&self, record: Arc<ResumeRecord>, options: ComposeOptions) -> Result<Artifact> {
        let _guard = self.acquire().inspect_err(|_| {
            warn!("Export requested while another export is in progress");
        })?;

        let kind = self.renderer.kind();
        let renderer = self.renderer.clone();
        let rendered = tokio::task::spawn_blocking(move || renderer.render(&record, &options))
            .await
            .map_err(|e| BuilderError::ExportFailed(format!("render task aborted: {e}")))
            .and_then(|r| r.map_err(|e| BuilderError::ExportFailed(e.to_string())));

        match rendered {
            Ok(artifact) => {
                info!(
                    "Exported {} ({kind}, {} bytes)",
                    artifact.filename,
                    artifact.bytes.len()
                );
                Ok(artifact)
            }
            Err(e) => {
                error!("Export with {kind} backend failed: {e}");
                Err(e)
            }
        }
    }

    /// Like [`export`](Self::export), but also returns the notice to show.
    pub async fn export_with_notice(
        &self,
        record: Arc<ResumeRecord>,
        options: ComposeOptions,
    ) -> (Result<Artifact>, Notice) {
        let result = self.export(record, options).await;
        let notice = Notice::from_result(&result);
        (result, notice)
    }
}
