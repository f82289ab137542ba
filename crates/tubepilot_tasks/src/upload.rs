use std::path::Path;
use std::sync::Arc;

use tubepilot_core::constants::{video_mime_for_extension, MAX_FILE_SIZE, UPLOAD_QUOTA_COST};
use tubepilot_core::{Phase, UploadProgress, UploadResult, VideoMetadata};
use tubepilot_gateway::wire::UploadRequest;
use tubepilot_gateway::{FailureKind, GatewayError, ProgressSink};
use tubepilot_logging::pilot_info;

use crate::cell::TaskCell;
use crate::TaskContext;

#[derive(Debug, Default)]
struct UploadData {
    progress: Option<UploadProgress>,
    results: Vec<UploadResult>,
}

/// Uploads local video files. Progress is only present while an upload is in flight.
pub struct UploadTask {
    ctx: TaskContext,
    cell: Arc<TaskCell<UploadData>>,
}

impl UploadTask {
    pub fn new(ctx: TaskContext) -> Self {
        Self {
            ctx,
            cell: Arc::new(TaskCell::new("upload")),
        }
    }

    /// Admits the upload locally, then streams it. Every progress tick is
    /// recorded on the task and forwarded to `on_progress`.
    pub async fn upload(
        &self,
        path: impl AsRef<Path>,
        metadata: VideoMetadata,
        on_progress: Option<Arc<dyn ProgressSink>>,
    ) -> Result<UploadResult, GatewayError> {
        let request = UploadRequest {
            path: path.as_ref().to_path_buf(),
            metadata,
        };
        let call = self.cell.begin_with(|data| data.progress = None);

        let outcome = match self.admit(&request).await {
            Ok(()) => {
                let relay = Arc::new(ProgressRelay {
                    cell: Arc::clone(&self.cell),
                    forward: on_progress,
                });
                self.ctx.gateway().upload(&request, relay).await
            }
            Err(err) => Err(err),
        };

        self.cell.settle(call, &outcome, |data, outcome| {
            data.progress = None;
            if let Ok(result) = outcome {
                pilot_info!("Uploaded {} as {}", request.path.display(), result.video_id);
                data.results.push(result.clone());
            }
        });
        outcome
    }

    async fn admit(&self, request: &UploadRequest) -> Result<(), GatewayError> {
        request.metadata.validate()?;
        check_extension(&request.path)?;

        let size = tokio::fs::metadata(&request.path)
            .await
            .map_err(|err| unreadable(&request.path, err))?
            .len();
        if size > MAX_FILE_SIZE {
            return Err(GatewayError::new(
                FailureKind::Validation,
                format!(
                    "{} is {} bytes, larger than the {} byte limit",
                    request.path.display(),
                    size,
                    MAX_FILE_SIZE
                ),
            ));
        }

        let quota = self.ctx.store().read(|state| state.quota().cloned());
        if let Some(quota) = quota {
            if !quota.admits(UPLOAD_QUOTA_COST) {
                return Err(GatewayError::new(
                    FailureKind::QuotaExceeded,
                    format!(
                        "{} quota units left, an upload needs {UPLOAD_QUOTA_COST}",
                        quota.remaining
                    ),
                ));
            }
        }
        Ok(())
    }

    /// Empties results, error and progress.
    pub fn clear(&self) {
        self.cell.write(|transient, data| {
            data.results.clear();
            data.progress = None;
            transient.clear_error();
        });
    }

    pub fn reset(&self) {
        self.cell.reset();
    }

    pub fn progress(&self) -> Option<UploadProgress> {
        self.cell.read(|_, data| data.progress)
    }

    pub fn results(&self) -> Vec<UploadResult> {
        self.cell.read(|_, data| data.results.clone())
    }

    pub fn loading(&self) -> bool {
        self.cell.loading()
    }

    pub fn error(&self) -> Option<String> {
        self.cell.error()
    }

    pub fn phase(&self) -> Phase {
        self.cell.phase()
    }
}

struct ProgressRelay {
    cell: Arc<TaskCell<UploadData>>,
    forward: Option<Arc<dyn ProgressSink>>,
}

impl ProgressSink for ProgressRelay {
    fn emit(&self, progress: UploadProgress) {
        self.cell.write(|_, data| data.progress = Some(progress));
        if let Some(forward) = &self.forward {
            forward.emit(progress);
        }
    }
}

fn check_extension(path: &Path) -> Result<(), GatewayError> {
    let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");
    match video_mime_for_extension(extension) {
        Some(_) => Ok(()),
        None => Err(GatewayError::new(
            FailureKind::Validation,
            format!("{} is not a supported video file", path.display()),
        )),
    }
}

fn unreadable(path: &Path, err: std::io::Error) -> GatewayError {
    GatewayError::new(
        FailureKind::Validation,
        format!("cannot read {}: {}", path.display(), err),
    )
}
