use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use futures_util::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::Body;
use tokio_util::io::ReaderStream;
use tubepilot_core::constants::video_mime_for_extension;
use tubepilot_core::UploadProgress;
use tubepilot_logging::pilot_trace;

use crate::gateway::ProgressSink;
use crate::wire::UploadRequest;
use crate::{FailureKind, GatewayError};

const FALLBACK_MIME: &str = "application/octet-stream";

/// Builds the multipart body (`video` file part + `metadata` JSON text).
///
/// The file is streamed; every chunk the transport pulls produces one progress tick.
pub(crate) async fn build_upload_form(
    request: &UploadRequest,
    progress: Arc<dyn ProgressSink>,
) -> Result<Form, GatewayError> {
    let path = request.path.as_path();
    let file = tokio::fs::File::open(path)
        .await
        .map_err(|err| local_file_error(path, err))?;
    let total = file
        .metadata()
        .await
        .map_err(|err| local_file_error(path, err))?
        .len();

    let started = Instant::now();
    let mut loaded: u64 = 0;
    let stream = ReaderStream::new(file).inspect(move |chunk| {
        if let Ok(bytes) = chunk {
            loaded += bytes.len() as u64;
            if let Some(tick) = UploadProgress::measure(loaded, total, started.elapsed()) {
                pilot_trace!("upload {}/{} bytes ({}%)", loaded, total, tick.percentage);
                progress.emit(tick);
            }
        }
    });

    let part = Part::stream_with_length(Body::wrap_stream(stream), total)
        .file_name(file_name(path))
        .mime_str(mime_for(path))
        .map_err(|err| GatewayError::new(FailureKind::Validation, err.to_string()))?;
    let metadata = serde_json::to_string(&request.metadata)
        .map_err(|err| GatewayError::new(FailureKind::Validation, err.to_string()))?;

    Ok(Form::new().part("video", part).text("metadata", metadata))
}

fn local_file_error(path: &Path, err: std::io::Error) -> GatewayError {
    GatewayError::new(
        FailureKind::Validation,
        format!("cannot read {}: {err}", path.display()),
    )
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "video.mp4".to_string())
}

fn mime_for(path: &Path) -> &'static str {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(video_mime_for_extension)
        .unwrap_or(FALLBACK_MIME)
}
