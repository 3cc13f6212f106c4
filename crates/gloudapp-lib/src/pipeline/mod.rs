//! Capture-or-select, upload, copy the link.
//!
//! Three entry points feed the same tail: a fresh screenshot, the path held
//! in the clipboard, and a file picked in a dialog. The network half
//! ([`UploadPipeline::upload`]) runs on the tokio runtime; the clipboard half
//! ([`deliver`]) belongs to the UI loop.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Local};

use crate::capture::CaptureTool;
use crate::clipboard::ClipboardAccess;
use crate::cloud::DropService;
use crate::config::AppConfig;
use crate::errors::{GloudError, Result};
use crate::fileops;
use crate::output;

/// A finished upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    pub source_path: PathBuf,
    pub url: String,
}

#[derive(Clone)]
pub struct UploadPipeline {
    service: Arc<dyn DropService>,
    capture: Arc<dyn CaptureTool>,
    screenshot_dir: PathBuf,
    time_format: String,
}

impl UploadPipeline {
    pub fn new(
        service: Arc<dyn DropService>,
        capture: Arc<dyn CaptureTool>,
        config: &AppConfig,
    ) -> Self {
        Self {
            service,
            capture,
            screenshot_dir: config.screenshot_dir.clone(),
            time_format: config.screenshot_time_format.clone(),
        }
    }

    /// `<screenshot_dir>/Screenshot <timestamp>.png`
    pub fn screenshot_path(&self, now: DateTime<Local>) -> PathBuf {
        let stamp = now.format(&self.time_format);
        self.screenshot_dir.join(format!("Screenshot {stamp}.png"))
    }

    /// Run the capture tool and return the new file.
    pub async fn capture_screenshot(&self) -> Result<PathBuf> {
        let target = self.screenshot_path(Local::now());
        if let Err(e) = self.capture.capture(&target).await {
            tracing::warn!(target = %target.display(), "Capture tool failed to run: {}", e);
        }
        if !target.is_file() {
            return Err(GloudError::CaptureToolFailure { path: target });
        }
        tracing::info!(path = %target.display(), "Screenshot captured");
        Ok(target)
    }

    /// Take a screenshot and upload it. Nothing is uploaded when the capture
    /// tool leaves no file behind.
    pub async fn screenshot_and_upload(&self) -> Result<UploadResult> {
        let path = self.capture_screenshot().await?;
        self.upload(&path).await
    }

    /// Upload `path` after checking it is still an existing regular file.
    pub async fn upload(&self, path: &Path) -> Result<UploadResult> {
        let source_path = validate_source(path)?;
        tracing::info!(service = self.service.name(), path = %source_path.display(), "Uploading");

        let drop = self
            .service
            .upload(&source_path)
            .await
            .map_err(transport_failure)?;

        tracing::info!(url = %drop.url, "Upload finished");
        Ok(UploadResult {
            source_path,
            url: drop.url,
        })
    }
}

/// Errors from talking to the service collapse into
/// [`GloudError::UploadTransportFailure`]; local errors pass through.
fn transport_failure(err: GloudError) -> GloudError {
    match err {
        GloudError::Http(e) => GloudError::UploadTransportFailure(e.to_string()),
        GloudError::Json(e) => {
            GloudError::UploadTransportFailure(format!("unexpected response: {e}"))
        }
        GloudError::Server { status, message } => {
            GloudError::UploadTransportFailure(format!("CloudApp answered {status}: {message}"))
        }
        other => other,
    }
}

/// `path` if it names an existing regular file.
pub fn validate_source(path: &Path) -> Result<PathBuf> {
    path.to_str()
        .and_then(fileops::existing_regular_file)
        .or_else(|| path.is_file().then(|| path.to_path_buf()))
        .ok_or_else(|| GloudError::FileNotFoundForUpload {
            path: path.to_path_buf(),
        })
}

/// The upload source named by clipboard text, if any.
pub fn clipboard_source(text: Option<&str>) -> Option<PathBuf> {
    text.and_then(fileops::existing_regular_file)
}

/// Put the link on the clipboard and report it on the console.
pub fn deliver(result: &UploadResult, clipboard: &mut dyn ClipboardAccess) -> Result<()> {
    clipboard.write_text(&result.url)?;
    output::success(&output::uploaded_line(&result.url));
    tracing::info!(
        source = %result.source_path.display(),
        url = %result.url,
        "Link copied to clipboard"
    );
    Ok(())
}
