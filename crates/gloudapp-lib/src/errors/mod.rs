use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GloudError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Startup authentication gave up. Fatal.
    #[error("Authentication failed: {0}")]
    AuthenticationFailure(String),

    /// A credential pair did not validate; drives the single re-prompt.
    #[error("Validation failed: {0}")]
    ValidationRetryable(String),

    #[error("File not found for upload: {}", path.display())]
    FileNotFoundForUpload { path: PathBuf },

    #[error("Capture tool did not produce {}", path.display())]
    CaptureToolFailure { path: PathBuf },

    #[error("Upload failed: {0}")]
    UploadTransportFailure(String),

    #[error("Clipboard error: {0}")]
    Clipboard(String),

    #[error("Dialog error: {0}")]
    Dialog(String),

    #[error("Tray error: {0}")]
    Tray(String),

    #[error("{0}")]
    Application(String),

    #[error("Panic recovered: {0}")]
    Panic(String),
}

pub type Result<T> = std::result::Result<T, GloudError>;

/// Wraps a closure, catching panics and converting them to `GloudError::Panic`.
///
/// If the closure panics, the panic payload is extracted as a string message.
/// If the closure returns normally, its result is passed through unchanged.
pub fn safe_run<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + std::panic::UnwindSafe,
{
    match std::panic::catch_unwind(f) {
        Ok(result) => result,
        Err(panic_info) => {
            let msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = panic_info.downcast_ref::<String>() {
                s.clone()
            } else {
                "Unknown panic".to_string()
            };
            Err(GloudError::Panic(msg))
        }
    }
}

/// Logs a fatal error and exits the process with code 1.
///
/// This function never returns (`-> !`). It is intended for unrecoverable
/// errors during startup, such as an authentication failure.
pub fn handle_fatal(err: GloudError) -> ! {
    tracing::error!("Fatal error: {}", err);
    std::process::exit(1)
}

/// Title and body of a user-facing error dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    pub title: String,
    pub message: String,
}

/// Maps a `GloudError` to dialog text with an actionable hint where one exists.
pub fn describe(err: &GloudError) -> ErrorReport {
    let (title, message) = match err {
        GloudError::AuthenticationFailure(msg) => (
            "Authentication failed",
            format!("{msg}\n\nCheck your CloudApp username and password."),
        ),
        GloudError::ValidationRetryable(msg) => ("Login rejected", msg.clone()),
        GloudError::FileNotFoundForUpload { path } => (
            "File not found",
            format!("{} does not exist or is not a regular file.", path.display()),
        ),
        GloudError::CaptureToolFailure { path } => (
            "Screenshot failed",
            format!(
                "No screenshot was written to {}.\n\nDid you install the capture tool?",
                path.display()
            ),
        ),
        GloudError::UploadTransportFailure(msg) => ("Upload failed", msg.clone()),
        GloudError::Http(e) => (
            "Network error",
            format!("{e}\n\nCheck your internet connection."),
        ),
        GloudError::Server { status, message } => (
            "Upload failed",
            format!("CloudApp answered {status}: {message}"),
        ),
        GloudError::Clipboard(msg) => ("Clipboard error", msg.clone()),
        GloudError::Io(e) => ("File error", e.to_string()),
        GloudError::Config(msg) => ("Configuration error", msg.clone()),
        other => ("Error", other.to_string()),
    };
    ErrorReport {
        title: title.to_string(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_run_passes_result_through() {
        let ok: Result<u32> = safe_run(|| Ok(7));
        assert_eq!(ok.unwrap(), 7);

        let err: Result<u32> = safe_run(|| Err(GloudError::Application("nope".into())));
        assert!(matches!(err, Err(GloudError::Application(_))));
    }

    #[test]
    fn test_safe_run_catches_panic() {
        let result: Result<()> = safe_run(|| panic!("refresh blew up"));
        match result {
            Err(GloudError::Panic(msg)) => assert_eq!(msg, "refresh blew up"),
            other => panic!("expected Panic, got {other:?}"),
        }
    }

    #[test]
    fn test_capture_failure_mentions_capture_tool() {
        let report = describe(&GloudError::CaptureToolFailure {
            path: PathBuf::from("/tmp/Screenshot 010124-120000.png"),
        });
        assert_eq!(report.title, "Screenshot failed");
        assert!(report.message.contains("capture tool"));
        assert!(report.message.contains("/tmp/Screenshot 010124-120000.png"));
    }

    #[test]
    fn test_file_not_found_report() {
        let report = describe(&GloudError::FileNotFoundForUpload {
            path: PathBuf::from("/nonexistent/path"),
        });
        assert_eq!(report.title, "File not found");
        assert!(report.message.starts_with("/nonexistent/path"));
    }

    #[test]
    fn test_server_error_report() {
        let report = describe(&GloudError::Server {
            status: 503,
            message: "maintenance".into(),
        });
        assert_eq!(report.title, "Upload failed");
        assert!(report.message.contains("503"));
    }

    #[test]
    fn test_fallback_report_uses_display() {
        let report = describe(&GloudError::Tray("icon".into()));
        assert_eq!(report.title, "Error");
        assert_eq!(report.message, "Tray error: icon");
    }
}
