//! User-facing messages and the file picker.
//!
//! The tray has no window of its own, so errors and the About box are modal
//! `rfd` dialogs.

use std::path::PathBuf;

use rfd::{FileDialog, MessageButtons, MessageDialog, MessageLevel};

use crate::errors::{describe, ErrorReport, GloudError};

pub trait Reporter {
    fn name(&self) -> &str;

    /// Show an error report.
    fn error(&self, report: &ErrorReport);

    /// Show an informational message.
    fn info(&self, title: &str, message: &str);

    /// Log `err` and show it via [`describe`].
    fn report_error(&self, err: &GloudError) {
        tracing::error!(reporter = self.name(), "{}", err);
        self.error(&describe(err));
    }
}

/// Native modal message boxes.
#[derive(Debug, Default, Clone, Copy)]
pub struct DialogReporter;

impl Reporter for DialogReporter {
    fn name(&self) -> &str {
        "dialog"
    }

    fn error(&self, report: &ErrorReport) {
        MessageDialog::new()
            .set_level(MessageLevel::Error)
            .set_title(&report.title)
            .set_description(&report.message)
            .set_buttons(MessageButtons::Ok)
            .show();
    }

    fn info(&self, title: &str, message: &str) {
        MessageDialog::new()
            .set_level(MessageLevel::Info)
            .set_title(title)
            .set_description(message)
            .set_buttons(MessageButtons::Ok)
            .show();
    }
}

/// Modal "choose a file" prompt. `None` means the user cancelled.
pub trait FilePicker {
    fn pick_file(&self) -> Option<PathBuf>;
}

#[derive(Debug, Default, Clone)]
pub struct DialogFilePicker {
    pub start_dir: Option<PathBuf>,
}

impl FilePicker for DialogFilePicker {
    fn pick_file(&self) -> Option<PathBuf> {
        let mut dialog = FileDialog::new().set_title("Upload file to CloudApp");
        if let Some(dir) = &self.start_dir {
            dialog = dialog.set_directory(dir);
        }
        let picked = dialog.pick_file();
        if picked.is_none() {
            tracing::debug!("File selection cancelled");
        }
        picked
    }
}


#[cfg(test)]
mod tests {
    use super::recording::RecordingReporter;
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_report_error_uses_describe() {
        let reporter = RecordingReporter::default();
        reporter.report_error(&GloudError::CaptureToolFailure {
            path: PathBuf::from("/tmp/Screenshot 010124-120000.png"),
        });

        let errors = reporter.errors.borrow();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].title, "Screenshot failed");
        assert!(errors[0].message.contains("capture tool"));
    }
}
