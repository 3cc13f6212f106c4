//! External screenshot tool.
//!
//! The tool is run with the destination path as its last argument. Its exit
//! status is only logged: whether a screenshot was taken is decided by the
//! caller looking for the file afterwards.

use std::path::Path;

use async_trait::async_trait;

use crate::errors::{GloudError, Result};

#[async_trait]
pub trait CaptureTool: Send + Sync {
    /// Ask the tool to write a screenshot to `target`.
    async fn capture(&self, target: &Path) -> Result<()>;
}

/// Runs a configured command line, e.g. `import -window root <target>`.
#[derive(Debug, Clone)]
pub struct CommandCaptureTool {
    argv: Vec<String>,
}

impl CommandCaptureTool {
    pub fn new(argv: Vec<String>) -> Self {
        Self { argv }
    }
}

#[async_trait]
impl CaptureTool for CommandCaptureTool {
    async fn capture(&self, target: &Path) -> Result<()> {
        let (program, args) = self
            .argv
            .split_first()
            .ok_or_else(|| GloudError::Config("captureCommand is empty".into()))?;

        tracing::debug!(program = %program, target = %target.display(), "Running capture tool");
        let output = tokio::process::Command::new(program)
            .args(args)
            .arg(target)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    GloudError::Application(format!("'{program}' not found"))
                } else {
                    GloudError::Io(e)
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::warn!(
                program = %program,
                status = %output.status,
                "Capture tool exited unsuccessfully: {}",
                stderr.trim()
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_empty_command_is_config_error() {
        let tool = CommandCaptureTool::new(Vec::new());
        let err = tool.capture(Path::new("/tmp/x.png")).await.unwrap_err();
        assert!(matches!(err, GloudError::Config(_)));
    }

    #[tokio::test]
    async fn test_missing_program_reports_not_found() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("shot.png");
        let tool = CommandCaptureTool::new(vec!["nonexistent_capture_tool_xyz".into()]);

        let err = tool.capture(&target).await.unwrap_err();
        assert!(err.to_string().contains("nonexistent_capture_tool_xyz"));
        assert!(!target.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_target_path_is_last_argument() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("Screenshot 010124-120000.png");
        // `sh -c SCRIPT ARG0`: the appended target becomes $0.
        let tool = CommandCaptureTool::new(vec![
            "sh".into(),
            "-c".into(),
            "printf png > \"$0\"".into(),
        ]);

        tool.capture(&target).await.unwrap();
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "png");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_tool_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("shot.png");
        let tool = CommandCaptureTool::new(vec!["sh".into(), "-c".into(), "exit 3".into()]);

        assert!(tool.capture(&target).await.is_ok());
        assert!(!target.exists());
    }
}
