//! Terminal credential prompt built on `dialoguer`.
//!
//! Used when GloudApp is started from a terminal without usable credentials.
//! Without a terminal attached the prompt reports cancellation straight away.

use std::io::IsTerminal;

use dialoguer::{theme::ColorfulTheme, Confirm, Input, Password};

use crate::credentials::Credentials;
use crate::errors::{GloudError, Result};
use crate::output;
use crate::session::prompt::{CredentialPrompt, PromptOutcome, PromptReason};

/// Asks for username, password and whether to remember them on stdin/stderr.
#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl TerminalPrompt {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialPrompt for TerminalPrompt {
    fn prompt(&mut self, reason: &PromptReason) -> Result<PromptOutcome> {
        if !std::io::stdin().is_terminal() {
            tracing::warn!("No terminal attached, cannot prompt for CloudApp credentials");
            return Ok(PromptOutcome::Cancelled);
        }

        let theme = ColorfulTheme::default();
        let mut username_input = Input::<String>::with_theme(&theme)
            .with_prompt("CloudApp username (empty to cancel)")
            .allow_empty(true);

        match reason {
            PromptReason::Missing => output::info("Log in to CloudApp"),
            PromptReason::Rejected { username, message } => {
                output::warning(&format!("Login as {username} failed: {message}"));
                username_input = username_input.default(username.clone());
            }
        }

        let username = username_input
            .interact_text()
            .map_err(|e| GloudError::Dialog(format!("Username prompt error: {e}")))?;
        let username = username.trim().to_string();
        if username.is_empty() {
            return Ok(PromptOutcome::Cancelled);
        }

        let password = Password::with_theme(&theme)
            .with_prompt("Password")
            .allow_empty_password(true)
            .interact()
            .map_err(|e| GloudError::Dialog(format!("Password prompt error: {e}")))?;

        let Some(credentials) = Credentials::new(username, password) else {
            return Ok(PromptOutcome::Cancelled);
        };

        let remember = Confirm::with_theme(&theme)
            .with_prompt("Remember these credentials?")
            .default(false)
            .interact_opt()
            .map_err(|e| GloudError::Dialog(format!("Confirm prompt error: {e}")))?
            .unwrap_or(false);

        Ok(PromptOutcome::Entered {
            credentials,
            remember,
        })
    }
}
