//! Startup authentication.
//!
//! `SessionManager::bootstrap` resolves credentials from the command line,
//! the credential store or an interactive prompt (in that order), validates
//! them against the `DropService`, and re-prompts exactly once when a
//! non-interactive pair is rejected. Network failures and bad credentials
//! take the same re-prompt path; the underlying cause is logged.

pub mod prompt;

use std::fmt;
use std::sync::Arc;

use crate::cloud::{Account, DropService};
use crate::credentials::{CredentialStore, Credentials};
use crate::errors::{GloudError, Result};

use prompt::{CredentialPrompt, PromptOutcome, PromptReason};

/// Default short-link host for accounts without a custom domain.
pub const DEFAULT_DOMAIN: &str = "cl.ly";

/// Where a credential pair came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Arguments,
    Store,
    Prompt,
}

impl CredentialSource {
    /// Interactive pairs have already used up the single prompt.
    pub fn is_interactive(self) -> bool {
        self == CredentialSource::Prompt
    }
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::Arguments => write!(f, "command line"),
            CredentialSource::Store => write!(f, "credential store"),
            CredentialSource::Prompt => write!(f, "prompt"),
        }
    }
}

/// Bootstrap progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Unresolved,
    Resolving(CredentialSource),
    Validating(CredentialSource),
    Retrying,
    Authenticated,
    Failed,
}

/// The one authenticated connection to the drop service.
#[derive(Clone)]
pub struct Session {
    username: String,
    domain: String,
    client: Arc<dyn DropService>,
}

impl Session {
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Account domain, or the default host when the account has none.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn client(&self) -> &Arc<dyn DropService> {
        &self.client
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("username", &self.username)
            .field("domain", &self.domain)
            .field("service", &self.client.name())
            .finish()
    }
}

/// A resolved pair plus whether the user asked to persist it.
struct Resolved {
    credentials: Credentials,
    source: CredentialSource,
    remember: bool,
}

/// Drives credential resolution and validation; see the module docs.
pub struct SessionManager {
    client: Arc<dyn DropService>,
    store: CredentialStore,
    prompt: Box<dyn CredentialPrompt>,
    default_domain: String,
    history: Vec<SessionState>,
}

impl SessionManager {
    pub fn new(
        client: Arc<dyn DropService>,
        store: CredentialStore,
        prompt: Box<dyn CredentialPrompt>,
    ) -> Self {
        Self {
            client,
            store,
            prompt,
            default_domain: DEFAULT_DOMAIN.to_string(),
            history: vec![SessionState::Unresolved],
        }
    }

    /// Override the host used when the account reports no domain.
    pub fn with_default_domain(mut self, domain: impl Into<String>) -> Self {
        self.default_domain = domain.into();
        self
    }

    pub fn state(&self) -> &SessionState {
        self.history.last().unwrap_or(&SessionState::Unresolved)
    }

    /// Every state visited so far, oldest first.
    pub fn history(&self) -> &[SessionState] {
        &self.history
    }

    /// Resolve, authenticate and validate. `args` are the positional
    /// command-line arguments; only exactly two are used.
    ///
    /// Any error returned is `GloudError::AuthenticationFailure`.
    pub async fn bootstrap(&mut self, args: &[String]) -> Result<Session> {
        let Some(resolved) = self.resolve(args)? else {
            return Err(self.fail("no credentials provided"));
        };

        let first = self.validate(&resolved).await;
        let (resolved, account) = match first {
            Ok(account) => (resolved, account),
            Err(e) if resolved.source.is_interactive() => {
                return Err(self.fail(&format!(
                    "login as {} rejected: {}",
                    resolved.credentials.username(),
                    e
                )));
            }
            Err(e) => {
                tracing::warn!(
                    source = %resolved.source,
                    username = %resolved.credentials.username(),
                    "Credentials rejected, asking once more: {}",
                    e
                );
                self.transition(SessionState::Retrying);
                let reason = PromptReason::Rejected {
                    username: resolved.credentials.username().to_string(),
                    message: e.to_string(),
                };
                let retry = match self.ask(&reason)? {
                    Some(retry) => retry,
                    None => return Err(self.fail("login cancelled")),
                };
                let second = self.validate(&retry).await;
                match second {
                    Ok(account) => (retry, account),
                    Err(e) => {
                        return Err(self.fail(&format!(
                            "login as {} rejected: {}",
                            retry.credentials.username(),
                            e
                        )));
                    }
                }
            }
        };

        if resolved.remember {
            if let Err(e) = self.store.save(&resolved.credentials) {
                tracing::warn!("Could not remember credentials: {}", e);
            }
        }

        let domain = account.domain_or(&self.default_domain).to_string();
        self.transition(SessionState::Authenticated);
        tracing::info!(
            username = %resolved.credentials.username(),
            source = %resolved.source,
            domain = %domain,
            "Authenticated with {}",
            self.client.name()
        );

        Ok(Session {
            username: resolved.credentials.username().to_string(),
            domain,
            client: Arc::clone(&self.client),
        })
    }

    fn resolve(&mut self, args: &[String]) -> Result<Option<Resolved>> {
        self.transition(SessionState::Resolving(CredentialSource::Arguments));
        if let [username, password] = args {
            match Credentials::new(username.as_str(), password.as_str()) {
                Some(credentials) => {
                    return Ok(Some(Resolved {
                        credentials,
                        source: CredentialSource::Arguments,
                        remember: false,
                    }));
                }
                None => tracing::warn!("Ignoring command-line credentials with an empty field"),
            }
        } else if !args.is_empty() {
            tracing::warn!(count = args.len(), "Expected username and password arguments, ignoring");
        }

        self.transition(SessionState::Resolving(CredentialSource::Store));
        if let Some(credentials) = self.store.load() {
            return Ok(Some(Resolved {
                credentials,
                source: CredentialSource::Store,
                remember: false,
            }));
        }

        self.ask(&PromptReason::Missing)
    }

    /// Run the interactive prompt; `None` when cancelled.
    fn ask(&mut self, reason: &PromptReason) -> Result<Option<Resolved>> {
        self.transition(SessionState::Resolving(CredentialSource::Prompt));
        match self.prompt.prompt(reason) {
            Ok(PromptOutcome::Entered { credentials, remember }) => Ok(Some(Resolved {
                credentials,
                source: CredentialSource::Prompt,
                remember,
            })),
            Ok(PromptOutcome::Cancelled) => {
                tracing::info!("Credential prompt cancelled");
                Ok(None)
            }
            Err(e) => Err(self.fail(&format!("credential prompt failed: {e}"))),
        }
    }

    async fn validate(&mut self, resolved: &Resolved) -> Result<Account> {
        self.transition(SessionState::Validating(resolved.source));
        let outcome = match self.client.authenticate(&resolved.credentials).await {
            Ok(()) => self.client.validate().await,
            Err(e) => Err(e),
        };
        outcome.map_err(|e| GloudError::ValidationRetryable(e.to_string()))
    }

    fn fail(&mut self, message: &str) -> GloudError {
        self.transition(SessionState::Failed);
        tracing::error!("Authentication failed: {}", message);
        GloudError::AuthenticationFailure(message.to_string())
    }

    fn transition(&mut self, next: SessionState) {
        tracing::debug!(from = ?self.state(), to = ?next, "Session state");
        self.history.push(next);
    }
}
