use crate::credentials::Credentials;
use crate::errors::Result;

/// Why the user is being asked for credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptReason {
    /// Neither the command line nor the store had a usable pair.
    Missing,
    /// A pair from the command line or the store was rejected.
    Rejected { username: String, message: String },
}

/// Result of one modal credential prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptOutcome {
    Entered {
        credentials: Credentials,
        /// The user asked for the pair to be saved once it validates.
        remember: bool,
    },
    Cancelled,
}

/// A blocking, modal credential prompt.
pub trait CredentialPrompt {
    fn prompt(&mut self, reason: &PromptReason) -> Result<PromptOutcome>;
}
