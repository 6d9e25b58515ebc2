//! Credential gate for leaving the intro stage.

use crate::llm::LlmProvider;

pub trait CredentialCheck {
    fn has_credential(&self) -> bool;
}

/// Keyless providers always pass; hosted ones need a non-blank API key.
impl CredentialCheck for LlmProvider {
    fn has_credential(&self) -> bool {
        !self.requires_api_key() || self.has_api_key()
    }
}

/// Fixed answer, for front ends that check credentials elsewhere.
#[derive(Debug, Clone, Copy)]
pub struct StaticCredential(pub bool);

impl CredentialCheck for StaticCredential {
    fn has_credential(&self) -> bool {
        self.0
    }
}
