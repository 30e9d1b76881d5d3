use async_trait::async_trait;
use std::fmt::Debug;

use super::{CompletionRequest, Message};
use crate::domain::DomainError;

/// Trait for completion providers (OpenAI, etc.)
///
/// Given a conversation and an optional set of bound tools, produce the next
/// assistant message. Network and auth failures surface as
/// [`DomainError::Transport`].
#[async_trait]
pub trait CompletionProvider: Send + Sync + Debug {
    /// Request one completion for the given conversation
    async fn complete(&self, request: CompletionRequest) -> Result<Message, DomainError>;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;
}
