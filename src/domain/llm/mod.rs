//! Conversation model and completion provider trait

mod message;
mod provider;
mod request;

pub use message::{Message, MessageRole, ToolCall};
pub use provider::CompletionProvider;
pub use request::{CompletionRequest, CompletionRequestBuilder, ToolSpec};

#[cfg(test)]
pub use provider::mock::MockCompletionProvider;
