//! Conversation state threaded through an agent run

use serde::{Deserialize, Serialize};

use crate::domain::llm::Message;

/// Fallback answer when the final message carries nothing extractable
pub const FALLBACK_ANSWER: &str = "Unable to extract a final answer.";

/// The ordered message log for one agent run.
///
/// Append-only: the first message is always the original user question and is
/// never removed. Owned exclusively by one in-flight run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentState {
    messages: Vec<Message>,
}

impl AgentState {
    /// Start a run from the user's question
    pub fn from_question(question: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::user(question)],
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn extend(&mut self, messages: Vec<Message>) {
        self.messages.extend(messages);
    }

    /// The original user question (always the first message)
    pub fn question(&self) -> &str {
        &self.messages[0].content
    }

    pub fn last(&self) -> &Message {
        self.messages.last().expect("state is never empty")
    }

    /// Second-to-last message, the query-generation fallback slot when no
    /// schema tool message exists
    pub fn second_to_last(&self) -> Option<&Message> {
        self.messages.len().checked_sub(2).map(|i| &self.messages[i])
    }

    /// Extract the final answer after the run has halted.
    ///
    /// Prefers the `final_answer` argument of the first tool call on the last
    /// message, falls back to the raw content, then to a fixed string.
    pub fn final_answer(&self) -> String {
        let last = self.last();

        if let Some(answer) = last.first_tool_call().and_then(|c| c.str_arg("final_answer")) {
            return answer.to_string();
        }

        if !last.content.is_empty() {
            return last.content.clone();
        }

        FALLBACK_ANSWER.to_string()
    }
}
