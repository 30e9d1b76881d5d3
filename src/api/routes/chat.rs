//! Chat pass-through endpoint

use axum::extract::State;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::llm::{CompletionRequest, Message};

/// Accepts either `inputs` or `message`; `inputs` wins when both are present
#[derive(Debug, Default, Deserialize)]
pub struct ChatRequest {
    pub inputs: Option<String>,
    pub message: Option<String>,
}

impl ChatRequest {
    fn user_input(&self) -> Option<&str> {
        self.inputs
            .as_deref()
            .or(self.message.as_deref())
            .filter(|s| !s.trim().is_empty())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub status: String,
    pub user_query: String,
    pub chatbot_response: String,
}

/// POST /chat
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Some(user_input) = request.user_input() else {
        return Err(ApiError::bad_request("No input provided"));
    };

    info!(provider = state.llm_provider.provider_name(), "Processing chat request");

    let completion = CompletionRequest::builder()
        .message(Message::user(user_input))
        .max_tokens(state.chat_max_tokens)
        .build();

    let response = state.llm_provider.complete(completion).await?;

    Ok(Json(ChatResponse {
        status: "success".to_string(),
        user_query: user_input.to_string(),
        chatbot_response: response.content,
    }))
}
