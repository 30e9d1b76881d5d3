//! Natural-language-to-SQL agent endpoint

use axum::extract::State;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};

#[derive(Debug, Default, Deserialize)]
pub struct AgentRequest {
    #[serde(default)]
    pub question: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AgentResponse {
    pub final_answer: String,
}

/// POST /sql-agent
pub async fn run_sql_agent(
    State(state): State<AppState>,
    Json(request): Json<AgentRequest>,
) -> Result<Json<AgentResponse>, ApiError> {
    let question = request.question.unwrap_or_default();

    info!("Running SQL agent");
    let final_answer = state.sql_agent.answer_question(&question).await?;

    Ok(Json(AgentResponse { final_answer }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::routes::test_support::test_state_with_agent;
    use crate::domain::agent::mock_sql_agent;

    #[tokio::test]
    async fn test_agent_returns_final_answer() {
        let state = test_state_with_agent(mock_sql_agent("[{\"total\":42}]"));

        let request = AgentRequest {
            question: Some("what is the total of all orders".to_string()),
        };
        let response = run_sql_agent(State(state), Json(request)).await.unwrap();

        assert_eq!(response.final_answer, "[{\"total\":42}]");
    }

    #[tokio::test]
    async fn test_missing_question_rejected() {
        let state = test_state_with_agent(mock_sql_agent("[]"));

        let err = run_sql_agent(State(state), Json(AgentRequest::default()))
            .await
            .unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::BAD_REQUEST);
    }
}
