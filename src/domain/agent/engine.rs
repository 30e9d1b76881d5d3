//! The SQL agent: node behaviors and the run loop.
//!
//! Each node reads the conversation state, calls at most one capability, and
//! returns the messages to append. The engine walks the graph from the entry
//! step until a terminal transition, then the final answer is extracted from
//! the last message. Recoverable failures (bad SQL) are folded into the state
//! as the `"Error:"` sentinel; capability transport failures propagate out.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, warn};

use super::capabilities::{QueryExecutor, SchemaIntrospector};
use super::graph::{Graph, RunBudget, Step, Transition, ERROR_SENTINEL};
use super::state::AgentState;
use crate::domain::llm::{CompletionProvider, CompletionRequest, Message, ToolCall, ToolSpec};
use crate::domain::DomainError;

/// Tool name the entry step requests and the list-tables node answers
pub const LIST_TABLES_TOOL: &str = "list_tables";
/// Tool bound to the model during schema inspection
pub const GET_SCHEMA_TOOL: &str = "get_schema";
/// Tool name attached to the terminal execution result
pub const EXECUTE_SQL_TOOL: &str = "execute_sql";

/// Agent tuning knobs
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// How often a failed execution may route back to query generation
    pub max_query_retries: u32,
    /// Hard cap on steps per run
    pub max_steps: u32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_query_retries: 3,
            max_steps: 32,
        }
    }
}

/// The natural-language-to-SQL agent.
///
/// Holds the immutable workflow graph and the injected capabilities; shared
/// read-only across requests, with each run owning its own [`AgentState`].
pub struct SqlAgent {
    llm: Arc<dyn CompletionProvider>,
    introspector: Arc<dyn SchemaIntrospector>,
    executor: Arc<dyn QueryExecutor>,
    graph: Graph,
    config: AgentConfig,
}

impl SqlAgent {
    pub fn new(
        llm: Arc<dyn CompletionProvider>,
        introspector: Arc<dyn SchemaIntrospector>,
        executor: Arc<dyn QueryExecutor>,
        config: AgentConfig,
    ) -> Self {
        Self {
            llm,
            introspector,
            executor,
            graph: Graph::new(),
            config,
        }
    }

    /// Answer a natural-language question against the connected database.
    ///
    /// Rejects empty questions before any capability is touched. Always
    /// returns a string on success, possibly one describing an execution
    /// error; only transport and internal failures surface as errors.
    pub async fn answer_question(&self, question: &str) -> Result<String, DomainError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(DomainError::invalid_input("No question provided"));
        }

        let state = self.run(AgentState::from_question(question)).await?;
        Ok(state.final_answer())
    }

    /// Drive one run from the entry step to a terminal transition
    pub async fn run(&self, mut state: AgentState) -> Result<AgentState, DomainError> {
        let mut budget = RunBudget::new(self.config.max_query_retries, self.config.max_steps);
        let mut step = self.graph.entry();

        loop {
            budget.take_step()?;
            debug!(step = step.name(), messages = state.len(), "Running agent step");

            let messages = self.run_step(step, &state).await?;
            state.extend(messages);

            match self.graph.successor(step, &state, &budget)? {
                Transition::To(next) => {
                    if step == Step::ExecuteQuery && next == Step::GenerateQuery {
                        budget.record_retry();
                        warn!(
                            retry = budget.retries_used(),
                            "Query execution failed, regenerating query"
                        );
                    }
                    step = next;
                }
                Transition::End => break,
            }
        }

        Ok(state)
    }

    async fn run_step(&self, step: Step, state: &AgentState) -> Result<Vec<Message>, DomainError> {
        match step {
            Step::ListTablesRequest => Ok(self.list_tables_request()),
            Step::ListTables => self.list_tables(state).await,
            Step::InspectSchema => self.inspect_schema(state).await,
            Step::GenerateQuery => self.generate_query(state).await,
            Step::CheckQuery => self.check_query(state).await,
            Step::ExecuteQuery => Ok(self.execute_query(state).await),
        }
    }

    /// Entry node: synthesize the request to enumerate tables
    fn list_tables_request(&self) -> Vec<Message> {
        vec![Message::tool_request(vec![ToolCall::new(
            LIST_TABLES_TOOL,
            json!({}),
        )])]
    }

    /// Invoke the list-tables capability, correlating the result back to the
    /// call id synthesized by the entry node
    async fn list_tables(&self, state: &AgentState) -> Result<Vec<Message>, DomainError> {
        let call_id = state
            .last()
            .first_tool_call()
            .map(|c| c.id.clone())
            .ok_or_else(|| DomainError::internal("List-tables step without a pending tool call"))?;

        let tables = self.introspector.list_tables().await?;
        Ok(vec![Message::tool_result(
            tables.join(", "),
            call_id,
            LIST_TABLES_TOOL,
        )])
    }

    /// Let the model decide which tables to inspect via the bound schema tool
    async fn inspect_schema(&self, state: &AgentState) -> Result<Vec<Message>, DomainError> {
        let request = CompletionRequest::builder()
            .messages(state.messages().to_vec())
            .tool(ToolSpec::new(
                GET_SCHEMA_TOOL,
                "Get the schema of the given tables",
                json!({
                    "type": "object",
                    "properties": {
                        "tables": {
                            "type": "array",
                            "items": { "type": "string" },
                            "description": "Names of the tables to describe"
                        }
                    },
                    "required": ["tables"]
                }),
            ))
            .temperature(0.0)
            .build();

        let response = self.llm.complete(request).await?;

        let Some(call) = response
            .tool_calls
            .iter()
            .find(|c| c.name == GET_SCHEMA_TOOL)
            .cloned()
        else {
            // Model answered without inspecting; keep its message as-is
            return Ok(vec![response]);
        };

        let tables = match call.arguments.get("tables").and_then(|v| v.as_array()) {
            Some(names) => names
                .iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect(),
            // Malformed arguments: describe everything rather than fail the run
            None => self.introspector.list_tables().await?,
        };

        let schema = self.introspector.table_schema(&tables).await?;
        let result = Message::tool_result(schema, call.id, GET_SCHEMA_TOOL);
        Ok(vec![response, result])
    }

    /// Draft a single SQL query from the schema and the original question.
    ///
    /// The schema is taken from the latest schema tool result; when the model
    /// skipped the tool, the second-to-last message (the table list) stands in.
    async fn generate_query(&self, state: &AgentState) -> Result<Vec<Message>, DomainError> {
        let schema = state
            .messages()
            .iter()
            .rev()
            .find(|m| m.name.as_deref() == Some(GET_SCHEMA_TOOL))
            .map(|m| m.content.as_str())
            .or_else(|| state.second_to_last().map(|m| m.content.as_str()))
            .unwrap_or("");
        let prompt = format!(
            "You are a SQL expert. Given the following schema:\n{schema}\n\n\
             Generate a SQL query to answer: {question}\n\
             Limit the results to at most 5 rows. Output only the SQL query.",
            schema = schema,
            question = state.question(),
        );

        let request = CompletionRequest::builder()
            .message(Message::user(prompt))
            .temperature(0.0)
            .build();

        let response = self.llm.complete(request).await?;
        Ok(vec![response])
    }

    /// Review the drafted query for common mistakes, rewriting if needed
    async fn check_query(&self, state: &AgentState) -> Result<Vec<Message>, DomainError> {
        let prompt = format!(
            "Double-check the following SQL query for common mistakes such as \
             unsafe operations or missing row limits. If there are mistakes, \
             rewrite the query; otherwise return it unchanged. \
             Output only the SQL query.\n\n{}",
            state.last().content,
        );

        let request = CompletionRequest::builder()
            .message(Message::user(prompt))
            .temperature(0.0)
            .build();

        let response = self.llm.complete(request).await?;
        Ok(vec![response])
    }

    /// Run the checked query. Both outcomes become a tool message carrying a
    /// `final_answer` argument so extraction is uniform; failures use the
    /// error sentinel content consumed by the conditional edge.
    async fn execute_query(&self, state: &AgentState) -> Vec<Message> {
        let sql = state.last().content.trim();

        let content = match self.executor.execute(sql).await {
            Ok(rows) => serde_json::to_string(&rows).unwrap_or_else(|_| "[]".to_string()),
            Err(e) => format!("{} {}", ERROR_SENTINEL, e),
        };

        let call = ToolCall::new(EXECUTE_SQL_TOOL, json!({ "final_answer": content }));
        let call_id = call.id.clone();
        vec![Message::tool_result(content, call_id, EXECUTE_SQL_TOOL).with_tool_calls(vec![call])]
    }
}

impl std::fmt::Debug for SqlAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlAgent")
            .field("provider", &self.llm.provider_name())
            .field("config", &self.config)
            .finish()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::agent::capabilities::mock::{MockExecutor, MockIntrospector};
    use crate::domain::agent::state::FALLBACK_ANSWER;
    use crate::domain::llm::MockCompletionProvider;
    use serde_json::{Map, Value};

    const SCHEMA: &str = "orders(id integer, total numeric)";

    fn introspector() -> Arc<MockIntrospector> {
        Arc::new(MockIntrospector::new(vec!["orders"], SCHEMA))
    }

    fn schema_tool_response() -> Message {
        Message::tool_request(vec![ToolCall::new(
            GET_SCHEMA_TOOL,
            json!({"tables": ["orders"]}),
        )])
    }

    fn rows(total: i64) -> Vec<Map<String, Value>> {
        let mut row = Map::new();
        row.insert("total".to_string(), json!(total));
        vec![row]
    }

    /// Provider scripted for one full pass: schema inspection, generation,
    /// check. Extra generation/check pairs cover retries.
    fn scripted_provider(queries: &[&str]) -> Arc<MockCompletionProvider> {
        let mut provider = MockCompletionProvider::new().with_response(schema_tool_response());
        for query in queries {
            provider = provider
                .with_response(Message::assistant(*query))
                .with_response(Message::assistant(*query));
        }
        Arc::new(provider)
    }

    #[tokio::test]
    async fn test_happy_path_returns_rows_as_final_answer() {
        let llm = scripted_provider(&["SELECT total FROM orders LIMIT 5"]);
        let executor = Arc::new(MockExecutor::new().then_rows(rows(42)));
        let agent = SqlAgent::new(
            llm.clone(),
            introspector(),
            executor.clone(),
            AgentConfig::default(),
        );

        let answer = agent
            .answer_question("what is the total of all orders")
            .await
            .unwrap();

        assert_eq!(answer, "[{\"total\":42}]");
        assert_eq!(executor.execution_count(), 1);
        assert_eq!(
            executor.executed.lock().unwrap()[0],
            "SELECT total FROM orders LIMIT 5"
        );
    }

    #[tokio::test]
    async fn test_generation_prompt_embeds_schema_and_question() {
        let llm = scripted_provider(&["SELECT total FROM orders LIMIT 5"]);
        let executor = Arc::new(MockExecutor::new().then_rows(rows(1)));
        let agent = SqlAgent::new(llm.clone(), introspector(), executor, AgentConfig::default());

        agent
            .answer_question("what is the total of all orders")
            .await
            .unwrap();

        let calls = llm.calls.lock().unwrap();
        let gen_request = calls
            .iter()
            .find(|r| r.messages[0].content.contains("Generate a SQL query"))
            .expect("generation request missing");
        let prompt = &gen_request.messages[0].content;

        assert!(prompt.contains(SCHEMA));
        assert!(prompt.contains("what is the total of all orders"));
        assert!(prompt.contains("at most 5 rows"));
    }

    #[tokio::test]
    async fn test_failed_execution_regenerates_once_then_succeeds() {
        let llm = scripted_provider(&[
            "SELECT tottal FROM orders LIMIT 5",
            "SELECT total FROM orders LIMIT 5",
        ]);
        let executor = Arc::new(
            MockExecutor::new()
                .then_error("syntax error")
                .then_rows(rows(7)),
        );
        let agent = SqlAgent::new(
            llm.clone(),
            introspector(),
            executor.clone(),
            AgentConfig::default(),
        );

        let answer = agent.answer_question("total of all orders").await.unwrap();

        assert_eq!(answer, "[{\"total\":7}]");
        assert_eq!(executor.execution_count(), 2);

        // Generation visited exactly twice
        let calls = llm.calls.lock().unwrap();
        let generations = calls
            .iter()
            .filter(|r| r.messages[0].content.contains("Generate a SQL query"))
            .count();
        assert_eq!(generations, 2);
    }

    #[tokio::test]
    async fn test_always_failing_executor_terminates_with_error_answer() {
        let llm = scripted_provider(&["SELECT 1"]);
        let executor = Arc::new(MockExecutor::new().then_error("relation does not exist"));
        let config = AgentConfig {
            max_query_retries: 3,
            max_steps: 64,
        };
        let agent = SqlAgent::new(llm, introspector(), executor.clone(), config);

        let answer = agent.answer_question("anything").await.unwrap();

        assert_eq!(answer, "Error: relation does not exist");
        // Initial attempt plus three retries
        assert_eq!(executor.execution_count(), 4);
    }

    #[tokio::test]
    async fn test_empty_question_rejected_before_any_capability() {
        let llm = Arc::new(MockCompletionProvider::new());
        let executor = Arc::new(MockExecutor::new());
        let agent = SqlAgent::new(
            llm.clone(),
            introspector(),
            executor.clone(),
            AgentConfig::default(),
        );

        let err = agent.answer_question("   ").await.unwrap_err();

        assert!(matches!(err, DomainError::InvalidInput { .. }));
        assert_eq!(llm.call_count(), 0);
        assert_eq!(executor.execution_count(), 0);
    }

    #[tokio::test]
    async fn test_transport_failure_propagates() {
        let llm = Arc::new(MockCompletionProvider::new().with_error("connection refused"));
        let executor = Arc::new(MockExecutor::new());
        let agent = SqlAgent::new(llm, introspector(), executor, AgentConfig::default());

        let err = agent.answer_question("total of all orders").await.unwrap_err();
        assert!(matches!(err, DomainError::Transport { .. }));
    }

    #[tokio::test]
    async fn test_step_budget_bounds_misbehaving_run() {
        let llm = scripted_provider(&["SELECT 1"]);
        let executor = Arc::new(MockExecutor::new().then_error("always broken"));
        let config = AgentConfig {
            max_query_retries: u32::MAX,
            max_steps: 16,
        };
        let agent = SqlAgent::new(llm, introspector(), executor, config);

        let err = agent.answer_question("anything").await.unwrap_err();
        assert!(matches!(err, DomainError::Internal { .. }));
    }

    #[tokio::test]
    async fn test_model_skipping_schema_tool_still_completes() {
        // Model answers the inspection turn without calling the tool
        let llm = Arc::new(
            MockCompletionProvider::new()
                .with_response(Message::assistant("The orders table looks relevant."))
                .with_response(Message::assistant("SELECT total FROM orders LIMIT 5"))
                .with_response(Message::assistant("SELECT total FROM orders LIMIT 5")),
        );
        let executor = Arc::new(MockExecutor::new().then_rows(rows(3)));
        let agent = SqlAgent::new(llm, introspector(), executor, AgentConfig::default());

        let answer = agent.answer_question("total of all orders").await.unwrap();
        assert_eq!(answer, "[{\"total\":3}]");
    }

    #[tokio::test]
    async fn test_execution_is_idempotent_for_side_effect_free_queries() {
        let executor = MockExecutor::new().then_rows(rows(5));

        let first = executor.execute("SELECT total FROM orders LIMIT 5").await;
        let second = executor.execute("SELECT total FROM orders LIMIT 5").await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_state_shape_after_happy_path() {
        let llm = scripted_provider(&["SELECT total FROM orders LIMIT 5"]);
        let executor = Arc::new(MockExecutor::new().then_rows(rows(1)));
        let agent = SqlAgent::new(llm, introspector(), executor, AgentConfig::default());

        let state = agent
            .run(AgentState::from_question("total of all orders"))
            .await
            .unwrap();

        // question, entry tool call, table list, inspection pair,
        // generation, check, execution result
        assert_eq!(state.len(), 8);
        assert_eq!(state.question(), "total of all orders");

        let last = state.last();
        assert!(last.first_tool_call().is_some());
        assert_eq!(last.name.as_deref(), Some(EXECUTE_SQL_TOOL));
    }

    #[test]
    fn test_fallback_answer_constant_is_used_verbatim() {
        assert_eq!(FALLBACK_ANSWER, "Unable to extract a final answer.");
    }
}
