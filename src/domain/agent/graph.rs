//! The fixed workflow graph driving the SQL agent.
//!
//! Steps and edges are plain data built once at startup and shared read-only
//! across runs. The single conditional edge sits after query execution, the
//! only place the `"Error:"` sentinel can appear; everything else is an
//! unconditional hop.

use crate::domain::agent::state::AgentState;
use crate::domain::DomainError;

/// Reserved content prefix signalling a failed execution in-band
pub const ERROR_SENTINEL: &str = "Error:";

/// Identifier of one unit of work in the workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    /// Entry: synthesize the list-tables tool call
    ListTablesRequest,
    /// Invoke the list-tables capability
    ListTables,
    /// Let the model inspect table schemas via the bound schema tool
    InspectSchema,
    /// Draft a SQL query from schema and question
    GenerateQuery,
    /// Review the drafted query for common mistakes
    CheckQuery,
    /// Run the query and wrap the outcome as the final tool message
    ExecuteQuery,
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ListTablesRequest => "list_tables_request",
            Self::ListTables => "list_tables",
            Self::InspectSchema => "inspect_schema",
            Self::GenerateQuery => "generate_query",
            Self::CheckQuery => "check_query",
            Self::ExecuteQuery => "execute_query",
        }
    }
}

/// Chosen successor after a step completes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    To(Step),
    End,
}

/// Edge out of a step
#[derive(Clone, Copy)]
enum Edge {
    /// Single unconditional successor
    To(Step),
    /// Decision function over the updated state and remaining budget
    Decide(fn(&AgentState, &RunBudget) -> Transition),
}

/// Per-run execution budget.
///
/// The retry budget bounds how often a failed execution may route back to
/// query generation; the step budget guarantees termination regardless of
/// graph topology.
#[derive(Debug, Clone)]
pub struct RunBudget {
    max_query_retries: u32,
    retries_used: u32,
    max_steps: u32,
    steps_taken: u32,
}

impl RunBudget {
    pub fn new(max_query_retries: u32, max_steps: u32) -> Self {
        Self {
            max_query_retries,
            retries_used: 0,
            max_steps,
            steps_taken: 0,
        }
    }

    pub fn retries_remaining(&self) -> bool {
        self.retries_used < self.max_query_retries
    }

    pub fn record_retry(&mut self) {
        self.retries_used += 1;
    }

    pub fn retries_used(&self) -> u32 {
        self.retries_used
    }

    /// Account for one step; fails once the step budget is exhausted
    pub fn take_step(&mut self) -> Result<(), DomainError> {
        if self.steps_taken >= self.max_steps {
            return Err(DomainError::internal(format!(
                "Agent run exceeded step budget of {}",
                self.max_steps
            )));
        }
        self.steps_taken += 1;
        Ok(())
    }
}

/// The immutable step graph: entry point plus one edge per step
pub struct Graph {
    entry: Step,
    edges: Vec<(Step, Edge)>,
}

impl Graph {
    /// Build the fixed SQL-agent topology
    pub fn new() -> Self {
        Self {
            entry: Step::ListTablesRequest,
            edges: vec![
                (Step::ListTablesRequest, Edge::To(Step::ListTables)),
                (Step::ListTables, Edge::To(Step::InspectSchema)),
                (Step::InspectSchema, Edge::To(Step::GenerateQuery)),
                (Step::GenerateQuery, Edge::To(Step::CheckQuery)),
                (Step::CheckQuery, Edge::To(Step::ExecuteQuery)),
                (Step::ExecuteQuery, Edge::Decide(route_after_execution)),
            ],
        }
    }

    pub fn entry(&self) -> Step {
        self.entry
    }

    /// Resolve the successor of `step` against the updated state
    pub fn successor(
        &self,
        step: Step,
        state: &AgentState,
        budget: &RunBudget,
    ) -> Result<Transition, DomainError> {
        let edge = self
            .edges
            .iter()
            .find(|(s, _)| *s == step)
            .map(|(_, e)| e)
            .ok_or_else(|| {
                DomainError::internal(format!("No edge defined for step '{}'", step.name()))
            })?;

        Ok(match edge {
            Edge::To(next) => Transition::To(*next),
            Edge::Decide(decide) => decide(state, budget),
        })
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

/// Conditional edge after query execution: regenerate on the error sentinel
/// while the retry budget lasts, otherwise the run is done.
fn route_after_execution(state: &AgentState, budget: &RunBudget) -> Transition {
    if state.last().content.starts_with(ERROR_SENTINEL) && budget.retries_remaining() {
        Transition::To(Step::GenerateQuery)
    } else {
        Transition::End
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::llm::Message;

    fn state_with_last(content: &str) -> AgentState {
        let mut state = AgentState::from_question("q");
        state.push(Message::tool_result(content, "call_1", "execute_sql"));
        state
    }

    #[test]
    fn test_unconditional_chain() {
        let graph = Graph::new();
        let state = AgentState::from_question("q");
        let budget = RunBudget::new(3, 32);

        assert_eq!(graph.entry(), Step::ListTablesRequest);
        assert_eq!(
            graph
                .successor(Step::ListTablesRequest, &state, &budget)
                .unwrap(),
            Transition::To(Step::ListTables)
        );
        assert_eq!(
            graph.successor(Step::CheckQuery, &state, &budget).unwrap(),
            Transition::To(Step::ExecuteQuery)
        );
    }

    #[test]
    fn test_execution_success_terminates() {
        let graph = Graph::new();
        let budget = RunBudget::new(3, 32);
        let state = state_with_last("[{\"total\": 7}]");

        assert_eq!(
            graph.successor(Step::ExecuteQuery, &state, &budget).unwrap(),
            Transition::End
        );
    }

    #[test]
    fn test_execution_error_routes_back() {
        let graph = Graph::new();
        let budget = RunBudget::new(3, 32);
        let state = state_with_last("Error: syntax error");

        assert_eq!(
            graph.successor(Step::ExecuteQuery, &state, &budget).unwrap(),
            Transition::To(Step::GenerateQuery)
        );
    }

    #[test]
    fn test_exhausted_retries_terminate_despite_error() {
        let graph = Graph::new();
        let mut budget = RunBudget::new(1, 32);
        budget.record_retry();
        let state = state_with_last("Error: still broken");

        assert_eq!(
            graph.successor(Step::ExecuteQuery, &state, &budget).unwrap(),
            Transition::End
        );
    }

    #[test]
    fn test_step_budget_exhaustion() {
        let mut budget = RunBudget::new(3, 2);
        assert!(budget.take_step().is_ok());
        assert!(budget.take_step().is_ok());
        assert!(budget.take_step().is_err());
    }
}
