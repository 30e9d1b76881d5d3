//! Natural-language-to-SQL agent workflow

mod capabilities;
mod engine;
mod graph;
mod state;

pub use capabilities::{JsonRow, QueryError, QueryExecutor, SchemaIntrospector};
pub use engine::{AgentConfig, SqlAgent};
pub use graph::{Graph, RunBudget, Step, Transition, ERROR_SENTINEL};
pub use state::{AgentState, FALLBACK_ANSWER};

#[cfg(test)]
pub use engine::test_support::mock_sql_agent;
