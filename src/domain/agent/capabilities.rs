//! Database capabilities consumed by the SQL agent

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::fmt::Debug;
use thiserror::Error;

use crate::domain::DomainError;

/// One result row as a column-name to value mapping
pub type JsonRow = Map<String, Value>;

/// SQL execution failure carrying a human-readable message.
///
/// Recoverable within a run: the executing node folds it into the
/// conversation as an `"Error: …"` sentinel instead of propagating it.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{0}")]
pub struct QueryError(pub String);

impl QueryError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Read-only schema discovery over the connected database.
///
/// Failures here have no in-band representation and are fatal to the run.
#[async_trait]
pub trait SchemaIntrospector: Send + Sync + Debug {
    /// List the table names visible to the agent
    async fn list_tables(&self) -> Result<Vec<String>, DomainError>;

    /// Describe the given tables as human-readable schema text
    async fn table_schema(&self, tables: &[String]) -> Result<String, DomainError>;
}

/// Arbitrary-query execution primitive
#[async_trait]
pub trait QueryExecutor: Send + Sync + Debug {
    /// Run a query, returning result rows or a recoverable failure
    async fn execute(&self, sql: &str) -> Result<Vec<JsonRow>, QueryError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::Mutex;

    #[derive(Debug)]
    pub struct MockIntrospector {
        tables: Vec<String>,
        schema: String,
    }

    impl MockIntrospector {
        pub fn new(tables: Vec<&str>, schema: impl Into<String>) -> Self {
            Self {
                tables: tables.into_iter().map(String::from).collect(),
                schema: schema.into(),
            }
        }
    }

    #[async_trait]
    impl SchemaIntrospector for MockIntrospector {
        async fn list_tables(&self) -> Result<Vec<String>, DomainError> {
            Ok(self.tables.clone())
        }

        async fn table_schema(&self, _tables: &[String]) -> Result<String, DomainError> {
            Ok(self.schema.clone())
        }
    }

    /// Executor scripted with a sequence of outcomes; the final outcome
    /// repeats once the script is exhausted.
    #[derive(Debug)]
    pub struct MockExecutor {
        outcomes: Mutex<Vec<Result<Vec<JsonRow>, QueryError>>>,
        pub executed: Mutex<Vec<String>>,
    }

    impl MockExecutor {
        pub fn new() -> Self {
            Self {
                outcomes: Mutex::new(Vec::new()),
                executed: Mutex::new(Vec::new()),
            }
        }

        pub fn then_rows(self, rows: Vec<JsonRow>) -> Self {
            self.outcomes.lock().unwrap().push(Ok(rows));
            self
        }

        pub fn then_error(self, message: impl Into<String>) -> Self {
            self.outcomes
                .lock()
                .unwrap()
                .push(Err(QueryError::new(message)));
            self
        }

        pub fn execution_count(&self) -> usize {
            self.executed.lock().unwrap().len()
        }
    }

    impl Default for MockExecutor {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl QueryExecutor for MockExecutor {
        async fn execute(&self, sql: &str) -> Result<Vec<JsonRow>, QueryError> {
            self.executed.lock().unwrap().push(sql.to_string());

            let mut outcomes = self.outcomes.lock().unwrap();
            if outcomes.is_empty() {
                return Err(QueryError::new("No scripted outcome"));
            }

            if outcomes.len() == 1 {
                outcomes[0].clone()
            } else {
                outcomes.remove(0)
            }
        }
    }
}
