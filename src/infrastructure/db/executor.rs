//! Arbitrary-query execution for the SQL agent

use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::postgres::{PgPool, PgRow};
use sqlx::{Column, Row, TypeInfo};

use crate::domain::agent::{JsonRow, QueryError, QueryExecutor};

/// Runs agent-generated SQL against PostgreSQL.
///
/// Execution failures are returned as [`QueryError`] so the workflow can
/// regenerate the query instead of aborting the run.
#[derive(Debug, Clone)]
pub struct PgQueryExecutor {
    pool: PgPool,
}

impl PgQueryExecutor {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QueryExecutor for PgQueryExecutor {
    async fn execute(&self, sql: &str) -> Result<Vec<JsonRow>, QueryError> {
        let rows = sqlx::query(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| QueryError::new(e.to_string()))?;

        Ok(rows.iter().map(row_to_json).collect())
    }
}

fn row_to_json(row: &PgRow) -> JsonRow {
    let mut object = Map::new();

    for (i, column) in row.columns().iter().enumerate() {
        object.insert(column.name().to_string(), column_value(row, i, column));
    }

    object
}

/// Decode one column into JSON by its Postgres type name
fn column_value(row: &PgRow, index: usize, column: &sqlx::postgres::PgColumn) -> Value {
    match column.type_info().name() {
        "INT2" => row
            .try_get::<Option<i16>, _>(index)
            .map(|v| v.map_or(Value::Null, Value::from))
            .unwrap_or(Value::Null),
        "INT4" => row
            .try_get::<Option<i32>, _>(index)
            .map(|v| v.map_or(Value::Null, Value::from))
            .unwrap_or(Value::Null),
        "INT8" => row
            .try_get::<Option<i64>, _>(index)
            .map(|v| v.map_or(Value::Null, Value::from))
            .unwrap_or(Value::Null),
        "FLOAT4" => row
            .try_get::<Option<f32>, _>(index)
            .map(|v| v.map_or(Value::Null, Value::from))
            .unwrap_or(Value::Null),
        "FLOAT8" => row
            .try_get::<Option<f64>, _>(index)
            .map(|v| v.map_or(Value::Null, Value::from))
            .unwrap_or(Value::Null),
        "BOOL" => row
            .try_get::<Option<bool>, _>(index)
            .map(|v| v.map_or(Value::Null, Value::from))
            .unwrap_or(Value::Null),
        "JSON" | "JSONB" => row
            .try_get::<Option<Value>, _>(index)
            .unwrap_or(None)
            .unwrap_or(Value::Null),
        "TIMESTAMPTZ" => row
            .try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(index)
            .map(|v| v.map_or(Value::Null, |ts| Value::from(ts.to_rfc3339())))
            .unwrap_or(Value::Null),
        // TEXT, VARCHAR, NUMERIC rendered as text, and anything else
        _ => row
            .try_get::<Option<String>, _>(index)
            .map(|v| v.map_or(Value::Null, Value::from))
            .unwrap_or(Value::Null),
    }
}
