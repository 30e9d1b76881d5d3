//! Schema discovery over information_schema

use async_trait::async_trait;
use sqlx::postgres::PgPool;
use sqlx::Row;

use crate::domain::agent::SchemaIntrospector;
use crate::domain::DomainError;

/// PostgreSQL schema introspector scoped to the public schema
#[derive(Debug, Clone)]
pub struct PgSchemaIntrospector {
    pool: PgPool,
}

impl PgSchemaIntrospector {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SchemaIntrospector for PgSchemaIntrospector {
    async fn list_tables(&self) -> Result<Vec<String>, DomainError> {
        let rows = sqlx::query(
            "SELECT table_name FROM information_schema.tables \
             WHERE table_schema = 'public' AND table_type = 'BASE TABLE' \
             ORDER BY table_name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list tables: {}", e)))?;

        Ok(rows.into_iter().map(|row| row.get("table_name")).collect())
    }

    async fn table_schema(&self, tables: &[String]) -> Result<String, DomainError> {
        let rows = sqlx::query(
            "SELECT table_name, column_name, data_type \
             FROM information_schema.columns \
             WHERE table_schema = 'public' AND table_name = ANY($1) \
             ORDER BY table_name, ordinal_position",
        )
        .bind(tables)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to describe tables: {}", e)))?;

        // Render one "table(col type, ...)" line per table
        let mut lines: Vec<String> = Vec::new();
        let mut current: Option<(String, Vec<String>)> = None;

        for row in rows {
            let table: String = row.get("table_name");
            let column: String = row.get("column_name");
            let data_type: String = row.get("data_type");
            let rendered = format!("{} {}", column, data_type);

            match current {
                Some((ref name, ref mut columns)) if *name == table => columns.push(rendered),
                _ => {
                    if let Some((name, columns)) = current.take() {
                        lines.push(format!("{}({})", name, columns.join(", ")));
                    }
                    current = Some((table, vec![rendered]));
                }
            }
        }

        if let Some((name, columns)) = current {
            lines.push(format!("{}({})", name, columns.join(", ")));
        }

        Ok(lines.join("\n"))
    }
}
