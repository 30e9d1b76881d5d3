//! Catalog Agent API
//!
//! A supplier/product catalog backend with two LLM-backed endpoints:
//! - a chat pass-through to the configured completion provider
//! - a natural-language-to-SQL agent that answers questions about the catalog

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use api::state::AppState;
use domain::agent::{AgentConfig, SqlAgent};
use infrastructure::db::{
    connect_pool, PgQueryExecutor, PgSchemaIntrospector, PostgresCatalogRepository,
};
use infrastructure::llm::{HttpClient, OpenAiProvider};

/// Create the application state with all services initialized
pub async fn create_app_state() -> anyhow::Result<AppState> {
    create_app_state_with_config(&AppConfig::default()).await
}

/// Create the application state with custom configuration
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    info!("Connecting to PostgreSQL...");
    let pool = connect_pool(&config.database).await?;
    info!("PostgreSQL connection established");

    let catalog = PostgresCatalogRepository::new(pool.clone());
    catalog.ensure_tables().await?;

    let api_key = std::env::var("OPENAI_API_KEY").unwrap_or_else(|_| config.llm.api_key.clone());
    let http_client = HttpClient::with_timeout(Duration::from_secs(config.llm.timeout_secs));
    let llm_provider = Arc::new(OpenAiProvider::with_base_url(
        http_client,
        api_key,
        config.llm.model.clone(),
        config.llm.base_url.clone(),
    ));

    info!(model = %config.llm.model, "Using OpenAI provider");

    let sql_agent = SqlAgent::new(
        llm_provider.clone(),
        Arc::new(PgSchemaIntrospector::new(pool.clone())),
        Arc::new(PgQueryExecutor::new(pool)),
        AgentConfig {
            max_query_retries: config.agent.max_query_retries,
            max_steps: config.agent.max_steps,
        },
    );

    Ok(AppState::new(
        Arc::new(catalog),
        llm_provider,
        Arc::new(sql_agent),
        config.llm.chat_max_tokens,
    ))
}
