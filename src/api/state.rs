//! Application state for shared services

use std::sync::Arc;

use crate::domain::agent::SqlAgent;
use crate::domain::catalog::CatalogRepository;
use crate::domain::llm::CompletionProvider;

/// Shared handler dependencies behind dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogRepository>,
    pub llm_provider: Arc<dyn CompletionProvider>,
    pub sql_agent: Arc<SqlAgent>,
    /// Token cap applied to the chat pass-through endpoint
    pub chat_max_tokens: u32,
}

impl AppState {
    pub fn new(
        catalog: Arc<dyn CatalogRepository>,
        llm_provider: Arc<dyn CompletionProvider>,
        sql_agent: Arc<SqlAgent>,
        chat_max_tokens: u32,
    ) -> Self {
        Self {
            catalog,
            llm_provider,
            sql_agent,
            chat_max_tokens,
        }
    }
}
