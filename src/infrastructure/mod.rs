//! Infrastructure layer - External service implementations

pub mod db;
pub mod llm;
pub mod logging;
