pub mod agent;
pub mod catalog;
pub mod error;
pub mod llm;

pub use error::DomainError;
