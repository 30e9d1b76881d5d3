//! HTTP endpoint handlers

pub mod agent;
pub mod chat;
pub mod products;
pub mod suppliers;
