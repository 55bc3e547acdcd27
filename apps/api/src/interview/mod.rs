//! Resume screening and mock interview workflow.

pub mod handlers;
pub mod manager;
pub mod models;
pub mod parsing;
pub mod prompts;
pub mod scoring;
pub mod store;
