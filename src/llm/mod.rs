//! LLM integration: streaming chat client, prompt templates and the
//! retrieval-backed query service

pub mod client;
pub mod prompts;
pub mod query;
