//! Retention advisor library

pub mod cli;
pub mod config;
pub mod error;
pub mod hr;
pub mod input;
pub mod llm;
pub mod output;
pub mod pipeline;
pub mod processing;

pub use config::Config;
pub use error::{Result, RetentionError};
