//! Core configuration, error handling, logging and analysis types for CodeSentry.
//!
//! This crate provides the foundational pieces shared by the MCP server and the CLI.

pub mod config;
pub mod error;
pub mod logging;
pub mod report;
pub mod types;

pub use config::{AiProvider, ConfigWarning, LogLevel, ServerConfig};
pub use error::{Error, Result};
pub use types::{AnalysisConfig, AnalysisOverrides};
