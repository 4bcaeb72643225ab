//! MCP (Model Context Protocol) server for CodeSentry.
//!
//! This crate implements the MCP server that exposes the code review
//! assistant's tools, resources and prompts to AI clients over stdio.

pub mod catalog;
pub mod dispatcher;
pub mod protocol;
pub mod server;
pub mod shutdown;
pub mod transport;

pub use dispatcher::{DispatchError, Dispatcher};
pub use server::McpServer;
pub use shutdown::Shutdown;
pub use transport::{StdioTransport, Transport};
