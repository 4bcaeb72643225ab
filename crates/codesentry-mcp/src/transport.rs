//! Transport layer for MCP JSON-RPC communication.
//!
//! MCP uses newline-delimited JSON over stdin/stdout.

use std::io;

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use serde_json::Value;

use crate::protocol::{JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, RequestId};

/// Message that can be received from the client.
#[derive(Debug)]
pub enum IncomingMessage {
    Request(JsonRpcRequest),
    Notification(JsonRpcNotification),
    /// Well-formed JSON that is not a JSON-RPC request or notification.
    Invalid { id: RequestId, reason: String },
}

/// Bidirectional channel carrying JSON-RPC messages.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send {
    /// Read the next message.
    ///
    /// Returns `Ok(None)` at end of stream and an `InvalidData` error for a
    /// line that is not JSON.
    async fn read_message(&mut self) -> io::Result<Option<IncomingMessage>>;

    /// Write a single response.
    async fn write_response(&mut self, response: &JsonRpcResponse) -> io::Result<()>;

    /// Flush pending output and close the write side.
    async fn close(&mut self) -> io::Result<()>;
}

/// Newline-delimited JSON transport over any async reader/writer pair.
pub struct StdioTransport {
    reader: Box<dyn AsyncBufRead + Unpin + Send>,
    writer: Box<dyn AsyncWrite + Unpin + Send>,
}

impl StdioTransport {
    /// Create a transport using stdin/stdout.
    pub fn stdio() -> Self {
        Self {
            reader: Box::new(BufReader::new(tokio::io::stdin())),
            writer: Box::new(tokio::io::stdout()),
        }
    }

    /// Create a transport with custom reader/writer.
    pub fn new(
        reader: Box<dyn AsyncBufRead + Unpin + Send>,
        writer: Box<dyn AsyncWrite + Unpin + Send>,
    ) -> Self {
        Self { reader, writer }
    }

    fn parse_line(line: &str) -> io::Result<IncomingMessage> {
        let value: Value = serde_json::from_str(line).map_err(|e| {
            tracing::warn!("Failed to parse message: {}", line);
            io::Error::new(io::ErrorKind::InvalidData, format!("Invalid JSON: {}", e))
        })?;

        if value.is_object() {
            // Try to parse as request first (has id field)
            if let Ok(request) = serde_json::from_value::<JsonRpcRequest>(value.clone()) {
                return Ok(IncomingMessage::Request(request));
            }

            // Try as notification (no id field)
            if let Ok(notification) = serde_json::from_value::<JsonRpcNotification>(value.clone()) {
                return Ok(IncomingMessage::Notification(notification));
            }
        }

        tracing::warn!("Not a JSON-RPC message: {}", line);
        let id = value
            .get("id")
            .and_then(|id| serde_json::from_value(id.clone()).ok())
            .unwrap_or(RequestId::Null);
        let reason = if value.is_array() {
            "batch requests are not supported"
        } else {
            "expected a JSON-RPC request or notification"
        };
        Ok(IncomingMessage::Invalid {
            id,
            reason: reason.to_string(),
        })
    }
}

#[async_trait]
impl Transport for StdioTransport {
    async fn read_message(&mut self) -> io::Result<Option<IncomingMessage>> {
        let mut line = String::new();

        loop {
            line.clear();
            if self.reader.read_line(&mut line).await? == 0 {
                return Ok(None); // EOF
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            tracing::debug!("Received: {}", trimmed);
            return Self::parse_line(trimmed).map(Some);
        }
    }

    async fn write_response(&mut self, response: &JsonRpcResponse) -> io::Result<()> {
        let mut json = serde_json::to_string(response).map_err(|e| {
            io::Error::new(io::ErrorKind::InvalidData, format!("Serialization error: {}", e))
        })?;

        tracing::debug!("Sending: {}", json);

        json.push('\n');
        self.writer.write_all(json.as_bytes()).await?;
        self.writer.flush().await
    }

    async fn close(&mut self) -> io::Result<()> {
        self.writer.flush().await?;
        self.writer.shutdown().await
    }
}
