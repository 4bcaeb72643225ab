//! MCP server implementation.
//!
//! The server handles the MCP protocol lifecycle:
//! 1. Initialize - exchange capabilities
//! 2. Serve tool, resource and prompt requests through the [`Dispatcher`]
//! 3. Shutdown - on EOF or signal, close the transport once

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::dispatcher::{DispatchError, Dispatcher};
use crate::protocol::{
    InitializeParams, InitializeResult, JsonRpcError, JsonRpcRequest, JsonRpcResponse,
    PromptGetParams, PromptsCapability, RequestId, ResourceReadParams, ResourcesCapability,
    ServerCapabilities, ServerInfo, ToolCallParams, ToolsCapability, MCP_VERSION,
};
use crate::shutdown::Shutdown;
use crate::transport::{IncomingMessage, StdioTransport, Transport};

/// Name reported in `serverInfo`.
pub const SERVER_NAME: &str = "codesentry-mcp";

/// MCP server for CodeSentry.
pub struct McpServer {
    dispatcher: Dispatcher,
    initialized: bool,
    closed: bool,
}

impl McpServer {
    /// Create a new MCP server.
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher,
            initialized: false,
            closed: false,
        }
    }

    /// Run the server over stdin/stdout until EOF or shutdown.
    pub async fn run(&mut self, shutdown: &Shutdown) -> codesentry_core::Result<()> {
        let mut transport = StdioTransport::stdio();
        self.serve(&mut transport, shutdown).await
    }

    /// Run the server main loop over the given transport.
    pub async fn serve<T: Transport>(
        &mut self,
        transport: &mut T,
        shutdown: &Shutdown,
    ) -> codesentry_core::Result<()> {
        tracing::info!("CodeSentry MCP server is running and ready for connections");

        let outcome = self.message_loop(transport, shutdown).await;
        self.close(transport).await?;

        tracing::info!("MCP server stopped");
        outcome
    }

    async fn message_loop<T: Transport>(
        &mut self,
        transport: &mut T,
        shutdown: &Shutdown,
    ) -> codesentry_core::Result<()> {
        loop {
            if shutdown.is_triggered() {
                tracing::info!("Shutdown requested, leaving message loop");
                return Ok(());
            }

            let message = tokio::select! {
                biased;
                _ = shutdown.wait() => {
                    tracing::info!("Shutdown requested, leaving message loop");
                    return Ok(());
                }
                message = transport.read_message() => message,
            };

            match message {
                Ok(Some(msg)) => {
                    if let Some(resp) = self.handle_message(msg).await {
                        transport.write_response(&resp).await.map_err(|e| {
                            tracing::error!("Failed to write response: {}", e);
                            e
                        })?;
                    }
                }
                Ok(None) => {
                    tracing::info!("EOF received, shutting down");
                    return Ok(());
                }
                Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                    let error_resp = JsonRpcResponse::error(
                        RequestId::Null,
                        JsonRpcError::parse_error(&e.to_string()),
                    );
                    transport.write_response(&error_resp).await?;
                }
                Err(e) => {
                    tracing::error!("Transport error: {}", e);
                    return Err(e.into());
                }
            }
        }
    }

    /// Close the transport; later calls are no-ops.
    pub async fn close<T: Transport>(&mut self, transport: &mut T) -> codesentry_core::Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        transport.close().await?;
        tracing::debug!("Transport closed");
        Ok(())
    }

    /// Handle an incoming message.
    async fn handle_message(&mut self, msg: IncomingMessage) -> Option<JsonRpcResponse> {
        match msg {
            IncomingMessage::Request(req) => Some(self.handle_request(req).await),
            IncomingMessage::Notification(notif) => {
                self.handle_notification(&notif.method);
                None // Notifications don't get responses
            }
            IncomingMessage::Invalid { id, reason } => Some(JsonRpcResponse::error(
                id,
                JsonRpcError::invalid_request(&reason),
            )),
        }
    }

    /// Handle a JSON-RPC request.
    async fn handle_request(&mut self, req: JsonRpcRequest) -> JsonRpcResponse {
        tracing::debug!("Handling request: {} (id: {:?})", req.method, req.id);

        let id = req.id;
        match req.method.as_str() {
            "initialize" => self.handle_initialize(id, req.params),
            "ping" => JsonRpcResponse::success(id, serde_json::json!({})),
            "tools/list" => respond(id, Ok(self.dispatcher.list_tools())),
            "tools/call" => match parse_params::<ToolCallParams>(req.params) {
                Ok(params) => respond(id, self.dispatcher.call_tool(&params.name, params.arguments)),
                Err(e) => JsonRpcResponse::error(id, e),
            },
            "resources/list" => respond(id, Ok(self.dispatcher.list_resources())),
            "resources/read" => match parse_params::<ResourceReadParams>(req.params) {
                Ok(params) => respond(id, self.dispatcher.read_resource(&params.uri)),
                Err(e) => JsonRpcResponse::error(id, e),
            },
            "prompts/list" => respond(id, Ok(self.dispatcher.list_prompts())),
            "prompts/get" => match parse_params::<PromptGetParams>(req.params) {
                Ok(params) => respond(id, self.dispatcher.get_prompt(&params.name, params.arguments)),
                Err(e) => JsonRpcResponse::error(id, e),
            },
            method => {
                tracing::warn!("Unknown method: {}", method);
                JsonRpcResponse::error(id, JsonRpcError::method_not_found(method))
            }
        }
    }

    /// Handle notifications (no response).
    fn handle_notification(&mut self, method: &str) {
        match method {
            "notifications/initialized" | "initialized" => {
                tracing::info!("Client initialized");
            }
            "notifications/cancelled" => {
                tracing::debug!("Request cancelled by client");
            }
            _ => {
                tracing::debug!("Ignoring notification: {}", method);
            }
        }
    }

    /// Handle initialize request.
    fn handle_initialize(&mut self, id: RequestId, params: Option<Value>) -> JsonRpcResponse {
        if self.initialized {
            return JsonRpcResponse::error(
                id,
                JsonRpcError::invalid_request("Server already initialized"),
            );
        }

        // Parse params (optional validation)
        if let Some(params) = params {
            match serde_json::from_value::<InitializeParams>(params) {
                Ok(init_params) => {
                    tracing::info!(
                        "Client: {} v{} (protocol: {})",
                        init_params.client_info.name,
                        init_params.client_info.version,
                        init_params.protocol_version
                    );
                }
                Err(e) => {
                    tracing::warn!("Failed to parse initialize params: {}", e);
                }
            }
        }

        self.initialized = true;

        let result = InitializeResult {
            protocol_version: MCP_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: false,
                }),
                resources: Some(ResourcesCapability {
                    subscribe: false,
                    list_changed: false,
                }),
                prompts: Some(PromptsCapability {
                    list_changed: false,
                }),
            },
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        respond(id, Ok(result))
    }
}

/// Deserialize required request params.
fn parse_params<P: DeserializeOwned>(params: Option<Value>) -> Result<P, JsonRpcError> {
    let params = params.ok_or_else(|| JsonRpcError::invalid_params("Missing params"))?;
    serde_json::from_value(params).map_err(|e| JsonRpcError::invalid_params(&e.to_string()))
}

/// Turn a dispatch outcome into a JSON-RPC response.
fn respond<R: Serialize>(id: RequestId, outcome: Result<R, DispatchError>) -> JsonRpcResponse {
    let result = outcome.and_then(|value| serde_json::to_value(value).map_err(DispatchError::from));

    match result {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => {
            tracing::warn!("{}", e);
            JsonRpcResponse::error(id, dispatch_error(&e))
        }
    }
}

fn dispatch_error(err: &DispatchError) -> JsonRpcError {
    match err {
        DispatchError::UnknownTool(_)
        | DispatchError::UnknownResource(_)
        | DispatchError::UnknownPrompt(_) => JsonRpcError {
            code: JsonRpcError::INVALID_PARAMS,
            message: err.to_string(),
            data: None,
        },
        DispatchError::Serialization(e) => JsonRpcError::internal_error(&e.to_string()),
    }
}
