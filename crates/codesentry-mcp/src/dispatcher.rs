//! Request dispatch for tools, resources and prompts.
//!
//! Every handler is a lookup over the static catalog. Unknown names come back
//! as [`DispatchError`] values; the server turns them into JSON-RPC errors.

use codesentry_core::logging::Redacted;
use codesentry_core::{AnalysisConfig, AnalysisOverrides};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::catalog::{
    self, ANALYZE_REPOSITORY_TOOL, CODE_REVIEW_PROMPT, CODE_REVIEW_TEXT, CONFIG_RESOURCE_URI,
    JSON_MIME_TYPE, PING_TOOL, SECURITY_AUDIT_PROMPT, SECURITY_AUDIT_TEXT,
};
use crate::protocol::{
    PromptGetResult, PromptMessage, PromptsListResult, ResourceContents, ResourceReadResult,
    ResourcesListResult, Role, TextContent, ToolCallResult, ToolsListResult,
};

/// Failure to answer a dispatched request.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Unknown resource: {0}")]
    UnknownResource(String),

    #[error("Unknown prompt: {0}")]
    UnknownPrompt(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type DispatchResult<T> = std::result::Result<T, DispatchError>;

/// Arguments accepted by the `ping` tool.
#[derive(Debug, Default, Deserialize)]
struct PingParams {
    #[serde(default)]
    message: Option<Value>,
}

/// Arguments accepted by the `analyze_repository` tool.
///
/// Fields are read independently, so a malformed `config` never hides the
/// caller's `path`.
#[derive(Debug, Default)]
struct AnalyzeRepositoryParams {
    path: Option<String>,
    config: Option<AnalysisOverrides>,
}

impl AnalyzeRepositoryParams {
    fn from_arguments(arguments: Option<&Value>) -> Self {
        let Some(args) = arguments else {
            return Self::default();
        };
        Self {
            path: args.get("path").and_then(Value::as_str).map(String::from),
            config: args
                .get("config")
                .and_then(|config| serde_json::from_value(config.clone()).ok()),
        }
    }
}

/// Parse tool arguments leniently; malformed input yields the defaults.
fn parse_args<T: for<'de> Deserialize<'de> + Default>(arguments: Option<Value>) -> T {
    arguments
        .map(|v| serde_json::from_value(v).unwrap_or_default())
        .unwrap_or_default()
}

/// Answers tool, resource and prompt requests.
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    analysis: AnalysisConfig,
}

impl Dispatcher {
    /// Create a dispatcher serving the given analysis configuration.
    pub fn new(analysis: AnalysisConfig) -> Self {
        Self { analysis }
    }

    /// The analysis configuration exposed as `codesentry://config`.
    pub fn analysis_config(&self) -> &AnalysisConfig {
        &self.analysis
    }

    pub fn list_tools(&self) -> ToolsListResult {
        tracing::debug!("Listing available tools");
        ToolsListResult {
            tools: catalog::tool_definitions(),
        }
    }

    /// Execute a tool by name with arguments.
    pub fn call_tool(&self, name: &str, arguments: Option<Value>) -> DispatchResult<ToolCallResult> {
        tracing::info!("Executing tool: {}", name);
        if let Some(args) = &arguments {
            tracing::debug!(arguments = %Redacted(args), "Tool arguments");
        }

        match name {
            PING_TOOL => Ok(self.handle_ping(parse_args(arguments))),
            ANALYZE_REPOSITORY_TOOL => Ok(self.handle_analyze_repository(
                AnalyzeRepositoryParams::from_arguments(arguments.as_ref()),
            )),
            _ => Err(DispatchError::UnknownTool(name.to_string())),
        }
    }

    fn handle_ping(&self, params: PingParams) -> ToolCallResult {
        let mut text = String::from("🏓 Pong! CodeSentry is running.");

        // Only non-empty string messages are echoed
        if let Some(Value::String(message)) = params.message {
            if !message.is_empty() {
                text.push_str(" Message: ");
                text.push_str(&message);
            }
        }

        ToolCallResult::text(text)
    }

    fn handle_analyze_repository(&self, params: AnalyzeRepositoryParams) -> ToolCallResult {
        let path = params.path.as_deref().unwrap_or("<unspecified>");
        let effective = self
            .analysis
            .with_overrides(&params.config.unwrap_or_default());

        let analyzers = effective.enabled_analyzers();
        let analyzers = if analyzers.is_empty() {
            "none".to_string()
        } else {
            analyzers.join(", ")
        };

        ToolCallResult::text(format!(
            "🔍 Repository analysis requested for: {}\n\
             Requested analyzers: {}\n\n\
             ⚠️  Repository analysis is not yet implemented - this feature is currently in development.",
            path, analyzers
        ))
    }

    pub fn list_resources(&self) -> ResourcesListResult {
        tracing::debug!("Listing available resources");
        ResourcesListResult {
            resources: catalog::resource_definitions(),
        }
    }

    pub fn read_resource(&self, uri: &str) -> DispatchResult<ResourceReadResult> {
        tracing::info!("Reading resource: {}", uri);

        match uri {
            CONFIG_RESOURCE_URI => Ok(ResourceReadResult {
                contents: vec![ResourceContents {
                    uri: uri.to_string(),
                    mime_type: JSON_MIME_TYPE.to_string(),
                    text: serde_json::to_string_pretty(&self.analysis)?,
                }],
            }),
            _ => Err(DispatchError::UnknownResource(uri.to_string())),
        }
    }

    pub fn list_prompts(&self) -> PromptsListResult {
        tracing::debug!("Listing available prompts");
        PromptsListResult {
            prompts: catalog::prompt_definitions(),
        }
    }

    /// Prompts take no arguments; any supplied are ignored.
    pub fn get_prompt(&self, name: &str, _arguments: Option<Value>) -> DispatchResult<PromptGetResult> {
        tracing::info!("Getting prompt: {}", name);

        let (description, text) = match name {
            CODE_REVIEW_PROMPT => ("Comprehensive code review analysis", CODE_REVIEW_TEXT),
            SECURITY_AUDIT_PROMPT => ("Security-focused code analysis", SECURITY_AUDIT_TEXT),
            _ => return Err(DispatchError::UnknownPrompt(name.to_string())),
        };

        Ok(PromptGetResult {
            description: description.to_string(),
            messages: vec![PromptMessage {
                role: Role::User,
                content: TextContent::Text {
                    text: text.to_string(),
                },
            }],
        })
    }
}
