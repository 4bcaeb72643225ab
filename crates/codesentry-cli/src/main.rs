//! CodeSentry CLI - entry point for the CodeSentry MCP server.

use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use codesentry_core::logging;
use codesentry_core::{AnalysisConfig, ServerConfig};
use codesentry_mcp::shutdown::listen_for_signals;
use codesentry_mcp::{Dispatcher, McpServer, Shutdown};

#[derive(Parser)]
#[command(name = "codesentry")]
#[command(author, version, about = "CodeSentry - AI-powered code review assistant over MCP", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Commands {
    /// Start the MCP server on stdin/stdout (default)
    Serve,

    /// Print the resolved configuration with secrets redacted
    Config,
}

/// Grace period for blocking tasks when the runtime is torn down.
const RUNTIME_SHUTDOWN_GRACE: Duration = Duration::from_millis(100);

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = ServerConfig::from_env();
    logging::init(&config, cli.verbose);

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!("Failed to start async runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let outcome = runtime.block_on(async {
        match cli.command.unwrap_or(Commands::Serve) {
            Commands::Serve => serve(config).await,
            Commands::Config => show_config(&config),
        }
    });

    // A stdin read may still be parked on a blocking thread; don't wait for it.
    runtime.shutdown_timeout(RUNTIME_SHUTDOWN_GRACE);

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Failed to run CodeSentry MCP server: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    tracing::info!("Starting CodeSentry MCP server v{}", env!("CARGO_PKG_VERSION"));
    config.log_warnings();
    tracing::debug!(
        ai = config.has_ai_provider(),
        github = config.has_github(),
        max_concurrent_analysis = config.max_concurrent_analysis,
        "Optional integrations"
    );

    let shutdown = Shutdown::new();
    let signals = shutdown.clone();
    let listener = tokio::spawn(async move {
        if let Err(e) = listen_for_signals(signals).await {
            tracing::error!("Failed to listen for termination signals: {}", e);
        }
    });

    let mut server = McpServer::new(Dispatcher::new(AnalysisConfig::default()));
    let outcome = server
        .run(&shutdown)
        .await
        .context("MCP server terminated with an error");

    listener.abort();
    outcome
}

fn show_config(config: &ServerConfig) -> anyhow::Result<()> {
    let value = serde_json::to_value(config).context("Failed to serialize configuration")?;
    let redacted = logging::redact(&value);
    println!("{}", serde_json::to_string_pretty(&redacted)?);
    for warning in config.validate() {
        println!("warning: {}", warning);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_none() {
        let cli = Cli::try_parse_from(["codesentry"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_parse_subcommands() {
        let cli = Cli::try_parse_from(["codesentry", "serve", "--verbose"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Serve));
        assert!(cli.verbose);

        let cli = Cli::try_parse_from(["codesentry", "config"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Config));
    }

    #[test]
    fn test_unknown_subcommand_rejected() {
        assert!(Cli::try_parse_from(["codesentry", "analyze"]).is_err());
    }

    #[test]
    fn test_config_output_redacts_secrets() {
        let config = ServerConfig {
            github_token: Some("ghp_secret".to_string()),
            openai_api_key: Some("sk-secret".to_string()),
            ..ServerConfig::default()
        };
        let value = logging::redact(&serde_json::to_value(&config).unwrap());

        assert_eq!(value["githubToken"], logging::REDACTION_MARKER);
        assert_eq!(value["openaiApiKey"], logging::REDACTION_MARKER);
        assert_eq!(value["maxConcurrentAnalysis"], 5);
        assert!(show_config(&config).is_ok());
    }
}
