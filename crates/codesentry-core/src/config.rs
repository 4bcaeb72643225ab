//! Server configuration loaded from environment variables.
//!
//! Every setting has a default, so loading never fails. Values that cannot be
//! parsed fall back to their default instead of aborting startup:
//!
//! | Variable                  | Default                        |
//! |---------------------------|--------------------------------|
//! | `DEBUG`                   | `false`                        |
//! | `LOG_LEVEL`               | `info`                         |
//! | `OPENAI_API_KEY`          | unset                          |
//! | `ANTHROPIC_API_KEY`       | unset                          |
//! | `AI_PROVIDER`             | `none`                         |
//! | `GITHUB_TOKEN`            | unset                          |
//! | `MAX_FILE_SIZE`           | `1048576`                      |
//! | `MAX_CONCURRENT_ANALYSIS` | `5`                            |
//! | `ALLOWED_DIRECTORIES`     | empty                          |
//! | `BLOCKED_PATTERNS`        | `node_modules,dist,build,.git` |
//!
//! # Example
//!
//! ```ignore
//! use codesentry_core::ServerConfig;
//!
//! let config = ServerConfig::from_env();
//! config.log_warnings();
//! ```

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::warn;

use crate::Error;

/// Default maximum file size accepted for analysis (1 MiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1024 * 1024;

/// Default number of analyses allowed to run concurrently.
pub const DEFAULT_MAX_CONCURRENT_ANALYSIS: u32 = 5;

/// Default comma-separated list of blocked path patterns.
pub const DEFAULT_BLOCKED_PATTERNS: &str = "node_modules,dist,build,.git";

/// File sizes above this trigger an advisory warning (10 MiB).
const LARGE_FILE_SIZE_THRESHOLD: u64 = 10 * 1024 * 1024;

/// Concurrency above this triggers an advisory warning.
const HIGH_CONCURRENCY_THRESHOLD: u32 = 10;

// =============================================================================
// Enumerated settings
// =============================================================================

/// Log verbosity requested through `LOG_LEVEL`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Lowercase name as accepted in `LOG_LEVEL`.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(Error::Config(format!("Unknown log level: {}", other))),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// AI provider selected through `AI_PROVIDER`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    #[serde(rename = "openai")]
    OpenAi,
    Anthropic,
    #[default]
    None,
}

impl FromStr for AiProvider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(AiProvider::OpenAi),
            "anthropic" => Ok(AiProvider::Anthropic),
            "none" | "" => Ok(AiProvider::None),
            other => Err(Error::Config(format!("Unknown AI provider: {}", other))),
        }
    }
}

// =============================================================================
// ServerConfig
// =============================================================================

/// Process-wide settings, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    /// Enables debug-level logging
    pub debug: bool,
    /// Minimum log level when `debug` is off
    pub log_level: LogLevel,

    /// OpenAI API key (optional, AI features only)
    pub openai_api_key: Option<String>,
    /// Anthropic API key (optional, AI features only)
    pub anthropic_api_key: Option<String>,
    /// Preferred AI provider
    pub default_ai_provider: AiProvider,

    /// GitHub token (optional, PR integration only)
    pub github_token: Option<String>,

    /// Largest file considered for analysis, in bytes
    pub max_file_size: u64,
    /// Upper bound on concurrently running analyses
    pub max_concurrent_analysis: u32,

    /// Directories analysis may read from; empty means unrestricted
    pub allowed_directories: Vec<String>,
    /// Path patterns never analyzed
    pub blocked_patterns: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl ServerConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    ///
    /// `from_env` is this function over `std::env::var`; tests pass a map instead.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = EnvReader { lookup };

        Self {
            debug: env.bool("DEBUG", false),
            log_level: env.parsed("LOG_LEVEL", LogLevel::Info),

            openai_api_key: env.string("OPENAI_API_KEY"),
            anthropic_api_key: env.string("ANTHROPIC_API_KEY"),
            default_ai_provider: env.parsed("AI_PROVIDER", AiProvider::None),

            github_token: env.string("GITHUB_TOKEN"),

            max_file_size: env.number("MAX_FILE_SIZE", DEFAULT_MAX_FILE_SIZE),
            max_concurrent_analysis: env
                .number("MAX_CONCURRENT_ANALYSIS", DEFAULT_MAX_CONCURRENT_ANALYSIS),

            allowed_directories: env.list("ALLOWED_DIRECTORIES", ""),
            blocked_patterns: env.list("BLOCKED_PATTERNS", DEFAULT_BLOCKED_PATTERNS),
        }
    }

    /// Check for risky or incomplete settings.
    ///
    /// Never fails; callers decide whether to log the warnings.
    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if !self.has_ai_provider() {
            warnings.push(ConfigWarning::NoAiKeys);
        }
        if !self.has_github() {
            warnings.push(ConfigWarning::NoGithubToken);
        }
        if self.max_file_size > LARGE_FILE_SIZE_THRESHOLD {
            warnings.push(ConfigWarning::LargeMaxFileSize(self.max_file_size));
        }
        if self.max_concurrent_analysis > HIGH_CONCURRENCY_THRESHOLD {
            warnings.push(ConfigWarning::HighConcurrency(
                self.max_concurrent_analysis,
            ));
        }

        warnings
    }

    /// Emit every validation warning through `tracing`.
    pub fn log_warnings(&self) {
        for warning in self.validate() {
            warn!("{}", warning);
        }
    }

    /// Whether any AI API key is configured.
    pub fn has_ai_provider(&self) -> bool {
        self.openai_api_key.is_some() || self.anthropic_api_key.is_some()
    }

    /// Whether a GitHub token is configured.
    pub fn has_github(&self) -> bool {
        self.github_token.is_some()
    }
}

/// Advisory finding from [`ServerConfig::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    NoAiKeys,
    NoGithubToken,
    LargeMaxFileSize(u64),
    HighConcurrency(u32),
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigWarning::NoAiKeys => f.write_str(
                "No AI API keys configured, AI analysis features will be disabled. \
                 Set OPENAI_API_KEY or ANTHROPIC_API_KEY to enable.",
            ),
            ConfigWarning::NoGithubToken => f.write_str(
                "No GitHub token configured, GitHub integration features will be disabled. \
                 Set GITHUB_TOKEN to enable PR analysis.",
            ),
            ConfigWarning::LargeMaxFileSize(size) => write!(
                f,
                "Large MAX_FILE_SIZE configured ({} bytes). This may impact performance.",
                size
            ),
            ConfigWarning::HighConcurrency(limit) => write!(
                f,
                "High MAX_CONCURRENT_ANALYSIS configured ({}). This may impact system resources.",
                limit
            ),
        }
    }
}

// =============================================================================
// Environment parsing helpers
// =============================================================================

struct EnvReader<F> {
    lookup: F,
}

impl<F> EnvReader<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn string(&self, name: &str) -> Option<String> {
        (self.lookup)(name)
    }

    fn bool(&self, name: &str, default: bool) -> bool {
        self.string(name).map_or(default, |value| parse_flag(&value))
    }

    /// Reads the leading integer, so `"8 workers"` yields 8.
    fn number<T: FromStr>(&self, name: &str, default: T) -> T {
        self.string(name)
            .and_then(|value| leading_integer(&value).parse().ok())
            .unwrap_or(default)
    }

    fn parsed<T>(&self, name: &str, default: T) -> T
    where
        T: FromStr<Err = Error>,
    {
        let Some(value) = self.string(name) else {
            return default;
        };
        value.parse().unwrap_or_else(|e: Error| {
            warn!(variable = name, "{}, using default", e);
            default
        })
    }

    fn list(&self, name: &str, default: &str) -> Vec<String> {
        self.string(name)
            .unwrap_or_else(|| default.to_string())
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(String::from)
            .collect()
    }
}

/// Whether a boolean environment value is switched on (`true` in any case, or `1`).
pub(crate) fn parse_flag(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value == "1"
}

/// Optional sign and digits at the start of `value`, after leading whitespace.
fn leading_integer(value: &str) -> &str {
    let value = value.trim_start();
    let sign = usize::from(value.starts_with(['+', '-']));
    let end = value[sign..]
        .find(|c: char| !c.is_ascii_digit())
        .map_or(value.len(), |digits| sign + digits);
    &value[..end]
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_with(vars: &[(&str, &str)]) -> ServerConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert!(!config.debug);
        assert_eq!(config.log_level, LogLevel::Info);
        assert_eq!(config.default_ai_provider, AiProvider::None);
        assert!(config.openai_api_key.is_none());
        assert!(config.github_token.is_none());
        assert_eq!(config.max_file_size, 1_048_576);
        assert_eq!(config.max_concurrent_analysis, 5);
        assert!(config.allowed_directories.is_empty());
        assert_eq!(
            config.blocked_patterns,
            vec!["node_modules", "dist", "build", ".git"]
        );
    }

    #[test]
    fn test_bool_parsing() {
        assert!(config_with(&[("DEBUG", "true")]).debug);
        assert!(config_with(&[("DEBUG", "TRUE")]).debug);
        assert!(config_with(&[("DEBUG", "1")]).debug);
        assert!(!config_with(&[("DEBUG", "yes")]).debug);
        assert!(!config_with(&[("DEBUG", "0")]).debug);
    }

    #[test]
    fn test_non_numeric_falls_back_to_default() {
        let config = config_with(&[
            ("MAX_CONCURRENT_ANALYSIS", "abc"),
            ("MAX_FILE_SIZE", "lots"),
        ]);
        assert_eq!(config.max_concurrent_analysis, 5);
        assert_eq!(config.max_file_size, DEFAULT_MAX_FILE_SIZE);
    }

    #[test]
    fn test_numeric_values() {
        let config = config_with(&[
            ("MAX_CONCURRENT_ANALYSIS", "8"),
            ("MAX_FILE_SIZE", "2048"),
        ]);
        assert_eq!(config.max_concurrent_analysis, 8);
        assert_eq!(config.max_file_size, 2048);
    }

    #[test]
    fn test_numeric_prefix_is_used() {
        let config = config_with(&[
            ("MAX_CONCURRENT_ANALYSIS", " 8 workers"),
            ("MAX_FILE_SIZE", "2048.5"),
        ]);
        assert_eq!(config.max_concurrent_analysis, 8);
        assert_eq!(config.max_file_size, 2048);

        let config = config_with(&[("MAX_CONCURRENT_ANALYSIS", "-3"), ("MAX_FILE_SIZE", "+4096")]);
        assert_eq!(config.max_concurrent_analysis, DEFAULT_MAX_CONCURRENT_ANALYSIS);
        assert_eq!(config.max_file_size, 4096);
    }

    #[test]
    fn test_leading_integer() {
        assert_eq!(leading_integer("42"), "42");
        assert_eq!(leading_integer("  7 days"), "7");
        assert_eq!(leading_integer("-12x"), "-12");
        assert_eq!(leading_integer("abc"), "");
        assert_eq!(leading_integer(""), "");
    }

    #[test]
    fn test_list_parsing_trims_and_drops_empty() {
        let config = config_with(&[
            ("ALLOWED_DIRECTORIES", " /src , ,/lib,"),
            ("BLOCKED_PATTERNS", "target"),
        ]);
        assert_eq!(config.allowed_directories, vec!["/src", "/lib"]);
        assert_eq!(config.blocked_patterns, vec!["target"]);
    }

    #[test]
    fn test_enum_parsing() {
        let config = config_with(&[("LOG_LEVEL", "WARN"), ("AI_PROVIDER", "Anthropic")]);
        assert_eq!(config.log_level, LogLevel::Warn);
        assert_eq!(config.default_ai_provider, AiProvider::Anthropic);

        let config = config_with(&[("LOG_LEVEL", "verbose"), ("AI_PROVIDER", "gemini")]);
        assert_eq!(config.log_level, LogLevel::Info);
        assert_eq!(config.default_ai_provider, AiProvider::None);
    }

    #[test]
    fn test_validate_warns_on_missing_integrations() {
        let warnings = ServerConfig::default().validate();
        assert!(warnings.contains(&ConfigWarning::NoAiKeys));
        assert!(warnings.contains(&ConfigWarning::NoGithubToken));
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn test_validate_warns_on_large_limits() {
        let config = config_with(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("GITHUB_TOKEN", "ghp_test"),
            ("MAX_FILE_SIZE", "20971520"),
            ("MAX_CONCURRENT_ANALYSIS", "11"),
        ]);
        let warnings = config.validate();
        assert_eq!(
            warnings,
            vec![
                ConfigWarning::LargeMaxFileSize(20_971_520),
                ConfigWarning::HighConcurrency(11),
            ]
        );
    }

    #[test]
    fn test_validate_clean_config() {
        let config = config_with(&[("ANTHROPIC_API_KEY", "key"), ("GITHUB_TOKEN", "token")]);
        assert!(config.has_ai_provider());
        assert!(config.has_github());
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_warning_messages_name_variables() {
        assert!(ConfigWarning::NoAiKeys.to_string().contains("OPENAI_API_KEY"));
        assert!(ConfigWarning::NoGithubToken.to_string().contains("GITHUB_TOKEN"));
        assert!(ConfigWarning::HighConcurrency(20).to_string().contains("20"));
    }

    #[test]
    #[serial_test::serial]
    fn test_from_env_reads_process_environment() {
        std::env::set_var("MAX_CONCURRENT_ANALYSIS", "abc");
        std::env::set_var("BLOCKED_PATTERNS", "vendor, target");
        let config = ServerConfig::from_env();
        std::env::remove_var("MAX_CONCURRENT_ANALYSIS");
        std::env::remove_var("BLOCKED_PATTERNS");

        assert_eq!(config.max_concurrent_analysis, 5);
        assert_eq!(config.blocked_patterns, vec!["vendor", "target"]);
    }
}
