//! Analysis configuration shared by the MCP surface.

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_MAX_FILE_SIZE;

/// Settings for a repository analysis run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisConfig {
    pub enable_security: bool,
    pub enable_performance: bool,
    pub enable_quality: bool,
    pub enable_documentation: bool,
    /// Largest file analyzed, in bytes
    pub max_file_size: u64,
    pub supported_extensions: Vec<String>,
    pub ignore_patterns: Vec<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            enable_security: true,
            enable_performance: true,
            enable_quality: true,
            enable_documentation: true,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            supported_extensions: [
                ".ts", ".js", ".tsx", ".jsx", ".py", ".go", ".rs", ".java", ".cpp", ".c",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            ignore_patterns: ["node_modules/", "dist/", "build/", ".git/", "*.min.js"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl AnalysisConfig {
    /// Return a copy with the flags present in `overrides` replaced.
    pub fn with_overrides(&self, overrides: &AnalysisOverrides) -> Self {
        Self {
            enable_security: overrides.enable_security.unwrap_or(self.enable_security),
            enable_performance: overrides
                .enable_performance
                .unwrap_or(self.enable_performance),
            enable_quality: overrides.enable_quality.unwrap_or(self.enable_quality),
            enable_documentation: overrides
                .enable_documentation
                .unwrap_or(self.enable_documentation),
            ..self.clone()
        }
    }

    /// Names of the analyzers this configuration enables.
    pub fn enabled_analyzers(&self) -> Vec<&'static str> {
        [
            ("security", self.enable_security),
            ("performance", self.enable_performance),
            ("quality", self.enable_quality),
            ("documentation", self.enable_documentation),
        ]
        .into_iter()
        .filter_map(|(name, enabled)| enabled.then_some(name))
        .collect()
    }
}

/// Per-call analyzer toggles accepted by `analyze_repository`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_security: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_performance: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_quality: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_documentation: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_serializes_camel_case() {
        let json = serde_json::to_value(AnalysisConfig::default()).unwrap();
        assert_eq!(json["enableSecurity"], true);
        assert_eq!(json["enableDocumentation"], true);
        assert_eq!(json["maxFileSize"], 1_048_576);

        let extensions = json["supportedExtensions"].as_array().unwrap();
        assert!(extensions.iter().any(|e| e == ".ts"));
        assert!(extensions.iter().any(|e| e == ".py"));
        assert_eq!(json["ignorePatterns"][0], "node_modules/");
    }

    #[test]
    fn test_overrides_replace_only_present_flags() {
        let overrides: AnalysisOverrides =
            serde_json::from_value(serde_json::json!({"enableSecurity": false})).unwrap();
        let config = AnalysisConfig::default().with_overrides(&overrides);

        assert!(!config.enable_security);
        assert!(config.enable_performance);
        assert!(config.enable_quality);
        assert_eq!(
            config.enabled_analyzers(),
            vec!["performance", "quality", "documentation"]
        );
    }

    #[test]
    fn test_no_overrides_keeps_defaults() {
        let config = AnalysisConfig::default().with_overrides(&AnalysisOverrides::default());
        assert_eq!(config, AnalysisConfig::default());
        assert_eq!(config.enabled_analyzers().len(), 4);
    }
}
