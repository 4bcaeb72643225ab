//! Static catalog of the tools, resources and prompts this server exposes.

use crate::protocol::{PromptDefinition, ResourceDefinition, ToolDefinition};

pub const PING_TOOL: &str = "ping";
pub const ANALYZE_REPOSITORY_TOOL: &str = "analyze_repository";

pub const CONFIG_RESOURCE_URI: &str = "codesentry://config";
pub const JSON_MIME_TYPE: &str = "application/json";

pub const CODE_REVIEW_PROMPT: &str = "code_review";
pub const SECURITY_AUDIT_PROMPT: &str = "security_audit";

/// Available MCP tools.
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: PING_TOOL.to_string(),
            description: "Test connectivity to the CodeSentry server".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "message": {
                        "type": "string",
                        "description": "Optional message to echo back"
                    }
                }
            }),
        },
        ToolDefinition {
            name: ANALYZE_REPOSITORY_TOOL.to_string(),
            description: "Analyze a git repository for security, performance, and quality issues"
                .to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "path": {
                        "type": "string",
                        "description": "Path to the repository to analyze"
                    },
                    "config": {
                        "type": "object",
                        "description": "Analysis configuration options",
                        "properties": {
                            "enableSecurity": { "type": "boolean" },
                            "enablePerformance": { "type": "boolean" },
                            "enableQuality": { "type": "boolean" },
                            "enableDocumentation": { "type": "boolean" }
                        }
                    }
                },
                "required": ["path"]
            }),
        },
    ]
}

/// Available MCP resources.
pub fn resource_definitions() -> Vec<ResourceDefinition> {
    vec![ResourceDefinition {
        uri: CONFIG_RESOURCE_URI.to_string(),
        name: "CodeSentry Configuration".to_string(),
        description: "Current analysis configuration settings".to_string(),
        mime_type: JSON_MIME_TYPE.to_string(),
    }]
}

/// Available MCP prompts.
pub fn prompt_definitions() -> Vec<PromptDefinition> {
    vec![
        PromptDefinition {
            name: CODE_REVIEW_PROMPT.to_string(),
            description: "Comprehensive code review prompt for analyzing code quality, \
                          security, and performance"
                .to_string(),
        },
        PromptDefinition {
            name: SECURITY_AUDIT_PROMPT.to_string(),
            description: "Security-focused analysis prompt for identifying vulnerabilities \
                          and security issues"
                .to_string(),
        },
    ]
}

pub(crate) const CODE_REVIEW_TEXT: &str = "\
Please perform a comprehensive code review focusing on:

1. **Security**: Look for vulnerabilities, security anti-patterns, and potential attack vectors
2. **Performance**: Identify bottlenecks, inefficient algorithms, and optimization opportunities
3. **Quality**: Check for code smells, maintainability issues, and best practices
4. **Documentation**: Assess documentation completeness and clarity

Provide specific, actionable feedback with file locations and suggested improvements.";

pub(crate) const SECURITY_AUDIT_TEXT: &str = "\
Perform a thorough security audit of the codebase. Focus on:

1. **OWASP Top 10** vulnerabilities
2. **Input validation** and sanitization
3. **Authentication** and authorization flaws
4. **Cryptographic** implementations
5. **Dependency** vulnerabilities
6. **Data exposure** risks

Provide severity ratings and specific remediation steps for each issue found.";

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_tool_names_are_unique() {
        let tools = tool_definitions();
        let names: HashSet<_> = tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names.len(), tools.len());
        assert!(names.contains(PING_TOOL));
        assert!(names.contains(ANALYZE_REPOSITORY_TOOL));
    }

    #[test]
    fn test_analyze_repository_requires_path() {
        let tools = tool_definitions();
        let analyze = tools
            .iter()
            .find(|t| t.name == ANALYZE_REPOSITORY_TOOL)
            .unwrap();
        assert_eq!(analyze.input_schema["required"], serde_json::json!(["path"]));
        assert_eq!(
            analyze.input_schema["properties"]["config"]["properties"]["enableQuality"]["type"],
            "boolean"
        );
    }

    #[test]
    fn test_single_config_resource() {
        let resources = resource_definitions();
        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].uri, CONFIG_RESOURCE_URI);
        assert_eq!(resources[0].mime_type, JSON_MIME_TYPE);
    }

    #[test]
    fn test_prompts() {
        let prompts = prompt_definitions();
        let names: Vec<_> = prompts.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec![CODE_REVIEW_PROMPT, SECURITY_AUDIT_PROMPT]);
        assert!(prompts.iter().all(|p| !p.description.is_empty()));
    }
}
