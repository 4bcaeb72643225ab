//! Data contracts for analysis findings and reports.
//!
//! Nothing in the server produces these yet; they describe the shape a
//! repository analysis returns so clients and future analyzers agree on it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Severity of a security finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SecuritySeverity {
    Low,
    Medium,
    High,
    Critical,
}

/// Severity of performance, quality and documentation findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SecurityIssueType {
    SqlInjection,
    Xss,
    Csrf,
    InsecureCrypto,
    PathTraversal,
    CommandInjection,
    AuthenticationBypass,
    AuthorizationFlaw,
    SensitiveDataExposure,
    DependencyVulnerability,
    HardcodedSecret,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PerformanceIssueType {
    AlgorithmComplexity,
    MemoryLeak,
    BlockingOperation,
    InefficientQuery,
    LargeObject,
    RegexPerformance,
    LoopOptimization,
    CachingOpportunity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QualityIssueType {
    CodeSmell,
    Duplication,
    Complexity,
    NamingConvention,
    DeadCode,
    MagicNumber,
    LongMethod,
    LargeClass,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentationIssueType {
    MissingFunctionDoc,
    MissingClassDoc,
    MissingParamDoc,
    MissingReturnDoc,
    OutdatedDoc,
    MissingReadme,
    MissingApiDoc,
}

/// A security finding at a source location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityIssue {
    pub id: String,
    #[serde(rename = "type")]
    pub issue_type: SecurityIssueType,
    pub severity: SecuritySeverity,
    pub file: String,
    pub line: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
    pub title: String,
    pub description: String,
    pub suggestion: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix: Option<String>,
    /// Common Weakness Enumeration id, e.g. `CWE-89`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwe: Option<String>,
    /// OWASP Top 10 reference, e.g. `A03:2021`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owasp: Option<String>,
}

/// A performance finding at a source location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceIssue {
    pub id: String,
    #[serde(rename = "type")]
    pub issue_type: PerformanceIssueType,
    pub severity: Severity,
    pub file: String,
    pub line: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
    pub title: String,
    pub description: String,
    pub suggestion: String,
    /// Big-O description, e.g. `O(n^2)`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complexity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_impact: Option<String>,
}

/// A maintainability finding at a source location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityIssue {
    pub id: String,
    #[serde(rename = "type")]
    pub issue_type: QualityIssueType,
    pub severity: Severity,
    pub file: String,
    pub line: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
    pub title: String,
    pub description: String,
    pub suggestion: String,
}

/// A documentation gap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentationIssue {
    pub id: String,
    #[serde(rename = "type")]
    pub issue_type: DocumentationIssueType,
    pub severity: Severity,
    pub file: String,
    pub line: u32,
    pub title: String,
    pub description: String,
    pub suggestion: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    pub total_files: u64,
    pub total_lines: u64,
    pub security_issues: u64,
    pub performance_issues: u64,
    pub quality_issues: u64,
    pub documentation_issues: u64,
    /// 0-100, higher is better
    pub overall_score: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeMetrics {
    pub lines_of_code: u64,
    pub cyclomatic_complexity: f64,
    pub maintainability_index: f64,
    /// Human-readable estimate, e.g. `2 hours`
    pub technical_debt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_coverage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duplicated_lines: Option<u64>,
}

/// Full result of analyzing one repository revision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub id: String,
    /// RFC 3339 timestamp
    pub timestamp: String,
    pub repository: String,
    pub branch: String,
    pub commit: String,
    pub files: Vec<String>,
    pub summary: AnalysisSummary,
    pub security: Vec<SecurityIssue>,
    pub performance: Vec<PerformanceIssue>,
    pub quality: Vec<QualityIssue>,
    pub documentation: Vec<DocumentationIssue>,
    pub metrics: CodeMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryInfo {
    pub name: String,
    pub path: String,
    pub branch: String,
    pub commit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub size: u64,
    pub file_count: u64,
    /// Language name to line count
    pub languages: HashMap<String, u64>,
}

/// Provider-backed analyzers; only these two are selectable per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiModelProvider {
    #[serde(rename = "openai")]
    OpenAi,
    Anthropic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiAnalysisOptions {
    pub provider: AiModelProvider,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub include_context: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitHubIntegration {
    pub token: String,
    pub owner: String,
    pub repo: String,
    pub enable_comments: bool,
    pub enable_status_checks: bool,
}
