//! Security advisory structures

use serde::{Deserialize, Serialize};
use std::fmt;

/// Advisory severity, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Low,
    Moderate,
    High,
    Critical,
}

impl Severity {
    /// Parse a severity as reported by the audit tool.
    ///
    /// Unrecognized strings map to `Info` so that a schema drift in the
    /// report never drops an advisory entirely.
    pub fn from_report(value: &str) -> Self {
        match value {
            "low" => Severity::Low,
            "moderate" => Severity::Moderate,
            "high" => Severity::High,
            "critical" => Severity::Critical,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Info => "info",
            Severity::Low => "low",
            Severity::Moderate => "moderate",
            Severity::High => "high",
            Severity::Critical => "critical",
        };
        write!(f, "{}", label)
    }
}

/// Summary of reported vulnerabilities for one package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvisoryRecord {
    /// Affected package name
    pub package: String,
    /// Highest reported severity
    pub severity: Severity,
    /// Title of the leading advisory
    pub title: String,
    /// Number of distinct advisories affecting this package
    pub vulnerability_count: usize,
}

impl AdvisoryRecord {
    /// Creates a new advisory record
    pub fn new(
        package: impl Into<String>,
        severity: Severity,
        title: impl Into<String>,
        vulnerability_count: usize,
    ) -> Self {
        Self {
            package: package.into(),
            severity,
            title: title.into(),
            vulnerability_count,
        }
    }
}

impl fmt::Display for AdvisoryRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {} ({} advisories)",
            self.package, self.severity, self.title, self.vulnerability_count
        )
    }
}
