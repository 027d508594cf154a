//! Security audit integration
//!
//! Runs `npm audit --json` and parses the structured report into advisory
//! records keyed by package name. The tool signals "vulnerabilities
//! found" through a non-zero exit code while still emitting a valid
//! report body; the body is authoritative, never the exit code. Only a
//! genuinely malformed body is an error, and the caller then proceeds
//! with an empty advisory set.

use crate::domain::{AdvisoryRecord, Severity};
use crate::error::AuditError;
use crate::package_manager::CommandRunner;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Provides security advisories for the current project
#[async_trait]
pub trait VulnerabilityReporter: Send + Sync {
    /// Run the audit and return advisories keyed by package name.
    /// An absent key means no known advisory, not a guarantee of safety.
    async fn fetch_advisories(&self) -> Result<BTreeMap<String, AdvisoryRecord>, AuditError>;
}

/// npm audit implementation
pub struct NpmAudit {
    runner: Arc<dyn CommandRunner>,
    root: PathBuf,
}

impl NpmAudit {
    /// Create an audit reporter rooted at a project directory
    pub fn new(runner: Arc<dyn CommandRunner>, root: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            root: root.into(),
        }
    }
}

#[async_trait]
impl VulnerabilityReporter for NpmAudit {
    async fn fetch_advisories(&self) -> Result<BTreeMap<String, AdvisoryRecord>, AuditError> {
        let output = self
            .runner
            .run("npm", &["audit", "--json"], &self.root)
            .await
            .map_err(|e| AuditError::unavailable(e.to_string()))?;

        parse_audit_report(&output.stdout)
    }
}

/// Parse the npm v7+ audit report shape:
/// `{ "vulnerabilities": { name: { severity, via: [...] } } }`
///
/// `via` mixes advisory objects (direct vulnerabilities) with bare
/// strings (names of vulnerable dependencies the package reaches). The
/// leading advisory object supplies the title; entries missing a usable
/// severity or name are skipped.
pub fn parse_audit_report(body: &str) -> Result<BTreeMap<String, AdvisoryRecord>, AuditError> {
    let report: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| AuditError::unavailable(format!("malformed audit report: {}", e)))?;

    let Some(vulnerabilities) = report.get("vulnerabilities").and_then(|v| v.as_object()) else {
        // A clean project reports an empty vulnerabilities object; a
        // missing field entirely means the schema is not what we expect
        return Err(AuditError::unavailable(
            "audit report has no vulnerabilities field",
        ));
    };

    let mut advisories = BTreeMap::new();
    for (package, entry) in vulnerabilities {
        let Some(severity) = entry.get("severity").and_then(|s| s.as_str()) else {
            continue;
        };
        let severity = Severity::from_report(severity);

        let via = entry
            .get("via")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();

        let direct: Vec<&serde_json::Value> = via.iter().filter(|v| v.is_object()).collect();
        let title = direct
            .first()
            .and_then(|v| v.get("title"))
            .and_then(|t| t.as_str())
            .map(str::to_string)
            .or_else(|| {
                via.iter()
                    .find_map(|v| v.as_str())
                    .map(|name| format!("depends on vulnerable {}", name))
            })
            .unwrap_or_else(|| "unspecified vulnerability".to_string());

        let vulnerability_count = direct.len().max(1);

        advisories.insert(
            package.clone(),
            AdvisoryRecord::new(package.clone(), severity, title, vulnerability_count),
        );
    }

    Ok(advisories)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package_manager::ProcessOutput;
    use std::path::Path;

    struct ScriptedRunner {
        output: ProcessOutput,
    }

    #[async_trait]
    impl CommandRunner for ScriptedRunner {
        async fn run(
            &self,
            _program: &str,
            _args: &[&str],
            _working_dir: &Path,
        ) -> std::io::Result<ProcessOutput> {
            Ok(self.output.clone())
        }
    }

    const SAMPLE_REPORT: &str = r#"{
        "vulnerabilities": {
            "lodash": {
                "name": "lodash",
                "severity": "high",
                "via": [
                    { "title": "Prototype Pollution", "severity": "high" },
                    { "title": "Command Injection", "severity": "high" }
                ]
            },
            "express": {
                "name": "express",
                "severity": "moderate",
                "via": ["qs"]
            }
        }
    }"#;

    #[test]
    fn test_parse_direct_advisories() {
        let advisories = parse_audit_report(SAMPLE_REPORT).unwrap();
        let lodash = &advisories["lodash"];
        assert_eq!(lodash.severity, Severity::High);
        assert_eq!(lodash.title, "Prototype Pollution");
        assert_eq!(lodash.vulnerability_count, 2);
    }

    #[test]
    fn test_parse_transitive_only_entry() {
        let advisories = parse_audit_report(SAMPLE_REPORT).unwrap();
        let express = &advisories["express"];
        assert_eq!(express.severity, Severity::Moderate);
        assert_eq!(express.title, "depends on vulnerable qs");
        assert_eq!(express.vulnerability_count, 1);
    }

    #[test]
    fn test_parse_clean_report() {
        let advisories = parse_audit_report(r#"{ "vulnerabilities": {} }"#).unwrap();
        assert!(advisories.is_empty());
    }

    #[test]
    fn test_parse_skips_entries_without_severity() {
        let body = r#"{
            "vulnerabilities": {
                "odd": { "via": [{ "title": "x" }] },
                "ok": { "severity": "low", "via": [] }
            }
        }"#;
        let advisories = parse_audit_report(body).unwrap();
        assert!(!advisories.contains_key("odd"));
        assert!(advisories.contains_key("ok"));
    }

    #[test]
    fn test_parse_malformed_body_is_error() {
        assert!(parse_audit_report("npm ERR! something broke").is_err());
    }

    #[test]
    fn test_parse_unexpected_schema_is_error() {
        assert!(parse_audit_report(r#"{ "advisories": {} }"#).is_err());
    }

    #[tokio::test]
    async fn test_reporter_ignores_exit_code() {
        // npm audit exits 1 when vulnerabilities exist; the body is
        // still the authoritative result
        let audit = NpmAudit::new(
            Arc::new(ScriptedRunner {
                output: ProcessOutput {
                    status_code: Some(1),
                    stdout: SAMPLE_REPORT.to_string(),
                    stderr: String::new(),
                },
            }),
            ".",
        );
        let advisories = audit.fetch_advisories().await.unwrap();
        assert_eq!(advisories.len(), 2);
    }

    #[tokio::test]
    async fn test_reporter_malformed_body() {
        let audit = NpmAudit::new(
            Arc::new(ScriptedRunner {
                output: ProcessOutput {
                    status_code: Some(1),
                    stdout: "not a report".to_string(),
                    stderr: String::new(),
                },
            }),
            ".",
        );
        assert!(audit.fetch_advisories().await.is_err());
    }
}
