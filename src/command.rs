//! The closed command type and its result data
//!
//! Every user-initiated action is one variant of [`Command`], carrying
//! exactly its required payload, and is dispatched through a single
//! exhaustively-matched router in the service. Results are plain data
//! objects; rendering is the formatters' concern.

use crate::analyzer::{ConflictPrediction, ImpactResult};
use crate::domain::{AdvisoryRecord, DependencyReportSet, LicenseVerdict};
use crate::package_manager::MutationOutcome;
use crate::registry::SearchResult;
use serde::Serialize;

/// A user-initiated action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Refresh and show the enriched dependency report
    List,
    /// Show available versions for one package
    Versions { name: String },
    /// Search the registry
    Search { query: String, limit: usize },
    /// Install a package, optionally at a specific version
    Install {
        name: String,
        version: Option<String>,
    },
    /// Change an installed package to a specific version
    Update { name: String, version: String },
    /// Uninstall a package; `force` skips the impact preamble
    Uninstall { name: String, force: bool },
    /// Show current security advisories
    Audit,
    /// Apply automatic advisory remediation
    AuditFix,
    /// Show non-compliant installed licenses
    Licenses,
    /// Show which packages directly depend on a target
    Impact { name: String },
    /// Predict conflicts from installing a candidate
    Conflicts { name: String, version: String },
}

/// Result of one mutation, with its advisory context
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MutationReport {
    /// The package manager's verbatim outcome
    pub outcome: MutationOutcome,
    /// Reverse-dependency impact computed before an uninstall; absent
    /// when skipped or when the tree was unavailable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impact: Option<ImpactResult>,
    /// Fresh dependency report after a successful mutation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refreshed: Option<DependencyReportSet>,
}

/// Data produced by one command
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CommandOutput {
    /// Enriched dependency report
    Report(DependencyReportSet),
    /// Available versions, sorted descending
    Versions { name: String, versions: Vec<String> },
    /// Registry search results in relevance order
    Search { results: Vec<SearchResult> },
    /// Mutation outcome and context
    Mutation(MutationReport),
    /// Current advisories, ordered by package name
    Advisories { advisories: Vec<AdvisoryRecord> },
    /// Non-compliant license verdicts; empty means full compliance
    Licenses { verdicts: Vec<LicenseVerdict> },
    /// Reverse-dependency impact
    Impact(ImpactResult),
    /// Predicted conflicts
    Conflicts(ConflictPrediction),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_output_json_tagging() {
        let output = CommandOutput::Versions {
            name: "lodash".to_string(),
            versions: vec!["4.17.21".to_string()],
        };
        let json = serde_json::to_string(&output).unwrap();
        assert!(json.contains("\"kind\":\"versions\""));
        assert!(json.contains("lodash"));
    }

    #[test]
    fn test_mutation_report_omits_empty_context() {
        let report = MutationReport {
            outcome: MutationOutcome {
                action: "npm install x".to_string(),
                success: true,
                message: String::new(),
            },
            impact: None,
            refreshed: None,
        };
        let json = serde_json::to_string(&report).unwrap();
        assert!(!json.contains("impact"));
        assert!(!json.contains("refreshed"));
    }
}
