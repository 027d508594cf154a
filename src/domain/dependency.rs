//! Dependency information structures

use super::advisory::AdvisoryRecord;
use super::version::strip_range_prefix;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A dependency declared in the project manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// Package name
    pub name: String,
    /// Declared range as it appears in the manifest (e.g., `^1.2.0`)
    pub declared_range: String,
    /// Bare comparable version with any range operator stripped
    pub resolved_version: String,
    /// Whether this is a development dependency
    pub is_dev: bool,
}

impl Dependency {
    /// Creates a dependency from a manifest entry, deriving the bare
    /// resolved version from the declared range.
    pub fn new(name: impl Into<String>, declared_range: impl Into<String>, is_dev: bool) -> Self {
        let declared_range = declared_range.into();
        let resolved_version = strip_range_prefix(&declared_range).to_string();
        Self {
            name: name.into(),
            declared_range,
            resolved_version,
            is_dev,
        }
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dev_marker = if self.is_dev { " (dev)" } else { "" };
        write!(f, "{}@{}{}", self.name, self.declared_range, dev_marker)
    }
}

/// Declared dependency maps as read from the manifest
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredDependencies {
    /// name -> declared range
    pub dependencies: BTreeMap<String, String>,
    /// name -> declared range, development only
    pub dev_dependencies: BTreeMap<String, String>,
}

impl DeclaredDependencies {
    /// Flattens both maps into a name-sorted dependency list, production
    /// entries first within each map's ordering.
    pub fn to_dependencies(&self) -> Vec<Dependency> {
        let mut deps: Vec<Dependency> = self
            .dependencies
            .iter()
            .map(|(name, range)| Dependency::new(name, range, false))
            .collect();
        deps.extend(
            self.dev_dependencies
                .iter()
                .map(|(name, range)| Dependency::new(name, range, true)),
        );
        deps
    }

    /// True if neither map declares anything
    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty() && self.dev_dependencies.is_empty()
    }
}

/// Outcome of a single per-package enrichment lookup.
///
/// A failed lookup is rendered as an explicit "error fetching" state,
/// distinct from a loaded-but-empty result; one failure never blocks
/// sibling packages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FetchOutcome<T> {
    /// Lookup completed
    Loaded { value: T },
    /// Lookup failed; carries the error message for display
    Failed { error: String },
}

impl<T> FetchOutcome<T> {
    /// Wraps a successful lookup
    pub fn loaded(value: T) -> Self {
        FetchOutcome::Loaded { value }
    }

    /// Wraps a failed lookup
    pub fn failed(error: impl Into<String>) -> Self {
        FetchOutcome::Failed {
            error: error.into(),
        }
    }

    /// True if the lookup failed
    pub fn is_failed(&self) -> bool {
        matches!(self, FetchOutcome::Failed { .. })
    }

    /// The loaded value, if any
    pub fn value(&self) -> Option<&T> {
        match self {
            FetchOutcome::Loaded { value } => Some(value),
            FetchOutcome::Failed { .. } => None,
        }
    }
}

/// A dependency enriched with registry and audit data, joined by name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyReport {
    /// The declared dependency
    #[serde(flatten)]
    pub dependency: Dependency,
    /// Available versions from the registry, sorted descending
    pub available_versions: FetchOutcome<Vec<String>>,
    /// Declared license of the registry's latest version
    pub license: FetchOutcome<Option<String>>,
    /// Known advisory for this package; absence means none reported,
    /// not a guarantee of safety
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advisory: Option<AdvisoryRecord>,
}

/// Full enrichment result for one refresh cycle.
///
/// Rebuilt wholesale on every refresh; never merged with a prior cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyReportSet {
    /// One report per declared dependency
    pub dependencies: Vec<DependencyReport>,
    /// Set when the audit facility was unavailable and advisories were
    /// degraded to an empty set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit_degraded: Option<String>,
}

impl DependencyReportSet {
    /// True if any per-package lookup failed
    pub fn has_fetch_failures(&self) -> bool {
        self.dependencies
            .iter()
            .any(|report| report.available_versions.is_failed() || report.license.is_failed())
    }
}
