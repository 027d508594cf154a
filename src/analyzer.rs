//! Dependency graph analysis: reverse-dependency impact and shallow
//! conflict prediction
//!
//! Both algorithms run over a freshly fetched tree and are deliberately
//! shallow:
//!
//! - Impact analysis records only packages whose *direct* dependency map
//!   contains the target. A package affected only through an intermediate
//!   dependency is not flagged; broadening that would change the
//!   contract, so the limit is documented instead.
//! - Conflict prediction checks only the candidate's direct requirements
//!   against *top-level* installed packages. Conflicts that manifest
//!   deeper in the tree, or between transitive dependency sets, are out
//!   of scope.

use crate::domain::version::satisfies;
use crate::domain::DependencyTreeNode;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Traversal guard; reported trees are shallow in practice, and anything
/// deeper indicates an effectively cyclic report.
const MAX_TRAVERSAL_DEPTH: usize = 64;

/// Packages that would be affected by removing a target package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactResult {
    /// The package whose removal was analyzed
    pub package: String,
    /// Distinct packages anywhere in the tree whose direct dependency
    /// map contains the target
    pub impacted: BTreeSet<String>,
}

impl ImpactResult {
    /// True if nothing in the tree directly depends on the target
    pub fn is_empty(&self) -> bool {
        self.impacted.is_empty()
    }
}

/// One requirement of the candidate that the installed tree cannot meet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    /// Conflicting package name
    pub name: String,
    /// Version currently installed at the top level
    pub current_version: String,
    /// Range the candidate requires
    pub required_range: String,
}

/// Predicted conflicts from installing a candidate package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictPrediction {
    /// Candidate package name
    pub package: String,
    /// Candidate version
    pub version: String,
    /// Conflicts ordered by dependency name
    pub conflicts: Vec<Conflict>,
}

impl ConflictPrediction {
    /// True if no conflict was predicted
    pub fn is_clean(&self) -> bool {
        self.conflicts.is_empty()
    }
}

/// Depth-first reverse-impact traversal.
///
/// At each node, the node's own name is recorded iff its direct
/// dependency map contains `target` and the node is not the target
/// itself (self-referential reports would otherwise self-report). Every
/// child is visited regardless of match. A visited set over
/// name/version pairs plus a depth bound guard against malformed cyclic
/// reports.
pub fn compute_impact(root: &DependencyTreeNode, target: &str) -> ImpactResult {
    let mut impacted = BTreeSet::new();
    let mut visited = BTreeSet::new();
    walk_impact(root, target, &mut impacted, &mut visited, 0);
    ImpactResult {
        package: target.to_string(),
        impacted,
    }
}

fn walk_impact(
    node: &DependencyTreeNode,
    target: &str,
    impacted: &mut BTreeSet<String>,
    visited: &mut BTreeSet<(String, String)>,
    depth: usize,
) {
    if depth > MAX_TRAVERSAL_DEPTH {
        return;
    }
    let key = (
        node.name.clone(),
        node.version.clone().unwrap_or_default(),
    );
    if !visited.insert(key) {
        return;
    }

    if node.name != target && node.dependencies.contains_key(target) {
        impacted.insert(node.name.clone());
    }

    for child in node.dependencies.values() {
        walk_impact(child, target, impacted, visited, depth + 1);
    }
}

/// Shallow conflict prediction for a not-yet-installed candidate.
///
/// `required` is the candidate's declared dependency-range map. For each
/// entry present at the *top level* of `tree` with a concrete installed
/// version, a conflict is emitted when the installed version does not
/// satisfy the required range. Installed versions or ranges the version
/// math cannot interpret are skipped; the heuristic cannot judge them
/// either way.
pub fn predict_conflicts(
    tree: &DependencyTreeNode,
    candidate: &str,
    candidate_version: &str,
    required: &BTreeMap<String, String>,
) -> ConflictPrediction {
    let mut conflicts = Vec::new();

    for (dep_name, required_range) in required {
        let Some(installed) = tree.dependencies.get(dep_name) else {
            continue;
        };
        let Some(installed_version) = installed.version.as_deref() else {
            continue;
        };
        match satisfies(installed_version, required_range) {
            Ok(true) => {}
            Ok(false) => conflicts.push(Conflict {
                name: dep_name.clone(),
                current_version: installed_version.to_string(),
                required_range: required_range.clone(),
            }),
            Err(_) => {}
        }
    }

    ConflictPrediction {
        package: candidate.to_string(),
        version: candidate_version.to_string(),
        conflicts,
    }
}
