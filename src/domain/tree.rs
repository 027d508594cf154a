//! Typed dependency tree built from the package manager's introspection
//! output
//!
//! `npm ls --json` reports a tree-shaped structure, but the report is
//! externally sourced and untrusted: construction is depth-bounded and
//! field access is defensive, so a malformed or effectively cyclic report
//! can never cause unbounded recursion.

use crate::error::TreeError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Maximum nesting depth accepted when building a tree from a report.
/// Real npm trees stay far below this; anything deeper is malformed.
pub const MAX_TREE_DEPTH: usize = 64;

/// One node of the resolved dependency tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyTreeNode {
    /// Package name (project name at the root)
    pub name: String,
    /// Concrete installed version, when the report includes one
    pub version: Option<String>,
    /// Declared license, present when the report was taken with long
    /// output
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    /// Direct dependencies, keyed by package name
    pub dependencies: BTreeMap<String, DependencyTreeNode>,
}

impl DependencyTreeNode {
    /// Build a tree from the raw JSON report of the introspection command.
    ///
    /// Required fields are validated; nodes missing a usable shape are
    /// dropped rather than aborting the whole tree. Depth beyond
    /// [`MAX_TREE_DEPTH`] is rejected.
    pub fn from_report(report: &serde_json::Value) -> Result<Self, TreeError> {
        let object = report
            .as_object()
            .ok_or_else(|| TreeError::unavailable("report root is not an object"))?;
        let name = object
            .get("name")
            .and_then(|v| v.as_str())
            .unwrap_or("project")
            .to_string();
        Self::from_object(name, report, 0)
    }

    fn from_object(
        name: String,
        value: &serde_json::Value,
        depth: usize,
    ) -> Result<Self, TreeError> {
        if depth > MAX_TREE_DEPTH {
            return Err(TreeError::unavailable(format!(
                "report exceeds maximum depth {}",
                MAX_TREE_DEPTH
            )));
        }

        let version = value
            .get("version")
            .and_then(|v| v.as_str())
            .map(str::to_string);
        let license = license_field(value);

        let mut dependencies = BTreeMap::new();
        if let Some(children) = value.get("dependencies").and_then(|v| v.as_object()) {
            for (child_name, child_value) in children {
                if !child_value.is_object() {
                    continue;
                }
                let child =
                    Self::from_object(child_name.clone(), child_value, depth + 1)?;
                dependencies.insert(child_name.clone(), child);
            }
        }

        Ok(Self {
            name,
            version,
            license,
            dependencies,
        })
    }

    /// Collect `name -> license` for every package in the tree below the
    /// root. Later occurrences of the same name do not overwrite an
    /// earlier recorded license.
    pub fn collect_licenses(&self) -> BTreeMap<String, Option<String>> {
        let mut licenses = BTreeMap::new();
        let mut stack: Vec<&DependencyTreeNode> = self.dependencies.values().collect();
        while let Some(node) = stack.pop() {
            licenses
                .entry(node.name.clone())
                .or_insert_with(|| node.license.clone());
            stack.extend(node.dependencies.values());
        }
        licenses
    }
}

/// npm reports the license either as a string or as an object with a
/// `type` field, depending on the package's manifest vintage.
fn license_field(value: &serde_json::Value) -> Option<String> {
    match value.get("license") {
        Some(serde_json::Value::String(s)) => Some(s.clone()),
        Some(serde_json::Value::Object(obj)) => obj
            .get("type")
            .and_then(|t| t.as_str())
            .map(str::to_string),
        _ => None,
    }
}
