//! Core domain types: dependencies, versions, advisories, licenses, and
//! the resolved dependency tree

pub mod advisory;
pub mod dependency;
pub mod license;
pub mod tree;
pub mod version;

pub use advisory::{AdvisoryRecord, Severity};
pub use dependency::{
    DeclaredDependencies, Dependency, DependencyReport, DependencyReportSet, FetchOutcome,
};
pub use license::{license_name, LicenseStatus, LicenseVerdict};
pub use tree::{DependencyTreeNode, MAX_TREE_DEPTH};
