//! Registry access: the `PackageRegistry` trait, the npm implementation,
//! and the shared HTTP client with retry logic

mod client;
mod npm;

pub use client::HttpClient;
pub use npm::{sort_versions_descending, NpmRegistry};

use crate::error::RegistryError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry from a registry search, in the registry's own relevance
/// ordering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Package name
    pub name: String,
    /// Latest version
    pub version: String,
    /// Package description, if present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Last publish date, if present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<DateTime<Utc>>,
}

/// Remote package registry
#[async_trait]
pub trait PackageRegistry: Send + Sync {
    /// Human-readable registry name
    fn registry_name(&self) -> &'static str;

    /// Fetch available versions for a package, sorted descending by
    /// semantic precedence
    async fn fetch_versions(&self, package: &str) -> Result<Vec<String>, RegistryError>;

    /// Fetch the declared license of the registry's latest version;
    /// `None` when the field is absent
    async fn fetch_license(&self, package: &str) -> Result<Option<String>, RegistryError>;

    /// Search the registry; ranking is the registry's own, never
    /// re-ordered locally
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>, RegistryError>;
}
