//! npm registry adapter
//!
//! Fetches package metadata from the npm registry.
//! Endpoints:
//! - packument: https://registry.npmjs.org/{package}
//! - search:    https://registry.npmjs.org/-/v1/search
//!
//! All response data is untrusted: entries missing required fields are
//! dropped rather than joined to local data.

use crate::domain::version::parse_components;
use crate::error::RegistryError;
use crate::registry::{HttpClient, PackageRegistry, SearchResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;

/// npm registry base URL
const NPM_REGISTRY_URL: &str = "https://registry.npmjs.org";

/// npm registry adapter
pub struct NpmRegistry {
    client: HttpClient,
}

/// npm packument (package document) response
#[derive(Debug, Deserialize)]
struct Packument {
    /// Tag name -> version, notably "latest"
    #[serde(default, rename = "dist-tags")]
    dist_tags: HashMap<String, String>,
    /// Version -> per-version metadata
    #[serde(default)]
    versions: HashMap<String, VersionMetadata>,
}

/// Per-version metadata; only the fields this tool consumes
#[derive(Debug, Deserialize)]
struct VersionMetadata {
    /// License, either a string or an object with a `type` field
    #[serde(default)]
    license: Option<serde_json::Value>,
}

/// npm search response
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    objects: Vec<SearchObject>,
}

#[derive(Debug, Deserialize)]
struct SearchObject {
    package: SearchPackage,
}

#[derive(Debug, Deserialize)]
struct SearchPackage {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    date: Option<String>,
}

impl NpmRegistry {
    /// Create a new npm registry adapter
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// Build the packument URL for a package
    fn packument_url(&self, package: &str) -> String {
        format!("{}/{}", NPM_REGISTRY_URL, package)
    }

    /// Build the search URL for a query
    fn search_url(&self, query: &str, limit: usize) -> String {
        format!(
            "{}/-/v1/search?text={}&size={}",
            NPM_REGISTRY_URL,
            urlencode(query),
            limit
        )
    }

    async fn fetch_packument(&self, package: &str) -> Result<Packument, RegistryError> {
        let url = self.packument_url(package);
        self.client.get_json(&url, package).await
    }
}

#[async_trait]
impl PackageRegistry for NpmRegistry {
    fn registry_name(&self) -> &'static str {
        "npm"
    }

    async fn fetch_versions(&self, package: &str) -> Result<Vec<String>, RegistryError> {
        let packument = self.fetch_packument(package).await?;

        if packument.versions.is_empty() {
            return Err(RegistryError::malformed(package, "no versions field"));
        }

        Ok(sort_versions_descending(
            packument.versions.keys().cloned().collect(),
        ))
    }

    async fn fetch_license(&self, package: &str) -> Result<Option<String>, RegistryError> {
        let packument = self.fetch_packument(package).await?;

        let Some(latest) = packument.dist_tags.get("latest") else {
            return Err(RegistryError::malformed(package, "no latest dist-tag"));
        };
        let Some(metadata) = packument.versions.get(latest) else {
            return Err(RegistryError::malformed(
                package,
                format!("latest tag '{}' has no version entry", latest),
            ));
        };

        Ok(license_string(metadata.license.as_ref()))
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>, RegistryError> {
        let url = self.search_url(query, limit);
        let response: SearchResponse = self.client.get_json(&url, query).await?;

        // Registry relevance ordering is preserved; entries missing
        // required fields are dropped
        let results = response
            .objects
            .into_iter()
            .filter_map(|object| {
                let package = object.package;
                let name = package.name?;
                let version = package.version?;
                Some(SearchResult {
                    name,
                    version,
                    description: package.description,
                    published: package
                        .date
                        .as_deref()
                        .and_then(|d| d.parse::<DateTime<Utc>>().ok()),
                })
            })
            .collect();

        Ok(results)
    }
}

/// Sort version strings descending by numeric component precedence.
///
/// Versions the comparator cannot interpret (pre-release tags and other
/// suffixes) are excluded from the set rather than mis-ordered.
pub fn sort_versions_descending(versions: Vec<String>) -> Vec<String> {
    let mut parsed: Vec<(Vec<u64>, String)> = versions
        .into_iter()
        .filter_map(|v| parse_components(&v).ok().map(|parts| (parts, v)))
        .collect();

    parsed.sort_by(|(a, _), (b, _)| {
        let len = a.len().max(b.len());
        for i in 0..len {
            let pa = a.get(i).copied().unwrap_or(0);
            let pb = b.get(i).copied().unwrap_or(0);
            match pb.cmp(&pa) {
                std::cmp::Ordering::Equal => continue,
                other => return other,
            }
        }
        std::cmp::Ordering::Equal
    });

    parsed.into_iter().map(|(_, v)| v).collect()
}

/// The license field is a string in modern manifests and an object with
/// a `type` field in older ones.
fn license_string(value: Option<&serde_json::Value>) -> Option<String> {
    match value {
        Some(serde_json::Value::String(s)) => Some(s.clone()),
        Some(serde_json::Value::Object(obj)) => obj
            .get("type")
            .and_then(|t| t.as_str())
            .map(str::to_string),
        _ => None,
    }
}

/// Minimal percent-encoding for search query text
fn urlencode(query: &str) -> String {
    let mut encoded = String::with_capacity(query.len());
    for byte in query.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }
    encoded
}
