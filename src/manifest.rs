//! Project manifest reading
//!
//! The manifest is package.json at the project root. Reading produces the
//! declared dependency and devDependency maps; the rest of the file is
//! ignored. Entries whose range is not a string are dropped defensively.

use crate::domain::DeclaredDependencies;
use crate::error::ManifestError;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Manifest file name expected at the project root
pub const MANIFEST_FILE: &str = "package.json";

/// Source of declared dependencies
#[async_trait]
pub trait ManifestSource: Send + Sync {
    /// Read the declared dependency maps from the project manifest
    async fn read_dependencies(&self) -> Result<DeclaredDependencies, ManifestError>;
}

/// Reads package.json from a project directory
pub struct PackageJsonSource {
    root: PathBuf,
}

impl PackageJsonSource {
    /// Create a source rooted at a project directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path to the manifest file
    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(MANIFEST_FILE)
    }
}

#[async_trait]
impl ManifestSource for PackageJsonSource {
    async fn read_dependencies(&self) -> Result<DeclaredDependencies, ManifestError> {
        let path = self.manifest_path();
        if !path.exists() {
            return Err(ManifestError::not_found(&path));
        }

        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| ManifestError::read_error(&path, e))?;

        parse_manifest(&content, &path)
    }
}

/// Parse manifest content into the declared dependency maps
pub fn parse_manifest(content: &str, path: &Path) -> Result<DeclaredDependencies, ManifestError> {
    let value: serde_json::Value = serde_json::from_str(content)
        .map_err(|e| ManifestError::parse_error(path, e.to_string()))?;

    if !value.is_object() {
        return Err(ManifestError::parse_error(path, "manifest root is not an object"));
    }

    Ok(DeclaredDependencies {
        dependencies: dependency_map(&value, "dependencies"),
        dev_dependencies: dependency_map(&value, "devDependencies"),
    })
}

fn dependency_map(value: &serde_json::Value, key: &str) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    if let Some(entries) = value.get(key).and_then(|v| v.as_object()) {
        for (name, range) in entries {
            if let Some(range) = range.as_str() {
                map.insert(name.clone(), range.to_string());
            }
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_manifest_both_sections() {
        let content = r#"{
            "name": "my-app",
            "dependencies": { "express": "^4.18.0", "lodash": "~4.17.21" },
            "devDependencies": { "jest": "^29.0.0" }
        }"#;

        let declared = parse_manifest(content, Path::new("package.json")).unwrap();
        assert_eq!(declared.dependencies.len(), 2);
        assert_eq!(declared.dependencies["express"], "^4.18.0");
        assert_eq!(declared.dev_dependencies["jest"], "^29.0.0");
    }

    #[test]
    fn test_parse_manifest_missing_sections() {
        let content = r#"{ "name": "bare" }"#;
        let declared = parse_manifest(content, Path::new("package.json")).unwrap();
        assert!(declared.is_empty());
    }

    #[test]
    fn test_parse_manifest_drops_non_string_ranges() {
        let content = r#"{
            "dependencies": { "good": "^1.0.0", "bad": { "version": "1.0.0" } }
        }"#;
        let declared = parse_manifest(content, Path::new("package.json")).unwrap();
        assert_eq!(declared.dependencies.len(), 1);
        assert!(declared.dependencies.contains_key("good"));
    }

    #[test]
    fn test_parse_manifest_invalid_json() {
        let err = parse_manifest("{ not json", Path::new("package.json")).unwrap_err();
        assert!(format!("{}", err).contains("failed to parse JSON"));
    }

    #[test]
    fn test_parse_manifest_non_object_root() {
        let err = parse_manifest("[1,2]", Path::new("package.json")).unwrap_err();
        assert!(format!("{}", err).contains("not an object"));
    }

    #[tokio::test]
    async fn test_read_dependencies_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let source = PackageJsonSource::new(dir.path());
        let err = source.read_dependencies().await.unwrap_err();
        assert!(matches!(err, ManifestError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_read_dependencies_from_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(MANIFEST_FILE),
            r#"{ "dependencies": { "react": "^18.2.0" } }"#,
        )
        .unwrap();

        let source = PackageJsonSource::new(dir.path());
        let declared = source.read_dependencies().await.unwrap();
        assert_eq!(declared.dependencies["react"], "^18.2.0");
    }
}
