//! Application error types using thiserror
//!
//! Error hierarchy:
//! - ManifestError: issues locating or parsing package.json
//! - RegistryError: issues talking to the npm registry
//! - AuditError: issues running or parsing the security audit
//! - TreeError: issues obtaining the resolved dependency tree
//! - MutationError: issues performing install/update/uninstall operations
//!
//! No variant is fatal to the process; callers degrade per-item where the
//! failure only affects one package's enrichment.

use std::path::PathBuf;
use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Manifest related errors
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// npm registry related errors
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Security audit related errors
    #[error(transparent)]
    Audit(#[from] AuditError),

    /// Dependency tree related errors
    #[error(transparent)]
    Tree(#[from] TreeError),

    /// Package mutation related errors
    #[error(transparent)]
    Mutation(#[from] MutationError),

    /// Version string related errors
    #[error(transparent)]
    Version(#[from] VersionError),
}

/// Errors related to the project manifest (package.json)
#[derive(Error, Debug)]
pub enum ManifestError {
    /// No manifest exists at the expected project root
    #[error("manifest file not found: {path}")]
    NotFound { path: PathBuf },

    /// Failed to read the manifest file
    #[error("failed to read manifest file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the manifest body
    #[error("failed to parse JSON in {path}: {message}")]
    ParseError { path: PathBuf, message: String },
}

/// Errors related to npm registry communication
#[derive(Error, Debug)]
pub enum RegistryError {
    /// The registry reported the package does not exist
    #[error("package '{package}' not found in the npm registry")]
    PackageNotFound { package: String },

    /// Network failure or non-2xx response
    #[error("registry unavailable while fetching '{package}': {message}")]
    Unavailable { package: String, message: String },

    /// Request exceeded the configured timeout
    #[error("timeout while fetching '{package}' from the npm registry")]
    Timeout { package: String },

    /// Response body did not match the expected shape
    #[error("malformed registry response for '{package}': {message}")]
    MalformedResponse { package: String, message: String },

    /// Rate limit exceeded after retries
    #[error("npm registry rate limit exceeded")]
    RateLimitExceeded,
}

/// Errors related to the security audit facility
#[derive(Error, Debug)]
pub enum AuditError {
    /// The audit tool could not be run, or its report body was malformed
    #[error("security audit unavailable: {message}")]
    Unavailable { message: String },
}

/// Errors related to dependency tree introspection
#[derive(Error, Debug)]
pub enum TreeError {
    /// The introspection command failed or produced an unusable report
    #[error("dependency tree unavailable: {message}")]
    Unavailable { message: String },

    /// The introspection command exceeded its time bound
    #[error("timeout while obtaining the dependency tree")]
    Timeout,
}

/// Errors related to package mutation operations
#[derive(Error, Debug)]
pub enum MutationError {
    /// The package manager reported a failure; message is verbatim tool output
    #[error("{action} failed: {message}")]
    Failed { action: String, message: String },

    /// Another mutation is already in flight
    #[error("another mutation is already in progress")]
    InFlight,

    /// The package manager invocation exceeded its time bound
    #[error("{action} timed out")]
    Timeout { action: String },
}

/// Errors related to version strings and ranges
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    /// Empty version string
    #[error("empty version string")]
    Empty,

    /// Pre-release or build-metadata suffix; deliberately unsupported
    #[error("unsupported version suffix in '{version}'")]
    UnsupportedSuffix { version: String },

    /// A dot-separated component was not a non-negative integer
    #[error("invalid component '{component}' in version '{version}'")]
    InvalidComponent { version: String, component: String },

    /// The range expression could not be interpreted
    #[error("invalid version range '{range}'")]
    InvalidRange { range: String },
}

impl ManifestError {
    /// Creates a new NotFound error
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        ManifestError::NotFound { path: path.into() }
    }

    /// Creates a new ReadError
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ManifestError::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Creates a new ParseError
    pub fn parse_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ManifestError::ParseError {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl RegistryError {
    /// Creates a new PackageNotFound error
    pub fn package_not_found(package: impl Into<String>) -> Self {
        RegistryError::PackageNotFound {
            package: package.into(),
        }
    }

    /// Creates a new Unavailable error
    pub fn unavailable(package: impl Into<String>, message: impl Into<String>) -> Self {
        RegistryError::Unavailable {
            package: package.into(),
            message: message.into(),
        }
    }

    /// Creates a new Timeout error
    pub fn timeout(package: impl Into<String>) -> Self {
        RegistryError::Timeout {
            package: package.into(),
        }
    }

    /// Creates a new MalformedResponse error
    pub fn malformed(package: impl Into<String>, message: impl Into<String>) -> Self {
        RegistryError::MalformedResponse {
            package: package.into(),
            message: message.into(),
        }
    }
}

impl AuditError {
    /// Creates a new Unavailable error
    pub fn unavailable(message: impl Into<String>) -> Self {
        AuditError::Unavailable {
            message: message.into(),
        }
    }
}

impl TreeError {
    /// Creates a new Unavailable error
    pub fn unavailable(message: impl Into<String>) -> Self {
        TreeError::Unavailable {
            message: message.into(),
        }
    }
}

impl MutationError {
    /// Creates a new Failed error carrying the tool's own message
    pub fn failed(action: impl Into<String>, message: impl Into<String>) -> Self {
        MutationError::Failed {
            action: action.into(),
            message: message.into(),
        }
    }

    /// Creates a new Timeout error
    pub fn timeout(action: impl Into<String>) -> Self {
        MutationError::Timeout {
            action: action.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_error_not_found() {
        let err = ManifestError::not_found("/path/to/package.json");
        let msg = format!("{}", err);
        assert!(msg.contains("manifest file not found"));
        assert!(msg.contains("package.json"));
    }

    #[test]
    fn test_manifest_error_parse() {
        let err = ManifestError::parse_error("/path/to/package.json", "unexpected token");
        let msg = format!("{}", err);
        assert!(msg.contains("failed to parse JSON"));
        assert!(msg.contains("unexpected token"));
    }

    #[test]
    fn test_registry_error_package_not_found() {
        let err = RegistryError::package_not_found("nonexistent-package");
        let msg = format!("{}", err);
        assert!(msg.contains("package 'nonexistent-package' not found"));
    }

    #[test]
    fn test_registry_error_unavailable() {
        let err = RegistryError::unavailable("lodash", "connection refused");
        let msg = format!("{}", err);
        assert!(msg.contains("registry unavailable"));
        assert!(msg.contains("connection refused"));
    }

    #[test]
    fn test_registry_error_timeout() {
        let err = RegistryError::timeout("express");
        let msg = format!("{}", err);
        assert!(msg.contains("timeout"));
        assert!(msg.contains("express"));
    }

    #[test]
    fn test_audit_error_unavailable() {
        let err = AuditError::unavailable("malformed report body");
        let msg = format!("{}", err);
        assert!(msg.contains("security audit unavailable"));
        assert!(msg.contains("malformed report body"));
    }

    #[test]
    fn test_tree_error_unavailable() {
        let err = TreeError::unavailable("npm ls exited with signal");
        let msg = format!("{}", err);
        assert!(msg.contains("dependency tree unavailable"));
    }

    #[test]
    fn test_mutation_error_failed_keeps_tool_message() {
        let err = MutationError::failed("npm install lodash@4.17.21", "EACCES: permission denied");
        let msg = format!("{}", err);
        assert!(msg.contains("npm install lodash@4.17.21 failed"));
        assert!(msg.contains("EACCES: permission denied"));
    }

    #[test]
    fn test_mutation_error_in_flight() {
        let msg = format!("{}", MutationError::InFlight);
        assert!(msg.contains("already in progress"));
    }

    #[test]
    fn test_version_error_suffix() {
        let err = VersionError::UnsupportedSuffix {
            version: "1.0.0-beta".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("unsupported version suffix"));
        assert!(msg.contains("1.0.0-beta"));
    }

    #[test]
    fn test_app_error_from_manifest_error() {
        let app_err: AppError = ManifestError::not_found("/path").into();
        assert!(format!("{}", app_err).contains("manifest file not found"));
    }

    #[test]
    fn test_app_error_from_registry_error() {
        let app_err: AppError = RegistryError::package_not_found("pkg").into();
        assert!(format!("{}", app_err).contains("package 'pkg' not found"));
    }

    #[test]
    fn test_app_error_from_mutation_error() {
        let app_err: AppError = MutationError::InFlight.into();
        assert!(format!("{}", app_err).contains("already in progress"));
    }
}
