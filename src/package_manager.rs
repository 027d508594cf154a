//! Package manager integration
//!
//! All process side effects live behind collaborator traits so the
//! reasoning core stays testable without spawning anything:
//! - `CommandRunner` executes external commands with a time bound
//! - `PackageMutator` performs install/uninstall/audit-fix
//! - `DependencyIntrospector` reads the resolved tree and candidate
//!   metadata
//! - `MutationGate` guarantees at most one mutation in flight

use crate::domain::DependencyTreeNode;
use crate::error::{MutationError, TreeError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncReadExt;

/// Default time bound for package manager invocations
const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(300);

/// Captured output of an external command
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    /// Exit code, if the process exited normally
    pub status_code: Option<i32>,
    /// Standard output
    pub stdout: String,
    /// Standard error
    pub stderr: String,
}

impl ProcessOutput {
    /// True if the process exited with code 0
    pub fn success(&self) -> bool {
        self.status_code == Some(0)
    }

    /// The diagnostic message a user should see: stderr when present,
    /// stdout otherwise
    pub fn message(&self) -> String {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim().to_string()
        } else {
            stderr.to_string()
        }
    }
}

/// Runs external commands
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run a command in a working directory, capturing output
    async fn run(
        &self,
        program: &str,
        args: &[&str],
        working_dir: &Path,
    ) -> std::io::Result<ProcessOutput>;
}

/// Command runner that executes real processes, bounded by a timeout
pub struct SystemCommandRunner {
    timeout: Duration,
}

impl SystemCommandRunner {
    /// Create a runner with the default time bound
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }

    /// Create a runner with a custom time bound
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for SystemCommandRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandRunner for SystemCommandRunner {
    async fn run(
        &self,
        program: &str,
        args: &[&str],
        working_dir: &Path,
    ) -> std::io::Result<ProcessOutput> {
        let mut child = tokio::process::Command::new(program)
            .args(args)
            .current_dir(working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let mut stdout_pipe = child.stdout.take().expect("stdout piped");
        let mut stderr_pipe = child.stderr.take().expect("stderr piped");

        let bounded = tokio::time::timeout(self.timeout, async {
            let mut stdout = Vec::new();
            let mut stderr = Vec::new();
            let (status, _, _) = tokio::try_join!(
                child.wait(),
                stdout_pipe.read_to_end(&mut stdout),
                stderr_pipe.read_to_end(&mut stderr),
            )?;
            Ok::<_, std::io::Error>((status, stdout, stderr))
        })
        .await;

        match bounded {
            Ok(result) => {
                let (status, stdout, stderr) = result?;
                Ok(ProcessOutput {
                    status_code: status.code(),
                    stdout: String::from_utf8_lossy(&stdout).to_string(),
                    stderr: String::from_utf8_lossy(&stderr).to_string(),
                })
            }
            Err(_) => {
                // Expired: reap the child so it does not outlive the bound
                let _ = child.kill().await;
                Err(std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    format!("command '{}' timed out", program),
                ))
            }
        }
    }
}

/// Outcome of a package mutation, surfaced verbatim to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationOutcome {
    /// The command that was executed
    pub action: String,
    /// Whether the package manager reported success
    pub success: bool,
    /// The tool's own diagnostic message
    pub message: String,
}

/// Performs package mutation side effects
#[async_trait]
pub trait PackageMutator: Send + Sync {
    /// Install a package, optionally at a specific version
    async fn install(
        &self,
        name: &str,
        version: Option<&str>,
    ) -> Result<MutationOutcome, MutationError>;

    /// Uninstall a package
    async fn uninstall(&self, name: &str) -> Result<MutationOutcome, MutationError>;

    /// Apply automatic advisory remediation
    async fn audit_fix(&self) -> Result<MutationOutcome, MutationError>;
}

/// Introspects installed state through the package manager
#[async_trait]
pub trait DependencyIntrospector: Send + Sync {
    /// Fetch the resolved dependency tree. Fetched fresh per analysis;
    /// never cached, since installed state may have changed.
    async fn dependency_tree(&self) -> Result<DependencyTreeNode, TreeError>;

    /// Declared dependency-range map of a not-yet-installed candidate
    async fn declared_dependencies(
        &self,
        name: &str,
        version: &str,
    ) -> Result<BTreeMap<String, String>, TreeError>;

    /// name -> declared license for every installed package
    async fn installed_licenses(&self) -> Result<BTreeMap<String, Option<String>>, TreeError>;
}

/// npm CLI implementation of mutation and introspection
pub struct NpmCli {
    runner: Arc<dyn CommandRunner>,
    root: PathBuf,
}

impl NpmCli {
    /// Create an npm CLI collaborator rooted at a project directory
    pub fn new(runner: Arc<dyn CommandRunner>, root: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            root: root.into(),
        }
    }

    async fn run_mutation(&self, args: &[&str]) -> Result<MutationOutcome, MutationError> {
        let action = format!("npm {}", args.join(" "));
        let output = self
            .runner
            .run("npm", args, &self.root)
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::TimedOut => MutationError::timeout(&action),
                _ => MutationError::failed(&action, e.to_string()),
            })?;

        Ok(MutationOutcome {
            success: output.success(),
            message: output.message(),
            action,
        })
    }
}

#[async_trait]
impl PackageMutator for NpmCli {
    async fn install(
        &self,
        name: &str,
        version: Option<&str>,
    ) -> Result<MutationOutcome, MutationError> {
        let spec = match version {
            Some(version) => format!("{}@{}", name, version),
            None => name.to_string(),
        };
        self.run_mutation(&["install", &spec]).await
    }

    async fn uninstall(&self, name: &str) -> Result<MutationOutcome, MutationError> {
        self.run_mutation(&["uninstall", name]).await
    }

    async fn audit_fix(&self) -> Result<MutationOutcome, MutationError> {
        self.run_mutation(&["audit", "fix"]).await
    }
}

#[async_trait]
impl DependencyIntrospector for NpmCli {
    async fn dependency_tree(&self) -> Result<DependencyTreeNode, TreeError> {
        let output = self
            .runner
            .run("npm", &["ls", "--all", "--long", "--json"], &self.root)
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::TimedOut => TreeError::Timeout,
                _ => TreeError::unavailable(e.to_string()),
            })?;

        // npm ls signals unmet peers through its exit code while still
        // emitting a valid report; the body is authoritative
        let report: serde_json::Value =
            serde_json::from_str(&output.stdout).map_err(|_| {
                TreeError::unavailable(if output.stderr.trim().is_empty() {
                    "introspection produced no parseable report".to_string()
                } else {
                    output.stderr.trim().to_string()
                })
            })?;

        DependencyTreeNode::from_report(&report)
    }

    async fn declared_dependencies(
        &self,
        name: &str,
        version: &str,
    ) -> Result<BTreeMap<String, String>, TreeError> {
        let spec = format!("{}@{}", name, version);
        let output = self
            .runner
            .run("npm", &["view", &spec, "dependencies", "--json"], &self.root)
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::TimedOut => TreeError::Timeout,
                _ => TreeError::unavailable(e.to_string()),
            })?;

        let body = output.stdout.trim();
        // A package with no dependencies prints nothing
        if body.is_empty() {
            if output.success() {
                return Ok(BTreeMap::new());
            }
            return Err(TreeError::unavailable(output.message()));
        }

        let value: serde_json::Value = serde_json::from_str(body)
            .map_err(|_| TreeError::unavailable(format!("unparseable metadata for {}", spec)))?;

        let mut ranges = BTreeMap::new();
        if let Some(entries) = value.as_object() {
            for (dep, range) in entries {
                if let Some(range) = range.as_str() {
                    ranges.insert(dep.clone(), range.to_string());
                }
            }
        }
        Ok(ranges)
    }

    async fn installed_licenses(&self) -> Result<BTreeMap<String, Option<String>>, TreeError> {
        let tree = self.dependency_tree().await?;
        Ok(tree.collect_licenses())
    }
}

/// Guard making the at-most-one-mutation-in-flight assumption
/// load-bearing: a second mutation fails with `MutationError::InFlight`
/// instead of queueing.
#[derive(Default)]
pub struct MutationGate {
    token: tokio::sync::Mutex<()>,
}

/// Held for the duration of one mutation
pub struct MutationPermit<'a> {
    _guard: tokio::sync::MutexGuard<'a, ()>,
}

impl MutationGate {
    /// Create a new gate
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the mutation token without waiting
    pub fn try_acquire(&self) -> Result<MutationPermit<'_>, MutationError> {
        self.token
            .try_lock()
            .map(|guard| MutationPermit { _guard: guard })
            .map_err(|_| MutationError::InFlight)
    }
}
