//! Service layer coordinating the enrichment pipeline and command
//! dispatch
//!
//! Responsibilities:
//! - Refresh cycle: read manifest, run the audit, fetch registry
//!   versions and licenses concurrently, join everything by package name
//! - Mutation routing through the mutation gate, with a fresh refresh
//!   after a successful mutation
//! - Analyses over a freshly-fetched dependency tree
//!
//! Failure policy: per-package enrichment failures degrade to an
//! explicit error state on that package alone; an unavailable audit
//! degrades the whole advisory set to empty (flagged on the report);
//! an unavailable tree aborts only the analysis that needed it.

use crate::analyzer;
use crate::audit::VulnerabilityReporter;
use crate::command::{Command, CommandOutput, MutationReport};
use crate::domain::{DependencyReport, DependencyReportSet, FetchOutcome};
use crate::error::{AppError, ManifestError};
use crate::manifest::ManifestSource;
use crate::package_manager::{DependencyIntrospector, MutationGate, MutationOutcome, PackageMutator};
use crate::registry::PackageRegistry;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::task::JoinSet;

/// Coordinates collaborators on behalf of the command router
pub struct DependencyService {
    manifest: Arc<dyn ManifestSource>,
    registry: Arc<dyn PackageRegistry>,
    auditor: Arc<dyn VulnerabilityReporter>,
    introspector: Arc<dyn DependencyIntrospector>,
    mutator: Arc<dyn PackageMutator>,
    gate: MutationGate,
}

impl DependencyService {
    /// Create a service over its five collaborators
    pub fn new(
        manifest: Arc<dyn ManifestSource>,
        registry: Arc<dyn PackageRegistry>,
        auditor: Arc<dyn VulnerabilityReporter>,
        introspector: Arc<dyn DependencyIntrospector>,
        mutator: Arc<dyn PackageMutator>,
    ) -> Self {
        Self {
            manifest,
            registry,
            auditor,
            introspector,
            mutator,
            gate: MutationGate::new(),
        }
    }

    /// Route a command to its operation. The match is exhaustive: adding
    /// a command variant forces a decision here.
    pub async fn dispatch(&self, command: Command) -> Result<CommandOutput, AppError> {
        match command {
            Command::List => Ok(CommandOutput::Report(self.refresh().await?)),
            Command::Versions { name } => {
                let versions = self.registry.fetch_versions(&name).await?;
                Ok(CommandOutput::Versions { name, versions })
            }
            Command::Search { query, limit } => {
                let results = self.registry.search(&query, limit).await?;
                Ok(CommandOutput::Search { results })
            }
            Command::Install { name, version } => {
                let outcome = {
                    let _permit = self.gate.try_acquire()?;
                    self.mutator.install(&name, version.as_deref()).await?
                };
                Ok(CommandOutput::Mutation(
                    self.mutation_report(outcome, None).await,
                ))
            }
            Command::Update { name, version } => {
                let outcome = {
                    let _permit = self.gate.try_acquire()?;
                    self.mutator.install(&name, Some(&version)).await?
                };
                Ok(CommandOutput::Mutation(
                    self.mutation_report(outcome, None).await,
                ))
            }
            Command::Uninstall { name, force } => {
                // Advisory preamble: which packages directly depend on
                // the target. A tree failure aborts only this analysis,
                // never the uninstall itself.
                let impact = if force {
                    None
                } else {
                    match self.introspector.dependency_tree().await {
                        Ok(tree) => Some(analyzer::compute_impact(&tree, &name)),
                        Err(_) => None,
                    }
                };
                let outcome = {
                    let _permit = self.gate.try_acquire()?;
                    self.mutator.uninstall(&name).await?
                };
                Ok(CommandOutput::Mutation(
                    self.mutation_report(outcome, impact).await,
                ))
            }
            Command::Audit => {
                let advisories = self.auditor.fetch_advisories().await?;
                Ok(CommandOutput::Advisories {
                    advisories: advisories.into_values().collect(),
                })
            }
            Command::AuditFix => {
                let outcome = {
                    let _permit = self.gate.try_acquire()?;
                    self.mutator.audit_fix().await?
                };
                Ok(CommandOutput::Mutation(
                    self.mutation_report(outcome, None).await,
                ))
            }
            Command::Licenses => {
                let installed = self.introspector.installed_licenses().await?;
                Ok(CommandOutput::Licenses {
                    verdicts: crate::compliance::check_compliance(&installed),
                })
            }
            Command::Impact { name } => {
                let tree = self.introspector.dependency_tree().await?;
                Ok(CommandOutput::Impact(analyzer::compute_impact(&tree, &name)))
            }
            Command::Conflicts { name, version } => {
                let required = self
                    .introspector
                    .declared_dependencies(&name, &version)
                    .await?;
                let tree = self.introspector.dependency_tree().await?;
                Ok(CommandOutput::Conflicts(analyzer::predict_conflicts(
                    &tree, &name, &version, &required,
                )))
            }
        }
    }

    /// Run one full enrichment cycle.
    ///
    /// The result replaces any previous cycle wholesale. Registry
    /// lookups for all packages run concurrently and are joined back by
    /// package name, so completion order never affects the result.
    pub async fn refresh(&self) -> Result<DependencyReportSet, ManifestError> {
        let declared = self.manifest.read_dependencies().await?;
        let dependencies = declared.to_dependencies();

        let (advisories, audit_degraded) = match self.auditor.fetch_advisories().await {
            Ok(map) => (map, None),
            Err(e) => (BTreeMap::new(), Some(e.to_string())),
        };

        // One lookup per distinct name: a package declared in both
        // dependency sections is fetched once and joined into each report
        let names: BTreeSet<String> = dependencies.iter().map(|d| d.name.clone()).collect();
        let mut lookups = JoinSet::new();
        for name in names {
            let registry = Arc::clone(&self.registry);
            lookups.spawn(async move {
                let versions = registry.fetch_versions(&name).await;
                let license = registry.fetch_license(&name).await;
                (name, versions, license)
            });
        }

        type Enrichment = (FetchOutcome<Vec<String>>, FetchOutcome<Option<String>>);
        let mut by_name: BTreeMap<String, Enrichment> = BTreeMap::new();
        while let Some(joined) = lookups.join_next().await {
            let Ok((name, versions, license)) = joined else {
                continue;
            };
            let versions = match versions {
                Ok(v) => FetchOutcome::loaded(v),
                Err(e) => FetchOutcome::failed(e.to_string()),
            };
            let license = match license {
                Ok(l) => FetchOutcome::loaded(l),
                Err(e) => FetchOutcome::failed(e.to_string()),
            };
            by_name.insert(name, (versions, license));
        }

        let reports = dependencies
            .into_iter()
            .map(|dependency| {
                let (available_versions, license) =
                    by_name.get(&dependency.name).cloned().unwrap_or((
                        FetchOutcome::failed("lookup task did not complete"),
                        FetchOutcome::failed("lookup task did not complete"),
                    ));
                let advisory = advisories.get(&dependency.name).cloned();
                DependencyReport {
                    dependency,
                    available_versions,
                    license,
                    advisory,
                }
            })
            .collect();

        Ok(DependencyReportSet {
            dependencies: reports,
            audit_degraded,
        })
    }

    /// Assemble a mutation report; a successful mutation triggers a
    /// refresh cycle, and a refresh failure after a successful mutation
    /// degrades to no refreshed report rather than failing the command.
    async fn mutation_report(
        &self,
        outcome: MutationOutcome,
        impact: Option<analyzer::ImpactResult>,
    ) -> MutationReport {
        let refreshed = if outcome.success {
            self.refresh().await.ok()
        } else {
            None
        };
        MutationReport {
            outcome,
            impact,
            refreshed,
        }
    }

    /// Expose the gate for callers that coordinate their own mutations
    pub fn mutation_gate(&self) -> &MutationGate {
        &self.gate
    }
}
