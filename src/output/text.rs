//! Text output formatter for human-readable display
//!
//! This module provides:
//! - Enriched dependency report display with colors
//! - Per-package "error fetching" states for degraded lookups
//! - Severity-colored advisory listing
//! - Mutation outcomes with impact preamble and refreshed report

use crate::analyzer::{ConflictPrediction, ImpactResult};
use crate::command::{CommandOutput, MutationReport};
use crate::domain::version::{compare, is_upgrade, strip_range_prefix};
use crate::domain::{
    AdvisoryRecord, DependencyReport, DependencyReportSet, FetchOutcome, LicenseStatus,
    LicenseVerdict, Severity,
};
use crate::output::{OutputFormatter, Verbosity};
use crate::registry::SearchResult;
use colored::Colorize;
use std::cmp::Ordering;
use std::io::Write;

/// Number of versions shown per package at normal verbosity
const VERSION_PREVIEW_COUNT: usize = 5;

/// Text formatter for human-readable output
pub struct TextFormatter {
    /// Verbosity level
    verbosity: Verbosity,
    /// Whether to use colors
    color: bool,
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            color: true,
        }
    }

    /// Create a new text formatter with color option
    pub fn with_color(verbosity: Verbosity, color: bool) -> Self {
        Self { verbosity, color }
    }

    /// Severity label, colored by how severe it is
    fn severity_label(&self, severity: Severity) -> String {
        if !self.color {
            return severity.to_string();
        }
        match severity {
            Severity::Critical => "critical".red().bold().to_string(),
            Severity::High => "high".red().to_string(),
            Severity::Moderate => "moderate".yellow().to_string(),
            Severity::Low => "low".cyan().to_string(),
            Severity::Info => "info".dimmed().to_string(),
        }
    }

    fn dim(&self, text: &str) -> String {
        if self.color {
            text.dimmed().to_string()
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        if self.color {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn error_state(&self, message: &str) -> String {
        let text = format!("error fetching: {}", message);
        if self.color {
            text.red().to_string()
        } else {
            text
        }
    }

    /// Latest-version cell: newest available with its relation to the
    /// declared version, or the degraded state
    fn versions_cell(&self, outcome: &FetchOutcome<Vec<String>>, declared_range: &str) -> String {
        match outcome {
            FetchOutcome::Loaded { value } => match value.first() {
                Some(latest) => match version_relation(latest, declared_range) {
                    Some(label) => {
                        format!("latest {} {}", latest, self.dim(&format!("({})", label)))
                    }
                    None => format!("latest {}", latest),
                },
                None => self.dim("no versions"),
            },
            FetchOutcome::Failed { error } => self.error_state(error),
        }
    }

    /// License cell: declared license, or the degraded state
    fn license_cell(&self, outcome: &FetchOutcome<Option<String>>) -> String {
        match outcome {
            FetchOutcome::Loaded { value } => match value {
                Some(license) => license.clone(),
                None => self.dim("no license"),
            },
            FetchOutcome::Failed { error } => self.error_state(error),
        }
    }

    fn format_report_line(
        &self,
        report: &DependencyReport,
        max_name_len: usize,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let dev_marker = if report.dependency.is_dev {
            self.dim(" (dev)")
        } else {
            String::new()
        };
        writeln!(
            writer,
            "  {:width$} {:10} {} | {}{}",
            self.bold(&report.dependency.name),
            report.dependency.declared_range,
            self.versions_cell(
                &report.available_versions,
                &report.dependency.declared_range
            ),
            self.license_cell(&report.license),
            dev_marker,
            width = max_name_len
        )?;
        if let Some(advisory) = &report.advisory {
            writeln!(
                writer,
                "  {:width$} {} {} ({} {})",
                "",
                self.severity_label(advisory.severity),
                advisory.title,
                advisory.vulnerability_count,
                if advisory.vulnerability_count == 1 {
                    "advisory"
                } else {
                    "advisories"
                },
                width = max_name_len
            )?;
        }
        Ok(())
    }

    fn format_report_set(
        &self,
        set: &DependencyReportSet,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        if set.dependencies.is_empty() {
            writeln!(writer, "No dependencies declared.")?;
            return Ok(());
        }

        let max_name_len = set
            .dependencies
            .iter()
            .map(|r| r.dependency.name.len())
            .max()
            .unwrap_or(0)
            .max(12);

        let (prod, dev): (Vec<&DependencyReport>, Vec<&DependencyReport>) = set
            .dependencies
            .iter()
            .partition(|r| !r.dependency.is_dev);

        if !prod.is_empty() {
            writeln!(writer, "{}", self.bold("dependencies"))?;
            for report in &prod {
                self.format_report_line(report, max_name_len, writer)?;
            }
        }
        if !dev.is_empty() {
            if !prod.is_empty() {
                writeln!(writer)?;
            }
            writeln!(writer, "{}", self.bold("devDependencies"))?;
            for report in &dev {
                self.format_report_line(report, max_name_len, writer)?;
            }
        }

        if let Some(reason) = &set.audit_degraded {
            writeln!(writer)?;
            writeln!(
                writer,
                "{}",
                self.dim(&format!("advisories unavailable: {}", reason))
            )?;
        }
        Ok(())
    }

    fn format_versions(
        &self,
        name: &str,
        versions: &[String],
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        if versions.is_empty() {
            writeln!(writer, "No versions found for {}", self.bold(name))?;
            return Ok(());
        }
        writeln!(
            writer,
            "{} — {} {}",
            self.bold(name),
            versions.len(),
            if versions.len() == 1 {
                "version"
            } else {
                "versions"
            }
        )?;
        let shown = if self.verbosity == Verbosity::Verbose {
            versions.len()
        } else {
            versions.len().min(VERSION_PREVIEW_COUNT)
        };
        for version in &versions[..shown] {
            writeln!(writer, "  {}", version)?;
        }
        if shown < versions.len() {
            writeln!(
                writer,
                "  {}",
                self.dim(&format!("… {} more (--verbose to show all)", versions.len() - shown))
            )?;
        }
        Ok(())
    }

    fn format_search(
        &self,
        results: &[SearchResult],
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        if results.is_empty() {
            writeln!(writer, "No packages matched.")?;
            return Ok(());
        }
        for result in results {
            let date = result
                .published
                .map(|d| self.dim(&format!(" ({})", d.format("%Y/%m/%d"))))
                .unwrap_or_default();
            writeln!(
                writer,
                "{}@{}{}",
                self.bold(&result.name),
                result.version,
                date
            )?;
            if let Some(description) = &result.description {
                writeln!(writer, "  {}", self.dim(description))?;
            }
        }
        Ok(())
    }

    fn format_impact(&self, impact: &ImpactResult, writer: &mut dyn Write) -> std::io::Result<()> {
        if impact.impacted.is_empty() {
            writeln!(
                writer,
                "No installed packages directly depend on {}.",
                self.bold(&impact.package)
            )?;
            return Ok(());
        }
        writeln!(
            writer,
            "{} {} directly on {}:",
            impact.impacted.len(),
            if impact.impacted.len() == 1 {
                "package depends"
            } else {
                "packages depend"
            },
            self.bold(&impact.package)
        )?;
        for name in &impact.impacted {
            writeln!(writer, "  {}", name)?;
        }
        Ok(())
    }

    fn format_conflicts(
        &self,
        prediction: &ConflictPrediction,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let candidate = format!("{}@{}", prediction.package, prediction.version);
        if prediction.is_clean() {
            writeln!(
                writer,
                "No conflicts predicted for {}.",
                self.bold(&candidate)
            )?;
            return Ok(());
        }
        writeln!(
            writer,
            "{} predicted {} for {}:",
            prediction.conflicts.len(),
            if prediction.conflicts.len() == 1 {
                "conflict"
            } else {
                "conflicts"
            },
            self.bold(&candidate)
        )?;
        for conflict in &prediction.conflicts {
            writeln!(
                writer,
                "  {} installed {} but {} requires {}",
                self.bold(&conflict.name),
                conflict.current_version,
                candidate,
                conflict.required_range
            )?;
        }
        Ok(())
    }

    fn format_advisories(
        &self,
        advisories: &[AdvisoryRecord],
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        if advisories.is_empty() {
            writeln!(writer, "No known security advisories.")?;
            return Ok(());
        }
        for advisory in advisories {
            writeln!(
                writer,
                "{} {} — {} ({} {})",
                self.severity_label(advisory.severity),
                self.bold(&advisory.package),
                advisory.title,
                advisory.vulnerability_count,
                if advisory.vulnerability_count == 1 {
                    "advisory"
                } else {
                    "advisories"
                }
            )?;
        }
        Ok(())
    }

    fn format_licenses(
        &self,
        verdicts: &[LicenseVerdict],
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        if verdicts.is_empty() {
            writeln!(writer, "All installed package licenses are recognized.")?;
            return Ok(());
        }
        for verdict in verdicts {
            let detail = match verdict.status {
                LicenseStatus::Missing => self.dim("no license declared"),
                _ => match &verdict.license {
                    Some(license) => format!("unrecognized license: {}", license),
                    None => self.dim("no license declared"),
                },
            };
            writeln!(writer, "{} — {}", self.bold(&verdict.package), detail)?;
        }
        Ok(())
    }

    fn format_mutation(
        &self,
        report: &MutationReport,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        if let Some(impact) = &report.impact {
            self.format_impact(impact, writer)?;
            writeln!(writer)?;
        }

        let status = if report.outcome.success {
            if self.color {
                "done".green().to_string()
            } else {
                "done".to_string()
            }
        } else if self.color {
            "failed".red().bold().to_string()
        } else {
            "failed".to_string()
        };
        writeln!(writer, "{} {}", self.bold(&report.outcome.action), status)?;

        // Package manager output is passed through verbatim
        if !report.outcome.message.is_empty()
            && (!report.outcome.success || self.verbosity == Verbosity::Verbose)
        {
            writeln!(writer, "{}", report.outcome.message.trim_end())?;
        }

        if let Some(refreshed) = &report.refreshed {
            writeln!(writer)?;
            self.format_report_set(refreshed, writer)?;
        }
        Ok(())
    }
}

/// Relation of the newest available version to the declared one.
/// `None` when either side cannot be compared.
fn version_relation(latest: &str, declared_range: &str) -> Option<&'static str> {
    match is_upgrade(latest, declared_range) {
        Ok(true) => Some("upgrade"),
        Ok(false) => match compare(latest, strip_range_prefix(declared_range)) {
            Ok(Ordering::Less) => Some("downgrade"),
            Ok(Ordering::Equal) => Some("current"),
            _ => None,
        },
        Err(_) => None,
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, output: &CommandOutput, writer: &mut dyn Write) -> std::io::Result<()> {
        if self.verbosity == Verbosity::Quiet {
            // Quiet mode still reports failures
            if let CommandOutput::Mutation(report) = output {
                if !report.outcome.success {
                    writeln!(writer, "{}", report.outcome.message.trim_end())?;
                }
            }
            return Ok(());
        }

        match output {
            CommandOutput::Report(set) => self.format_report_set(set, writer),
            CommandOutput::Versions { name, versions } => {
                self.format_versions(name, versions, writer)
            }
            CommandOutput::Search { results } => self.format_search(results, writer),
            CommandOutput::Mutation(report) => self.format_mutation(report, writer),
            CommandOutput::Advisories { advisories } => self.format_advisories(advisories, writer),
            CommandOutput::Licenses { verdicts } => self.format_licenses(verdicts, writer),
            CommandOutput::Impact(impact) => self.format_impact(impact, writer),
            CommandOutput::Conflicts(prediction) => self.format_conflicts(prediction, writer),
        }
    }
}
