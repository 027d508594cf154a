//! CLI argument parsing module for depdex

use crate::command::Command;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Default number of search results to request
const DEFAULT_SEARCH_LIMIT: usize = 10;

/// npm dependency management assistant
#[derive(Parser, Debug, Clone)]
#[command(name = "depdex", version, about = "npm dependency management assistant")]
pub struct CliArgs {
    /// The action to perform
    #[command(subcommand)]
    pub action: Action,

    /// Project directory containing package.json (default: current directory)
    #[arg(short = 'C', long = "dir", default_value = ".", global = true)]
    pub path: PathBuf,

    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Enable quiet mode - minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// CLI subcommands; each maps onto exactly one core command
#[derive(Subcommand, Debug, Clone)]
pub enum Action {
    /// Show declared dependencies enriched with registry versions,
    /// licenses, and security advisories
    List,

    /// Show available versions for a package, newest first
    Versions {
        /// Package name
        name: String,
    },

    /// Search the npm registry
    Search {
        /// Query text
        query: String,
        /// Maximum number of results
        #[arg(long, default_value_t = DEFAULT_SEARCH_LIMIT)]
        limit: usize,
    },

    /// Install a package
    Install {
        /// Package name
        name: String,
        /// Specific version (default: the registry's latest)
        #[arg(long)]
        version: Option<String>,
    },

    /// Change an installed package to a specific version
    Update {
        /// Package name
        name: String,
        /// Target version
        #[arg(long)]
        version: String,
    },

    /// Uninstall a package, showing which packages directly depend on it
    Uninstall {
        /// Package name
        name: String,
        /// Skip the reverse-dependency impact preamble
        #[arg(long)]
        force: bool,
    },

    /// Show current security advisories
    Audit,

    /// Apply automatic advisory remediation
    AuditFix,

    /// Show installed packages whose license is unknown or missing
    Licenses,

    /// Show which installed packages directly depend on a target
    Impact {
        /// Package name
        name: String,
    },

    /// Predict conflicts from installing a candidate package
    Conflicts {
        /// Candidate package name
        name: String,
        /// Candidate version
        version: String,
    },
}

impl CliArgs {
    /// Translate the parsed CLI action into a core command
    pub fn to_command(&self) -> Command {
        match &self.action {
            Action::List => Command::List,
            Action::Versions { name } => Command::Versions { name: name.clone() },
            Action::Search { query, limit } => Command::Search {
                query: query.clone(),
                limit: *limit,
            },
            Action::Install { name, version } => Command::Install {
                name: name.clone(),
                version: version.clone(),
            },
            Action::Update { name, version } => Command::Update {
                name: name.clone(),
                version: version.clone(),
            },
            Action::Uninstall { name, force } => Command::Uninstall {
                name: name.clone(),
                force: *force,
            },
            Action::Audit => Command::Audit,
            Action::AuditFix => Command::AuditFix,
            Action::Licenses => Command::Licenses,
            Action::Impact { name } => Command::Impact { name: name.clone() },
            Action::Conflicts { name, version } => Command::Conflicts {
                name: name.clone(),
                version: version.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::parse_from(args)
    }

    #[test]
    fn test_list_defaults() {
        let args = parse(&["depdex", "list"]);
        assert_eq!(args.to_command(), Command::List);
        assert_eq!(args.path, PathBuf::from("."));
        assert!(!args.json);
    }

    #[test]
    fn test_versions_subcommand() {
        let args = parse(&["depdex", "versions", "lodash"]);
        assert_eq!(
            args.to_command(),
            Command::Versions {
                name: "lodash".to_string()
            }
        );
    }

    #[test]
    fn test_search_with_limit() {
        let args = parse(&["depdex", "search", "http client", "--limit", "5"]);
        assert_eq!(
            args.to_command(),
            Command::Search {
                query: "http client".to_string(),
                limit: 5
            }
        );
    }

    #[test]
    fn test_search_default_limit() {
        let args = parse(&["depdex", "search", "express"]);
        assert!(matches!(
            args.to_command(),
            Command::Search { limit: DEFAULT_SEARCH_LIMIT, .. }
        ));
    }

    #[test]
    fn test_install_with_version() {
        let args = parse(&["depdex", "install", "react", "--version", "18.2.0"]);
        assert_eq!(
            args.to_command(),
            Command::Install {
                name: "react".to_string(),
                version: Some("18.2.0".to_string())
            }
        );
    }

    #[test]
    fn test_update_requires_version() {
        let result = CliArgs::try_parse_from(["depdex", "update", "react"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_uninstall_force() {
        let args = parse(&["depdex", "uninstall", "lodash", "--force"]);
        assert_eq!(
            args.to_command(),
            Command::Uninstall {
                name: "lodash".to_string(),
                force: true
            }
        );
    }

    #[test]
    fn test_conflicts_subcommand() {
        let args = parse(&["depdex", "conflicts", "webpack", "5.90.0"]);
        assert_eq!(
            args.to_command(),
            Command::Conflicts {
                name: "webpack".to_string(),
                version: "5.90.0".to_string()
            }
        );
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = parse(&["depdex", "audit", "--json", "-C", "/tmp/project"]);
        assert!(args.json);
        assert_eq!(args.path, PathBuf::from("/tmp/project"));
        assert_eq!(args.to_command(), Command::Audit);
    }
}
