//! depdex - npm dependency management assistant library
//!
//! This library provides the core functionality for inspecting and
//! mutating a project's npm dependencies:
//! - Enriched dependency reports (versions, licenses, advisories)
//! - Registry queries (versions, search)
//! - Mutations delegated to the npm CLI (install, update, uninstall)
//! - Reverse-dependency impact and conflict prediction

pub mod analyzer;
pub mod audit;
pub mod cli;
pub mod command;
pub mod compliance;
pub mod domain;
pub mod error;
pub mod manifest;
pub mod output;
pub mod package_manager;
pub mod progress;
pub mod registry;
pub mod service;
