//! depdex - npm dependency management assistant CLI
//!
//! Inspects a project's package.json, enriches it with registry and
//! audit data, and delegates mutations to the npm CLI.

use clap::Parser;
use depdex::audit::NpmAudit;
use depdex::cli::CliArgs;
use depdex::command::{Command, CommandOutput};
use depdex::domain::DependencyReportSet;
use depdex::manifest::PackageJsonSource;
use depdex::output::{create_formatter, OutputConfig};
use depdex::package_manager::{NpmCli, SystemCommandRunner};
use depdex::progress::Progress;
use depdex::registry::{HttpClient, NpmRegistry};
use depdex::service::DependencyService;
use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    match run(args).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Main application logic
async fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    if args.verbose {
        eprintln!("depdex v{}", env!("CARGO_PKG_VERSION"));
        eprintln!("Project: {}", args.path.display());
    }

    let service = build_service(&args)?;
    let command = args.to_command();

    let mut progress = Progress::new(!args.quiet && !args.json);
    progress.spinner(spinner_message(&command));
    let result = service.dispatch(command).await;
    progress.finish_and_clear();

    let output = result?;

    let output_config = OutputConfig::from_cli(args.json, args.verbose, args.quiet);
    let formatter = create_formatter(output_config);

    let mut stdout = io::stdout().lock();
    formatter.format(&output, &mut stdout)?;
    stdout.flush()?;

    Ok(exit_code_for(&output))
}

/// Wire the service to the real registry, npm CLI, and filesystem
fn build_service(args: &CliArgs) -> anyhow::Result<DependencyService> {
    let runner = Arc::new(SystemCommandRunner::new());
    let npm = Arc::new(NpmCli::new(runner.clone(), &args.path));

    Ok(DependencyService::new(
        Arc::new(PackageJsonSource::new(&args.path)),
        Arc::new(NpmRegistry::new(HttpClient::new()?)),
        Arc::new(NpmAudit::new(runner, &args.path)),
        npm.clone(),
        npm,
    ))
}

/// Spinner message while a command runs
fn spinner_message(command: &Command) -> &'static str {
    match command {
        Command::List => "Fetching dependency report...",
        Command::Versions { .. } => "Fetching versions...",
        Command::Search { .. } => "Searching registry...",
        Command::Install { .. } => "Installing...",
        Command::Update { .. } => "Updating...",
        Command::Uninstall { .. } => "Uninstalling...",
        Command::Audit => "Running security audit...",
        Command::AuditFix => "Applying audit fixes...",
        Command::Licenses => "Checking installed licenses...",
        Command::Impact { .. } => "Analyzing reverse dependencies...",
        Command::Conflicts { .. } => "Predicting conflicts...",
    }
}

/// Exit code policy: 0 on success, 1 on failure, 2 on partial results
fn exit_code_for(output: &CommandOutput) -> ExitCode {
    match output {
        CommandOutput::Report(set) => report_exit_code(set),
        CommandOutput::Mutation(report) => {
            if !report.outcome.success {
                ExitCode::FAILURE
            } else if let Some(refreshed) = &report.refreshed {
                report_exit_code(refreshed)
            } else {
                ExitCode::SUCCESS
            }
        }
        _ => ExitCode::SUCCESS,
    }
}

fn report_exit_code(set: &DependencyReportSet) -> ExitCode {
    if set.has_fetch_failures() || set.audit_degraded.is_some() {
        ExitCode::from(2)
    } else {
        ExitCode::SUCCESS
    }
}
