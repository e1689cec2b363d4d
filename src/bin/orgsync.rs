//! # orgsync
//!
//! Command-line entry point: load department and user CSV files and converge
//! them onto the directory service, or print the plan with `--dry-run`.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use std::process;

use orgsync::client::DirectoryClient;
use orgsync::config::SyncConfig;
use orgsync::logging::init_structured_logging;
use orgsync::orchestration::{plan_dry_run, DryRunPlan, SyncCoordinator, SyncReport};
use orgsync::{input, DepartmentOutcome};

#[derive(Parser)]
#[command(name = "orgsync")]
#[command(about = "Synchronize departments and users from CSV into the directory service")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Department CSV (overrides configuration)
    #[arg(long)]
    departments: Option<PathBuf>,

    /// User CSV (overrides configuration)
    #[arg(long)]
    users: Option<PathBuf>,

    /// Configuration file (default: ./orgsync.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Validate input and print the plan without calling the service
    #[arg(long)]
    dry_run: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_structured_logging();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config =
        SyncConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(path) = cli.departments {
        config.departments_csv = path;
    }
    if let Some(path) = cli.users {
        config.users_csv = path;
    }

    let departments = input::load_departments(&config.departments_csv)
        .with_context(|| display_context("departments", &config.departments_csv))?;
    let users = input::load_users(&config.users_csv)
        .with_context(|| display_context("users", &config.users_csv))?;

    if cli.dry_run {
        let plan = plan_dry_run(&departments, &users).context("Dry run failed")?;
        return print_plan(&plan, cli.format);
    }

    config.validate()?;
    let client = DirectoryClient::new(&config)?;
    let report = SyncCoordinator::from_config(client, &config)
        .run(&departments, &users)
        .await
        .context("Sync failed")?;

    print_report(&report, cli.format)
}

fn display_context(kind: &str, path: &Path) -> String {
    format!("Failed to load {kind} from {}", path.display())
}

fn print_plan(plan: &DryRunPlan, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(plan)?),
        OutputFormat::Text => {
            println!("Departments ({}), in creation order:", plan.departments.len());
            for (position, dept) in plan.departments.iter().enumerate() {
                let parent = match (&dept.parent_external_id, dept.parent_outside_input) {
                    (Some(parent), true) => format!(" (parent {parent}, expected remotely)"),
                    (Some(parent), false) => format!(" (parent {parent})"),
                    (None, _) => String::new(),
                };
                println!("  {}. {} [{}]{parent}", position + 1, dept.name, dept.external_id);
            }
            println!("Users ({}):", plan.users.len());
            for user in &plan.users {
                println!(
                    "  {} {} <{}> -> {}",
                    user.first, user.last, user.nickname, user.dept_external_id
                );
            }
        }
    }
    Ok(())
}

fn print_report(report: &SyncReport, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Text => {
            let summary = &report.summary;
            println!("Run {} finished in {} ms", report.run_id, report.duration_ms());
            println!(
                "Departments: {} total, {} existing, {} adopted, {} created, {} resolved after conflict",
                summary.departments_total,
                summary.departments_existing,
                summary.departments_adopted,
                summary.departments_created,
                summary.departments_resolved_after_conflict
            );
            for dept in report
                .departments
                .iter()
                .filter(|d| d.outcome == DepartmentOutcome::CreatedAfterFailedAdoption)
            {
                println!(
                    "  warning: {} was created after a failed adoption; check for a duplicate name",
                    dept.external_id
                );
            }
            println!(
                "Users: {} created, {} already existed",
                summary.users_created, summary.users_existing
            );
        }
    }
    Ok(())
}
