//! CLI binary entry point for phantom-export

#[cfg(feature = "cli")]
use anyhow::Context;
#[cfg(feature = "cli")]
use chrono::NaiveDate;
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand, ValueEnum};
#[cfg(feature = "cli")]
use phantom_pbi_export::cli::commands::export::{ExportArgs, PackageKind, handle_export};
#[cfg(feature = "cli")]
use phantom_pbi_export::cli::commands::inspect::{
    MeasuresArgs, handle_config_init, handle_measures, handle_schema,
};
#[cfg(feature = "cli")]
use phantom_pbi_export::models::Scenario;
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "phantom-export")]
#[command(about = "Export Phantom dashboards as Power BI templates and projects")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Build a template (.pbit) or project (PBIP) package
    Export {
        /// Package shape
        #[arg(value_enum)]
        kind: PackageKindArg,
        /// JSON file with the dashboard items
        items: PathBuf,
        /// Scenario of the dashboard
        #[arg(short, long, default_value = "Retail")]
        scenario: Scenario,
        /// JSON data snapshot embedded in project packages
        #[arg(long)]
        snapshot: Option<PathBuf>,
        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
        /// Directory containing .phantom-export.toml
        #[arg(long)]
        config_dir: Option<PathBuf>,
        /// Project name, overrides the configuration
        #[arg(long)]
        project: Option<String>,
        /// Seed for reproducible identifiers
        #[arg(long)]
        seed: Option<u64>,
        /// Export date (YYYY-MM-DD) for a reproducible filename and timestamp
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Skip writing the Markdown guide
        #[arg(long)]
        no_docs: bool,
        /// Overwrite existing files without prompting
        #[arg(short, long)]
        force: bool,
    },
    /// Print the DAX measures generated for a dashboard
    Measures {
        /// JSON file with the dashboard items
        items: PathBuf,
        #[arg(short, long, default_value = "Retail")]
        scenario: Scenario,
        /// Write JSON to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        config_dir: Option<PathBuf>,
        #[arg(short, long)]
        force: bool,
    },
    /// Print the star schema of a scenario
    Schema {
        scenario: Scenario,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(short, long)]
        force: bool,
    },
    /// Write a sample .phantom-export.toml
    InitConfig {
        #[arg(default_value = ".")]
        dir: PathBuf,
        #[arg(short, long)]
        force: bool,
    },
}

#[cfg(feature = "cli")]
#[derive(Clone, Copy, ValueEnum)]
enum PackageKindArg {
    Template,
    Project,
}

#[cfg(feature = "cli")]
impl From<PackageKindArg> for PackageKind {
    fn from(arg: PackageKindArg) -> Self {
        match arg {
            PackageKindArg::Template => PackageKind::Template,
            PackageKindArg::Project => PackageKind::Project,
        }
    }
}

#[cfg(feature = "cli")]
fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Export {
            kind,
            items,
            scenario,
            snapshot,
            output,
            config_dir,
            project,
            seed,
            date,
            no_docs,
            force,
        } => {
            let args = ExportArgs {
                kind: kind.into(),
                items,
                scenario,
                snapshot,
                output_dir: output,
                config_dir,
                project_name: project,
                seed,
                date,
                no_docs,
                force,
            };
            handle_export(&args).context("export failed")?;
        }
        Commands::Measures {
            items,
            scenario,
            output,
            config_dir,
            force,
        } => {
            let args = MeasuresArgs {
                items,
                scenario,
                output,
                config_dir,
                force,
            };
            handle_measures(&args).context("measure generation failed")?;
        }
        Commands::Schema {
            scenario,
            output,
            force,
        } => {
            handle_schema(scenario, output.as_ref(), force)
                .with_context(|| format!("schema output failed for {}", scenario))?;
        }
        Commands::InitConfig { dir, force } => {
            handle_config_init(&dir, force).context("config init failed")?;
        }
    }

    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature is not enabled. Build with --features cli");
    std::process::exit(1);
}
