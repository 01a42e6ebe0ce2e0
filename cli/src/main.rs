use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use node_health_core::Severity;
use node_health_engine::{
    AnalyserConfig, CatalogueCache, CheckRegistry, analyse_nodes, format_checks, format_reports,
    read_inputs,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// CLI-specific output format enum with clap argument parsing support.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
    Table,
}

impl From<CliOutputFormat> for node_health_engine::OutputFormat {
    fn from(fmt: CliOutputFormat) -> Self {
        match fmt {
            CliOutputFormat::Json => Self::Json,
            CliOutputFormat::Yaml => Self::Yaml,
            CliOutputFormat::Table => Self::Table,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "node-health")]
#[command(about = "Health-check analysis of controller-node console transcripts")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Analyse one or more transcript files (node name = file stem).
    Analyse(AnalyseArgs),
    /// List the registered checks in report order.
    Checks,
}

#[derive(Debug, Args)]
struct AnalyseArgs {
    /// Transcript files to analyse.
    #[arg(required = true)]
    files: Vec<PathBuf>,
    /// YAML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Directory holding alarm catalogues (overrides the config file).
    #[arg(long)]
    reference_dir: Option<PathBuf>,
    /// Number of nodes analysed in parallel (default: number of CPUs).
    #[arg(long)]
    jobs: Option<usize>,
    /// Output format.
    #[arg(long, default_value = "table")]
    format: CliOutputFormat,
    /// Log per-check decisions to stderr.
    #[arg(long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let verbose = matches!(&cli.command, Command::Analyse(args) if args.verbose);
    init_tracing(verbose);

    let result = match cli.command {
        Command::Analyse(args) => run_analyse(args),
        Command::Checks => run_checks(),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

/// `RUST_LOG` wins when set; otherwise `warn`, or `debug` with `--verbose`.
fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run_analyse(args: AnalyseArgs) -> Result<(), String> {
    let registry = CheckRegistry::standard();
    let config = load_config(&args, registry)?;

    let inputs = read_inputs(&args.files).map_err(|e| e.to_string())?;
    let cache = CatalogueCache::new();
    let reports =
        analyse_nodes(registry, &cache, &config, &inputs).map_err(|e| e.to_string())?;

    let flagged = reports
        .iter()
        .filter(|report| report.worst_severity() != Severity::Ok)
        .count();
    info!(nodes = reports.len(), flagged, "Analysis finished");

    let out = format_reports(&reports, args.format.into()).map_err(|e| e.to_string())?;
    print!("{out}");
    if !out.ends_with('\n') {
        println!();
    }
    Ok(())
}

fn load_config(args: &AnalyseArgs, registry: &CheckRegistry) -> Result<AnalyserConfig, String> {
    let mut config = match &args.config {
        Some(path) => AnalyserConfig::load(path)
            .map_err(|e| format!("Failed to load config '{}': {e}", path.display()))?,
        None => AnalyserConfig::default(),
    };

    if let Some(dir) = &args.reference_dir {
        config.reference_dir = dir.clone();
    }
    if args.jobs.is_some() {
        config.jobs = args.jobs;
    }

    config.validate(registry).map_err(|e| e.to_string())?;
    Ok(config)
}

fn run_checks() -> Result<(), String> {
    print!("{}", format_checks(CheckRegistry::standard()));
    Ok(())
}
