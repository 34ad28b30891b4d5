use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use colored::Colorize;
use data_loader::DataIndex;
use reports::{
    CsvSink, ExecutionMode, FacetReport, ReportConfig, ReportError, ReportOrchestrator,
    first_difference,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Top-rated movie reports over the MovieLens 100k dataset
#[derive(Parser)]
#[command(name = "top-rated")]
#[command(about = "Top-N movie reports by gender, genre and age band", long_about = None)]
struct Cli {
    /// Path to MovieLens 100k dataset directory
    #[arg(short, long, default_value = "data/ml-100k")]
    data_dir: PathBuf,

    /// JSON file with report settings; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Ratings per chunk in parallel mode
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Movies per report
    #[arg(long)]
    top_n: Option<usize>,

    /// Worker threads for parallel mode (defaults to available CPUs)
    #[arg(long)]
    workers: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate every report and write them as CSV files
    Generate {
        /// sequential or parallel (defaults to the configured mode)
        #[arg(long)]
        mode: Option<ExecutionMode>,

        /// Reports go to <output-dir>/<mode>/
        #[arg(long, default_value = "output")]
        output_dir: PathBuf,

        /// Rows printed per report in the summary
        #[arg(long, default_value = "3")]
        preview: usize,
    },

    /// Run both modes concurrently and check they agree
    Compare,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = build_config(&cli)?;
    info!(
        "Report settings: top {}, chunk size {}, {} workers",
        config.top_n,
        config.chunk_size,
        config.worker_count()
    );

    // Load data index (this may take a moment)
    println!("Loading MovieLens dataset from {}...", cli.data_dir.display());
    let start = Instant::now();
    let data_dir = cli.data_dir.clone();
    let data_index = tokio::task::spawn_blocking(move || DataIndex::load_from_files(&data_dir))
        .await
        .context("Loader task failed")?
        .context("Failed to load MovieLens dataset")?;
    let data_index = Arc::new(data_index);

    let (users, movies, ratings) = data_index.counts();
    println!(
        "{} Loaded {} users, {} movies, {} ratings in {:?}",
        "✓".green(),
        users,
        movies,
        ratings,
        start.elapsed()
    );

    let orchestrator = ReportOrchestrator::new(data_index, config).map_err(describe_failure)?;

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Generate {
            mode,
            output_dir,
            preview,
        } => {
            let mode = mode.unwrap_or(orchestrator.config().mode);
            handle_generate(orchestrator, mode, &output_dir, preview).await?
        }
        Commands::Compare => handle_compare(orchestrator).await?,
    }

    Ok(())
}

/// Config file (if any) with command-line overrides applied
fn build_config(cli: &Cli) -> Result<ReportConfig> {
    let mut config = match &cli.config {
        Some(path) => ReportConfig::from_json_file(path)?,
        None => ReportConfig::default(),
    };

    if let Some(chunk_size) = cli.chunk_size {
        config.chunk_size = chunk_size;
    }
    if let Some(top_n) = cli.top_n {
        config.top_n = top_n;
    }
    if cli.workers.is_some() {
        config.workers = cli.workers;
    }
    if let Commands::Generate { mode: Some(mode), .. } = &cli.command {
        config.mode = *mode;
    }

    Ok(config)
}

/// Handle the 'generate' command
async fn handle_generate(
    orchestrator: ReportOrchestrator,
    mode: ExecutionMode,
    output_dir: &Path,
    preview: usize,
) -> Result<()> {
    let target = output_dir.join(mode.as_str());
    let top_n = orchestrator.config().top_n;

    let start = Instant::now();
    let worker_target = target.clone();
    let reports = tokio::task::spawn_blocking(move || {
        let mut sink = CsvSink::create_fresh(&worker_target, top_n)?;
        orchestrator.run(mode, &mut sink).map_err(describe_failure)
    })
    .await
    .context("Report task failed")??;
    let elapsed = start.elapsed();

    print_summary(&reports, preview);
    println!(
        "{} Wrote {} reports to {}",
        "✓".green(),
        reports.len(),
        target.display()
    );
    println!(
        "{} ({} mode): {:.2}s",
        "Execution time".bold(),
        mode,
        elapsed.as_secs_f64()
    );

    Ok(())
}

/// Handle the 'compare' command
async fn handle_compare(orchestrator: ReportOrchestrator) -> Result<()> {
    let sequential = {
        let orchestrator = orchestrator.clone();
        tokio::task::spawn_blocking(move || {
            let start = Instant::now();
            let reports = orchestrator.generate(ExecutionMode::Sequential);
            (reports, start.elapsed())
        })
    };
    let parallel = tokio::task::spawn_blocking(move || {
        let start = Instant::now();
        let reports = orchestrator.generate(ExecutionMode::Parallel);
        (reports, start.elapsed())
    });

    let (sequential, parallel) = tokio::join!(sequential, parallel);
    let (sequential, sequential_time) = sequential.context("Sequential task failed")?;
    let (parallel, parallel_time) = parallel.context("Parallel task failed")?;
    let sequential = sequential.map_err(describe_failure)?;
    let parallel = parallel.map_err(describe_failure)?;

    println!("{}", "Mode comparison:".bold().blue());
    println!("  sequential: {:.2}s", sequential_time.as_secs_f64());
    println!("  parallel:   {:.2}s", parallel_time.as_secs_f64());

    match first_difference(&sequential, &parallel) {
        None => {
            println!(
                "{} All {} reports identical across modes",
                "✓".green(),
                sequential.len()
            );
            Ok(())
        }
        Some(difference) => {
            println!("{} {}", "✗".red(), difference);
            bail!("sequential and parallel reports differ")
        }
    }
}

/// Name the failing report in the error chain
fn describe_failure(err: ReportError) -> anyhow::Error {
    match err.failed_facet() {
        Some(facet) => {
            let facet = facet.to_string();
            anyhow!(err).context(format!("Report '{}' failed; no files were written", facet))
        }
        None => anyhow!(err),
    }
}

/// Helper function to print the head of each report
fn print_summary(reports: &[FacetReport], preview: usize) {
    print!("{}", "Top-rated movies:\n".bold().blue());
    for report in reports {
        println!("{} ({} movies)", report.name.bold(), report.rows.len());
        for (rank, row) in report.rows.iter().take(preview).enumerate() {
            println!(
                "  {}. {} - {} ({} ratings)",
                (rank + 1).to_string().green(),
                row.title,
                row.formatted_score(),
                row.rating_count
            );
        }
    }
}
