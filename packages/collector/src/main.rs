use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use collector::extracts::{load_extracts, summarize};
use collector::{default_cities, load_cities, logging, Collector, CollectorSettings, Config};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "collector")]
#[command(about = "Collect pharmacy listings per city into JSON extracts")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Search, enrich and write extracts (default)
    Collect {
        /// JSON file with `[{"city": ..., "neighborhoods": [...]}]`
        #[arg(long)]
        areas: Option<PathBuf>,
        #[arg(long)]
        output_dir: Option<PathBuf>,
        #[arg(long)]
        state_file: Option<PathBuf>,
        /// Max requests in flight
        #[arg(long)]
        concurrency: Option<usize>,
    },

    /// Print counts from existing extracts
    Summary {
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _guard = logging::init(&Config::log_dir_from_env())?;

    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Collect {
        areas: None,
        output_dir: None,
        state_file: None,
        concurrency: None,
    });

    match command {
        Commands::Collect {
            areas,
            output_dir,
            state_file,
            concurrency,
        } => collect(areas, output_dir, state_file, concurrency).await,
        Commands::Summary { output_dir } => {
            summary(output_dir.unwrap_or_else(Config::output_dir_from_env)).await
        }
    }
}

async fn collect(
    areas: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    state_file: Option<PathBuf>,
    concurrency: Option<usize>,
) -> Result<()> {
    // Missing credentials stop the run before any request goes out
    let mut config = Config::from_env()?;
    if let Some(dir) = output_dir {
        config.output_dir = dir;
    }
    if let Some(file) = state_file {
        config.state_file = file;
    }

    let mut settings = CollectorSettings::default();
    if let Some(n) = concurrency {
        settings = settings.with_concurrency(n);
    }

    let cities = match areas {
        Some(path) => load_cities(&path)?,
        None => default_cities(),
    };

    info!(?config, cities = cities.len(), "Starting collection");

    let collector = Collector::from_config(&config, &settings).await?;
    let report = collector.run(&cities).await;

    for city in &report.cities {
        info!(
            city = %city.city,
            candidates = city.candidates,
            new = city.new_ids,
            enriched = city.enriched,
            dropped = city.dropped,
            written = city.written,
            duplicates = city.duplicates,
            invalid_coordinates = city.invalid_coordinates,
            skipped = city.skipped,
            "City done"
        );
    }

    Ok(())
}

async fn summary(output_dir: PathBuf) -> Result<()> {
    let extracts = load_extracts(&output_dir)
        .await
        .with_context(|| format!("Failed to read extracts from {}", output_dir.display()))?;
    let summary = summarize(&extracts);

    print!("{summary}");

    Ok(())
}
