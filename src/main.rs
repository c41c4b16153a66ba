use anyhow::Result;
use clap::{Parser, Subcommand};
use racescan::harness::{HarnessOptions, run_harness};
use racescan::pipeline::{
    ScrapeOptions, ValidateOptions, render_table, scrape_sources, validate_configs,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "racescan", about = "Config-driven race listing scraper")]
struct Cli {
    #[arg(long, default_value = "configs/sources")]
    config_dir: PathBuf,

    #[arg(long, default_value = "data/cache")]
    cache_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Scrape {
        #[arg(long)]
        source: Option<String>,
        #[arg(long)]
        json: Option<PathBuf>,
        #[arg(long, default_value_t = false)]
        no_cache: bool,
    },
    Validate {
        #[arg(long)]
        source_file: Option<PathBuf>,
    },
    Harness,
}

fn main() -> Result<()> {
    init_tracing()?;
    let cli = Cli::parse();

    match cli.command {
        Commands::Scrape {
            source,
            json,
            no_cache,
        } => {
            let outcome = scrape_sources(&ScrapeOptions {
                config_dir: cli.config_dir,
                cache_dir: cli.cache_dir,
                source,
                no_cache,
            })?;

            for report in &outcome.reports {
                info!(
                    source = %report.source_key,
                    pages = report.pages_fetched,
                    lines = report.lines_scanned,
                    candidates = report.candidates,
                    records = report.records,
                    dropped_unknown_date = report.dropped_unknown_date,
                    "source scrape summary"
                );
            }

            print!("{}", render_table(&outcome.records));
            println!("{} races found", outcome.records.len());

            if let Some(path) = json {
                std::fs::write(&path, serde_json::to_string_pretty(&outcome.records)?)?;
                info!(file = %path.display(), "records written");
            }
        }
        Commands::Validate { source_file } => {
            let messages = validate_configs(&ValidateOptions {
                config_dir: Some(cli.config_dir),
                source_file,
            })?;
            for line in messages {
                println!("{line}");
            }
        }
        Commands::Harness => {
            let report = run_harness(&HarnessOptions {
                config_dir: cli.config_dir,
                cache_dir: cli.cache_dir,
            })?;

            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|err| anyhow::anyhow!(err.to_string()))?;
    Ok(())
}
