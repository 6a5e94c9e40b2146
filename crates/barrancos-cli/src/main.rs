mod catalog;
mod enrich;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "barrancos")]
#[command(about = "Canyon dataset normalization and enrichment")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Build the canonical catalog from one or more raw datasets
    Build {
        /// Raw dataset to read; repeatable (default: BARRANCOS_DATA_PATH)
        #[arg(long = "input")]
        inputs: Vec<PathBuf>,
        /// Where to write the catalog (default: BARRANCOS_CATALOG_PATH)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print one canonical canyon as JSON
    Show {
        id: String,
        #[arg(long = "input")]
        inputs: Vec<PathBuf>,
    },
    /// Add a Wikiloc search URL to every record
    SearchLinks {
        #[arg(long)]
        source: Option<PathBuf>,
        /// Defaults to the source path with a `_con_wikiloc` suffix
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long)]
        activity: Option<String>,
    },
    /// Fetch coordinates from Descente-Canyon map pages
    Coordinates {
        #[arg(long)]
        source: Option<PathBuf>,
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long)]
        delay_ms: Option<u64>,
        #[arg(long)]
        zoom: Option<f64>,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long, default_value_t = 0)]
        start: usize,
        #[arg(long)]
        dry_run: bool,
    },
    /// Look up Wikiloc approach tracks for records without one
    WikilocLinks {
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        delay_ms: Option<u64>,
        #[arg(long)]
        radius_km: Option<f64>,
        /// Extra map endpoint parameters, e.g. `sort=near&lang=es`
        #[arg(long)]
        map_params: Option<String>,
        #[arg(long)]
        activity: Option<String>,
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    let config = barrancos_core::load_app_config_from_env()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Commands::Build { inputs, output } => {
            let inputs = or_default_input(inputs, &config);
            let output = output.unwrap_or_else(|| config.catalog_path.clone());
            catalog::run_build(&inputs, &output)?;
        }
        Commands::Show { id, inputs } => {
            let inputs = or_default_input(inputs, &config);
            println!("{}", catalog::run_show(&inputs, &id)?);
        }
        Commands::SearchLinks {
            source,
            output,
            activity,
        } => {
            let source = source.unwrap_or_else(|| config.data_path.clone());
            let output = output.unwrap_or_else(|| enrich::search_links_output(&source));
            let activity = activity.unwrap_or_else(|| config.wikiloc_activity.clone());
            enrich::run_search_links(&source, &output, &activity)?;
        }
        Commands::Coordinates {
            source,
            output,
            delay_ms,
            zoom,
            limit,
            start,
            dry_run,
        } => {
            let source = source.unwrap_or_else(|| config.data_path.clone());
            let output = output.unwrap_or_else(|| source.clone());
            let options = barrancos_scraper::CoordinateOptions {
                base_url: barrancos_scraper::DESCENTE_BASE_URL.to_owned(),
                zoom: zoom.unwrap_or(config.default_zoom),
                delay: std::time::Duration::from_millis(
                    delay_ms.unwrap_or(config.inter_request_delay_ms),
                ),
                limit,
                start,
            };
            enrich::run_coordinates(&config, &source, &output, &options, dry_run).await?;
        }
        Commands::WikilocLinks {
            input,
            output,
            limit,
            delay_ms,
            radius_km,
            map_params,
            activity,
            dry_run,
        } => {
            let input = input.unwrap_or_else(|| config.data_path.clone());
            let output = output.unwrap_or_else(|| input.clone());
            let options = barrancos_scraper::WikilocOptions {
                base_url: barrancos_scraper::WIKILOC_BASE_URL.to_owned(),
                activity: activity.unwrap_or_else(|| config.wikiloc_activity.clone()),
                result_limit: config.wikiloc_limit,
                radius_km,
                default_radius_km: config.wikiloc_radius_km,
                map_params,
                use_map: config.wikiloc_use_map,
                delay: std::time::Duration::from_millis(
                    delay_ms.unwrap_or(config.inter_request_delay_ms),
                ),
                limit,
            };
            enrich::run_wikiloc_links(&config, &input, &output, &options, dry_run).await?;
        }
    }

    Ok(())
}

fn or_default_input(inputs: Vec<PathBuf>, config: &barrancos_core::AppConfig) -> Vec<PathBuf> {
    if inputs.is_empty() {
        vec![config.data_path.clone()]
    } else {
        inputs
    }
}
