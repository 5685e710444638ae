use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use nutrition_insights_server::config::{
    AppConfig, CliConfig, FileConfig, DEFAULT_HOST, DEFAULT_METRICS_PORT, DEFAULT_PAGE_SIZE,
    DEFAULT_PORT,
};
use nutrition_insights_server::server::metrics;
use nutrition_insights_server::{load_dataset, run_server, NutritionEngine, RequestsLoggingLevel};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to a TOML config file. Values in it override the command line.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Path to the recipes CSV file.
    #[clap(env = "CSV_PATH", value_parser = parse_path)]
    pub data_path: Option<PathBuf>,

    /// The address to bind to.
    #[clap(long, env = "HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// The port to listen on.
    #[clap(short, long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// The port for the metrics server (Prometheus scraping).
    #[clap(long, default_value_t = DEFAULT_METRICS_PORT)]
    pub metrics_port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// The maximum age of content in the cache in seconds.
    #[clap(long, default_value_t = 3600)]
    pub content_cache_age_sec: usize,

    /// Path to the frontend directory to be statically served.
    #[clap(long)]
    pub frontend_dir_path: Option<String>,

    /// Page size of /api/nutrition/all when the request does not set one.
    #[clap(long, default_value_t = DEFAULT_PAGE_SIZE)]
    pub default_page_size: i64,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            data_path: self.data_path.clone(),
            host: self.host.clone(),
            port: self.port,
            metrics_port: self.metrics_port,
            logging_level: self.logging_level.clone(),
            content_cache_age_sec: self.content_cache_age_sec,
            frontend_dir_path: self.frontend_dir_path.clone(),
            default_page_size: self.default_page_size,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config file {:?}...", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;

    let dataset = load_dataset(&config.data_path)
        .with_context(|| format!("Failed to load dataset {:?}", config.data_path))?;
    let engine = NutritionEngine::new(dataset);

    info!("Initializing metrics...");
    metrics::init_metrics();
    metrics::init_dataset_metrics(engine.report(), engine.summarize().len());

    info!(
        "Ready to serve {} diet types at {}:{}",
        engine.summarize().len(),
        config.host,
        config.port
    );
    run_server(config.server_config(), Arc::new(engine), config.metrics_port).await
}
