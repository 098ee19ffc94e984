use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use breed_catalog_server::breed_store::{BreedStore, InMemoryBreedStore, SqliteBreedStore};
use breed_catalog_server::catalog::CatalogService;
use breed_catalog_server::config::{self, AppConfig, FileConfig};
use breed_catalog_server::seed;
use breed_catalog_server::server::{metrics, run_server, RequestsLoggingLevel};

fn parse_path(s: &str) -> Result<PathBuf, String> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(format!("Error resolving path '{}': {}", s, msg));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir().map_err(|e| format!("Failed to get current dir: {}", e))?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to TOML configuration file. Values in the file override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Directory holding the catalog database (breeds.db).
    #[clap(long, value_parser = parse_path)]
    pub db_dir: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3001)]
    pub port: u16,

    /// The port for the metrics server (Prometheus scraping).
    #[clap(long, default_value_t = 9091)]
    pub metrics_port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Path to the frontend directory to be statically served.
    #[clap(long)]
    pub frontend_dir_path: Option<String>,

    /// JSON file with the breeds used to seed an empty catalog.
    #[clap(long, value_parser = parse_path)]
    pub seed_file: Option<PathBuf>,

    /// Path the breed routes are mounted at.
    #[clap(long, default_value = "/dogs")]
    pub base_path: String,

    /// Keep the catalog in memory instead of SQLite. Nothing survives a restart.
    #[clap(long)]
    pub in_memory: bool,
}

impl From<&CliArgs> for config::CliConfig {
    fn from(args: &CliArgs) -> Self {
        config::CliConfig {
            db_dir: args.db_dir.clone(),
            port: args.port,
            metrics_port: args.metrics_port,
            logging_level: args.logging_level.clone(),
            frontend_dir_path: args.frontend_dir_path.clone(),
            seed_file: args.seed_file.clone(),
            base_path: args.base_path.clone(),
            in_memory: args.in_memory,
        }
    }
}

fn open_store(app_config: &AppConfig) -> Result<Arc<dyn BreedStore>> {
    match app_config.catalog_db_path() {
        Some(db_path) => {
            info!("Opening breed catalog at {:?}", db_path);
            let store = SqliteBreedStore::new(&db_path)
                .with_context(|| format!("Failed to open breed catalog at {:?}", db_path))?;
            Ok(Arc::new(store))
        }
        None => {
            info!("Using in-memory breed catalog");
            Ok(Arc::new(InMemoryBreedStore::new()))
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
            info!("Loading config from {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let cli_config = config::CliConfig::from(&cli_args);
    let app_config = AppConfig::resolve(&cli_config, file_config)?;

    metrics::init_metrics();

    let store = open_store(&app_config)?;

    let seed_breeds = match &app_config.seed_file {
        Some(path) => seed::load_seed_file(path)?,
        None => seed::default_breeds()?,
    };
    let seed_outcome = seed::seed_if_absent(store.as_ref(), &seed_breeds)
        .context("Failed to seed breed catalog")?;
    info!("Seeding: {:?}", seed_outcome);

    let record = store
        .load_record()
        .context("Failed to load breed catalog after seeding")?;
    metrics::set_breeds_count(record.len());

    let catalog_service = Arc::new(CatalogService::new(store));

    run_server(app_config.server_config(), catalog_service).await
}
