mod file_config;

pub use file_config::FileConfig;

use crate::server::{RequestsLoggingLevel, ServerConfig};
use anyhow::{bail, Result};
use std::path::PathBuf;

pub const CATALOG_DB_FILE_NAME: &str = "breeds.db";

/// CLI arguments that take part in config resolution.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub db_dir: Option<PathBuf>,
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,
    pub seed_file: Option<PathBuf>,
    pub base_path: String,
    pub in_memory: bool,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Not set when running with an in-memory store.
    pub db_dir: Option<PathBuf>,
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,
    pub seed_file: Option<PathBuf>,
    pub base_path: String,
    pub in_memory: bool,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let in_memory = file.in_memory.unwrap_or(cli.in_memory);

        let db_dir = file
            .db_dir
            .map(PathBuf::from)
            .or_else(|| cli.db_dir.clone());
        let db_dir = match (db_dir, in_memory) {
            (_, true) => None,
            (None, false) => {
                bail!("db_dir must be specified via --db-dir or in config file, or use --in-memory")
            }
            (Some(db_dir), false) => {
                if !db_dir.exists() {
                    bail!("Database directory does not exist: {:?}", db_dir);
                }
                if !db_dir.is_dir() {
                    bail!("db_dir is not a directory: {:?}", db_dir);
                }
                Some(db_dir)
            }
        };

        let port = file.port.unwrap_or(cli.port);
        let metrics_port = file.metrics_port.unwrap_or(cli.metrics_port);

        let logging_level = match file.logging_level {
            Some(level) => match RequestsLoggingLevel::parse(&level) {
                Some(level) => level,
                None => bail!("Invalid logging_level in config file: {}", level),
            },
            None => cli.logging_level.clone(),
        };

        let frontend_dir_path = file
            .frontend_dir_path
            .or_else(|| cli.frontend_dir_path.clone());

        let seed_file = file
            .seed_file
            .map(PathBuf::from)
            .or_else(|| cli.seed_file.clone());
        if let Some(seed_file) = &seed_file {
            if !seed_file.is_file() {
                bail!("Seed file not found: {:?}", seed_file);
            }
        }

        let base_path = file.base_path.unwrap_or_else(|| cli.base_path.clone());
        validate_base_path(&base_path)?;

        Ok(Self {
            db_dir,
            port,
            metrics_port,
            logging_level,
            frontend_dir_path,
            seed_file,
            base_path,
            in_memory,
        })
    }

    pub fn catalog_db_path(&self) -> Option<PathBuf> {
        self.db_dir
            .as_ref()
            .map(|dir| dir.join(CATALOG_DB_FILE_NAME))
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            requests_logging_level: self.logging_level.clone(),
            port: self.port,
            metrics_port: self.metrics_port,
            breeds_base_path: self.base_path.clone(),
            frontend_dir_path: self.frontend_dir_path.clone(),
        }
    }
}

fn validate_base_path(base_path: &str) -> Result<()> {
    if !base_path.starts_with('/') {
        bail!("base_path must start with '/': {:?}", base_path);
    }
    if base_path.len() < 2 || base_path.ends_with('/') {
        bail!("base_path must not end with '/': {:?}", base_path);
    }
    // The router reads these as captures or wildcards and refuses to nest them.
    if let Some(c) = base_path.chars().find(|c| matches!(c, '{' | '}' | '*' | ':')) {
        bail!("base_path must be a literal path, found {:?} in {:?}", c, base_path);
    }
    if base_path.contains("//") {
        bail!("base_path must not contain empty segments: {:?}", base_path);
    }
    Ok(())
}
