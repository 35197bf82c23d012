//! CLI command definitions and dispatch.

pub mod dir;
pub mod file;
pub mod migrate;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use archivehub_cache::CacheManager;
use archivehub_core::config::AppConfig;
use archivehub_core::result::AppResult;
use archivehub_database::DatabasePool;
use archivehub_service::{DirectoryService, FileService, HttpMetadataProbe};

use crate::output::OutputFormat;

/// ArchiveHub archive hierarchy management
#[derive(Debug, Parser)]
#[command(name = "archivehub", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Directory management
    Dir(dir::DirArgs),
    /// File management
    File(file::FileArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        match &self.command {
            Commands::Migrate(args) => migrate::execute(args, config).await,
            Commands::Dir(args) => dir::execute(args, config, self.format).await,
            Commands::File(args) => file::execute(args, config, self.format).await,
        }
    }
}

/// Load configuration from file, overlays and environment.
pub fn load_config(config_path: &str) -> AppResult<AppConfig> {
    AppConfig::load(config_path)
}

/// Hierarchy services wired against the configured database and cache.
pub struct Services {
    /// Shared connection pool.
    pub pool: DatabasePool,
    /// Directory service.
    pub directories: Arc<DirectoryService>,
    /// File service.
    pub files: FileService,
}

impl Services {
    /// Connect to the database and cache and build both services.
    pub async fn connect(config: &AppConfig) -> AppResult<Self> {
        let pool = DatabasePool::connect(&config.database).await?;
        let (directory_store, file_store) = pool.repositories();
        let cache = CacheManager::from_config(&config.cache).await?;

        let directories = Arc::new(DirectoryService::new(
            directory_store.clone(),
            file_store.clone(),
            cache,
            config.hierarchy.tree_cache_ttl(),
        ));
        let probe = Arc::new(HttpMetadataProbe::from_config(&config.hierarchy)?);
        let files = FileService::new(file_store, directory_store, directories.clone(), probe);

        Ok(Self {
            pool,
            directories,
            files,
        })
    }

    /// Release the connection pool.
    pub async fn close(self) {
        self.pool.close().await;
    }
}
