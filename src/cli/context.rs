use std::path::PathBuf;

use crate::adapters::actors::static_directory::StaticActorDirectory;
use crate::adapters::store::sqlite_log_store::SqliteLogStore;
use crate::cli::Cli;
use crate::cli::output::Printer;
use crate::config::app_config::AppConfig;
use crate::core::errors::Result;
use crate::core::services::log_service::LogService;

/// Everything a command needs, built once at startup from the flags and
/// the configuration file.
#[derive(Debug, Clone)]
pub struct Context {
    pub config: AppConfig,
    pub db_path: PathBuf,
    pub out: Printer,
}

impl Context {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let config = AppConfig::load_or_default(cli.config.as_deref())?;
        let db_path = cli
            .db
            .clone()
            .unwrap_or_else(|| config.store.path.clone());

        tracing::debug!(db = %db_path.display(), "using log database");

        Ok(Self {
            config,
            db_path,
            out: Printer::new(cli.quiet),
        })
    }

    pub fn open_store(&self) -> Result<SqliteLogStore> {
        SqliteLogStore::open(&self.db_path, &self.config.store.table_prefix)
    }

    /// Service over `store` with the configured row cap.
    pub fn service<'a>(&self, store: &'a SqliteLogStore) -> LogService<'a> {
        LogService::new(store).with_max_limit(self.config.query.max_limit)
    }

    pub fn actors(&self) -> Result<StaticActorDirectory> {
        StaticActorDirectory::from_config(&self.config)
    }
}
