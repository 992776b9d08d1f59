use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::core::errors::{LogifyError, Result};
use crate::core::services::retention_service::{DEFAULT_RETENTION_DAYS, MAX_RETENTION_DAYS};

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "logify.toml";

static TABLE_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("table prefix pattern is valid")
});

/// Top-level Logify configuration read from `logify.toml`.
///
/// Every section is optional; a missing file means all defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub store: StoreSection,
    pub retention: RetentionSection,
    pub query: QuerySection,
    /// Actor id (as a string key) to display name.
    pub actors: HashMap<String, String>,
}

impl AppConfig {
    /// Load and validate the configuration at `path`. The file must exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(LogifyError::InvalidConfig {
                detail: format!("{} not found", path.display()),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content).map_err(|e| match e {
            LogifyError::InvalidConfig { detail } => LogifyError::InvalidConfig {
                detail: format!("{}: {detail}", path.display()),
            },
            other => other,
        })
    }

    /// Load an explicitly requested file, or `./logify.toml` when present,
    /// or fall back to defaults.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let default_path = Path::new(CONFIG_FILE_NAME);
                if default_path.exists() {
                    Self::load(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Parse TOML text and validate it.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| LogifyError::InvalidConfig {
            detail: format!("failed to parse: {e}"),
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        validate_table_prefix(&self.store.table_prefix)?;

        if self.retention.days > MAX_RETENTION_DAYS {
            return Err(LogifyError::InvalidConfig {
                detail: format!(
                    "[retention] days = {} exceeds the maximum of {MAX_RETENTION_DAYS}",
                    self.retention.days
                ),
            });
        }

        if self.query.per_page == 0 {
            return Err(LogifyError::InvalidConfig {
                detail: "[query] per_page must be at least 1".into(),
            });
        }
        if self.query.max_limit == 0 {
            return Err(LogifyError::InvalidConfig {
                detail: "[query] max_limit must be at least 1".into(),
            });
        }

        self.actor_names().map(|_| ())
    }

    /// The `[actors]` table keyed by numeric id.
    pub fn actor_names(&self) -> Result<HashMap<u64, String>> {
        self.actors
            .iter()
            .map(|(id, name)| {
                id.trim()
                    .parse::<u64>()
                    .map(|id| (id, name.clone()))
                    .map_err(|_| LogifyError::InvalidConfig {
                        detail: format!("[actors] key '{id}' is not a numeric actor id"),
                    })
            })
            .collect()
    }
}

/// The `[store]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    /// SQLite database file.
    pub path: PathBuf,
    /// Prepended to the table names, e.g. `app_` gives `app_logify`.
    pub table_prefix: String,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            path: PathBuf::from("logify.db"),
            table_prefix: String::new(),
        }
    }
}

/// The `[retention]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetentionSection {
    pub enabled: bool,
    pub days: u32,
}

impl Default for RetentionSection {
    fn default() -> Self {
        Self {
            enabled: true,
            days: DEFAULT_RETENTION_DAYS,
        }
    }
}

/// The `[query]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QuerySection {
    /// Rows per page in listings.
    pub per_page: u64,
    /// Largest row limit any single query may request.
    pub max_limit: u64,
}

impl Default for QuerySection {
    fn default() -> Self {
        Self {
            per_page: crate::core::models::filter::DEFAULT_LIMIT,
            max_limit: 1000,
        }
    }
}

/// Reject table prefixes that are not plain SQL identifiers. The prefix is
/// interpolated into table names, so nothing else may pass.
pub fn validate_table_prefix(prefix: &str) -> Result<()> {
    if prefix.is_empty() || TABLE_PREFIX_RE.is_match(prefix) {
        return Ok(());
    }
    Err(LogifyError::InvalidConfig {
        detail: format!(
            "table_prefix '{prefix}' is invalid: use letters, digits and '_' only, \
             not starting with a digit"
        ),
    })
}
