use semver::Version;
use serde_json::json;

use crate::core::errors::Result;
use crate::core::models::log_entry::NewLogEntry;
use crate::core::traits::log_store::LogStore;
use crate::core::traits::schema_store::SchemaStore;

/// Name written into lifecycle metadata.
pub const PRODUCT_NAME: &str = "Logify";
/// Options key holding the schema version last installed.
pub const DB_VERSION_OPTION: &str = "db_version";

pub const ACTIVATED_ACTION: &str = "plugin_activated";
pub const DEACTIVATED_ACTION: &str = "plugin_deactivated";
pub const UPGRADED_ACTION: &str = "plugin_upgraded";

/// Version of this build, from Cargo.toml.
pub fn current_version() -> Version {
    env!("CARGO_PKG_VERSION")
        .parse()
        .expect("CARGO_PKG_VERSION is always valid semver")
}

/// Result of [`LifecycleService::upgrade`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpgradeOutcome {
    UpToDate { version: Version },
    Upgraded { from: Version, to: Version },
}

/// Install, upgrade and removal of the log tables, each step recording
/// itself in the log it manages.
///
/// The self-recorded entries are best-effort: a failure to write them is
/// logged and never fails the lifecycle step.
pub struct LifecycleService<'a> {
    store: &'a dyn LogStore,
    schema: &'a dyn SchemaStore,
    version: Version,
}

impl<'a> LifecycleService<'a> {
    pub fn new(store: &'a dyn LogStore, schema: &'a dyn SchemaStore) -> Self {
        Self {
            store,
            schema,
            version: current_version(),
        }
    }

    /// Pretend to be a different build. Used to exercise upgrades.
    pub fn with_version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    /// Create the tables, store the schema version and record activation.
    pub fn activate(&self) -> Result<()> {
        self.schema.create_schema()?;
        self.schema
            .set_option(DB_VERSION_OPTION, &self.version.to_string())?;
        tracing::info!(version = %self.version, "log store activated");

        self.record(
            NewLogEntry::new(ACTIVATED_ACTION)
                .subject_type("plugin")
                .metadata(json!({
                    "plugin": PRODUCT_NAME,
                    "version": self.version.to_string(),
                })),
        );
        Ok(())
    }

    /// Record deactivation. Tables and data are left in place.
    pub fn deactivate(&self) {
        tracing::info!("log store deactivated");
        self.record(
            NewLogEntry::new(DEACTIVATED_ACTION)
                .subject_type("plugin")
                .metadata(json!({
                    "plugin": PRODUCT_NAME,
                    "version": self.version.to_string(),
                })),
        );
    }

    /// Bring the schema up to this build's version if the stored one is
    /// older. A missing or unreadable stored version counts as `0.0.0`.
    pub fn upgrade(&self) -> Result<UpgradeOutcome> {
        let stored = self.stored_version()?;
        if stored >= self.version {
            return Ok(UpgradeOutcome::UpToDate { version: stored });
        }

        self.schema.create_schema()?;
        self.record(
            NewLogEntry::new(UPGRADED_ACTION)
                .subject_type("plugin")
                .metadata(json!({
                    "plugin": PRODUCT_NAME,
                    "from_version": stored.to_string(),
                    "to_version": self.version.to_string(),
                })),
        );
        self.schema
            .set_option(DB_VERSION_OPTION, &self.version.to_string())?;
        tracing::info!(from = %stored, to = %self.version, "log store upgraded");

        Ok(UpgradeOutcome::Upgraded {
            from: stored,
            to: self.version.clone(),
        })
    }

    /// Drop the log and options tables. Every entry is lost.
    pub fn uninstall(&self) -> Result<()> {
        self.schema.drop_schema()?;
        tracing::info!("log store uninstalled");
        Ok(())
    }

    fn stored_version(&self) -> Result<Version> {
        let raw = self.schema.get_option(DB_VERSION_OPTION)?;
        Ok(match raw.as_deref().map(Version::parse) {
            Some(Ok(version)) => version,
            Some(Err(e)) => {
                tracing::warn!(error = %e, "stored schema version is unreadable");
                Version::new(0, 0, 0)
            }
            None => Version::new(0, 0, 0),
        })
    }

    fn record(&self, entry: NewLogEntry) {
        if let Err(e) = self.store.insert(&entry) {
            tracing::warn!(action = %entry.action, error = %e, "could not record lifecycle event");
        }
    }
}
