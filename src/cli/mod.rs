pub mod commands;
pub mod context;
pub mod output;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::core::models::filter::{DistinctField, RawFilter, RawScalar};
use crate::core::services::retention_service::MAX_RETENTION_DAYS;

/// Record, browse and expire audit events.
#[derive(Parser, Debug)]
#[command(name = "logify", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the configuration file (default: ./logify.toml if present)
    #[arg(long, global = true, env = "LOGIFY_CONFIG")]
    pub config: Option<PathBuf>,

    /// SQLite database file, overriding [store] path
    #[arg(long, global = true, env = "LOGIFY_DB")]
    pub db: Option<PathBuf>,

    /// Verbose diagnostics on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode: only show errors and requested data
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the log tables and record activation
    Init,

    /// Record deactivation (tables and entries are kept)
    Deactivate,

    /// Bring the tables up to this version
    Upgrade,

    /// Drop the log tables and every entry in them
    Uninstall {
        /// Confirm the removal
        #[arg(long)]
        yes: bool,
    },

    /// Record an event
    Record {
        /// Action name, e.g. user_login
        action: String,
        /// Category of the affected entity (post, user, order...)
        #[arg(long)]
        subject_type: Option<String>,
        /// Identifier of the affected entity
        #[arg(long)]
        subject_id: Option<String>,
        /// Metadata as a JSON document
        #[arg(long)]
        meta: Option<String>,
        /// Id of the acting principal; omit for system events
        #[arg(long, env = "LOGIFY_ACTOR")]
        actor: Option<u64>,
    },

    /// List entries, newest first by default
    List {
        #[command(flatten)]
        filter: FilterArgs,
        /// Page to show (1-based)
        #[arg(long, default_value_t = 1)]
        page: u64,
        /// Rows per page (default: [query] per_page)
        #[arg(long)]
        per_page: Option<u64>,
        /// Print the page as JSON
        #[arg(long)]
        json: bool,
    },

    /// Count entries matching a filter
    Count {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Delete entries by id
    Delete {
        /// Entry ids
        #[arg(required = true)]
        ids: Vec<u64>,
    },

    /// Delete entries older than the retention window
    Cleanup {
        /// Retention window in days (default: [retention] days)
        #[arg(long, value_parser = clap::value_parser!(u32).range(0..=i64::from(MAX_RETENTION_DAYS)))]
        days: Option<u32>,
    },

    /// List distinct values of a field, for building filters
    Values {
        #[arg(value_enum)]
        field: ValueField,
    },

    /// Entry count per action
    Stats,
}

/// Filter flags shared by `list` and `count`. Values are passed through
/// unvalidated; normalization decides what survives.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Match this action (repeat for any of several)
    #[arg(long)]
    pub action: Vec<String>,
    /// Match this actor id (repeat for any of several)
    #[arg(long)]
    pub actor: Vec<String>,
    /// Match this subject type (repeat for any of several)
    #[arg(long)]
    pub subject_type: Vec<String>,
    /// Match this subject id exactly
    #[arg(long)]
    pub subject_id: Option<String>,
    /// Entries created at or after this time (YYYY-MM-DD or RFC 3339)
    #[arg(long)]
    pub from: Option<String>,
    /// Entries created at or before this time; a bare date covers the day
    #[arg(long)]
    pub to: Option<String>,
    /// Free-text search over action, subject and metadata
    #[arg(long)]
    pub search: Option<String>,
    /// Sort column: id, actor_id, action, subject_type, subject_id, created_at
    #[arg(long)]
    pub order_by: Option<String>,
    /// asc or desc
    #[arg(long)]
    pub order: Option<String>,
}

impl FilterArgs {
    pub fn to_raw(&self) -> RawFilter {
        let mut raw = RawFilter::new();
        for action in &self.action {
            raw = raw.action(action.as_str());
        }
        for actor in &self.actor {
            raw = raw.actor(RawScalar::Text(actor.clone()));
        }
        for subject_type in &self.subject_type {
            raw = raw.subject_type(subject_type.as_str());
        }
        raw.subject_id = self.subject_id.clone().map(RawScalar::Text);
        raw.from = self.from.clone();
        raw.to = self.to.clone();
        raw.search = self.search.clone();
        raw.order_by = self.order_by.clone();
        raw.order_direction = self.order.clone();
        raw
    }

    pub fn is_empty(&self) -> bool {
        self.action.is_empty()
            && self.actor.is_empty()
            && self.subject_type.is_empty()
            && self.subject_id.is_none()
            && self.from.is_none()
            && self.to.is_none()
            && self.search.is_none()
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum ValueField {
    Action,
    SubjectType,
}

impl From<ValueField> for DistinctField {
    fn from(field: ValueField) -> Self {
        match field {
            ValueField::Action => DistinctField::Action,
            ValueField::SubjectType => DistinctField::SubjectType,
        }
    }
}
