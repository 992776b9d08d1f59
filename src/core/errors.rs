/// All domain errors for Logify.
///
/// Filter input never reaches this type: malformed filters fall back to
/// safe defaults during normalization. Deleting an id that does not exist
/// is not an error either.
#[derive(Debug, thiserror::Error)]
pub enum LogifyError {
    #[error(
        "Storage failure during {operation}: {detail}\n\n  \
         The log database rejected the statement or could not be reached.\n  \
         Check the [store] path in logify.toml and the file permissions."
    )]
    StorageFault { operation: String, detail: String },

    #[error(
        "Invalid log entry: {detail}\n\n  \
         Every entry needs a non-empty action, e.g. 'logify record user_login'."
    )]
    InvalidEntry { detail: String },

    #[error(
        "Invalid configuration: {detail}\n\n  \
         Check logify.toml (or the file given with --config)."
    )]
    InvalidConfig { detail: String },

    #[error("Invalid argument: {detail}")]
    InvalidArgument { detail: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl LogifyError {
    /// Build a `StorageFault` for the named operation.
    pub fn storage(operation: &str, detail: impl std::fmt::Display) -> Self {
        Self::StorageFault {
            operation: operation.to_string(),
            detail: detail.to_string(),
        }
    }

    /// Whether this error came from the backing store.
    pub fn is_storage_fault(&self) -> bool {
        matches!(self, Self::StorageFault { .. })
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, LogifyError>;
