use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::errors::{LogifyError, Result};
use crate::core::models::text::{
    self, ACTION_MAX_CHARS, SUBJECT_ID_MAX_CHARS, SUBJECT_TYPE_MAX_CHARS,
};

/// One recorded audit event, as read back from the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    pub id: u64,
    /// `None` for unauthenticated or system-initiated actions.
    pub actor_id: Option<u64>,
    pub action: String,
    pub subject_type: Option<String>,
    pub subject_id: Option<String>,
    pub metadata: Option<Metadata>,
    pub created_at: DateTime<Utc>,
}

/// Structured payload attached to an entry.
///
/// The write path always stores valid JSON, but rows written by other
/// tools may not decode. Those are kept verbatim and flagged instead of
/// failing the whole read.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Metadata {
    Structured(serde_json::Value),
    Malformed(String),
}

impl Metadata {
    /// Decode a stored metadata column.
    pub fn from_stored(raw: String) -> Self {
        match serde_json::from_str(&raw) {
            Ok(value) => Self::Structured(value),
            Err(_) => Self::Malformed(raw),
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed(_))
    }

    pub fn as_value(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Structured(value) => Some(value),
            Self::Malformed(_) => None,
        }
    }

    /// Compact single-line rendering cut to `max_chars`, with `...`
    /// appended when something was cut. `None` for malformed payloads.
    pub fn preview(&self, max_chars: usize) -> Option<String> {
        let full = self.as_value()?.to_string();
        if full.chars().count() <= max_chars {
            return Some(full);
        }
        let mut cut: String = full.chars().take(max_chars).collect();
        cut.push_str("...");
        Some(cut)
    }
}

/// An entry as handed to the store for insertion.
///
/// `id` and `created_at` are assigned by the store.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NewLogEntry {
    #[serde(default)]
    pub actor_id: Option<u64>,
    pub action: String,
    #[serde(default)]
    pub subject_type: Option<String>,
    #[serde(default)]
    pub subject_id: Option<String>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

impl NewLogEntry {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            ..Self::default()
        }
    }

    pub fn actor(mut self, actor_id: u64) -> Self {
        self.actor_id = Some(actor_id);
        self
    }

    pub fn subject(mut self, subject_type: impl Into<String>, subject_id: impl Into<String>) -> Self {
        self.subject_type = Some(subject_type.into());
        self.subject_id = Some(subject_id.into());
        self
    }

    pub fn subject_type(mut self, subject_type: impl Into<String>) -> Self {
        self.subject_type = Some(subject_type.into());
        self
    }

    pub fn metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Clean the entry before it is written.
    ///
    /// - text fields are sanitized and length-bounded; empty subject fields
    ///   become absent
    /// - actor id `0` means "nobody" and is stored as absent
    /// - `null`, `{}` and `[]` metadata are stored as absent
    ///
    /// Fails only when the action is empty after cleaning.
    pub fn normalized(self) -> Result<Self> {
        let action = text::sanitize(&self.action, ACTION_MAX_CHARS).ok_or_else(|| {
            LogifyError::InvalidEntry {
                detail: "action is empty".into(),
            }
        })?;

        let metadata = self.metadata.filter(|value| match value {
            serde_json::Value::Null => false,
            serde_json::Value::Object(map) => !map.is_empty(),
            serde_json::Value::Array(items) => !items.is_empty(),
            _ => true,
        });

        Ok(Self {
            actor_id: self.actor_id.filter(|id| *id > 0),
            action,
            subject_type: self
                .subject_type
                .as_deref()
                .and_then(|s| text::sanitize(s, SUBJECT_TYPE_MAX_CHARS)),
            subject_id: self
                .subject_id
                .as_deref()
                .and_then(|s| text::sanitize(s, SUBJECT_ID_MAX_CHARS)),
            metadata,
        })
    }

    /// Metadata serialized for the `metadata` column.
    pub fn metadata_text(&self) -> Result<Option<String>> {
        self.metadata
            .as_ref()
            .map(|value| serde_json::to_string(value))
            .transpose()
            .map_err(|e| LogifyError::InvalidEntry {
                detail: format!("metadata cannot be serialized: {e}"),
            })
    }
}
