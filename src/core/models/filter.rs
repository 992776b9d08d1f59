use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::core::models::text::{
    self, ACTION_MAX_CHARS, SEARCH_MAX_CHARS, SUBJECT_ID_MAX_CHARS, SUBJECT_TYPE_MAX_CHARS,
};
use crate::core::models::timestamp::{self, RangeEnd};

/// Page size used when the caller does not ask for one.
pub const DEFAULT_LIMIT: u64 = 20;

/// A loosely-typed scalar as it arrives from a query string, a form or a
/// JSON document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawScalar {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl RawScalar {
    /// Coerce to a non-negative integer. Negative, fractional and
    /// non-numeric input yields `None`.
    pub fn as_non_negative(&self) -> Option<u64> {
        match self {
            Self::Int(n) => u64::try_from(*n).ok(),
            Self::Float(f) if f.is_finite() && *f >= 0.0 && f.fract() == 0.0 => {
                Some(*f as u64)
            }
            Self::Float(_) | Self::Bool(_) => None,
            Self::Text(s) => s.trim().parse::<u64>().ok(),
        }
    }

    /// Text view of the scalar; booleans are not text.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Int(n) => Some(n.to_string()),
            Self::Float(f) => Some(f.to_string()),
            Self::Bool(_) => None,
            Self::Text(s) => Some(s.clone()),
        }
    }
}

impl From<&str> for RawScalar {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for RawScalar {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for RawScalar {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<i32> for RawScalar {
    fn from(n: i32) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<u64> for RawScalar {
    fn from(n: u64) -> Self {
        i64::try_from(n).map_or_else(|_| Self::Text(n.to_string()), Self::Int)
    }
}

/// Either one value or a list of values for the same field.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(RawScalar),
    Many(Vec<RawScalar>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<RawScalar> {
        match self {
            Self::One(v) => vec![v],
            Self::Many(vs) => vs,
        }
    }

    fn push(self, value: RawScalar) -> Self {
        let mut values = self.into_vec();
        values.push(value);
        Self::Many(values)
    }
}

/// Filter input before validation. Every field is optional and may hold
/// anything; [`RawFilter::normalize`] turns it into a [`FilterSpec`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawFilter {
    pub action: Option<OneOrMany>,
    #[serde(alias = "user_id")]
    pub actor_id: Option<OneOrMany>,
    #[serde(alias = "object_type")]
    pub subject_type: Option<OneOrMany>,
    #[serde(alias = "object_id")]
    pub subject_id: Option<RawScalar>,
    #[serde(alias = "date_from")]
    pub from: Option<String>,
    #[serde(alias = "date_to")]
    pub to: Option<String>,
    pub search: Option<String>,
    #[serde(alias = "orderby")]
    pub order_by: Option<String>,
    #[serde(alias = "order")]
    pub order_direction: Option<String>,
    pub limit: Option<RawScalar>,
    pub offset: Option<RawScalar>,
}

fn append(slot: Option<OneOrMany>, value: RawScalar) -> Option<OneOrMany> {
    Some(match slot {
        Some(existing) => existing.push(value),
        None => OneOrMany::One(value),
    })
}

impl RawFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an accepted action. Repeated calls build an OR-set.
    pub fn action(mut self, action: impl Into<RawScalar>) -> Self {
        self.action = append(self.action, action.into());
        self
    }

    /// Add an accepted actor id. Repeated calls build an OR-set.
    pub fn actor(mut self, actor: impl Into<RawScalar>) -> Self {
        self.actor_id = append(self.actor_id, actor.into());
        self
    }

    /// Add an accepted subject type. Repeated calls build an OR-set.
    pub fn subject_type(mut self, subject_type: impl Into<RawScalar>) -> Self {
        self.subject_type = append(self.subject_type, subject_type.into());
        self
    }

    pub fn subject_id(mut self, subject_id: impl Into<RawScalar>) -> Self {
        self.subject_id = Some(subject_id.into());
        self
    }

    pub fn created_from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    pub fn created_to(mut self, to: impl Into<String>) -> Self {
        self.to = Some(to.into());
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn order_by(mut self, field: impl Into<String>) -> Self {
        self.order_by = Some(field.into());
        self
    }

    pub fn order_direction(mut self, direction: impl Into<String>) -> Self {
        self.order_direction = Some(direction.into());
        self
    }

    pub fn limit(mut self, limit: impl Into<RawScalar>) -> Self {
        self.limit = Some(limit.into());
        self
    }

    pub fn offset(mut self, offset: impl Into<RawScalar>) -> Self {
        self.offset = Some(offset.into());
        self
    }

    /// Validate and normalize. Never fails: anything unusable is dropped
    /// or replaced by its default.
    pub fn normalize(self) -> FilterSpec {
        let actions = text_set(self.action, ACTION_MAX_CHARS);
        let subject_types = text_set(self.subject_type, SUBJECT_TYPE_MAX_CHARS);

        let mut actor_ids = Vec::new();
        for id in self
            .actor_id
            .map(OneOrMany::into_vec)
            .unwrap_or_default()
            .iter()
            .filter_map(RawScalar::as_non_negative)
            .filter(|id| i64::try_from(*id).is_ok())
        {
            if !actor_ids.contains(&id) {
                actor_ids.push(id);
            }
        }

        FilterSpec {
            actions,
            actor_ids,
            subject_types,
            subject_id: self
                .subject_id
                .and_then(|v| v.as_text())
                .and_then(|s| text::sanitize(&s, SUBJECT_ID_MAX_CHARS)),
            from: self
                .from
                .as_deref()
                .and_then(|s| timestamp::parse_bound(s, RangeEnd::From)),
            to: self
                .to
                .as_deref()
                .and_then(|s| timestamp::parse_bound(s, RangeEnd::To)),
            search: self
                .search
                .as_deref()
                .and_then(|s| text::sanitize(s, SEARCH_MAX_CHARS)),
            order_by: self
                .order_by
                .as_deref()
                .and_then(SortField::parse)
                .unwrap_or_default(),
            direction: self
                .order_direction
                .as_deref()
                .map(SortDirection::parse)
                .unwrap_or_default(),
            limit: Some(
                self.limit
                    .as_ref()
                    .and_then(RawScalar::as_non_negative)
                    .unwrap_or(DEFAULT_LIMIT),
            ),
            offset: self
                .offset
                .as_ref()
                .and_then(RawScalar::as_non_negative)
                .unwrap_or(0),
        }
    }
}

/// Sanitize every value, dropping empties and duplicates while keeping the
/// order in which values were first given.
fn text_set(values: Option<OneOrMany>, max_chars: usize) -> Vec<String> {
    let mut set: Vec<String> = Vec::new();
    for value in values.map(OneOrMany::into_vec).unwrap_or_default() {
        if let Some(clean) = value.as_text().and_then(|s| text::sanitize(&s, max_chars))
            && !set.contains(&clean)
        {
            set.push(clean);
        }
    }
    set
}

/// Columns a listing may be sorted by. Closed set: these are the only
/// identifiers that ever reach query text from caller input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    Id,
    ActorId,
    Action,
    SubjectType,
    SubjectId,
    #[default]
    CreatedAt,
}

impl SortField {
    pub const ALL: [SortField; 6] = [
        Self::Id,
        Self::ActorId,
        Self::Action,
        Self::SubjectType,
        Self::SubjectId,
        Self::CreatedAt,
    ];

    /// Exact, case-sensitive lookup by column name.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.column() == name)
    }

    pub fn column(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::ActorId => "actor_id",
            Self::Action => "action",
            Self::SubjectType => "subject_type",
            Self::SubjectId => "subject_id",
            Self::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

impl SortDirection {
    /// `asc` / `ascending` in any case is ascending; everything else is
    /// descending.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Self::Ascending,
            _ => Self::Descending,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

/// Columns for which the store can list distinct values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistinctField {
    Action,
    SubjectType,
}

impl DistinctField {
    pub fn column(self) -> &'static str {
        match self {
            Self::Action => "action",
            Self::SubjectType => "subject_type",
        }
    }
}

/// Validated match, sort and page criteria. Built only through
/// [`RawFilter::normalize`]; fields are read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSpec {
    actions: Vec<String>,
    actor_ids: Vec<u64>,
    subject_types: Vec<String>,
    subject_id: Option<String>,
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
    search: Option<String>,
    order_by: SortField,
    direction: SortDirection,
    limit: Option<u64>,
    offset: u64,
}

impl Default for FilterSpec {
    fn default() -> Self {
        RawFilter::default().normalize()
    }
}

impl FilterSpec {
    pub fn actions(&self) -> &[String] {
        &self.actions
    }

    pub fn actor_ids(&self) -> &[u64] {
        &self.actor_ids
    }

    pub fn subject_types(&self) -> &[String] {
        &self.subject_types
    }

    pub fn subject_id(&self) -> Option<&str> {
        self.subject_id.as_deref()
    }

    pub fn created_from(&self) -> Option<DateTime<Utc>> {
        self.from
    }

    pub fn created_to(&self) -> Option<DateTime<Utc>> {
        self.to
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn order_by(&self) -> SortField {
        self.order_by
    }

    pub fn direction(&self) -> SortDirection {
        self.direction
    }

    /// `None` means every matching row.
    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Same criteria without a row limit or offset.
    pub fn unbounded(self) -> Self {
        Self {
            limit: None,
            offset: 0,
            ..self
        }
    }

    /// Same criteria with the limit capped at `max`.
    pub fn capped(self, max: u64) -> Self {
        Self {
            limit: Some(self.limit.map_or(max, |l| l.min(max))),
            ..self
        }
    }

    /// Same criteria showing page `page` (1-based) of `per_page` rows.
    pub fn page(self, page: u64, per_page: u64) -> Self {
        Self {
            limit: Some(per_page),
            offset: page.saturating_sub(1).saturating_mul(per_page),
            ..self
        }
    }
}
