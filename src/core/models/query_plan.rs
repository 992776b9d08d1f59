use crate::core::models::filter::{SortDirection, SortField};

/// A value bound to a `?` placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlValue {
    Integer(i64),
    Text(String),
}

impl From<&str> for SqlValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// One boolean condition with the values for its placeholders, in order.
///
/// The SQL fragment is assembled only from fixed column names and `?`
/// placeholders, never from caller text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    sql: String,
    params: Vec<SqlValue>,
}

impl Condition {
    pub(crate) fn new(sql: String, params: Vec<SqlValue>) -> Self {
        Self { sql, params }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[SqlValue] {
        &self.params
    }
}

/// Row window of a listing query. `limit: None` means every row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub limit: Option<u64>,
    pub offset: u64,
}

/// Compiled, parameter-bound form of a filter.
///
/// Conditions are AND-ed; an empty list matches every row. Count plans
/// carry no ordering and no window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPlan {
    pub(crate) conditions: Vec<Condition>,
    pub(crate) ordering: Option<(SortField, SortDirection)>,
    pub(crate) window: Option<Window>,
}

impl QueryPlan {
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn ordering(&self) -> Option<(SortField, SortDirection)> {
        self.ordering
    }

    pub fn window(&self) -> Option<Window> {
        self.window
    }

    pub fn matches_all(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Body of the `WHERE` clause. `1=1` when there are no conditions.
    pub fn where_sql(&self) -> String {
        if self.conditions.is_empty() {
            return "1=1".to_string();
        }
        self.conditions
            .iter()
            .map(Condition::sql)
            .collect::<Vec<_>>()
            .join(" AND ")
    }

    /// Placeholder values for [`QueryPlan::where_sql`], in order.
    pub fn params(&self) -> Vec<&SqlValue> {
        self.conditions.iter().flat_map(|c| c.params.iter()).collect()
    }

    /// `ORDER BY` clause, ties broken by `id` in the same direction.
    pub fn order_sql(&self) -> Option<String> {
        let (field, direction) = self.ordering?;
        let keyword = direction.keyword();
        Some(match field {
            SortField::Id => format!("ORDER BY id {keyword}"),
            other => format!("ORDER BY {} {keyword}, id {keyword}", other.column()),
        })
    }
}
