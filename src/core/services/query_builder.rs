use crate::core::models::filter::FilterSpec;
use crate::core::models::query_plan::{Condition, QueryPlan, SqlValue, Window};
use crate::core::models::text;
use crate::core::models::timestamp;

/// Compiles a [`FilterSpec`] into a [`QueryPlan`].
///
/// Conditions are emitted in a fixed order: action, actor, subject type,
/// subject id, lower date bound, upper date bound, search. Multi-valued
/// fields OR their values inside one condition.
pub struct QueryBuilder;

impl QueryBuilder {
    /// Plan for a listing: conditions, ordering and row window.
    pub fn compile(&self, spec: &FilterSpec) -> QueryPlan {
        QueryPlan {
            conditions: self.conditions(spec),
            ordering: Some((spec.order_by(), spec.direction())),
            window: Some(Window {
                limit: spec.limit(),
                offset: spec.offset(),
            }),
        }
    }

    /// Plan for counting every match, ignoring ordering and window.
    pub fn compile_count(&self, spec: &FilterSpec) -> QueryPlan {
        QueryPlan {
            conditions: self.conditions(spec),
            ordering: None,
            window: None,
        }
    }

    fn conditions(&self, spec: &FilterSpec) -> Vec<Condition> {
        let mut conditions = Vec::new();

        if let Some(c) = one_of("action", spec.actions().iter().map(|a| a.as_str().into())) {
            conditions.push(c);
        }

        let actors = spec
            .actor_ids()
            .iter()
            .filter_map(|id| i64::try_from(*id).ok())
            .map(SqlValue::Integer);
        if let Some(c) = one_of("actor_id", actors) {
            conditions.push(c);
        }

        if let Some(c) = one_of(
            "subject_type",
            spec.subject_types().iter().map(|t| t.as_str().into()),
        ) {
            conditions.push(c);
        }

        if let Some(subject_id) = spec.subject_id() {
            conditions.push(Condition::new(
                "subject_id = ?".into(),
                vec![subject_id.into()],
            ));
        }

        if let Some(from) = spec.created_from() {
            conditions.push(Condition::new(
                "created_at >= ?".into(),
                vec![SqlValue::Text(timestamp::to_storage(&from))],
            ));
        }

        if let Some(to) = spec.created_to() {
            conditions.push(Condition::new(
                "created_at <= ?".into(),
                vec![SqlValue::Text(timestamp::to_storage(&to))],
            ));
        }

        if let Some(term) = spec.search() {
            conditions.push(search_condition(term));
        }

        conditions
    }
}

/// `column = ?` for one value, `column IN (?, ...)` for several, nothing
/// for none.
fn one_of(column: &'static str, values: impl Iterator<Item = SqlValue>) -> Option<Condition> {
    let values: Vec<SqlValue> = values.collect();
    let sql = match values.len() {
        0 => return None,
        1 => format!("{column} = ?"),
        n => format!("{column} IN ({})", vec!["?"; n].join(", ")),
    };
    Some(Condition::new(sql, values))
}

/// Substring match on action, subject type and metadata; exact match on
/// subject id.
fn search_condition(term: &str) -> Condition {
    let pattern = format!("%{}%", text::escape_like(term));
    Condition::new(
        "(action LIKE ? ESCAPE '\\' OR subject_type LIKE ? ESCAPE '\\' \
         OR subject_id = ? OR metadata LIKE ? ESCAPE '\\')"
            .into(),
        vec![
            SqlValue::Text(pattern.clone()),
            SqlValue::Text(pattern.clone()),
            SqlValue::Text(term.to_string()),
            SqlValue::Text(pattern),
        ],
    )
}
