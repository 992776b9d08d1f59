use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::types::{ToSqlOutput, Type};
use rusqlite::{Connection, OptionalExtension, ToSql, params};

use crate::config::app_config::validate_table_prefix;
use crate::core::errors::{LogifyError, Result};
use crate::core::models::filter::DistinctField;
use crate::core::models::log_entry::{LogEntry, Metadata, NewLogEntry};
use crate::core::models::query_plan::{QueryPlan, SqlValue};
use crate::core::models::timestamp;
use crate::core::traits::clock::{Clock, SystemClock};
use crate::core::traits::listener::LogListener;
use crate::core::traits::log_store::LogStore;
use crate::core::traits::schema_store::SchemaStore;

/// Base name of the log table; the configured prefix is prepended.
pub const LOG_TABLE: &str = "logify";
/// Base name of the options table.
pub const OPTIONS_TABLE: &str = "logify_options";

const COLUMNS: &str = "id, actor_id, action, subject_type, subject_id, metadata, created_at";

impl ToSql for SqlValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            SqlValue::Integer(n) => ToSqlOutput::from(*n),
            SqlValue::Text(s) => ToSqlOutput::from(s.as_str()),
        })
    }
}

/// SQLite-backed log store.
///
/// One connection behind a mutex; every operation is a single autocommit
/// statement. Timestamps come from the injected [`Clock`], so a fresh
/// store writes wall-clock time.
pub struct SqliteLogStore {
    conn: Mutex<Connection>,
    log_table: String,
    options_table: String,
    clock: Arc<dyn Clock>,
    listeners: Vec<Arc<dyn LogListener>>,
}

impl SqliteLogStore {
    /// Open (creating if needed) the database at `db_path` and make sure
    /// both tables exist.
    pub fn open(db_path: impl AsRef<Path>, table_prefix: &str) -> Result<Self> {
        let db_path = db_path.as_ref();

        if let Some(parent) = db_path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(db_path)
            .map_err(|e| LogifyError::storage("open", format!("{}: {e}", db_path.display())))?;
        conn.busy_timeout(Duration::from_secs(5))
            .map_err(|e| LogifyError::storage("open", e))?;

        Self::from_connection(conn, table_prefix)
    }

    /// Private in-memory database, gone when the store is dropped.
    pub fn in_memory(table_prefix: &str) -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| LogifyError::storage("open", e))?;
        Self::from_connection(conn, table_prefix)
    }

    fn from_connection(conn: Connection, table_prefix: &str) -> Result<Self> {
        validate_table_prefix(table_prefix)?;

        let store = Self {
            conn: Mutex::new(conn),
            log_table: format!("{table_prefix}{LOG_TABLE}"),
            options_table: format!("{table_prefix}{OPTIONS_TABLE}"),
            clock: Arc::new(SystemClock),
            listeners: Vec::new(),
        };
        store.create_schema()?;
        Ok(store)
    }

    /// Replace the clock used for `created_at`.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Register insert hooks. Listeners run in registration order.
    pub fn with_listener(mut self, listener: Arc<dyn LogListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    /// The clock stamping new entries, for services that must agree with it.
    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    pub fn table_name(&self) -> &str {
        &self.log_table
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| LogifyError::storage("lock", e.to_string()))
    }

    fn row_to_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<LogEntry> {
        let id: i64 = row.get(0)?;
        let actor_id: Option<i64> = row.get(1)?;
        let metadata: Option<String> = row.get(5)?;
        let created_raw: String = row.get(6)?;

        let created_at = timestamp::from_storage(&created_raw).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                6,
                Type::Text,
                format!("unreadable created_at '{created_raw}'").into(),
            )
        })?;

        let metadata = metadata.map(Metadata::from_stored);
        if metadata.as_ref().is_some_and(Metadata::is_malformed) {
            tracing::warn!(id, "log entry has malformed metadata");
        }

        Ok(LogEntry {
            id: id.unsigned_abs(),
            actor_id: actor_id.and_then(|a| u64::try_from(a).ok()),
            action: row.get(2)?,
            subject_type: row.get(3)?,
            subject_id: row.get(4)?,
            metadata,
            created_at,
        })
    }
}

fn window_value(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

impl LogStore for SqliteLogStore {
    fn insert(&self, entry: &NewLogEntry) -> Result<u64> {
        let mut entry = entry.clone().normalized()?;
        if !self.listeners.is_empty() {
            for listener in &self.listeners {
                listener.before_log(&mut entry);
            }
            entry = entry.normalized()?;
        }

        let metadata = entry.metadata_text()?;
        let actor_id = entry
            .actor_id
            .map(i64::try_from)
            .transpose()
            .map_err(|_| LogifyError::InvalidEntry {
                detail: "actor id is out of range".into(),
            })?;

        // Timestamp under the lock so id order and created_at order agree.
        let (id, created_at) = {
            let conn = self.lock()?;
            let created_at = self.clock.now();
            conn.execute(
                &format!(
                    "INSERT INTO {} (actor_id, action, subject_type, subject_id, metadata, created_at) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    self.log_table
                ),
                params![
                    actor_id,
                    entry.action,
                    entry.subject_type,
                    entry.subject_id,
                    metadata,
                    timestamp::to_storage(&created_at),
                ],
            )
            .map_err(|e| LogifyError::storage("insert", e))?;
            (conn.last_insert_rowid().unsigned_abs(), created_at)
        };

        tracing::debug!(id, action = %entry.action, "log entry recorded");

        if !self.listeners.is_empty() {
            let stored = LogEntry {
                id,
                actor_id: entry.actor_id,
                action: entry.action,
                subject_type: entry.subject_type,
                subject_id: entry.subject_id,
                metadata: entry.metadata.map(Metadata::Structured),
                created_at,
            };
            for listener in &self.listeners {
                listener.after_log(&stored);
            }
        }

        Ok(id)
    }

    fn query(&self, plan: &QueryPlan) -> Result<Vec<LogEntry>> {
        let mut sql = format!(
            "SELECT {COLUMNS} FROM {} WHERE {}",
            self.log_table,
            plan.where_sql()
        );
        if let Some(order) = plan.order_sql() {
            sql.push(' ');
            sql.push_str(&order);
        }

        let (limit, offset) = match plan.window() {
            Some(window) => (window.limit.map_or(-1, window_value), window_value(window.offset)),
            None => (-1, 0),
        };
        sql.push_str(" LIMIT ? OFFSET ?");

        let mut values: Vec<&dyn ToSql> = plan.params().into_iter().map(|v| v as &dyn ToSql).collect();
        values.push(&limit);
        values.push(&offset);

        tracing::debug!(%sql, params = values.len(), "running log query");

        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| LogifyError::storage("query", e))?;
        let entries = stmt
            .query_map(values.as_slice(), Self::row_to_entry)
            .map_err(|e| LogifyError::storage("query", e))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| LogifyError::storage("query", e))?;

        Ok(entries)
    }

    fn count(&self, plan: &QueryPlan) -> Result<u64> {
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE {}",
            self.log_table,
            plan.where_sql()
        );
        let values: Vec<&dyn ToSql> = plan.params().into_iter().map(|v| v as &dyn ToSql).collect();

        let conn = self.lock()?;
        let total: i64 = conn
            .query_row(&sql, values.as_slice(), |row| row.get(0))
            .map_err(|e| LogifyError::storage("count", e))?;

        Ok(total.unsigned_abs())
    }

    fn delete_by_id(&self, id: u64) -> Result<u64> {
        let Ok(id) = i64::try_from(id) else {
            return Ok(0);
        };

        let conn = self.lock()?;
        let removed = conn
            .execute(
                &format!("DELETE FROM {} WHERE id = ?1", self.log_table),
                params![id],
            )
            .map_err(|e| LogifyError::storage("delete", e))?;

        Ok(removed as u64)
    }

    fn delete_older_than(&self, threshold: DateTime<Utc>) -> Result<u64> {
        let conn = self.lock()?;
        let removed = conn
            .execute(
                &format!("DELETE FROM {} WHERE created_at < ?1", self.log_table),
                params![timestamp::to_storage(&threshold)],
            )
            .map_err(|e| LogifyError::storage("delete_older_than", e))?;

        tracing::debug!(removed, threshold = %threshold, "deleted expired log entries");
        Ok(removed as u64)
    }

    fn distinct_values(&self, field: DistinctField) -> Result<Vec<String>> {
        let column = field.column();
        let sql = format!(
            "SELECT DISTINCT {column} FROM {} WHERE {column} IS NOT NULL ORDER BY {column} ASC",
            self.log_table
        );

        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| LogifyError::storage("distinct_values", e))?;
        let values = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| LogifyError::storage("distinct_values", e))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| LogifyError::storage("distinct_values", e))?;

        Ok(values)
    }
}

impl SchemaStore for SqliteLogStore {
    fn create_schema(&self) -> Result<()> {
        let t = &self.log_table;
        let schema = format!(
            "CREATE TABLE IF NOT EXISTS {t} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                actor_id INTEGER DEFAULT NULL,
                action TEXT NOT NULL,
                subject_type TEXT DEFAULT NULL,
                subject_id TEXT DEFAULT NULL,
                metadata TEXT DEFAULT NULL,
                created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f000', 'now'))
            );
            CREATE INDEX IF NOT EXISTS idx_{t}_actor_id ON {t}(actor_id);
            CREATE INDEX IF NOT EXISTS idx_{t}_action ON {t}(action);
            CREATE INDEX IF NOT EXISTS idx_{t}_subject_type ON {t}(subject_type);
            CREATE INDEX IF NOT EXISTS idx_{t}_created_at ON {t}(created_at);
            CREATE TABLE IF NOT EXISTS {o} (
                name TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
            o = self.options_table,
        );

        self.lock()?
            .execute_batch(&schema)
            .map_err(|e| LogifyError::storage("create_schema", e))
    }

    fn drop_schema(&self) -> Result<()> {
        let sql = format!(
            "DROP TABLE IF EXISTS {}; DROP TABLE IF EXISTS {};",
            self.log_table, self.options_table
        );
        self.lock()?
            .execute_batch(&sql)
            .map_err(|e| LogifyError::storage("drop_schema", e))
    }

    fn get_option(&self, name: &str) -> Result<Option<String>> {
        self.lock()?
            .query_row(
                &format!("SELECT value FROM {} WHERE name = ?1", self.options_table),
                params![name],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| LogifyError::storage("get_option", e))
    }

    fn set_option(&self, name: &str, value: &str) -> Result<()> {
        self.lock()?
            .execute(
                &format!(
                    "INSERT INTO {} (name, value) VALUES (?1, ?2) \
                     ON CONFLICT(name) DO UPDATE SET value = excluded.value",
                    self.options_table
                ),
                params![name, value],
            )
            .map(|_| ())
            .map_err(|e| LogifyError::storage("set_option", e))
    }

    fn delete_option(&self, name: &str) -> Result<()> {
        self.lock()?
            .execute(
                &format!("DELETE FROM {} WHERE name = ?1", self.options_table),
                params![name],
            )
            .map(|_| ())
            .map_err(|e| LogifyError::storage("delete_option", e))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::core::models::filter::{FilterSpec, RawFilter};
    use crate::core::services::query_builder::QueryBuilder;
    use chrono::TimeZone;
    use serde_json::json;
    use tempfile::TempDir;

    /// Clock that only moves when told to.
    struct ManualClock(Mutex<DateTime<Utc>>);

    impl ManualClock {
        fn starting_at(ts: DateTime<Utc>) -> Arc<Self> {
            Arc::new(Self(Mutex::new(ts)))
        }

        fn advance(&self, by: chrono::Duration) {
            let mut now = self.0.lock().unwrap();
            *now += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap()
    }

    fn store_with_clock() -> (SqliteLogStore, Arc<ManualClock>) {
        let clock = ManualClock::starting_at(start());
        let store = SqliteLogStore::in_memory("")
            .unwrap()
            .with_clock(clock.clone());
        (store, clock)
    }

    /// Insert one entry per action, one minute apart.
    fn insert_all(store: &SqliteLogStore, clock: &ManualClock, entries: Vec<NewLogEntry>) -> Vec<u64> {
        entries
            .into_iter()
            .map(|e| {
                clock.advance(chrono::Duration::minutes(1));
                store.insert(&e).unwrap()
            })
            .collect()
    }

    fn find(store: &SqliteLogStore, spec: &FilterSpec) -> Vec<LogEntry> {
        store.query(&QueryBuilder.compile(spec)).unwrap()
    }

    fn total(store: &SqliteLogStore, spec: &FilterSpec) -> u64 {
        store.count(&QueryBuilder.compile_count(spec)).unwrap()
    }

    fn actions(entries: &[LogEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.action.as_str()).collect()
    }

    // ─── Insert ──────────────────────────────────────────────────────

    #[test]
    fn insert_assigns_ids_and_timestamps() {
        let (store, clock) = store_with_clock();
        let ids = insert_all(
            &store,
            &clock,
            vec![NewLogEntry::new("a"), NewLogEntry::new("b")],
        );
        assert!(ids[1] > ids[0]);

        let rows = find(&store, &RawFilter::new().order_direction("asc").normalize());
        assert_eq!(rows[0].created_at, start() + chrono::Duration::minutes(1));
        assert_eq!(rows[1].created_at, start() + chrono::Duration::minutes(2));
    }

    #[test]
    fn insert_round_trips_all_fields() {
        let (store, _) = store_with_clock();
        let id = store
            .insert(
                &NewLogEntry::new("post_created")
                    .actor(7)
                    .subject("post", "123")
                    .metadata(json!({"title": "Hello", "tags": ["a", "b"], "draft": false, "n": null})),
            )
            .unwrap();

        let rows = find(&store, &FilterSpec::default());
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.id, id);
        assert_eq!(row.actor_id, Some(7));
        assert_eq!(row.subject_type.as_deref(), Some("post"));
        assert_eq!(row.subject_id.as_deref(), Some("123"));
        assert_eq!(
            row.metadata.as_ref().and_then(Metadata::as_value),
            Some(&json!({"title": "Hello", "tags": ["a", "b"], "draft": false, "n": null}))
        );
    }

    #[test]
    fn insert_rejects_empty_action() {
        let (store, _) = store_with_clock();
        let err = store.insert(&NewLogEntry::new("   ")).unwrap_err();
        assert!(matches!(err, LogifyError::InvalidEntry { .. }));
        assert_eq!(total(&store, &FilterSpec::default()), 0);
    }

    #[test]
    fn insert_rejects_actor_id_beyond_column_range() {
        let (store, _) = store_with_clock();
        let too_big = u64::try_from(i64::MAX).unwrap() + 1;

        let err = store
            .insert(&NewLogEntry::new("user_login").actor(too_big))
            .unwrap_err();
        assert!(matches!(err, LogifyError::InvalidEntry { .. }));
        assert_eq!(total(&store, &FilterSpec::default()), 0);

        let max = u64::try_from(i64::MAX).unwrap();
        store.insert(&NewLogEntry::new("user_login").actor(max)).unwrap();
        assert_eq!(find(&store, &FilterSpec::default())[0].actor_id, Some(max));
    }

    /// Hands out a strictly later instant on every call.
    struct TickingClock(std::sync::atomic::AtomicI64);

    impl Clock for TickingClock {
        fn now(&self) -> DateTime<Utc> {
            let tick = self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            start() + chrono::Duration::microseconds(tick)
        }
    }

    #[test]
    fn concurrent_inserts_keep_id_and_time_order_aligned() {
        let store = Arc::new(
            SqliteLogStore::in_memory("")
                .unwrap()
                .with_clock(Arc::new(TickingClock(0.into()))),
        );

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for i in 0..25 {
                        store.insert(&NewLogEntry::new(format!("t{t}_{i}"))).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let spec = RawFilter::new()
            .order_by("id")
            .order_direction("asc")
            .normalize()
            .unbounded();
        let rows = find(&store, &spec);
        assert_eq!(rows.len(), 200);
        assert!(
            rows.windows(2).all(|w| w[0].created_at < w[1].created_at),
            "created_at must increase with id"
        );
    }

    #[test]
    fn insert_into_dropped_table_is_storage_fault() {
        let (store, _) = store_with_clock();
        store.drop_schema().unwrap();
        let err = store.insert(&NewLogEntry::new("a")).unwrap_err();
        assert!(err.is_storage_fault());
    }

    #[test]
    fn malformed_metadata_is_flagged_on_read() {
        let (store, _) = store_with_clock();
        store
            .lock()
            .unwrap()
            .execute(
                "INSERT INTO logify (action, metadata, created_at) VALUES ('legacy', '{broken', '2026-01-01 00:00:00')",
                [],
            )
            .unwrap();

        let rows = find(&store, &FilterSpec::default());
        assert_eq!(rows.len(), 1);
        assert!(rows[0].metadata.as_ref().unwrap().is_malformed());
    }

    #[test]
    fn column_default_timestamp_is_readable() {
        let (store, _) = store_with_clock();
        store
            .lock()
            .unwrap()
            .execute("INSERT INTO logify (action) VALUES ('external')", [])
            .unwrap();
        let rows = find(&store, &FilterSpec::default());
        assert_eq!(rows[0].action, "external");
    }

    // ─── Query / count ───────────────────────────────────────────────

    #[test]
    fn default_order_is_newest_first() {
        let (store, clock) = store_with_clock();
        insert_all(
            &store,
            &clock,
            ["first", "second", "third"].map(NewLogEntry::new).to_vec(),
        );
        let rows = find(&store, &FilterSpec::default());
        assert_eq!(actions(&rows), ["third", "second", "first"]);
    }

    #[test]
    fn equal_timestamps_fall_back_to_id_order() {
        let (store, _) = store_with_clock();
        for action in ["a", "b", "c"] {
            store.insert(&NewLogEntry::new(action)).unwrap();
        }
        let rows = find(&store, &FilterSpec::default());
        assert_eq!(actions(&rows), ["c", "b", "a"]);
    }

    #[test]
    fn login_logout_scenario() {
        let (store, clock) = store_with_clock();
        insert_all(
            &store,
            &clock,
            ["login", "logout", "login"].map(NewLogEntry::new).to_vec(),
        );

        let logins = RawFilter::new().action("login");
        assert_eq!(total(&store, &logins.clone().normalize()), 2);

        let rows = find(&store, &logins.order_direction("ascending").normalize());
        assert_eq!(rows.len(), 2);
        assert!(rows[0].created_at < rows[1].created_at);
    }

    #[test]
    fn multi_valued_action_is_union() {
        let (store, clock) = store_with_clock();
        insert_all(
            &store,
            &clock,
            ["a", "b", "c", "a"].map(NewLogEntry::new).to_vec(),
        );
        let rows = find(
            &store,
            &RawFilter::new().action("a").action("b").normalize(),
        );
        assert_eq!(actions(&rows), ["a", "b", "a"]);
        let ids: std::collections::HashSet<u64> = rows.iter().map(|r| r.id).collect();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn fields_are_and_combined() {
        let (store, clock) = store_with_clock();
        insert_all(
            &store,
            &clock,
            vec![
                NewLogEntry::new("edit").actor(1).subject_type("post"),
                NewLogEntry::new("edit").actor(2).subject_type("post"),
                NewLogEntry::new("edit").actor(1).subject_type("page"),
                NewLogEntry::new("view").actor(1).subject_type("post"),
            ],
        );
        let spec = RawFilter::new()
            .action("edit")
            .actor(1)
            .subject_type("post")
            .normalize();
        assert_eq!(total(&store, &spec), 1);
    }

    #[test]
    fn pagination_scenario() {
        let (store, clock) = store_with_clock();
        let entries = (0..25).map(|i| NewLogEntry::new(format!("event_{i}"))).collect();
        insert_all(&store, &clock, entries);

        let spec = RawFilter::new().limit(20).offset(20).normalize();
        assert_eq!(find(&store, &spec).len(), 5);
        assert_eq!(total(&store, &FilterSpec::default()), 25);
    }

    #[test]
    fn count_matches_unbounded_query() {
        let (store, clock) = store_with_clock();
        insert_all(
            &store,
            &clock,
            (0..30)
                .map(|i| NewLogEntry::new(if i % 3 == 0 { "x" } else { "y" }).actor(i % 4))
                .collect(),
        );

        for raw in [
            RawFilter::new(),
            RawFilter::new().action("x"),
            RawFilter::new().actor(1).actor(3),
            RawFilter::new().search("y"),
            RawFilter::new().action("nope"),
        ] {
            let spec = raw.normalize();
            let all = find(&store, &spec.clone().unbounded());
            assert_eq!(total(&store, &spec), all.len() as u64);
        }
    }

    #[test]
    fn no_match_is_empty_not_error() {
        let (store, _) = store_with_clock();
        assert!(find(&store, &RawFilter::new().action("ghost").normalize()).is_empty());
    }

    #[test]
    fn search_scenario_subject_id_is_exact() {
        let (store, clock) = store_with_clock();
        insert_all(
            &store,
            &clock,
            vec![
                NewLogEntry::new("post_created"),
                NewLogEntry::new("viewed").subject("page", "post"),
                NewLogEntry::new("viewed").subject("page", "posted"),
            ],
        );

        let rows = find(&store, &RawFilter::new().search("post").normalize());
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().any(|r| r.action == "post_created"));
        assert!(rows.iter().any(|r| r.subject_id.as_deref() == Some("post")));
        assert!(!rows.iter().any(|r| r.subject_id.as_deref() == Some("posted")));
    }

    #[test]
    fn search_matches_metadata_and_escapes_wildcards() {
        let (store, clock) = store_with_clock();
        insert_all(
            &store,
            &clock,
            vec![
                NewLogEntry::new("coupon").metadata(json!({"code": "50%off"})),
                NewLogEntry::new("coupon").metadata(json!({"code": "500ff"})),
            ],
        );
        let rows = find(&store, &RawFilter::new().search("50%").normalize());
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0].metadata.as_ref().and_then(Metadata::as_value),
            Some(&json!({"code": "50%off"}))
        );
    }

    #[test]
    fn subject_id_match_is_case_sensitive() {
        let (store, clock) = store_with_clock();
        insert_all(
            &store,
            &clock,
            vec![
                NewLogEntry::new("a").subject("user", "ABC"),
                NewLogEntry::new("a").subject("user", "abc"),
            ],
        );
        let rows = find(&store, &RawFilter::new().subject_id("abc").normalize());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].subject_id.as_deref(), Some("abc"));
    }

    #[test]
    fn date_range_is_inclusive() {
        let (store, clock) = store_with_clock();
        insert_all(
            &store,
            &clock,
            ["a", "b", "c"].map(NewLogEntry::new).to_vec(),
        );
        // rows at 12:01, 12:02, 12:03
        let spec = RawFilter::new()
            .created_from("2026-01-01 12:01:00")
            .created_to("2026-01-01 12:02:00")
            .normalize();
        assert_eq!(actions(&find(&store, &spec)), ["b", "a"]);

        let whole_day = RawFilter::new().created_to("2026-01-01").normalize();
        assert_eq!(total(&store, &whole_day), 3);
    }

    #[test]
    fn sorting_by_action_ascending() {
        let (store, clock) = store_with_clock();
        insert_all(
            &store,
            &clock,
            ["m", "z", "a"].map(NewLogEntry::new).to_vec(),
        );
        let spec = RawFilter::new()
            .order_by("action")
            .order_direction("asc")
            .normalize();
        assert_eq!(actions(&find(&store, &spec)), ["a", "m", "z"]);
    }

    #[test]
    fn unknown_sort_field_does_not_fault() {
        let (store, clock) = store_with_clock();
        insert_all(&store, &clock, ["a", "b"].map(NewLogEntry::new).to_vec());
        let spec = RawFilter::new().order_by("password").normalize();
        assert_eq!(actions(&find(&store, &spec)), ["b", "a"]);
    }

    // ─── Delete ──────────────────────────────────────────────────────

    #[test]
    fn delete_missing_id_is_zero_not_error() {
        let (store, _) = store_with_clock();
        assert_eq!(store.delete_by_id(999).unwrap(), 0);
        assert_eq!(store.delete_by_id(u64::MAX).unwrap(), 0);
    }

    #[test]
    fn delete_by_id_removes_one_row() {
        let (store, clock) = store_with_clock();
        let ids = insert_all(&store, &clock, ["a", "b"].map(NewLogEntry::new).to_vec());
        assert_eq!(store.delete_by_id(ids[0]).unwrap(), 1);
        assert_eq!(store.delete_by_id(ids[0]).unwrap(), 0);
        assert_eq!(actions(&find(&store, &FilterSpec::default())), ["b"]);
    }

    #[test]
    fn delete_many_counts_removed_rows() {
        let (store, clock) = store_with_clock();
        let ids = insert_all(&store, &clock, ["a", "b", "c"].map(NewLogEntry::new).to_vec());
        assert_eq!(store.delete_many(&[ids[0], ids[2], 12345]).unwrap(), 2);
        assert_eq!(total(&store, &FilterSpec::default()), 1);
    }

    #[test]
    fn delete_older_than_is_exact_and_idempotent() {
        let (store, clock) = store_with_clock();
        insert_all(&store, &clock, ["a", "b", "c"].map(NewLogEntry::new).to_vec());
        // rows at 12:01, 12:02, 12:03; the 12:02 row is not older than itself
        let threshold = start() + chrono::Duration::minutes(2);

        assert_eq!(store.delete_older_than(threshold).unwrap(), 1);
        assert_eq!(store.delete_older_than(threshold).unwrap(), 0);
        assert_eq!(actions(&find(&store, &FilterSpec::default())), ["c", "b"]);
    }

    // ─── Distinct values ─────────────────────────────────────────────

    #[test]
    fn distinct_values_sorted_without_nulls() {
        let (store, clock) = store_with_clock();
        insert_all(
            &store,
            &clock,
            vec![
                NewLogEntry::new("zeta").subject_type("user"),
                NewLogEntry::new("alpha"),
                NewLogEntry::new("zeta").subject_type("post"),
            ],
        );
        assert_eq!(
            store.distinct_values(DistinctField::Action).unwrap(),
            ["alpha", "zeta"]
        );
        assert_eq!(
            store.distinct_values(DistinctField::SubjectType).unwrap(),
            ["post", "user"]
        );
    }

    // ─── Listeners ───────────────────────────────────────────────────

    struct Recorder {
        seen: Mutex<Vec<(u64, String)>>,
    }

    impl LogListener for Recorder {
        fn after_log(&self, entry: &LogEntry) {
            self.seen.lock().unwrap().push((entry.id, entry.action.clone()));
        }
    }

    struct Tagger;

    impl LogListener for Tagger {
        fn before_log(&self, entry: &mut NewLogEntry) {
            entry.subject_type.get_or_insert_with(|| "tagged".to_string());
        }
    }

    #[test]
    fn listeners_see_inserts() {
        let recorder = Arc::new(Recorder {
            seen: Mutex::new(Vec::new()),
        });
        let store = SqliteLogStore::in_memory("")
            .unwrap()
            .with_listener(Arc::new(Tagger))
            .with_listener(recorder.clone());

        let id = store.insert(&NewLogEntry::new("hooked")).unwrap();

        assert_eq!(*recorder.seen.lock().unwrap(), vec![(id, "hooked".to_string())]);
        let rows = find(&store, &FilterSpec::default());
        assert_eq!(rows[0].subject_type.as_deref(), Some("tagged"));
    }

    #[test]
    fn failed_insert_does_not_notify() {
        let recorder = Arc::new(Recorder {
            seen: Mutex::new(Vec::new()),
        });
        let store = SqliteLogStore::in_memory("")
            .unwrap()
            .with_listener(recorder.clone());
        store.drop_schema().unwrap();

        assert!(store.insert(&NewLogEntry::new("x")).is_err());
        assert!(recorder.seen.lock().unwrap().is_empty());
    }

    // ─── Schema / options / persistence ──────────────────────────────

    #[test]
    fn prefix_names_tables() {
        let store = SqliteLogStore::in_memory("app_").unwrap();
        assert_eq!(store.table_name(), "app_logify");
        store.insert(&NewLogEntry::new("a")).unwrap();
    }

    #[test]
    fn invalid_prefix_rejected() {
        let err = SqliteLogStore::in_memory("x;--").err().unwrap();
        assert!(matches!(err, LogifyError::InvalidConfig { .. }));
    }

    #[test]
    fn options_round_trip() {
        let (store, _) = store_with_clock();
        assert_eq!(store.get_option("db_version").unwrap(), None);
        store.set_option("db_version", "1.0.0").unwrap();
        store.set_option("db_version", "1.1.0").unwrap();
        assert_eq!(store.get_option("db_version").unwrap().as_deref(), Some("1.1.0"));
        store.delete_option("db_version").unwrap();
        assert_eq!(store.get_option("db_version").unwrap(), None);
    }

    #[test]
    fn entries_persist_across_reopen() {
        let tmp = TempDir::new().unwrap();
        let db_path = tmp.path().join("nested/dir/audit.db");

        {
            let store = SqliteLogStore::open(&db_path, "").unwrap();
            store.insert(&NewLogEntry::new("kept")).unwrap();
        }

        let store = SqliteLogStore::open(&db_path, "").unwrap();
        assert_eq!(actions(&find(&store, &FilterSpec::default())), ["kept"]);
    }
}
