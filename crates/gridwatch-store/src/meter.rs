use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use gridwatch_models::reading::{EnergyReading, METER_TABLE_DDL};
use rusqlite::Connection;
use tracing::debug;

use crate::error::StoreError;
use crate::row::{QuerySpec, ResultRow, SqlValue};

/// Read-only query access to the meter store. Abstracted as a trait so the
/// tool service can run against a mock in tests.
#[async_trait]
pub trait QueryStore: Send + Sync {
    /// Execute a validated read query and return its rows.
    async fn execute(&self, spec: QuerySpec) -> Result<Vec<ResultRow>, StoreError>;
}

/// SQLite-backed meter store.
///
/// The database is written by the external collection pipeline; gridwatch
/// only reads. `rusqlite::Connection` is not `Sync`, so access is serialized
/// through a mutex, and the blocking query work runs on the tokio blocking
/// pool so the request path never stalls on it.
pub struct MeterStore {
    conn: Arc<Mutex<Connection>>,
    queries: Arc<AtomicU64>,
}

impl MeterStore {
    /// Open a read-only connection to the meter database.
    pub fn open(path: &str) -> Result<Self, StoreError> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self::from_connection(conn))
    }

    /// Open an in-memory database with the meter schema. The in-memory DB is
    /// writable so tests can seed readings.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(METER_TABLE_DDL)?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
            queries: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Insert a reading. In production the collection pipeline writes
    /// directly to SQLite; this path exists for tests and tooling.
    pub fn insert_reading(&self, reading: &EnergyReading) -> Result<(), StoreError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| StoreError::Worker(format!("connection mutex poisoned: {e}")))?;
        conn.execute(
            "INSERT INTO meter_readings (building, data_value, recorded_at) VALUES (?1, ?2, ?3)",
            rusqlite::params![reading.building, reading.data_value, reading.recorded_at],
        )?;
        Ok(())
    }

    /// Number of queries that reached the driver. The SELECT guard rejects
    /// before this counter moves.
    pub fn queries_executed(&self) -> u64 {
        self.queries.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl QueryStore for MeterStore {
    async fn execute(&self, spec: QuerySpec) -> Result<Vec<ResultRow>, StoreError> {
        // Rejected before any connection is touched.
        if !spec.is_select() {
            return Err(StoreError::NotReadOnly);
        }

        let conn = Arc::clone(&self.conn);
        let queries = Arc::clone(&self.queries);

        let rows = tokio::task::spawn_blocking(move || -> Result<Vec<ResultRow>, StoreError> {
            queries.fetch_add(1, Ordering::Relaxed);
            let conn = conn
                .lock()
                .map_err(|e| StoreError::Worker(format!("connection mutex poisoned: {e}")))?;

            let mut stmt = conn.prepare_cached(&spec.sql)?;
            let column_names: Vec<String> =
                stmt.column_names().iter().map(|s| s.to_string()).collect();

            let mut rows = stmt.query(rusqlite::params_from_iter(spec.params.iter()))?;
            let mut out = Vec::new();
            while let Some(row) = rows.next()? {
                let mut columns = Vec::with_capacity(column_names.len());
                for (i, name) in column_names.iter().enumerate() {
                    columns.push((name.clone(), SqlValue::from(row.get_ref(i)?)));
                }
                out.push(ResultRow::new(columns));
            }
            Ok(out)
        })
        .await
        .map_err(|e| StoreError::Worker(e.to_string()))??;

        debug!(rows = rows.len(), "query executed");
        Ok(rows)
    }
}
