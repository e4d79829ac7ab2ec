use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::{params, params_from_iter, Connection, OpenFlags, OptionalExtension};

use renocost_types::{AmcSubscription, Quote, RecordFilter, RecordKind, SiteVisit, WorkLog};

use crate::connection::configure_connection;
use crate::error::{StoreError, StoreResult};
use crate::list::{filter_clause, RecordList};
use crate::record::StoredRecord;

const SCHEMA: &str = include_str!("../sql/schema.sql");

#[derive(Debug, Clone)]
pub struct SqliteRecordStoreBuilder {
    path: Option<PathBuf>,
    read_only: bool,
    create_if_missing: bool,
}

impl Default for SqliteRecordStoreBuilder {
    fn default() -> Self {
        Self {
            path: None,
            read_only: false,
            create_if_missing: true,
        }
    }
}

impl SqliteRecordStoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn read_only(mut self, value: bool) -> Self {
        self.read_only = value;
        self
    }

    pub fn create_if_missing(mut self, value: bool) -> Self {
        self.create_if_missing = value;
        self
    }

    pub fn build(self) -> StoreResult<SqliteRecordStore> {
        let path = self.path.ok_or(StoreError::MissingPath)?;
        let mut flags = if self.read_only {
            OpenFlags::SQLITE_OPEN_READ_ONLY
        } else {
            OpenFlags::SQLITE_OPEN_READ_WRITE
        };

        if !self.read_only && self.create_if_missing {
            flags |= OpenFlags::SQLITE_OPEN_CREATE;
        }
        flags |= OpenFlags::SQLITE_OPEN_URI | OpenFlags::SQLITE_OPEN_NO_MUTEX;

        Ok(SqliteRecordStore { path, flags })
    }
}

/// Handle to the record database.
///
/// Holds only the file path and open flags; every operation opens its own
/// connection and drops it when done. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct SqliteRecordStore {
    path: PathBuf,
    flags: OpenFlags,
}

impl SqliteRecordStore {
    pub fn builder() -> SqliteRecordStoreBuilder {
        SqliteRecordStoreBuilder::new()
    }

    pub fn new(path: impl AsRef<Path>) -> StoreResult<Self> {
        SqliteRecordStoreBuilder::new().path(path).build()
    }

    /// Create parent directories, build a read-write handle and make sure
    /// the schema exists.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let store = Self::new(path)?;
        store.initialize()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn connect(&self) -> StoreResult<Connection> {
        let conn = Connection::open_with_flags(&self.path, self.flags).map_err(|source| {
            StoreError::OpenDatabase {
                path: self.path.clone(),
                source,
            }
        })?;
        configure_connection(&conn).map_err(|source| StoreError::OpenDatabase {
            path: self.path.clone(),
            source,
        })?;
        Ok(conn)
    }

    /// Create tables and indexes; safe to call repeatedly
    pub fn initialize(&self) -> StoreResult<()> {
        let conn = self.connect()?;
        conn.execute_batch(SCHEMA)?;
        tracing::debug!(path = %self.path.display(), "record store initialized");
        Ok(())
    }

    /// Insert a record and return its identifier.
    ///
    /// Fails on a duplicate identifier, a broken reference or a record that
    /// does not pass its own validation.
    pub fn save<T: StoredRecord>(&self, record: &T) -> StoreResult<String> {
        record.validate()?;
        let values = record.to_values()?;
        let placeholders = vec!["?"; T::COLUMNS.len()].join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            T::TABLE,
            T::COLUMNS.join(", "),
            placeholders
        );

        let conn = self.connect()?;
        conn.execute(&sql, params_from_iter(values))?;
        tracing::info!(kind = T::KIND.as_str(), id = record.id(), "record saved");
        Ok(record.id().to_string())
    }

    /// Lazy listing; the database is not touched until the first pull
    pub fn list<T: StoredRecord>(&self, filter: RecordFilter) -> RecordList<T> {
        RecordList::new(self.clone(), filter)
    }

    pub fn quotes(&self, filter: RecordFilter) -> RecordList<Quote> {
        self.list(filter)
    }

    pub fn visits(&self, filter: RecordFilter) -> RecordList<SiteVisit> {
        self.list(filter)
    }

    pub fn subscriptions(&self, filter: RecordFilter) -> RecordList<AmcSubscription> {
        self.list(filter)
    }

    pub fn work_logs(&self, filter: RecordFilter) -> RecordList<WorkLog> {
        self.list(filter)
    }

    pub fn find<T: StoredRecord>(&self, id: &str) -> StoreResult<Option<T>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE id = ?1",
            T::COLUMNS.join(", "),
            T::TABLE
        );
        let conn = self.connect()?;
        let record = conn
            .query_row(&sql, params![id], |row| T::from_row(row))
            .optional()?;
        Ok(record)
    }

    pub fn find_quote(&self, id: &str) -> StoreResult<Option<Quote>> {
        self.find(id)
    }

    /// Number of stored records matching `filter` (the limit is ignored)
    pub fn count<T: StoredRecord>(&self, filter: &RecordFilter) -> StoreResult<usize> {
        let (conditions, values) = filter_clause::<T>(filter);
        let mut sql = format!("SELECT COUNT(*) FROM {}", T::TABLE);
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }

        let conn = self.connect()?;
        let count: i64 = conn.query_row(&sql, params_from_iter(values), |row| row.get(0))?;
        Ok(count.max(0) as usize)
    }

    pub fn count_kind(&self, kind: RecordKind) -> StoreResult<usize> {
        let filter = RecordFilter::new();
        match kind {
            RecordKind::Quote => self.count::<Quote>(&filter),
            RecordKind::SiteVisit => self.count::<SiteVisit>(&filter),
            RecordKind::Amc => self.count::<AmcSubscription>(&filter),
            RecordKind::WorkLog => self.count::<WorkLog>(&filter),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_requires_path() {
        assert!(matches!(
            SqliteRecordStore::builder().build(),
            Err(StoreError::MissingPath)
        ));
    }

    #[test]
    fn test_read_only_flags() {
        let store = SqliteRecordStore::builder()
            .path("records.db")
            .read_only(true)
            .build()
            .unwrap();
        assert!(store.flags.contains(OpenFlags::SQLITE_OPEN_READ_ONLY));
        assert!(!store.flags.contains(OpenFlags::SQLITE_OPEN_CREATE));
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteRecordStore::open(dir.path().join("nested").join("renocost.db")).unwrap();
        store.initialize().unwrap();
        assert_eq!(store.count_kind(RecordKind::Quote).unwrap(), 0);
    }
}
