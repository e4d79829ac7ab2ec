//! Lazy, restartable record listing.
//!
//! A [`RecordList`] is a description of a query; nothing touches the
//! database until the first `next()` on one of its iterators. Rows come back
//! newest first in pages, using the last `(created, rowid)` pair seen as the
//! keyset cursor for the following page.

use std::collections::VecDeque;
use std::marker::PhantomData;

use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};

use renocost_types::RecordFilter;

use crate::error::StoreResult;
use crate::record::{encode_time, StoredRecord};
use crate::store::SqliteRecordStore;

/// Rows fetched per round trip
pub const PAGE_SIZE: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Cursor {
    created: String,
    rowid: i64,
}

/// Matching records of one kind, newest first
#[derive(Debug, Clone)]
pub struct RecordList<T> {
    store: SqliteRecordStore,
    filter: RecordFilter,
    _record: PhantomData<fn() -> T>,
}

impl<T: StoredRecord> RecordList<T> {
    pub(crate) fn new(store: SqliteRecordStore, filter: RecordFilter) -> Self {
        Self {
            store,
            filter,
            _record: PhantomData,
        }
    }

    pub fn filter(&self) -> &RecordFilter {
        &self.filter
    }

    /// Fresh iterator starting from the newest record
    pub fn iter(&self) -> RecordIter<T> {
        RecordIter {
            store: self.store.clone(),
            filter: self.filter.clone(),
            conn: None,
            buffer: VecDeque::new(),
            cursor: None,
            yielded: 0,
            exhausted: false,
            _record: PhantomData,
        }
    }

    /// Drain a fresh iterator, stopping at the first error
    pub fn to_vec(&self) -> StoreResult<Vec<T>> {
        self.iter().collect()
    }
}

impl<'a, T: StoredRecord> IntoIterator for &'a RecordList<T> {
    type Item = StoreResult<T>;
    type IntoIter = RecordIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over a [`RecordList`]; holds its connection until dropped
pub struct RecordIter<T> {
    store: SqliteRecordStore,
    filter: RecordFilter,
    conn: Option<Connection>,
    buffer: VecDeque<T>,
    cursor: Option<Cursor>,
    yielded: usize,
    exhausted: bool,
    _record: PhantomData<fn() -> T>,
}

impl<T: StoredRecord> RecordIter<T> {
    fn remaining(&self) -> Option<usize> {
        self.filter.limit.map(|limit| limit.saturating_sub(self.yielded))
    }

    fn fetch_page(&mut self) -> StoreResult<()> {
        let page_size = match self.remaining() {
            Some(remaining) => remaining.min(PAGE_SIZE),
            None => PAGE_SIZE,
        };
        if page_size == 0 {
            self.exhausted = true;
            return Ok(());
        }

        if self.conn.is_none() {
            self.conn = Some(self.store.connect()?);
        }
        let Some(conn) = self.conn.as_ref() else {
            return Ok(());
        };

        let (sql, values) = page_query::<T>(&self.filter, self.cursor.as_ref(), page_size);
        let mut stmt = conn.prepare_cached(&sql)?;
        let created_idx = T::COLUMNS.len();
        let mut rows = stmt.query(params_from_iter(values))?;

        let mut fetched = 0usize;
        let mut last = None;
        while let Some(row) = rows.next()? {
            let record = T::from_row(row)?;
            last = Some(Cursor {
                created: row.get(created_idx)?,
                rowid: row.get(created_idx + 1)?,
            });
            self.buffer.push_back(record);
            fetched += 1;
        }

        tracing::debug!(table = T::TABLE, fetched, "fetched record page");

        if fetched < page_size {
            self.exhausted = true;
        }
        if last.is_some() {
            self.cursor = last;
        }
        Ok(())
    }
}

impl<T: StoredRecord> Iterator for RecordIter<T> {
    type Item = StoreResult<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining() == Some(0) {
            return None;
        }
        if self.buffer.is_empty() && !self.exhausted {
            if let Err(err) = self.fetch_page() {
                self.exhausted = true;
                self.buffer.clear();
                return Some(Err(err));
            }
        }
        let record = self.buffer.pop_front()?;
        self.yielded += 1;
        Some(Ok(record))
    }
}

/// WHERE clause and bound values for a filter, without keyset or limit
pub(crate) fn filter_clause<T: StoredRecord>(filter: &RecordFilter) -> (Vec<String>, Vec<Value>) {
    let mut conditions = Vec::new();
    let mut values = Vec::new();

    match (T::SERVICE_COLUMN, filter.service_type) {
        (Some(column), Some(service)) => {
            conditions.push(format!("{column} = ?"));
            values.push(Value::Text(service.as_str().to_string()));
        }
        (None, Some(service)) => {
            tracing::debug!(table = T::TABLE, %service, "service filter ignored");
        }
        _ => {}
    }

    match (T::STATUS_COLUMN, filter.status.as_deref()) {
        (Some(column), Some(status)) => {
            conditions.push(format!("{column} = ?"));
            values.push(Value::Text(status.trim().to_lowercase()));
        }
        (None, Some(status)) => {
            tracing::debug!(table = T::TABLE, status, "status filter ignored");
        }
        _ => {}
    }

    if let Some(since) = filter.since {
        conditions.push(format!("{} >= ?", T::CREATED_COLUMN));
        values.push(Value::Text(encode_time(&since)));
    }
    if let Some(until) = filter.until {
        conditions.push(format!("{} <= ?", T::CREATED_COLUMN));
        values.push(Value::Text(encode_time(&until)));
    }

    (conditions, values)
}

fn page_query<T: StoredRecord>(
    filter: &RecordFilter,
    cursor: Option<&Cursor>,
    page_size: usize,
) -> (String, Vec<Value>) {
    let (mut conditions, mut values) = filter_clause::<T>(filter);
    let created = T::CREATED_COLUMN;

    if let Some(cursor) = cursor {
        conditions.push(format!(
            "({created} < ? OR ({created} = ? AND rowid < ?))"
        ));
        values.push(Value::Text(cursor.created.clone()));
        values.push(Value::Text(cursor.created.clone()));
        values.push(Value::Integer(cursor.rowid));
    }

    let mut sql = format!(
        "SELECT {}, {created}, rowid FROM {}",
        T::COLUMNS.join(", "),
        T::TABLE
    );
    if !conditions.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" AND "));
    }
    sql.push_str(&format!(" ORDER BY {created} DESC, rowid DESC LIMIT {page_size}"));

    (sql, values)
}
