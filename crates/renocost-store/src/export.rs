//! CSV export of stored records

use std::fs::File;
use std::io::Write;
use std::iter::Peekable;
use std::path::Path;

use renocost_types::{AmcSubscription, Features, Quote, RecordFilter, RecordKind, SiteVisit, WorkLog};

use crate::error::{StoreError, StoreResult};
use crate::list::{RecordIter, RecordList};
use crate::record::StoredRecord;
use crate::store::SqliteRecordStore;

/// Header of the training set consumed by the offline model trainer
pub const TRAINING_HEADER: [&str; 5] = ["service", "area", "points", "image", "total"];

fn export_error(path: &Path, err: impl std::fmt::Display) -> StoreError {
    StoreError::Export {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

fn create_destination(path: &Path) -> StoreResult<File> {
    File::create(path).map_err(|err| export_error(path, err))
}

/// Pull the first row before the destination is truncated, so an
/// unreachable database leaves an existing file intact.
fn open_listing<T: StoredRecord>(list: &RecordList<T>) -> StoreResult<Peekable<RecordIter<T>>> {
    let mut records = list.iter().peekable();
    if matches!(records.peek(), Some(Err(_))) {
        if let Some(Err(err)) = records.next() {
            return Err(err);
        }
    }
    Ok(records)
}

/// Write records as CSV with the entity's column header
pub fn write_table<T, I, W>(records: I, out: W) -> StoreResult<usize>
where
    T: StoredRecord,
    I: IntoIterator<Item = StoreResult<T>>,
    W: Write,
{
    let mut writer = csv::Writer::from_writer(out);
    writer
        .write_record(T::COLUMNS)
        .map_err(|err| StoreError::Io(err.into()))?;

    let mut rows = 0;
    for record in records {
        writer
            .write_record(record?.csv_row()?)
            .map_err(|err| StoreError::Io(err.into()))?;
        rows += 1;
    }
    writer.flush()?;
    Ok(rows)
}

fn training_row(quote: &Quote) -> Vec<String> {
    let features: &Features = &quote.input_features;
    let image = features
        .number(Features::IMAGE)
        .unwrap_or(if quote.photo_refs.is_empty() { 0.0 } else { 1.0 });
    vec![
        quote.service_type.as_str().to_string(),
        features.area().to_string(),
        features.points().to_string(),
        image.to_string(),
        format!("{:.2}", quote.estimated_cost),
    ]
}

impl SqliteRecordStore {
    /// Export every record of one kind matching `filter`.
    ///
    /// Returns the number of data rows written. An unwritable destination
    /// fails with [`StoreError::Export`].
    pub fn export_records<T: StoredRecord>(
        &self,
        filter: &RecordFilter,
        dest: &Path,
    ) -> StoreResult<usize> {
        let records = open_listing(&self.list::<T>(filter.clone()))?;
        let file = create_destination(dest)?;
        let rows = write_table(records, file).map_err(|err| match err {
            StoreError::Io(io) => export_error(dest, io),
            other => other,
        })?;
        tracing::info!(kind = T::KIND.as_str(), rows, path = %dest.display(), "records exported");
        Ok(rows)
    }

    pub fn export_to_table(
        &self,
        kind: RecordKind,
        filter: &RecordFilter,
        dest: &Path,
    ) -> StoreResult<usize> {
        match kind {
            RecordKind::Quote => self.export_records::<Quote>(filter, dest),
            RecordKind::SiteVisit => self.export_records::<SiteVisit>(filter, dest),
            RecordKind::Amc => self.export_records::<AmcSubscription>(filter, dest),
            RecordKind::WorkLog => self.export_records::<WorkLog>(filter, dest),
        }
    }

    /// Write all quotes as `service,area,points,image,total`
    pub fn export_training_set(&self, dest: &Path) -> StoreResult<usize> {
        let records = open_listing(&self.quotes(RecordFilter::new()))?;
        let file = create_destination(dest)?;
        let mut writer = csv::Writer::from_writer(file);
        writer
            .write_record(TRAINING_HEADER)
            .map_err(|err| export_error(dest, err))?;

        let mut rows = 0;
        for quote in records {
            writer
                .write_record(training_row(&quote?))
                .map_err(|err| export_error(dest, err))?;
            rows += 1;
        }
        writer.flush().map_err(|err| export_error(dest, err))?;

        tracing::info!(rows, path = %dest.display(), "training set exported");
        Ok(rows)
    }
}
