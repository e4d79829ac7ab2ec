//! SQLite-backed record store with lazy listing and CSV export

mod connection;
mod error;
mod export;
mod list;
mod record;
mod store;

pub use error::{StoreError, StoreResult};
pub use export::{write_table, TRAINING_HEADER};
pub use list::{RecordIter, RecordList, PAGE_SIZE};
pub use record::{decode_time, encode_time, StoredRecord};
pub use store::{SqliteRecordStore, SqliteRecordStoreBuilder};
