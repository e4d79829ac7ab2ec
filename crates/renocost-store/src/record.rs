//! Table mapping for each persisted entity

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::{Type, Value};
use rusqlite::Row;

use renocost_types::{AmcSubscription, Quote, RecordKind, SiteVisit, WorkLog};

use crate::error::{StoreError, StoreResult};

/// Fixed-width RFC 3339 UTC timestamp; sorts lexicographically
pub fn encode_time(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub fn decode_time(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|err| conversion_error(idx, err))
}

fn conversion_error<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, err.into())
}

fn text(value: impl Into<String>) -> Value {
    Value::Text(value.into())
}

fn optional_text(value: Option<&String>) -> Value {
    value.map_or(Value::Null, |v| Value::Text(v.clone()))
}

/// An entity that lives in its own table.
///
/// `COLUMNS` is the declared attribute order: the insert order, the order
/// `from_row` reads, and the CSV export header.
pub trait StoredRecord: Sized {
    const KIND: RecordKind;
    const TABLE: &'static str;
    const COLUMNS: &'static [&'static str];
    const CREATED_COLUMN: &'static str;
    const SERVICE_COLUMN: Option<&'static str> = None;
    const STATUS_COLUMN: Option<&'static str> = None;

    fn id(&self) -> &str;

    fn validate(&self) -> StoreResult<()> {
        Ok(())
    }

    /// Values in `COLUMNS` order
    fn to_values(&self) -> StoreResult<Vec<Value>>;

    /// Read a record from columns `0..COLUMNS.len()`
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    /// Export cells in `COLUMNS` order
    fn csv_row(&self) -> StoreResult<Vec<String>>;
}

impl StoredRecord for Quote {
    const KIND: RecordKind = RecordKind::Quote;
    const TABLE: &'static str = "quotes";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "service_type",
        "input_features",
        "estimated_cost",
        "confidence_source",
        "created_at",
        "photo_refs",
    ];
    const CREATED_COLUMN: &'static str = "created_at";
    const SERVICE_COLUMN: Option<&'static str> = Some("service_type");

    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> StoreResult<()> {
        if !self.estimated_cost.is_finite() || self.estimated_cost < 0.0 {
            return Err(StoreError::InvalidRecord {
                table: Self::TABLE,
                message: format!(
                    "estimated cost must be a non-negative number, got {}",
                    self.estimated_cost
                ),
            });
        }
        Ok(())
    }

    fn to_values(&self) -> StoreResult<Vec<Value>> {
        Ok(vec![
            text(self.id.clone()),
            text(self.service_type.as_str()),
            text(serde_json::to_string(&self.input_features)?),
            Value::Real(self.estimated_cost),
            text(self.confidence_source.as_str()),
            text(encode_time(&self.created_at)),
            text(serde_json::to_string(&self.photo_refs)?),
        ])
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let service: String = row.get(1)?;
        let features: String = row.get(2)?;
        let source: String = row.get(4)?;
        let created_at: String = row.get(5)?;
        let photo_refs: String = row.get(6)?;

        Ok(Quote {
            id: row.get(0)?,
            service_type: service.parse().map_err(|err| conversion_error(1, err))?,
            input_features: serde_json::from_str(&features).map_err(|err| conversion_error(2, err))?,
            estimated_cost: row.get(3)?,
            confidence_source: source.parse().map_err(|err: String| conversion_error(4, err))?,
            created_at: decode_time(5, &created_at)?,
            photo_refs: serde_json::from_str(&photo_refs).map_err(|err| conversion_error(6, err))?,
        })
    }

    fn csv_row(&self) -> StoreResult<Vec<String>> {
        Ok(vec![
            self.id.clone(),
            self.service_type.as_str().to_string(),
            serde_json::to_string(&self.input_features)?,
            format!("{:.2}", self.estimated_cost),
            self.confidence_source.as_str().to_string(),
            encode_time(&self.created_at),
            self.photo_refs.join(";"),
        ])
    }
}

impl StoredRecord for SiteVisit {
    const KIND: RecordKind = RecordKind::SiteVisit;
    const TABLE: &'static str = "site_visits";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "scheduled_at",
        "address",
        "linked_quote_id",
        "status",
        "customer",
        "created_at",
    ];
    const CREATED_COLUMN: &'static str = "created_at";
    const STATUS_COLUMN: Option<&'static str> = Some("status");

    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> StoreResult<()> {
        if self.address.trim().is_empty() {
            return Err(StoreError::InvalidRecord {
                table: Self::TABLE,
                message: "address must not be empty".to_string(),
            });
        }
        Ok(())
    }

    fn to_values(&self) -> StoreResult<Vec<Value>> {
        Ok(vec![
            text(self.id.clone()),
            text(encode_time(&self.scheduled_at)),
            text(self.address.clone()),
            optional_text(self.linked_quote_id.as_ref()),
            text(self.status.as_str()),
            optional_text(self.customer.as_ref()),
            text(encode_time(&self.created_at)),
        ])
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let scheduled_at: String = row.get(1)?;
        let status: String = row.get(4)?;
        let created_at: String = row.get(6)?;

        Ok(SiteVisit {
            id: row.get(0)?,
            scheduled_at: decode_time(1, &scheduled_at)?,
            address: row.get(2)?,
            linked_quote_id: row.get(3)?,
            status: status.parse().map_err(|err: String| conversion_error(4, err))?,
            customer: row.get(5)?,
            created_at: decode_time(6, &created_at)?,
        })
    }

    fn csv_row(&self) -> StoreResult<Vec<String>> {
        Ok(vec![
            self.id.clone(),
            encode_time(&self.scheduled_at),
            self.address.clone(),
            self.linked_quote_id.clone().unwrap_or_default(),
            self.status.as_str().to_string(),
            self.customer.clone().unwrap_or_default(),
            encode_time(&self.created_at),
        ])
    }
}

impl StoredRecord for AmcSubscription {
    const KIND: RecordKind = RecordKind::Amc;
    const TABLE: &'static str = "amc_subscriptions";
    const COLUMNS: &'static [&'static str] = &["id", "plan", "start_date", "status", "customer"];
    const CREATED_COLUMN: &'static str = "start_date";
    const STATUS_COLUMN: Option<&'static str> = Some("status");

    fn id(&self) -> &str {
        &self.id
    }

    fn to_values(&self) -> StoreResult<Vec<Value>> {
        Ok(vec![
            text(self.id.clone()),
            text(self.plan.as_str()),
            text(encode_time(&self.start_date)),
            text(self.status.as_str()),
            optional_text(self.customer.as_ref()),
        ])
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let plan: String = row.get(1)?;
        let start_date: String = row.get(2)?;
        let status: String = row.get(3)?;

        Ok(AmcSubscription {
            id: row.get(0)?,
            plan: plan.parse().map_err(|err: String| conversion_error(1, err))?,
            start_date: decode_time(2, &start_date)?,
            status: status.parse().map_err(|err: String| conversion_error(3, err))?,
            customer: row.get(4)?,
        })
    }

    fn csv_row(&self) -> StoreResult<Vec<String>> {
        Ok(vec![
            self.id.clone(),
            self.plan.as_str().to_string(),
            encode_time(&self.start_date),
            self.status.as_str().to_string(),
            self.customer.clone().unwrap_or_default(),
        ])
    }
}

impl StoredRecord for WorkLog {
    const KIND: RecordKind = RecordKind::WorkLog;
    const TABLE: &'static str = "work_logs";
    const COLUMNS: &'static [&'static str] =
        &["id", "worker", "completed", "next_day", "photo_ref", "created_at"];
    const CREATED_COLUMN: &'static str = "created_at";

    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> StoreResult<()> {
        let message = if self.worker.trim().is_empty() {
            "worker must not be empty"
        } else if self.completed.trim().is_empty() && self.next_day.trim().is_empty() {
            "either completed or next-day work must be given"
        } else {
            return Ok(());
        };
        Err(StoreError::InvalidRecord {
            table: Self::TABLE,
            message: message.to_string(),
        })
    }

    fn to_values(&self) -> StoreResult<Vec<Value>> {
        Ok(vec![
            text(self.id.clone()),
            text(self.worker.clone()),
            text(self.completed.clone()),
            text(self.next_day.clone()),
            optional_text(self.photo_ref.as_ref()),
            text(encode_time(&self.created_at)),
        ])
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let created_at: String = row.get(5)?;

        Ok(WorkLog {
            id: row.get(0)?,
            worker: row.get(1)?,
            completed: row.get(2)?,
            next_day: row.get(3)?,
            photo_ref: row.get(4)?,
            created_at: decode_time(5, &created_at)?,
        })
    }

    fn csv_row(&self) -> StoreResult<Vec<String>> {
        Ok(vec![
            self.id.clone(),
            self.worker.clone(),
            self.completed.clone(),
            self.next_day.clone(),
            self.photo_ref.clone().unwrap_or_default(),
            encode_time(&self.created_at),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_encoded_time_is_fixed_width() {
        let whole = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();
        let fractional = whole + chrono::Duration::nanoseconds(1500);
        assert_eq!(encode_time(&whole), "2026-03-01T10:00:00.000000000Z");
        assert_eq!(encode_time(&whole).len(), encode_time(&fractional).len());
        assert!(encode_time(&whole) < encode_time(&fractional));
    }

    #[test]
    fn test_decode_round_trip() {
        let at = Utc.with_ymd_and_hms(2026, 10, 19, 8, 30, 15).unwrap()
            + chrono::Duration::nanoseconds(123_456_789);
        assert_eq!(decode_time(0, &encode_time(&at)).unwrap(), at);
    }

    #[test]
    fn test_columns_match_values() {
        let quote = Quote::new(
            renocost_types::ServiceType::Painting,
            renocost_types::Features::new().with_number("area", 5.0),
            100.0,
            renocost_types::ConfidenceSource::Heuristic,
            Utc::now(),
        );
        assert_eq!(quote.to_values().unwrap().len(), Quote::COLUMNS.len());
        assert_eq!(quote.csv_row().unwrap().len(), Quote::COLUMNS.len());
    }
}
