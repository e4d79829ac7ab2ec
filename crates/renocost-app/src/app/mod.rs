//! Use cases

mod renovation_service;

pub use renovation_service::{Clock, EstimateOutcome, HistorySummary, RenovationService};
