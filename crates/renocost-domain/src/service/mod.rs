//! Domain services

pub mod heuristic;
pub mod lifecycle;
pub mod ranking;
pub mod suggestion;

pub use heuristic::heuristic_breakdown;
pub use lifecycle::{amc_end_date, can_transition, effective_status, transition_visit};
pub use ranking::{providers_for_service, rank_providers, search_providers};
pub use suggestion::purchase_suggestion;
