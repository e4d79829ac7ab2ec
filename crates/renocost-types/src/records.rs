//! Persisted entities and reference data

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{ConfidenceSource, Features, ServiceType};

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// A saved cost estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub id: String,
    pub service_type: ServiceType,
    pub input_features: Features,
    /// Estimated cost in rupees, never negative
    pub estimated_cost: f64,
    pub confidence_source: ConfidenceSource,
    pub created_at: DateTime<Utc>,
    /// Attached photo file references, in upload order
    #[serde(default)]
    pub photo_refs: Vec<String>,
}

impl Quote {
    pub fn new(
        service_type: ServiceType,
        input_features: Features,
        estimated_cost: f64,
        confidence_source: ConfidenceSource,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: new_id(),
            service_type,
            input_features,
            estimated_cost: estimated_cost.max(0.0),
            confidence_source,
            created_at,
            photo_refs: Vec::new(),
        }
    }

    pub fn with_photos(mut self, photo_refs: Vec<String>) -> Self {
        self.photo_refs = photo_refs;
        self
    }
}

/// Site visit status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisitStatus {
    Requested,
    Confirmed,
    Completed,
    Cancelled,
}

impl VisitStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VisitStatus::Requested => "requested",
            VisitStatus::Confirmed => "confirmed",
            VisitStatus::Completed => "completed",
            VisitStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, VisitStatus::Completed | VisitStatus::Cancelled)
    }
}

impl fmt::Display for VisitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VisitStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "requested" => Ok(VisitStatus::Requested),
            "confirmed" => Ok(VisitStatus::Confirmed),
            "completed" => Ok(VisitStatus::Completed),
            "cancelled" => Ok(VisitStatus::Cancelled),
            other => Err(format!("unknown visit status: {other}")),
        }
    }
}

/// A scheduled on-site inspection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteVisit {
    pub id: String,
    pub scheduled_at: DateTime<Utc>,
    pub address: String,
    #[serde(default)]
    pub linked_quote_id: Option<String>,
    pub status: VisitStatus,
    #[serde(default)]
    pub customer: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl SiteVisit {
    /// New visit in `requested` state
    pub fn new(address: String, scheduled_at: DateTime<Utc>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: new_id(),
            scheduled_at,
            address,
            linked_quote_id: None,
            status: VisitStatus::Requested,
            customer: None,
            created_at,
        }
    }

    pub fn with_linked_quote(mut self, quote_id: String) -> Self {
        self.linked_quote_id = Some(quote_id);
        self
    }

    pub fn with_customer(mut self, customer: String) -> Self {
        self.customer = Some(customer);
        self
    }
}

/// Annual maintenance contract billing plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmcPlan {
    Monthly,
    Yearly,
}

impl AmcPlan {
    pub fn as_str(&self) -> &'static str {
        match self {
            AmcPlan::Monthly => "monthly",
            AmcPlan::Yearly => "yearly",
        }
    }

    /// Plan price in rupees
    pub fn price(&self) -> f64 {
        match self {
            AmcPlan::Monthly => 499.0,
            AmcPlan::Yearly => 4999.0,
        }
    }
}

impl fmt::Display for AmcPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AmcPlan {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monthly" => Ok(AmcPlan::Monthly),
            "yearly" => Ok(AmcPlan::Yearly),
            other => Err(format!("unknown AMC plan: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmcStatus {
    Active,
    Expired,
    Cancelled,
}

impl AmcStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AmcStatus::Active => "active",
            AmcStatus::Expired => "expired",
            AmcStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for AmcStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AmcStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(AmcStatus::Active),
            "expired" => Ok(AmcStatus::Expired),
            "cancelled" => Ok(AmcStatus::Cancelled),
            other => Err(format!("unknown AMC status: {other}")),
        }
    }
}

/// Maintenance contract subscription
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmcSubscription {
    pub id: String,
    pub plan: AmcPlan,
    pub start_date: DateTime<Utc>,
    pub status: AmcStatus,
    #[serde(default)]
    pub customer: Option<String>,
}

impl AmcSubscription {
    /// New active subscription starting at `start_date`
    pub fn new(plan: AmcPlan, start_date: DateTime<Utc>) -> Self {
        Self {
            id: new_id(),
            plan,
            start_date,
            status: AmcStatus::Active,
            customer: None,
        }
    }

    pub fn with_customer(mut self, customer: String) -> Self {
        self.customer = Some(customer);
        self
    }
}

/// Worker daily log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkLog {
    pub id: String,
    pub worker: String,
    pub completed: String,
    pub next_day: String,
    #[serde(default)]
    pub photo_ref: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl WorkLog {
    pub fn new(
        worker: String,
        completed: String,
        next_day: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: new_id(),
            worker,
            completed,
            next_day,
            photo_ref: None,
            created_at,
        }
    }

    pub fn with_photo(mut self, photo_ref: String) -> Self {
        self.photo_ref = Some(photo_ref);
        self
    }
}

/// Verified service provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    pub id: u32,
    pub name: String,
    pub services: BTreeSet<ServiceType>,
    /// Customer rating, 0 to 5
    pub rating: f64,
    pub phone: String,
    /// Typical charge per job in rupees
    #[serde(default)]
    pub avg_charge: Option<f64>,
}

impl Provider {
    pub fn offers(&self, service: ServiceType) -> bool {
        self.services.contains(&service)
    }
}
