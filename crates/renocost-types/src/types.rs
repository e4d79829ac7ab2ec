//! Service, feature and estimate types

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result, UnsupportedServiceError};

/// Renovation service offered by the estimator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    Painting,
    Plumbing,
    Tiling,
    Other,
}

impl ServiceType {
    pub const ALL: [ServiceType; 4] = [
        ServiceType::Painting,
        ServiceType::Plumbing,
        ServiceType::Tiling,
        ServiceType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::Painting => "painting",
            ServiceType::Plumbing => "plumbing",
            ServiceType::Tiling => "tiling",
            ServiceType::Other => "other",
        }
    }

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            ServiceType::Painting => "Painting",
            ServiceType::Plumbing => "Plumbing",
            ServiceType::Tiling => "Tiling",
            ServiceType::Other => "Other",
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceType {
    type Err = UnsupportedServiceError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "painting" => Ok(ServiceType::Painting),
            "plumbing" => Ok(ServiceType::Plumbing),
            "tiling" | "tiles" | "tile" => Ok(ServiceType::Tiling),
            "other" => Ok(ServiceType::Other),
            _ => Err(UnsupportedServiceError(s.to_string())),
        }
    }
}

/// Where an estimated cost came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceSource {
    Model,
    Heuristic,
}

impl ConfidenceSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceSource::Model => "model",
            ConfidenceSource::Heuristic => "heuristic",
        }
    }
}

impl fmt::Display for ConfidenceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfidenceSource {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "model" => Ok(ConfidenceSource::Model),
            "heuristic" => Ok(ConfidenceSource::Heuristic),
            other => Err(format!("unknown confidence source: {other}")),
        }
    }
}

/// A single input feature value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Number(f64),
    Text(String),
}

impl FeatureValue {
    /// Numbers parse as numbers, everything else is kept as text
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw.parse::<f64>() {
            Ok(n) if n.is_finite() => FeatureValue::Number(n),
            _ => FeatureValue::Text(raw.to_string()),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FeatureValue::Number(n) => Some(*n),
            FeatureValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FeatureValue::Number(_) => None,
            FeatureValue::Text(s) => Some(s),
        }
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Number(n) => write!(f, "{}", n),
            FeatureValue::Text(s) => f.write_str(s),
        }
    }
}

/// Named input features, kept sorted by name.
///
/// Well-known keys: `area` (m²), `points` (plumbing connection points),
/// `image` / `photo_count` (derived from attached photos), `material_grade`,
/// `region`. Non-finite numbers are never stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Features(BTreeMap<String, FeatureValue>);

impl Features {
    pub const AREA: &'static str = "area";
    pub const POINTS: &'static str = "points";
    pub const IMAGE: &'static str = "image";
    pub const PHOTO_COUNT: &'static str = "photo_count";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_number(mut self, key: impl Into<String>, value: f64) -> Self {
        self.insert_number(key, value);
        self
    }

    pub fn with_text(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert_text(key, value);
        self
    }

    pub fn insert_number(&mut self, key: impl Into<String>, value: f64) {
        if value.is_finite() {
            self.0.insert(key.into(), FeatureValue::Number(value));
        }
    }

    pub fn insert_text(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), FeatureValue::Text(value.into()));
    }

    pub fn get(&self, key: &str) -> Option<&FeatureValue> {
        self.0.get(key)
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.0.get(key).and_then(FeatureValue::as_number)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(FeatureValue::as_text)
    }

    /// Area in m², zero when missing
    pub fn area(&self) -> f64 {
        self.number(Self::AREA).unwrap_or(0.0)
    }

    /// Whole plumbing points, zero when missing or negative
    pub fn points(&self) -> u32 {
        self.number(Self::POINTS)
            .filter(|p| *p > 0.0)
            .map(|p| p.floor().min(u32::MAX as f64) as u32)
            .unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FeatureValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse a `key=value` pair
    pub fn parse_pair(pair: &str) -> Result<(String, FeatureValue)> {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| Error::Validation(format!("expected key=value, got {:?}", pair)))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(Error::Validation(format!("empty feature name in {:?}", pair)));
        }
        Ok((key.to_string(), FeatureValue::parse(value)))
    }

    /// Build features from `key=value` pairs; later pairs win
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut features = Features::new();
        for pair in pairs {
            let (key, value) = Self::parse_pair(pair.as_ref())?;
            features.0.insert(key, value);
        }
        Ok(features)
    }

    /// Compact JSON, stable across calls
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl FromIterator<(String, FeatureValue)> for Features {
    fn from_iter<T: IntoIterator<Item = (String, FeatureValue)>>(iter: T) -> Self {
        let mut features = Features::new();
        for (key, value) in iter {
            match value {
                FeatureValue::Number(n) => features.insert_number(key, n),
                FeatureValue::Text(s) => features.insert_text(key, s),
            }
        }
        features
    }
}

/// Kind of persisted record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    #[value(name = "quote", alias = "quotes")]
    Quote,
    #[value(name = "visit", alias = "visits", alias = "site-visit")]
    SiteVisit,
    #[value(name = "amc", alias = "subscription")]
    Amc,
    #[value(name = "worklog", alias = "work-log")]
    WorkLog,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Quote => "quote",
            RecordKind::SiteVisit => "site_visit",
            RecordKind::Amc => "amc_subscription",
            RecordKind::WorkLog => "work_log",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filter applied when listing or exporting records.
///
/// `service_type` only applies to quotes, `status` to visits and
/// subscriptions. Time bounds apply to the creation time, inclusive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFilter {
    pub service_type: Option<ServiceType>,
    pub status: Option<String>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
}

impl RecordFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_service(mut self, service: ServiceType) -> Self {
        self.service_type = Some(service);
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn since(mut self, at: DateTime<Utc>) -> Self {
        self.since = Some(at);
        self
    }

    pub fn until(mut self, at: DateTime<Utc>) -> Self {
        self.until = Some(at);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Material quantity behind a heuristic estimate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum MaterialQuantity {
    PaintLitres(f64),
    TileArea(f64),
    PlumbingPoints(u32),
    GenericArea(f64),
}

/// Heuristic cost split
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub material: f64,
    pub labour: f64,
    pub total: f64,
    pub quantity: MaterialQuantity,
}

/// Output of the estimation engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    pub service_type: ServiceType,
    pub estimated_cost: f64,
    pub confidence_source: ConfidenceSource,
    /// Heuristic split, reported even when a model priced the job
    pub breakdown: CostBreakdown,
    pub purchase_suggestion: String,
}
