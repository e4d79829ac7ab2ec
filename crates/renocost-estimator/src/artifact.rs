//! `linear-v1` model artifacts stored as `<models_dir>/<service>.json`

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use renocost_types::{Features, ServiceType};

use crate::error::ModelError;
use crate::source::{CostModel, ModelLoader};

pub const LINEAR_FORMAT: &str = "linear-v1";

/// Artifact location for a service
pub fn artifact_path(models_dir: &Path, service: ServiceType) -> PathBuf {
    models_dir.join(format!("{}.json", service.as_str()))
}

/// Linear model over numeric features plus per-category offsets.
///
/// prediction = intercept + Σ weight × numeric feature + Σ offset of the
/// matching text value. Missing numeric features count as zero; unknown
/// category values add nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub format: String,
    pub service: String,
    pub intercept: f64,
    #[serde(default)]
    pub coefficients: BTreeMap<String, f64>,
    #[serde(default)]
    pub categories: BTreeMap<String, BTreeMap<String, f64>>,
}

impl LinearModel {
    pub fn new(service: ServiceType, intercept: f64) -> Self {
        Self {
            format: LINEAR_FORMAT.to_string(),
            service: service.as_str().to_string(),
            intercept,
            coefficients: BTreeMap::new(),
            categories: BTreeMap::new(),
        }
    }

    pub fn with_coefficient(mut self, feature: impl Into<String>, weight: f64) -> Self {
        self.coefficients.insert(feature.into(), weight);
        self
    }

    pub fn with_category(
        mut self,
        feature: impl Into<String>,
        value: impl Into<String>,
        offset: f64,
    ) -> Self {
        self.categories
            .entry(feature.into())
            .or_default()
            .insert(value.into(), offset);
        self
    }

    /// Parse and check an artifact for `expected`
    pub fn from_json(
        json: &str,
        path: &Path,
        expected: ServiceType,
    ) -> Result<Self, ModelError> {
        let model: LinearModel =
            serde_json::from_str(json).map_err(|source| ModelError::Malformed {
                path: path.to_path_buf(),
                source,
            })?;
        model.validate(expected)?;
        Ok(model)
    }

    pub fn validate(&self, expected: ServiceType) -> Result<(), ModelError> {
        if self.format != LINEAR_FORMAT {
            return Err(ModelError::UnsupportedFormat(self.format.clone()));
        }
        match self.service.parse::<ServiceType>() {
            Ok(service) if service == expected => {}
            _ => {
                return Err(ModelError::ServiceMismatch {
                    expected,
                    found: self.service.clone(),
                })
            }
        }
        if !self.intercept.is_finite() {
            return Err(ModelError::InvalidWeight("intercept".to_string()));
        }
        if let Some((name, _)) = self.coefficients.iter().find(|(_, w)| !w.is_finite()) {
            return Err(ModelError::InvalidWeight(name.clone()));
        }
        for (feature, offsets) in &self.categories {
            if let Some((value, _)) = offsets.iter().find(|(_, w)| !w.is_finite()) {
                return Err(ModelError::InvalidWeight(format!("{feature}={value}")));
            }
        }
        Ok(())
    }

    /// Write as pretty JSON, creating the directory
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
    }
}

impl CostModel for LinearModel {
    fn service(&self) -> ServiceType {
        self.service.parse().unwrap_or(ServiceType::Other)
    }

    fn predict(&self, features: &Features) -> Result<f64, ModelError> {
        let numeric: f64 = self
            .coefficients
            .iter()
            .map(|(name, weight)| weight * features.number(name).unwrap_or(0.0))
            .sum();

        let categorical: f64 = self
            .categories
            .iter()
            .filter_map(|(name, offsets)| {
                let value = features.text(name)?.trim();
                offsets
                    .iter()
                    .find(|(candidate, _)| candidate.eq_ignore_ascii_case(value))
                    .map(|(_, offset)| *offset)
            })
            .sum();

        let prediction = self.intercept + numeric + categorical;
        if prediction.is_finite() {
            Ok(prediction)
        } else {
            Err(ModelError::NonFinite(prediction))
        }
    }
}

/// Loads `linear-v1` artifacts from a models directory
#[derive(Debug, Clone)]
pub struct JsonModelLoader {
    models_dir: PathBuf,
}

impl JsonModelLoader {
    pub fn new(models_dir: impl Into<PathBuf>) -> Self {
        Self {
            models_dir: models_dir.into(),
        }
    }

    pub fn models_dir(&self) -> &Path {
        &self.models_dir
    }
}

impl ModelLoader for JsonModelLoader {
    fn load(&self, service: ServiceType) -> Result<Box<dyn CostModel>, ModelError> {
        let path = artifact_path(&self.models_dir, service);
        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(err) if err.kind() == ErrorKind::NotFound => return Err(ModelError::Missing(path)),
            Err(source) => return Err(ModelError::Read { path, source }),
        };
        let model = LinearModel::from_json(&json, &path, service)?;
        Ok(Box::new(model))
    }

    fn available(&self) -> Vec<ServiceType> {
        let mut services: Vec<ServiceType> = WalkDir::new(&self.models_dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| {
                entry
                    .path()
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| ext.eq_ignore_ascii_case("json"))
                    .unwrap_or(false)
            })
            .filter_map(|entry| {
                let stem = entry.path().file_stem()?.to_str()?.to_string();
                // only canonical names; `tiles.json` is not the tiling artifact
                ServiceType::ALL
                    .into_iter()
                    .find(|service| service.as_str() == stem)
            })
            .collect();
        services.sort();
        services.dedup();
        services
    }
}
