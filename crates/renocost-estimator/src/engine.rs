use std::path::PathBuf;

use renocost_domain::model::HeuristicRates;
use renocost_domain::service::{heuristic_breakdown, purchase_suggestion};
use renocost_types::{round2, ConfidenceSource, Error, Estimate, Features, Result, ServiceType};

use crate::artifact::JsonModelLoader;
use crate::source::{EstimationSource, ModelLoader};

/// Prices jobs with a trained model when one loads, else with the heuristic.
///
/// Pure with respect to persistence; the only I/O is reading model
/// artifacts.
pub struct EstimationEngine {
    loader: Option<Box<dyn ModelLoader>>,
    rates: HeuristicRates,
}

impl std::fmt::Debug for EstimationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EstimationEngine")
            .field("has_loader", &self.loader.is_some())
            .field("rates", &self.rates)
            .finish()
    }
}

impl EstimationEngine {
    /// Engine reading `linear-v1` artifacts from `models_dir`, if given
    pub fn new(models_dir: Option<PathBuf>, rates: HeuristicRates) -> Self {
        Self {
            loader: models_dir
                .map(|dir| Box::new(JsonModelLoader::new(dir)) as Box<dyn ModelLoader>),
            rates,
        }
    }

    /// Heuristic-only engine
    pub fn heuristic(rates: HeuristicRates) -> Self {
        Self { loader: None, rates }
    }

    pub fn with_loader(loader: Box<dyn ModelLoader>, rates: HeuristicRates) -> Self {
        Self {
            loader: Some(loader),
            rates,
        }
    }

    pub fn rates(&self) -> &HeuristicRates {
        &self.rates
    }

    /// Decide how `service` is priced. Load failures fall back to the
    /// heuristic and are logged.
    pub fn resolve_source(&self, service: ServiceType) -> EstimationSource {
        let Some(loader) = self.loader.as_ref() else {
            return EstimationSource::Heuristic;
        };
        match loader.load(service) {
            Ok(model) => {
                tracing::debug!(%service, "using trained model");
                EstimationSource::Model(model)
            }
            Err(crate::ModelError::Missing(path)) => {
                tracing::debug!(%service, path = %path.display(), "no model artifact, using heuristic");
                EstimationSource::Heuristic
            }
            Err(err) => {
                tracing::warn!(%service, error = %err, "model unavailable, using heuristic");
                EstimationSource::Heuristic
            }
        }
    }

    /// Estimate a job given the service name as entered
    pub fn estimate(&self, service: &str, features: &Features) -> Result<Estimate> {
        let service: ServiceType = service.parse()?;
        self.estimate_for(service, features)
    }

    /// Estimate a job for a parsed service.
    ///
    /// Numeric features must be finite, and so must the resulting cost;
    /// inputs large enough to overflow are rejected with
    /// [`Error::Validation`].
    pub fn estimate_for(&self, service: ServiceType, features: &Features) -> Result<Estimate> {
        if let Some((key, value)) = features
            .iter()
            .find(|(_, value)| value.as_number().is_some_and(|n| !n.is_finite()))
        {
            return Err(Error::Validation(format!(
                "feature {key} must be a finite number, got {value}"
            )));
        }

        let breakdown = heuristic_breakdown(service, features, &self.rates);
        let suggestion = purchase_suggestion(&breakdown, &self.rates.tiling);

        let (cost, confidence_source) = match self.resolve_source(service) {
            EstimationSource::Model(model) => match model.predict(features) {
                Ok(prediction) => (round2(prediction.max(0.0)), ConfidenceSource::Model),
                Err(err) => {
                    tracing::warn!(%service, error = %err, "model prediction failed, using heuristic");
                    (breakdown.total, ConfidenceSource::Heuristic)
                }
            },
            EstimationSource::Heuristic => (breakdown.total, ConfidenceSource::Heuristic),
        };

        if !cost.is_finite() || !breakdown.total.is_finite() {
            return Err(Error::Validation(format!(
                "inputs too large to price a {service} job"
            )));
        }

        tracing::debug!(%service, cost, source = %confidence_source, "estimated");

        Ok(Estimate {
            service_type: service,
            estimated_cost: cost,
            confidence_source,
            breakdown,
            purchase_suggestion: suggestion,
        })
    }

    /// Service types that currently have a model artifact
    pub fn available_models(&self) -> Vec<ServiceType> {
        self.loader
            .as_ref()
            .map(|loader| loader.available())
            .unwrap_or_default()
    }
}
