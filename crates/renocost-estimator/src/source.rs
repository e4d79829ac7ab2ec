use std::fmt;

use renocost_types::{ConfidenceSource, Features, ServiceType};

use crate::error::ModelError;

/// A trained predictor for one service type
pub trait CostModel: fmt::Debug + Send + Sync {
    fn service(&self) -> ServiceType;

    /// Raw predicted total in rupees
    fn predict(&self, features: &Features) -> Result<f64, ModelError>;
}

/// Finds and loads model artifacts
pub trait ModelLoader: Send + Sync {
    fn load(&self, service: ServiceType) -> Result<Box<dyn CostModel>, ModelError>;

    /// Service types with an artifact present, sorted
    fn available(&self) -> Vec<ServiceType>;
}

/// How a single estimate is priced; decided once per estimate
#[derive(Debug)]
pub enum EstimationSource {
    Model(Box<dyn CostModel>),
    Heuristic,
}

impl EstimationSource {
    pub fn confidence(&self) -> ConfidenceSource {
        match self {
            EstimationSource::Model(_) => ConfidenceSource::Model,
            EstimationSource::Heuristic => ConfidenceSource::Heuristic,
        }
    }

    pub fn is_model(&self) -> bool {
        matches!(self, EstimationSource::Model(_))
    }
}
