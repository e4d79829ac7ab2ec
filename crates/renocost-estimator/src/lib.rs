//! Cost estimation: trained per-service models with a heuristic fallback

mod artifact;
mod engine;
mod error;
mod source;

pub use artifact::{artifact_path, JsonModelLoader, LinearModel, LINEAR_FORMAT};
pub use engine::EstimationEngine;
pub use error::ModelError;
pub use source::{CostModel, EstimationSource, ModelLoader};
