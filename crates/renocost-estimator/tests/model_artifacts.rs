use std::fs;

use renocost_domain::model::HeuristicRates;
use renocost_estimator::{artifact_path, EstimationEngine, LinearModel};
use renocost_types::{ConfidenceSource, Features, ServiceType};

fn engine_with(dir: &tempfile::TempDir) -> EstimationEngine {
    EstimationEngine::new(Some(dir.path().to_path_buf()), HeuristicRates::default())
}

#[test]
fn artifact_present_uses_model() {
    let dir = tempfile::tempdir().unwrap();
    LinearModel::new(ServiceType::Tiling, 2000.0)
        .with_coefficient("area", 700.0)
        .save(&artifact_path(dir.path(), ServiceType::Tiling))
        .unwrap();

    let engine = engine_with(&dir);
    let estimate = engine
        .estimate("Tiles", &Features::new().with_number("area", 10.0))
        .unwrap();
    assert_eq!(estimate.service_type, ServiceType::Tiling);
    assert_eq!(estimate.confidence_source, ConfidenceSource::Model);
    assert_eq!(estimate.estimated_cost, 9000.0);

    // other services still have no artifact
    let painting = engine
        .estimate("painting", &Features::new().with_number("area", 10.0))
        .unwrap();
    assert_eq!(painting.confidence_source, ConfidenceSource::Heuristic);
}

#[test]
fn malformed_artifact_falls_back_to_heuristic() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(artifact_path(dir.path(), ServiceType::Painting), "{ not json").unwrap();

    let estimate = engine_with(&dir)
        .estimate("painting", &Features::new().with_number("area", 500.0))
        .unwrap();
    assert_eq!(estimate.confidence_source, ConfidenceSource::Heuristic);
    assert_eq!(estimate.estimated_cost, 42500.0);
}

#[test]
fn artifact_for_another_service_is_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let mismatched = LinearModel::new(ServiceType::Plumbing, 99.0);
    mismatched
        .save(&artifact_path(dir.path(), ServiceType::Other))
        .unwrap();

    let estimate = engine_with(&dir)
        .estimate("other", &Features::new().with_number("area", 2.0))
        .unwrap();
    assert_eq!(estimate.confidence_source, ConfidenceSource::Heuristic);
    assert_eq!(estimate.estimated_cost, 460.0);
}

#[test]
fn available_models_lists_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    for service in [ServiceType::Tiling, ServiceType::Painting] {
        LinearModel::new(service, 1.0)
            .save(&artifact_path(dir.path(), service))
            .unwrap();
    }
    fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
    fs::write(dir.path().join("roofing.json"), "{}").unwrap();

    assert_eq!(
        engine_with(&dir).available_models(),
        vec![ServiceType::Painting, ServiceType::Tiling]
    );
}

#[test]
fn missing_models_dir_is_heuristic() {
    let dir = tempfile::tempdir().unwrap();
    let engine = EstimationEngine::new(Some(dir.path().join("nope")), HeuristicRates::default());
    assert!(engine.available_models().is_empty());

    for service in ServiceType::ALL {
        let estimate = engine
            .estimate_for(service, &Features::new().with_number("area", 20.0))
            .unwrap();
        assert!(estimate.estimated_cost >= 0.0);
        assert_eq!(estimate.confidence_source, ConfidenceSource::Heuristic);
    }
}
