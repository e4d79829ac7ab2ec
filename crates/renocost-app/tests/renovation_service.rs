use std::fs;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, TimeZone, Utc};
use tempfile::TempDir;

use renocost_app::app::RenovationService;
use renocost_app::config::Config;
use renocost_estimator::{artifact_path, LinearModel};
use renocost_types::{
    AmcPlan, AmcStatus, ConfidenceSource, Error, Features, RecordFilter, RecordKind, ServiceType,
    VisitStatus,
};

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 10, 30, 0).unwrap()
}

fn setup() -> (TempDir, RenovationService) {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = Config::with_data_dir(dir.path());
    let service = RenovationService::open(&config)
        .expect("open service")
        .with_clock(fixed_now);
    (dir, service)
}

#[test]
fn painting_estimate_without_model_is_heuristic_and_listed() {
    let (_dir, service) = setup();
    let outcome = service
        .request_estimate("painting", Features::new().with_number("area", 500.0), &[])
        .unwrap();

    assert_eq!(outcome.quote.confidence_source, ConfidenceSource::Heuristic);
    assert_eq!(outcome.quote.estimated_cost, 42500.0);
    assert!(outcome.quote.estimated_cost >= 0.0);
    assert_eq!(outcome.quote.created_at, fixed_now());
    assert_eq!(outcome.quote.input_features.number("image"), Some(0.0));

    let listed = service.quotes(RecordFilter::new()).to_vec().unwrap();
    assert_eq!(listed, vec![outcome.quote]);
}

#[test]
fn unknown_service_is_rejected_and_nothing_saved() {
    let (_dir, service) = setup();
    let err = service
        .request_estimate("roofing", Features::new().with_number("area", 10.0), &[])
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedService(_)));
    assert_eq!(service.history_summary().unwrap().quotes, 0);
}

#[test]
fn photo_refs_must_be_jpg_or_png() {
    let (_dir, service) = setup();
    let err = service
        .request_estimate(
            "tiling",
            Features::new().with_number("area", 12.0),
            &["site/plan.pdf".to_string()],
        )
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    let outcome = service
        .request_estimate(
            "Tiles",
            Features::new().with_number("area", 12.0),
            &["site/floor.JPG".to_string(), "site/wall.png".to_string()],
        )
        .unwrap();
    assert_eq!(outcome.quote.service_type, ServiceType::Tiling);
    assert_eq!(outcome.quote.input_features.number("image"), Some(1.0));
    assert_eq!(outcome.quote.input_features.number("photo_count"), Some(2.0));
    assert_eq!(outcome.quote.photo_refs.len(), 2);
}

#[test]
fn model_artifact_prices_quote() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::with_data_dir(dir.path());
    LinearModel::new(ServiceType::Painting, 500.0)
        .with_coefficient("area", 90.0)
        .with_coefficient("image", 1000.0)
        .save(&artifact_path(&config.models_dir().unwrap(), ServiceType::Painting))
        .unwrap();

    let service = RenovationService::open(&config).unwrap();
    assert_eq!(service.available_models(), vec![ServiceType::Painting]);

    let outcome = service
        .request_estimate("painting", Features::new().with_number("area", 100.0), &[])
        .unwrap();
    assert_eq!(outcome.quote.confidence_source, ConfidenceSource::Model);
    assert_eq!(outcome.quote.estimated_cost, 9500.0);
    // heuristic split is still reported
    assert_eq!(outcome.estimate.breakdown.total, 8500.0);
}

#[test]
fn malformed_model_falls_back() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::with_data_dir(dir.path());
    let path = artifact_path(&config.models_dir().unwrap(), ServiceType::Plumbing);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, r#"{"format": "linear-v1", "service": "plumbing"}"#).unwrap();

    let service = RenovationService::open(&config).unwrap();
    let outcome = service
        .request_estimate("plumbing", Features::new().with_number("points", 3.0), &[])
        .unwrap();
    assert_eq!(outcome.quote.confidence_source, ConfidenceSource::Heuristic);
    assert_eq!(outcome.quote.estimated_cost, 1400.0);
}

#[test]
fn visit_with_missing_quote_is_not_found_and_not_persisted() {
    let (_dir, service) = setup();
    let when = fixed_now() + Duration::days(2);
    let err = service
        .schedule_visit("12 Lake View, Pune", when, Some("no-such-quote"))
        .unwrap_err();
    assert!(matches!(
        err,
        Error::NotFound(ref e) if e.kind == RecordKind::Quote && e.id == "no-such-quote"
    ));
    assert!(service.visits(RecordFilter::new()).to_vec().unwrap().is_empty());
}

#[test]
fn visit_linked_to_existing_quote() {
    let (_dir, service) = setup();
    let outcome = service
        .request_estimate("other", Features::new().with_number("area", 2.0), &[])
        .unwrap();
    let when = fixed_now() + Duration::days(1);
    let visit = service
        .schedule_visit_for("  7 MG Road ", when, Some(&outcome.quote.id), Some("Asha"))
        .unwrap();

    assert_eq!(visit.status, VisitStatus::Requested);
    assert_eq!(visit.address, "7 MG Road");
    assert_eq!(visit.scheduled_at, when);
    assert_eq!(visit.linked_quote_id.as_deref(), Some(outcome.quote.id.as_str()));
    assert_eq!(service.visits(RecordFilter::new()).to_vec().unwrap(), vec![visit]);

    assert!(matches!(
        service.schedule_visit("   ", when, None),
        Err(Error::Validation(_))
    ));
}

#[test]
fn yearly_amc_starts_active_at_call_time() {
    let (_dir, service) = setup();
    let subscription = service.subscribe_amc("yearly").unwrap();
    assert_eq!(subscription.plan, AmcPlan::Yearly);
    assert_eq!(subscription.status, AmcStatus::Active);
    assert_eq!(subscription.start_date, fixed_now());
    assert_eq!(service.amc_status(&subscription), AmcStatus::Active);

    assert!(matches!(service.subscribe_amc("weekly"), Err(Error::Validation(_))));
    assert_eq!(service.history_summary().unwrap().amc_subscriptions, 1);
}

#[test]
fn monthly_amc_expires_with_the_clock() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::with_data_dir(dir.path());
    let now = Arc::new(Mutex::new(fixed_now()));
    let clock = Arc::clone(&now);
    let service = RenovationService::open(&config)
        .unwrap()
        .with_clock(move || *clock.lock().unwrap());

    let subscription = service.subscribe_amc("monthly").unwrap();
    *now.lock().unwrap() = fixed_now() + Duration::days(31);
    assert_eq!(service.amc_status(&subscription), AmcStatus::Expired);
}

#[test]
fn work_log_validation_and_persistence() {
    let (_dir, service) = setup();
    assert!(matches!(
        service.log_work("", "done", "", None),
        Err(Error::Validation(_))
    ));
    assert!(matches!(
        service.log_work("Ravi", " ", "", None),
        Err(Error::Validation(_))
    ));
    assert!(matches!(
        service.log_work("Ravi", "Sanding", "", Some("day1.gif")),
        Err(Error::Validation(_))
    ));

    let log = service
        .log_work("Ravi", "Sanding", "Primer", Some("uploads/day1.jpg"))
        .unwrap();
    assert_eq!(log.created_at, fixed_now());
    assert_eq!(service.work_logs(RecordFilter::new()).to_vec().unwrap(), vec![log]);
}

#[test]
fn providers_come_ranked_from_builtin_catalogue() {
    let (_dir, service) = setup();
    let others = service.providers_for("other").unwrap();
    let names: Vec<_> = others.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "Cool AC Services",
            "Amit Electricals",
            "Dream Carpentry",
            "Modish Renovators"
        ]
    );
    assert!(service.providers_for("tiling").unwrap().is_empty());
    assert!(matches!(
        service.providers_for("roofing"),
        Err(Error::UnsupportedService(_))
    ));
    assert_eq!(service.search_providers("soni", None).unwrap().len(), 1);
}

#[test]
fn export_twice_is_byte_identical() {
    let (dir, service) = setup();
    for area in [10.0, 20.0, 30.0] {
        service
            .request_estimate("tiling", Features::new().with_number("area", area), &[])
            .unwrap();
    }

    let a = dir.path().join("a.csv");
    let b = dir.path().join("b.csv");
    assert_eq!(
        service
            .export_history(RecordKind::Quote, &RecordFilter::new(), &a)
            .unwrap(),
        3
    );
    service
        .export_history(RecordKind::Quote, &RecordFilter::new(), &b)
        .unwrap();
    assert_eq!(fs::read(&a).unwrap(), fs::read(&b).unwrap());

    let err = service
        .export_history(RecordKind::Quote, &RecordFilter::new(), &dir.path().join("x").join("y.csv"))
        .unwrap_err();
    assert!(matches!(err, Error::Export(_)));
}

#[test]
fn huge_painting_area_is_priced_not_panicking() {
    let (_dir, service) = setup();
    let outcome = service
        .request_estimate("painting", Features::new().with_number("area", 2.0e10), &[])
        .unwrap();
    assert!(outcome.quote.estimated_cost.is_finite());
    assert!(outcome.quote.estimated_cost >= 0.0);
}

#[test]
fn overflowing_area_is_rejected_before_saving() {
    let (_dir, service) = setup();
    let err = service
        .request_estimate("other", Features::new().with_number("area", 1e307), &[])
        .unwrap_err();
    assert!(matches!(err, Error::Validation(ref msg) if msg.contains("too large")));
    assert_eq!(service.history_summary().unwrap().quotes, 0);
}

#[test]
fn full_precision_area_lists_back_equal() {
    let (_dir, service) = setup();
    let outcome = service
        .request_estimate(
            "tiling",
            Features::new().with_number("area", 182.78745657865406),
            &[],
        )
        .unwrap();
    let listed = service.quotes(RecordFilter::new()).to_vec().unwrap();
    assert_eq!(listed, vec![outcome.quote]);
}

#[test]
fn subscription_status_filter_uses_effective_status() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::with_data_dir(dir.path());
    let now = Arc::new(Mutex::new(fixed_now()));
    let clock = Arc::clone(&now);
    let service = RenovationService::open(&config)
        .unwrap()
        .with_clock(move || *clock.lock().unwrap());

    let monthly = service.subscribe_amc("monthly").unwrap();
    let yearly = service.subscribe_amc("yearly").unwrap();
    *now.lock().unwrap() = fixed_now() + Duration::days(60);

    let expired = service
        .subscriptions_with_status(RecordFilter::new().with_status("expired"))
        .unwrap();
    assert_eq!(expired, vec![(monthly, AmcStatus::Expired)]);

    let active = service
        .subscriptions_with_status(RecordFilter::new().with_status("Active"))
        .unwrap();
    assert_eq!(active, vec![(yearly.clone(), AmcStatus::Active)]);

    let limited = service
        .subscriptions_with_status(RecordFilter::new().with_limit(1))
        .unwrap();
    assert_eq!(limited, vec![(yearly, AmcStatus::Active)]);
}

#[test]
fn unsupported_service_imports_no_photos() {
    let (dir, service) = setup();
    let photo = dir.path().join("floor.png");
    fs::write(&photo, b"not really a png").unwrap();

    let err = service
        .request_estimate_with_photos("roofing", Features::new(), &[photo.as_path()])
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedService(_)));

    let uploads = Config::with_data_dir(dir.path()).uploads_dir().unwrap();
    assert!(!uploads.exists() || fs::read_dir(&uploads).unwrap().next().is_none());
    assert_eq!(service.history_summary().unwrap().quotes, 0);
}
