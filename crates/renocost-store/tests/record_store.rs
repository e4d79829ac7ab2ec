use std::fs;

use chrono::{DateTime, Duration, TimeZone, Utc};
use tempfile::TempDir;

use renocost_store::{SqliteRecordStore, StoreError, PAGE_SIZE};
use renocost_types::{
    AmcPlan, AmcSubscription, ConfidenceSource, Error, Features, Quote, RecordFilter, RecordKind,
    ServiceType, SiteVisit, VisitStatus, WorkLog,
};

fn setup() -> (TempDir, SqliteRecordStore) {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = SqliteRecordStore::open(dir.path().join("renocost.db")).expect("open store");
    (dir, store)
}

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 1, 9, 0, 0).unwrap()
}

fn quote_at(service: ServiceType, area: f64, at: DateTime<Utc>) -> Quote {
    Quote::new(
        service,
        Features::new().with_number("area", area),
        area * 10.0,
        ConfidenceSource::Heuristic,
        at,
    )
}

#[test]
fn save_then_list_returns_equal_quote() {
    let (_dir, store) = setup();
    let quote = Quote::new(
        ServiceType::Painting,
        Features::new()
            .with_number("area", 500.0)
            .with_text("material_grade", "premium"),
        42500.0,
        ConfidenceSource::Heuristic,
        base_time() + Duration::nanoseconds(987_654_321),
    )
    .with_photos(vec!["uploads/wall.jpg".to_string()]);

    let id = store.save(&quote).unwrap();
    assert_eq!(id, quote.id);
    assert!(!id.is_empty());

    let listed = store.quotes(RecordFilter::new()).to_vec().unwrap();
    assert_eq!(listed, vec![quote.clone()]);
    assert_eq!(store.find_quote(&id).unwrap(), Some(quote));
    assert_eq!(store.find_quote("missing").unwrap(), None);
}

#[test]
fn full_precision_features_survive_the_store() {
    let (_dir, store) = setup();
    let areas = [182.78745657865406, 0.1 + 0.2, 1.0 / 3.0, 9007199254740993.0, 5e-324];
    for (i, area) in areas.into_iter().enumerate() {
        let quote = Quote::new(
            ServiceType::Other,
            Features::new()
                .with_number("area", area)
                .with_number("ratio", area / 7.0),
            area * 230.0,
            ConfidenceSource::Heuristic,
            base_time() + Duration::minutes(i as i64),
        );
        store.save(&quote).unwrap();
        assert_eq!(store.find_quote(&quote.id).unwrap(), Some(quote));
    }

    let listed = store.quotes(RecordFilter::new()).to_vec().unwrap();
    let mut listed_areas: Vec<f64> = listed.iter().map(|q| q.input_features.area()).collect();
    listed_areas.reverse();
    assert_eq!(listed_areas, areas.to_vec());
}

#[test]
fn identifiers_are_unique_and_duplicates_rejected() {
    let (_dir, store) = setup();
    let a = quote_at(ServiceType::Tiling, 10.0, base_time());
    let b = quote_at(ServiceType::Tiling, 10.0, base_time());
    assert_ne!(store.save(&a).unwrap(), store.save(&b).unwrap());

    let err = store.save(&a).unwrap_err();
    assert!(matches!(err, StoreError::Database(_)));
    assert!(matches!(Error::from(err), Error::Storage(_)));
    assert_eq!(store.count_kind(RecordKind::Quote).unwrap(), 2);
}

#[test]
fn list_is_newest_first_with_insertion_tiebreak() {
    let (_dir, store) = setup();
    let older = quote_at(ServiceType::Painting, 1.0, base_time());
    let tie_first = quote_at(ServiceType::Painting, 2.0, base_time() + Duration::hours(1));
    let tie_second = quote_at(ServiceType::Painting, 3.0, base_time() + Duration::hours(1));
    for quote in [&older, &tie_first, &tie_second] {
        store.save(quote).unwrap();
    }

    let ids: Vec<String> = store
        .quotes(RecordFilter::new())
        .iter()
        .map(|q| q.unwrap().id)
        .collect();
    assert_eq!(ids, vec![tie_second.id, tie_first.id, older.id]);
}

#[test]
fn list_pages_through_many_records_and_restarts() {
    let (_dir, store) = setup();
    let total = PAGE_SIZE * 2 + 5;
    for i in 0..total {
        let at = base_time() + Duration::minutes((i / 3) as i64);
        store.save(&quote_at(ServiceType::Other, i as f64, at)).unwrap();
    }

    let list = store.quotes(RecordFilter::new());
    let first: Vec<Quote> = list.to_vec().unwrap();
    assert_eq!(first.len(), total);
    assert!(first
        .windows(2)
        .all(|pair| pair[0].created_at >= pair[1].created_at));
    // same created_at: later inserts (larger area) come first
    assert_eq!(first[0].input_features.area(), (total - 1) as f64);

    let second: Vec<Quote> = list.iter().map(Result::unwrap).collect();
    assert_eq!(first, second);
}

#[test]
fn list_is_lazy_until_first_pull() {
    let dir = tempfile::tempdir().unwrap();
    let store = SqliteRecordStore::new(dir.path().join("absent").join("renocost.db")).unwrap();

    let list = store.quotes(RecordFilter::new());
    let mut iter = list.iter();
    assert!(!dir.path().join("absent").exists());

    assert!(matches!(iter.next(), Some(Err(StoreError::OpenDatabase { .. }))));
    assert!(iter.next().is_none());
}

#[test]
fn empty_store_lists_nothing() {
    let (_dir, store) = setup();
    assert!(store.visits(RecordFilter::new()).to_vec().unwrap().is_empty());
    assert!(store.work_logs(RecordFilter::new()).iter().next().is_none());
}

#[test]
fn filters_apply_to_listing_and_count() {
    let (_dir, store) = setup();
    let t0 = base_time();
    store.save(&quote_at(ServiceType::Painting, 1.0, t0)).unwrap();
    store.save(&quote_at(ServiceType::Tiling, 2.0, t0 + Duration::days(1))).unwrap();
    store.save(&quote_at(ServiceType::Painting, 3.0, t0 + Duration::days(2))).unwrap();
    store.save(&quote_at(ServiceType::Painting, 4.0, t0 + Duration::days(3))).unwrap();

    let painting = RecordFilter::new().with_service(ServiceType::Painting);
    assert_eq!(store.count::<Quote>(&painting).unwrap(), 3);

    let window = painting
        .clone()
        .since(t0 + Duration::days(1))
        .until(t0 + Duration::days(2));
    let areas: Vec<f64> = store
        .quotes(window)
        .iter()
        .map(|q| q.unwrap().input_features.area())
        .collect();
    assert_eq!(areas, vec![3.0]);

    let limited = store.quotes(painting.with_limit(2)).to_vec().unwrap();
    assert_eq!(limited.len(), 2);
    assert_eq!(limited[0].input_features.area(), 4.0);

    assert!(store
        .quotes(RecordFilter::new().with_limit(0))
        .to_vec()
        .unwrap()
        .is_empty());
}

#[test]
fn status_filter_applies_to_visits_and_subscriptions() {
    let (_dir, store) = setup();
    let requested = SiteVisit::new("1 Main Road".to_string(), base_time(), base_time());
    let mut confirmed = SiteVisit::new("2 Main Road".to_string(), base_time(), base_time());
    confirmed.status = VisitStatus::Confirmed;
    store.save(&requested).unwrap();
    store.save(&confirmed).unwrap();

    let found = store
        .visits(RecordFilter::new().with_status("Confirmed"))
        .to_vec()
        .unwrap();
    assert_eq!(found, vec![confirmed]);

    store
        .save(&AmcSubscription::new(AmcPlan::Yearly, base_time()))
        .unwrap();
    assert_eq!(
        store
            .subscriptions(RecordFilter::new().with_status("active"))
            .to_vec()
            .unwrap()
            .len(),
        1
    );
    assert!(store
        .subscriptions(RecordFilter::new().with_status("cancelled"))
        .to_vec()
        .unwrap()
        .is_empty());
}

#[test]
fn visit_link_must_reference_existing_quote() {
    let (_dir, store) = setup();
    let dangling = SiteVisit::new("12 Lake View".to_string(), base_time(), base_time())
        .with_linked_quote("no-such-quote".to_string());
    assert!(store.save(&dangling).is_err());
    assert_eq!(store.count_kind(RecordKind::SiteVisit).unwrap(), 0);

    let quote = quote_at(ServiceType::Plumbing, 0.0, base_time());
    store.save(&quote).unwrap();
    let linked = SiteVisit::new("12 Lake View".to_string(), base_time(), base_time())
        .with_linked_quote(quote.id.clone())
        .with_customer("Asha".to_string());
    store.save(&linked).unwrap();
    assert_eq!(store.find::<SiteVisit>(&linked.id).unwrap(), Some(linked));
}

#[test]
fn invalid_records_are_rejected_before_insert() {
    let (_dir, store) = setup();
    let mut quote = quote_at(ServiceType::Painting, 1.0, base_time());
    quote.estimated_cost = -5.0;
    let err = store.save(&quote).unwrap_err();
    assert!(matches!(err, StoreError::InvalidRecord { table: "quotes", .. }));
    assert!(matches!(Error::from(err), Error::Validation(_)));

    let log = WorkLog::new(" ".to_string(), "tiles laid".to_string(), String::new(), base_time());
    assert!(store.save(&log).is_err());
    let log = WorkLog::new("Ravi".to_string(), String::new(), String::new(), base_time());
    assert!(store.save(&log).is_err());
    assert_eq!(store.count_kind(RecordKind::WorkLog).unwrap(), 0);
}

#[test]
fn work_log_round_trip() {
    let (_dir, store) = setup();
    let log = WorkLog::new(
        "Ravi".to_string(),
        "Primer coat, living room".to_string(),
        "Second coat".to_string(),
        base_time(),
    )
    .with_photo("uploads/day1.png".to_string());
    store.save(&log).unwrap();
    assert_eq!(store.work_logs(RecordFilter::new()).to_vec().unwrap(), vec![log]);
}

#[test]
fn export_is_byte_identical_across_runs() {
    let (dir, store) = setup();
    for i in 0..5 {
        let quote = quote_at(ServiceType::Tiling, 10.0 + i as f64, base_time() + Duration::hours(i))
            .with_photos(vec![format!("p{i}.jpg")]);
        store.save(&quote).unwrap();
    }

    let first = dir.path().join("first.csv");
    let second = dir.path().join("second.csv");
    assert_eq!(
        store
            .export_to_table(RecordKind::Quote, &RecordFilter::new(), &first)
            .unwrap(),
        5
    );
    store
        .export_to_table(RecordKind::Quote, &RecordFilter::new(), &second)
        .unwrap();

    let a = fs::read(&first).unwrap();
    assert_eq!(a, fs::read(&second).unwrap());

    let text = String::from_utf8(a).unwrap();
    assert!(text.starts_with("id,service_type,input_features,estimated_cost,"));
    assert_eq!(text.lines().count(), 6);
    assert!(text.contains(",140.00,heuristic,"));
}

#[test]
fn export_to_unwritable_destination_fails() {
    let (dir, store) = setup();
    let dest = dir.path().join("missing-dir").join("out.csv");
    let err = store
        .export_to_table(RecordKind::SiteVisit, &RecordFilter::new(), &dest)
        .unwrap_err();
    assert!(matches!(err, StoreError::Export { .. }));
    assert!(matches!(Error::from(err), Error::Export(_)));
}

#[test]
fn export_keeps_existing_file_when_database_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let store = SqliteRecordStore::new(dir.path().join("absent").join("renocost.db")).unwrap();
    let dest = dir.path().join("quotes.csv");
    fs::write(&dest, "previous export\n").unwrap();

    let err = store
        .export_to_table(RecordKind::Quote, &RecordFilter::new(), &dest)
        .unwrap_err();
    assert!(matches!(err, StoreError::OpenDatabase { .. }));
    assert!(store.export_training_set(&dest).is_err());
    assert_eq!(fs::read_to_string(&dest).unwrap(), "previous export\n");
}

#[test]
fn training_set_uses_trainer_columns() {
    let (dir, store) = setup();
    let quote = Quote::new(
        ServiceType::Plumbing,
        Features::new().with_number("points", 3.0).with_number("image", 0.0),
        1400.0,
        ConfidenceSource::Heuristic,
        base_time(),
    );
    store.save(&quote).unwrap();

    let dest = dir.path().join("records.csv");
    assert_eq!(store.export_training_set(&dest).unwrap(), 1);
    assert_eq!(
        fs::read_to_string(&dest).unwrap(),
        "service,area,points,image,total\nplumbing,0,3,0,1400.00\n"
    );
}
