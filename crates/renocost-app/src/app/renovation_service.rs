//! Renovation Service - the estimate/visit/AMC/work-log use cases
//!
//! Each use case validates its input, calls the estimation engine where a
//! price is needed, and persists exactly one record. Nothing is persisted
//! when validation fails.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use renocost_domain::repository::ProviderDirectory;
use renocost_domain::service::effective_status;
use renocost_estimator::EstimationEngine;
use renocost_infra::{is_supported_photo, PhotoUploads};
use renocost_store::{RecordList, SqliteRecordStore};
use renocost_types::{
    AmcPlan, AmcStatus, AmcSubscription, Error, Estimate, Features, NotFoundError, Provider,
    Quote, RecordFilter, RecordKind, Result, ServiceType, SiteVisit, WorkLog,
};

use crate::config::Config;
use crate::repository;

/// Source of "now" for new records
pub type Clock = Box<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// A persisted quote and the estimate behind it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EstimateOutcome {
    pub quote: Quote,
    pub estimate: Estimate,
}

/// Stored record counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HistorySummary {
    pub quotes: usize,
    pub site_visits: usize,
    pub amc_subscriptions: usize,
    pub work_logs: usize,
}

pub struct RenovationService {
    store: SqliteRecordStore,
    engine: EstimationEngine,
    providers: Box<dyn ProviderDirectory>,
    uploads: Option<PhotoUploads>,
    clock: Clock,
}

impl RenovationService {
    pub fn new(
        store: SqliteRecordStore,
        engine: EstimationEngine,
        providers: Box<dyn ProviderDirectory>,
    ) -> Self {
        Self {
            store,
            engine,
            providers,
            uploads: None,
            clock: Box::new(Utc::now),
        }
    }

    /// Wire every collaborator from configuration
    pub fn open(config: &Config) -> Result<Self> {
        let store = repository::open_record_store(config)?;
        let engine = repository::open_estimation_engine(config)?;
        let providers = repository::open_provider_directory(config)?;
        let uploads = repository::open_uploads(config)?;
        Ok(Self::new(store, engine, Box::new(providers)).with_uploads(uploads))
    }

    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_uploads(mut self, uploads: PhotoUploads) -> Self {
        self.uploads = Some(uploads);
        self
    }

    pub fn store(&self) -> &SqliteRecordStore {
        &self.store
    }

    pub fn engine(&self) -> &EstimationEngine {
        &self.engine
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    /// Price a job and persist the resulting quote.
    ///
    /// Photo references must be JPG/PNG paths; they set the `image` and
    /// `photo_count` features.
    pub fn request_estimate(
        &self,
        service: &str,
        features: Features,
        photo_refs: &[String],
    ) -> Result<EstimateOutcome> {
        let service: ServiceType = service.parse()?;

        if let Some(bad) = photo_refs.iter().find(|r| !is_supported_photo(Path::new(r.as_str()))) {
            return Err(Error::Validation(format!(
                "photo {bad:?} is not a JPG or PNG file"
            )));
        }

        let mut features = features;
        features.insert_number(Features::IMAGE, if photo_refs.is_empty() { 0.0 } else { 1.0 });
        features.insert_number(Features::PHOTO_COUNT, photo_refs.len() as f64);

        let estimate = self.engine.estimate_for(service, &features)?;
        let quote = Quote::new(
            service,
            features,
            estimate.estimated_cost,
            estimate.confidence_source,
            self.now(),
        )
        .with_photos(photo_refs.to_vec());

        self.store.save(&quote)?;
        tracing::info!(
            id = %quote.id,
            %service,
            cost = quote.estimated_cost,
            source = %quote.confidence_source,
            "quote created"
        );

        Ok(EstimateOutcome { quote, estimate })
    }

    /// Price a job from photo files on disk.
    ///
    /// The service is checked before any photo is imported, so a rejected
    /// request leaves the uploads directory untouched.
    pub fn request_estimate_with_photos(
        &self,
        service: &str,
        features: Features,
        photos: &[&Path],
    ) -> Result<EstimateOutcome> {
        let service_type: ServiceType = service.parse()?;
        let photo_refs = self.import_photos(photos)?;
        self.request_estimate(service_type.as_str(), features, &photo_refs)
    }

    /// Copy photos into the uploads directory and return the stored
    /// references. Without an uploads directory the paths are only
    /// validated.
    pub fn import_photos(&self, paths: &[&Path]) -> Result<Vec<String>> {
        paths
            .iter()
            .map(|path| match self.uploads {
                Some(ref uploads) => uploads
                    .import(path)
                    .map(|stored| stored.display().to_string()),
                None => renocost_infra::validate_photo(path).map(|_| path.display().to_string()),
            })
            .collect()
    }

    /// Book a site visit in `requested` state
    pub fn schedule_visit(
        &self,
        address: &str,
        when: DateTime<Utc>,
        linked_quote_id: Option<&str>,
    ) -> Result<SiteVisit> {
        self.schedule_visit_for(address, when, linked_quote_id, None)
    }

    pub fn schedule_visit_for(
        &self,
        address: &str,
        when: DateTime<Utc>,
        linked_quote_id: Option<&str>,
        customer: Option<&str>,
    ) -> Result<SiteVisit> {
        let address = address.trim();
        if address.is_empty() {
            return Err(Error::Validation("visit address must not be empty".to_string()));
        }

        let mut visit = SiteVisit::new(address.to_string(), when, self.now());
        if let Some(quote_id) = linked_quote_id {
            if self.store.find_quote(quote_id)?.is_none() {
                return Err(NotFoundError {
                    kind: RecordKind::Quote,
                    id: quote_id.to_string(),
                }
                .into());
            }
            visit = visit.with_linked_quote(quote_id.to_string());
        }
        if let Some(customer) = customer.map(str::trim).filter(|c| !c.is_empty()) {
            visit = visit.with_customer(customer.to_string());
        }

        self.store.save(&visit)?;
        tracing::info!(id = %visit.id, scheduled_at = %visit.scheduled_at, "site visit scheduled");
        Ok(visit)
    }

    /// Start an AMC subscription now
    pub fn subscribe_amc(&self, plan: &str) -> Result<AmcSubscription> {
        self.subscribe_amc_for(plan, None)
    }

    pub fn subscribe_amc_for(&self, plan: &str, customer: Option<&str>) -> Result<AmcSubscription> {
        let plan: AmcPlan = plan.parse().map_err(Error::Validation)?;
        let mut subscription = AmcSubscription::new(plan, self.now());
        if let Some(customer) = customer.map(str::trim).filter(|c| !c.is_empty()) {
            subscription = subscription.with_customer(customer.to_string());
        }

        self.store.save(&subscription)?;
        tracing::info!(id = %subscription.id, %plan, price = plan.price(), "AMC subscription started");
        Ok(subscription)
    }

    /// Status as of the service clock
    pub fn amc_status(&self, subscription: &AmcSubscription) -> AmcStatus {
        effective_status(subscription, self.now())
    }

    /// Record a worker's daily log
    pub fn log_work(
        &self,
        worker: &str,
        completed: &str,
        next_day: &str,
        photo_ref: Option<&str>,
    ) -> Result<WorkLog> {
        let worker = worker.trim();
        if worker.is_empty() {
            return Err(Error::Validation("worker name must not be empty".to_string()));
        }
        if completed.trim().is_empty() && next_day.trim().is_empty() {
            return Err(Error::Validation(
                "describe the completed work or the plan for the next day".to_string(),
            ));
        }

        let mut log = WorkLog::new(
            worker.to_string(),
            completed.trim().to_string(),
            next_day.trim().to_string(),
            self.now(),
        );
        if let Some(photo) = photo_ref {
            if !is_supported_photo(Path::new(photo)) {
                return Err(Error::Validation(format!("photo {photo:?} is not a JPG or PNG file")));
            }
            log = log.with_photo(photo.to_string());
        }

        self.store.save(&log)?;
        tracing::info!(id = %log.id, worker, "work logged");
        Ok(log)
    }

    /// Providers offering a service, best rated first
    pub fn providers_for(&self, service: &str) -> Result<Vec<Provider>> {
        let service: ServiceType = service.parse()?;
        self.providers.find_by_service(service)
    }

    pub fn search_providers(&self, query: &str, service: Option<&str>) -> Result<Vec<Provider>> {
        let service = service.map(str::parse::<ServiceType>).transpose()?;
        self.providers.search(query, service)
    }

    pub fn all_providers(&self) -> Result<Vec<Provider>> {
        self.providers.all()
    }

    pub fn quotes(&self, filter: RecordFilter) -> RecordList<Quote> {
        self.store.quotes(filter)
    }

    pub fn visits(&self, filter: RecordFilter) -> RecordList<SiteVisit> {
        self.store.visits(filter)
    }

    pub fn subscriptions(&self, filter: RecordFilter) -> RecordList<AmcSubscription> {
        self.store.subscriptions(filter)
    }

    /// Subscriptions paired with their status as of the service clock.
    ///
    /// `filter.status` and `filter.limit` apply to the effective status, so
    /// a lapsed plan stored as `active` matches `expired`.
    pub fn subscriptions_with_status(
        &self,
        filter: RecordFilter,
    ) -> Result<Vec<(AmcSubscription, AmcStatus)>> {
        let mut stored = filter;
        let wanted = stored.status.take().map(|s| s.trim().to_ascii_lowercase());
        let limit = stored.limit.take();
        let now = self.now();

        let mut rows = Vec::new();
        for subscription in self.store.subscriptions(stored).iter() {
            if limit.is_some_and(|limit| rows.len() >= limit) {
                break;
            }
            let subscription = subscription?;
            let status = effective_status(&subscription, now);
            if wanted.as_deref().is_some_and(|w| w != status.as_str()) {
                continue;
            }
            rows.push((subscription, status));
        }
        Ok(rows)
    }

    pub fn work_logs(&self, filter: RecordFilter) -> RecordList<WorkLog> {
        self.store.work_logs(filter)
    }

    pub fn history_summary(&self) -> Result<HistorySummary> {
        Ok(HistorySummary {
            quotes: self.store.count_kind(RecordKind::Quote)?,
            site_visits: self.store.count_kind(RecordKind::SiteVisit)?,
            amc_subscriptions: self.store.count_kind(RecordKind::Amc)?,
            work_logs: self.store.count_kind(RecordKind::WorkLog)?,
        })
    }

    /// CSV export of one record kind
    pub fn export_history(&self, kind: RecordKind, filter: &RecordFilter, dest: &Path) -> Result<usize> {
        Ok(self.store.export_to_table(kind, filter, dest)?)
    }

    pub fn export_training_set(&self, dest: &Path) -> Result<usize> {
        Ok(self.store.export_training_set(dest)?)
    }

    pub fn available_models(&self) -> Vec<ServiceType> {
        self.engine.available_models()
    }
}
