//! Repository trait definitions

use renocost_types::{Provider, Result, ServiceType};

use crate::service::ranking;

/// Read-only provider reference data
pub trait ProviderDirectory {
    /// Every provider, ranked
    fn all(&self) -> Result<Vec<Provider>>;

    /// Providers offering a service, rating descending then name ascending
    fn find_by_service(&self, service: ServiceType) -> Result<Vec<Provider>> {
        Ok(ranking::providers_for_service(&self.all()?, service))
    }

    /// Case-insensitive name search with optional service filter
    fn search(&self, query: &str, service: Option<ServiceType>) -> Result<Vec<Provider>> {
        Ok(ranking::search_providers(&self.all()?, query, service))
    }
}
