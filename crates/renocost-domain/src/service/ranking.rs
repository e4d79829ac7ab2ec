//! Provider ordering and lookup

use std::cmp::Ordering;

use renocost_types::{Provider, ServiceType};

/// Rating descending, then name ascending (case-insensitive first)
pub fn compare_providers(a: &Provider, b: &Provider) -> Ordering {
    b.rating
        .total_cmp(&a.rating)
        .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        .then_with(|| a.name.cmp(&b.name))
}

pub fn rank_providers(mut providers: Vec<Provider>) -> Vec<Provider> {
    providers.sort_by(compare_providers);
    providers
}

/// Providers offering `service`, ranked
pub fn providers_for_service<'a, I>(providers: I, service: ServiceType) -> Vec<Provider>
where
    I: IntoIterator<Item = &'a Provider>,
{
    rank_providers(
        providers
            .into_iter()
            .filter(|p| p.offers(service))
            .cloned()
            .collect(),
    )
}

/// Name search with an optional service filter, ranked.
///
/// An empty query matches every provider.
pub fn search_providers<'a, I>(providers: I, query: &str, service: Option<ServiceType>) -> Vec<Provider>
where
    I: IntoIterator<Item = &'a Provider>,
{
    let needle = query.trim().to_lowercase();
    rank_providers(
        providers
            .into_iter()
            .filter(|p| service.map_or(true, |s| p.offers(s)))
            .filter(|p| needle.is_empty() || p.name.to_lowercase().contains(&needle))
            .cloned()
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn provider(id: u32, name: &str, rating: f64, services: &[ServiceType]) -> Provider {
        Provider {
            id,
            name: name.to_string(),
            services: services.iter().copied().collect::<BTreeSet<_>>(),
            rating,
            phone: format!("90000000{:02}", id),
            avg_charge: None,
        }
    }

    #[test]
    fn test_rating_descending_then_name() {
        let providers = vec![
            provider(1, "Zed Paints", 4.5, &[ServiceType::Painting]),
            provider(2, "alpha paints", 4.5, &[ServiceType::Painting]),
            provider(3, "Best Paints", 4.9, &[ServiceType::Painting]),
            provider(4, "Pipe Works", 5.0, &[ServiceType::Plumbing]),
        ];

        let ranked = providers_for_service(&providers, ServiceType::Painting);
        let names: Vec<_> = ranked.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Best Paints", "alpha paints", "Zed Paints"]);
    }

    #[test]
    fn test_no_match_is_empty() {
        let providers = vec![provider(1, "Pipe Works", 4.0, &[ServiceType::Plumbing])];
        assert!(providers_for_service(&providers, ServiceType::Tiling).is_empty());
    }

    #[test]
    fn test_search_by_name_and_service() {
        let providers = vec![
            provider(1, "Ravi Painters", 4.4, &[ServiceType::Painting]),
            provider(2, "Soni Plumbers", 4.5, &[ServiceType::Plumbing]),
            provider(3, "Ravi Plumbing Co", 3.9, &[ServiceType::Plumbing]),
        ];

        let found = search_providers(&providers, "ravi", None);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].name, "Ravi Painters");

        let found = search_providers(&providers, "RAVI", Some(ServiceType::Plumbing));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 3);

        assert_eq!(search_providers(&providers, "", None).len(), 3);
    }
}
