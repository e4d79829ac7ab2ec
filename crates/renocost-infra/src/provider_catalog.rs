//! Provider catalogue loader for JSON and TOML files

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use renocost_domain::service::rank_providers;
use renocost_types::{Error, Provider, Result, ServiceType};

/// One provider as written in a catalogue file.
///
/// Accepts a single `service` (older files) or a `services` list.
#[derive(Debug, Deserialize)]
struct ProviderEntry {
    #[serde(default)]
    id: Option<u32>,
    name: String,
    #[serde(default)]
    service: Option<String>,
    #[serde(default)]
    services: Vec<String>,
    rating: f64,
    #[serde(default)]
    phone: String,
    #[serde(default)]
    avg_charge: Option<f64>,
}

/// Container for `[[providers]]` tables or `{"providers": [...]}`
#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    providers: Vec<ProviderEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonCatalog {
    List(Vec<ProviderEntry>),
    Table(CatalogFile),
}

#[derive(Serialize)]
struct CatalogFileOut<'a> {
    providers: &'a [Provider],
}

/// Unknown names count as `other`
fn service_from_name(name: &str) -> ServiceType {
    name.parse().unwrap_or(ServiceType::Other)
}

impl ProviderEntry {
    fn into_provider(self, position: usize) -> Result<Provider> {
        if self.name.trim().is_empty() {
            return Err(Error::Provider(format!("provider #{} has no name", position + 1)));
        }
        if !self.rating.is_finite() || !(0.0..=5.0).contains(&self.rating) {
            return Err(Error::Provider(format!(
                "rating {} for {} is outside 0-5",
                self.rating, self.name
            )));
        }

        let mut services: BTreeSet<ServiceType> = self
            .services
            .iter()
            .map(|s| service_from_name(s))
            .collect();
        if let Some(service) = self.service.as_deref() {
            services.insert(service_from_name(service));
        }
        if services.is_empty() {
            services.insert(ServiceType::Other);
        }

        Ok(Provider {
            id: self.id.unwrap_or(position as u32 + 1),
            name: self.name.trim().to_string(),
            services,
            rating: self.rating,
            phone: self.phone,
            avg_charge: self.avg_charge,
        })
    }
}

/// Ranked, validated provider list
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderCatalog {
    providers: Vec<Provider>,
}

impl ProviderCatalog {
    pub fn new(providers: Vec<Provider>) -> Self {
        Self {
            providers: rank_providers(providers),
        }
    }

    /// Built-in catalogue used when no provider file exists
    pub fn builtin() -> Self {
        let entry = |id: u32, name: &str, service: ServiceType, rating: f64, charge: f64| Provider {
            id,
            name: name.to_string(),
            services: BTreeSet::from([service]),
            rating,
            phone: format!("90000000{:02}", id),
            avg_charge: Some(charge),
        };

        Self::new(vec![
            entry(1, "Amit Electricals", ServiceType::Other, 4.6, 800.0),
            entry(2, "Ravi Painters", ServiceType::Painting, 4.4, 2500.0),
            entry(3, "Soni Plumbers", ServiceType::Plumbing, 4.5, 1200.0),
            entry(4, "Dream Carpentry", ServiceType::Other, 4.3, 2000.0),
            entry(5, "Cool AC Services", ServiceType::Other, 4.7, 900.0),
            entry(6, "Modish Renovators", ServiceType::Other, 4.2, 15000.0),
        ])
    }

    /// Load a catalogue; `.toml` files are TOML, anything else JSON
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Provider(format!("failed to read {}: {}", path.display(), e))
        })?;

        if is_toml(path) {
            Self::load_from_toml_str(&content)
        } else {
            Self::load_from_json_str(&content)
        }
    }

    pub fn load_from_json_str(json: &str) -> Result<Self> {
        let entries = match serde_json::from_str::<JsonCatalog>(json)
            .map_err(|e| Error::Provider(format!("failed to parse provider JSON: {}", e)))?
        {
            JsonCatalog::List(entries) => entries,
            JsonCatalog::Table(file) => file.providers,
        };
        Self::from_entries(entries)
    }

    pub fn load_from_toml_str(toml_content: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(toml_content)
            .map_err(|e| Error::Provider(format!("failed to parse provider TOML: {}", e)))?;
        Self::from_entries(file.providers)
    }

    fn from_entries(entries: Vec<ProviderEntry>) -> Result<Self> {
        let providers = entries
            .into_iter()
            .enumerate()
            .map(|(position, entry)| entry.into_provider(position))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(providers))
    }

    /// Write in the format implied by the extension
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = if is_toml(path) {
            toml::to_string_pretty(&CatalogFileOut {
                providers: &self.providers,
            })
            .map_err(|e| Error::Provider(format!("failed to encode provider TOML: {}", e)))?
        } else {
            serde_json::to_string_pretty(&self.providers)?
        };
        fs::write(path, content)?;
        Ok(())
    }

    pub fn providers(&self) -> &[Provider] {
        &self.providers
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

fn is_toml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("toml"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_TOML: &str = r#"
[[providers]]
id = 10
name = "Tile Masters"
services = ["tiling", "Painting"]
rating = 4.1
phone = "9000000010"

[[providers]]
name = "Handy Fixers"
service = "Carpentry"
rating = 4.8
"#;

    #[test]
    fn test_load_original_json_format() {
        let json = r#"[
            {"id":2,"name":"Ravi Painters","service":"Painting","rating":4.4,"phone":"9000000002","avg_charge":2500},
            {"id":1,"name":"Amit Electricals","service":"Electrical","rating":4.6,"phone":"9000000001","avg_charge":800}
        ]"#;
        let catalog = ProviderCatalog::load_from_json_str(json).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.providers()[0].name, "Amit Electricals");
        assert!(catalog.providers()[0].offers(ServiceType::Other));
        assert!(catalog.providers()[1].offers(ServiceType::Painting));
    }

    #[test]
    fn test_load_toml() {
        let catalog = ProviderCatalog::load_from_toml_str(TEST_TOML).unwrap();
        let providers = catalog.providers();
        assert_eq!(providers[0].name, "Handy Fixers");
        assert_eq!(providers[0].id, 2);
        assert_eq!(providers[1].id, 10);
        assert!(providers[1].offers(ServiceType::Tiling));
        assert!(providers[1].offers(ServiceType::Painting));
    }

    #[test]
    fn test_rating_out_of_range() {
        let json = r#"{"providers": [{"name": "Too Good", "service": "painting", "rating": 7.5}]}"#;
        assert!(matches!(
            ProviderCatalog::load_from_json_str(json),
            Err(Error::Provider(_))
        ));
    }

    #[test]
    fn test_builtin_is_ranked() {
        let catalog = ProviderCatalog::builtin();
        assert_eq!(catalog.len(), 6);
        assert_eq!(catalog.providers()[0].name, "Cool AC Services");
        assert_eq!(catalog.providers()[5].name, "Modish Renovators");
    }
}
