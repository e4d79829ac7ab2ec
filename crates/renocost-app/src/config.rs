//! Configuration management for renocost
//!
//! Config stored at: ~/.config/renocost/config.json

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use renocost_domain::model::HeuristicRates;
use renocost_types::{ConfigError, OutputFormat, Result};

const APP_DIR: &str = "renocost";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Data directory override (record store, uploads)
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Model artifact directory override
    #[serde(default)]
    pub models_dir: Option<PathBuf>,

    /// Provider catalogue file override (JSON or TOML)
    #[serde(default)]
    pub providers_file: Option<PathBuf>,

    /// Default output format (json, table)
    #[serde(default)]
    pub output_format: OutputFormat,

    /// Heuristic pricing rates
    #[serde(default)]
    pub rates: HeuristicRates,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            models_dir: None,
            providers_file: None,
            output_format: OutputFormat::Table,
            rates: HeuristicRates::default(),
        }
    }
}

impl Config {
    /// Keys accepted by [`Config::set_value`]
    pub const KEYS: [&'static str; 4] = ["data_dir", "models_dir", "providers_file", "output_format"];

    /// Config with every path rooted under `data_dir`
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: Some(data_dir.into()),
            ..Self::default()
        }
    }

    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NotFound)?.join(APP_DIR);
        Ok(config_dir)
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Data directory; defaults to the platform data dir
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.data_dir {
            return Ok(dir.clone());
        }

        let data_dir = dirs::data_dir().ok_or(ConfigError::NotFound)?.join(APP_DIR);
        Ok(data_dir)
    }

    /// SQLite record store file
    pub fn store_path(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join("renocost.db"))
    }

    pub fn uploads_dir(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join("uploads"))
    }

    pub fn models_dir(&self) -> Result<PathBuf> {
        match self.models_dir {
            Some(ref dir) => Ok(dir.clone()),
            None => Ok(self.data_dir()?.join("models")),
        }
    }

    pub fn providers_file(&self) -> Result<PathBuf> {
        match self.providers_file {
            Some(ref path) => Ok(path.clone()),
            None => Ok(self.data_dir()?.join("providers.json")),
        }
    }

    /// Load config from file, or create default
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)
                .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Set one value by key. An empty path value clears the override.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        let path = || {
            let value = value.trim();
            (!value.is_empty()).then(|| PathBuf::from(value))
        };

        match key {
            "data_dir" => self.data_dir = path(),
            "models_dir" => self.models_dir = path(),
            "providers_file" => self.providers_file = path(),
            "output_format" => {
                self.output_format = match value.trim().to_ascii_lowercase().as_str() {
                    "table" => OutputFormat::Table,
                    "json" => OutputFormat::Json,
                    _ => {
                        return Err(ConfigError::InvalidValue {
                            key: key.to_string(),
                            value: value.to_string(),
                        }
                        .into())
                    }
                }
            }
            _ => return Err(ConfigError::UnknownKey(key.to_string()).into()),
        }
        Ok(())
    }
}

impl std::fmt::Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let show = |path: Result<PathBuf>| {
            path.map(|p| p.display().to_string())
                .unwrap_or_else(|_| "(error)".to_string())
        };

        writeln!(f, "Renocost Configuration")?;
        writeln!(f, "======================")?;
        writeln!(f)?;
        writeln!(f, "Data dir:       {}", show(self.data_dir()))?;
        writeln!(f, "Record store:   {}", show(self.store_path()))?;
        writeln!(f, "Uploads dir:    {}", show(self.uploads_dir()))?;
        writeln!(f, "Models dir:     {}", show(self.models_dir()))?;
        writeln!(f, "Providers file: {}", show(self.providers_file()))?;
        writeln!(f, "Output format:  {}", self.output_format)?;
        writeln!(f)?;
        writeln!(
            f,
            "Painting:       ₹{}/L, {} coats, {} m²/L, labour ₹{}/m²",
            self.rates.painting.price_per_litre,
            self.rates.painting.coats,
            self.rates.painting.coverage_m2_per_litre,
            self.rates.painting.labour_per_m2
        )?;
        writeln!(
            f,
            "Tiling:         ₹{}/m², labour ₹{}/m²",
            self.rates.tiling.price_per_m2, self.rates.tiling.labour_per_m2
        )?;
        writeln!(
            f,
            "Plumbing:       ₹{} callout + ₹{}/point",
            self.rates.plumbing.callout, self.rates.plumbing.per_point
        )?;
        writeln!(
            f,
            "Other:          ₹{}/m² material, ₹{}/m² labour",
            self.rates.other.material_per_m2, self.rates.other.labour_per_m2
        )?;

        if let Ok(path) = Self::config_path() {
            writeln!(f)?;
            writeln!(f, "Config file:    {}", path.display())?;
        }

        Ok(())
    }
}
