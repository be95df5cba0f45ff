use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::env;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use url::Url;
use validator::Validate;

use crate::extractor::DEFAULT_DEPLETED_MARKERS;
use crate::models::{ProductSpec, StoreIdentity};
use crate::{AppError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub products: Vec<ProductSpec>,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub scraper: ScraperConfig,
    #[serde(default)]
    pub extractor: ExtractorConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub id: String,
    /// Cookie that selects the store on the target site, set once per session.
    pub cookie_name: Option<String>,
    /// Page on the target site's origin where the store cookie is applied.
    pub cookie_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    #[serde(default = "default_true")]
    pub headless: bool,
    pub chrome_path: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    pub user_agent: Option<String>,
    #[serde(default = "default_inventory_selector")]
    pub inventory_selector: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    #[serde(default = "default_depleted_markers")]
    pub depleted_markers: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    pub prefix: Option<String>,
}

fn default_interval_secs() -> u64 {
    300
}

fn default_queue_capacity() -> usize {
    10
}

fn default_true() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_inventory_selector() -> String {
    "#pnlInventory".to_string()
}

fn default_depleted_markers() -> Vec<String> {
    DEFAULT_DEPLETED_MARKERS.iter().map(|m| m.to_string()).collect()
}

fn default_listen_addr() -> String {
    "0.0.0.0:9090".to_string()
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            headless: true,
            chrome_path: None,
            timeout_secs: default_timeout_secs(),
            user_agent: None,
            inventory_selector: default_inventory_selector(),
        }
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            depleted_markers: default_depleted_markers(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            listen_addr: default_listen_addr(),
            prefix: None,
        }
    }
}

impl SchedulerConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl ScraperConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl AppConfig {
    /// Loads the file at `path`, then applies `INVENTORY__*` environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let s = Config::builder()
            .add_source(File::from(path.as_ref()))
            // e.g. INVENTORY__SCHEDULER__INTERVAL_SECS=60
            .add_source(Environment::with_prefix("INVENTORY").separator("__"))
            .build()?;

        let mut config: AppConfig = s.try_deserialize()?;

        // Add Chrome path from environment if not set
        if config.scraper.chrome_path.is_none() {
            config.scraper.chrome_path = env::var("CHROME_PATH").ok();
        }

        config.validate()?;
        Ok(config)
    }

    pub fn store_identity(&self) -> StoreIdentity {
        StoreIdentity::new(self.store.id.trim())
    }

    pub fn validate(&self) -> Result<()> {
        // Validate store configuration
        if self.store.id.trim().is_empty() {
            return Err(AppError::Validation("Store id must not be empty".into()));
        }

        match (&self.store.cookie_name, &self.store.cookie_url) {
            (Some(_), None) | (None, Some(_)) => {
                return Err(AppError::Validation(
                    "Store cookie_name and cookie_url must be set together".into(),
                ));
            }
            (Some(_), Some(url)) if Url::parse(url).is_err() => {
                return Err(AppError::Validation("Invalid store cookie_url format".into()));
            }
            _ => {}
        }

        // Validate products
        if self.products.is_empty() {
            return Err(AppError::Validation("At least one product must be configured".into()));
        }

        let mut seen = HashSet::new();
        for product in &self.products {
            product.validate()?;
            if !seen.insert(product.url.as_str()) {
                return Err(AppError::Validation(format!(
                    "Duplicate product url: {}",
                    product.url
                )));
            }
        }

        // Validate scheduler configuration
        if self.scheduler.interval_secs == 0 {
            return Err(AppError::Validation("Scheduler interval_secs must be greater than 0".into()));
        }

        if self.scheduler.queue_capacity == 0 {
            return Err(AppError::Validation("Scheduler queue_capacity must be greater than 0".into()));
        }

        // Validate scraper configuration
        if self.scraper.timeout_secs == 0 {
            return Err(AppError::Validation("Scraper timeout_secs must be greater than 0".into()));
        }

        if self.scraper.inventory_selector.trim().is_empty() {
            return Err(AppError::Validation("Scraper inventory_selector must not be empty".into()));
        }

        // Validate metrics configuration
        if self.metrics.enabled && self.metrics.listen_addr.parse::<SocketAddr>().is_err() {
            return Err(AppError::Validation(format!(
                "Invalid metrics listen_addr: {}",
                self.metrics.listen_addr
            )));
        }

        Ok(())
    }
}
