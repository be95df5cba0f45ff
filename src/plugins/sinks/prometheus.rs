use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};
use std::net::SocketAddr;

use crate::config::MetricsConfig;
use crate::plugins::traits::MetricsSink;
use crate::{AppError, Result};

pub const INVENTORY_COUNT: &str = "inventory_count";
pub const SCRAPE_SUCCESS: &str = "scrape_success";
pub const SCRAPE_FAILURE: &str = "scrape_failure";
pub const SCRAPE_DURATION_SECONDS: &str = "scrape_duration_seconds";

// Page loads through a real browser take seconds, so the tail goes past the usual 10s.
const DURATION_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0,
];

#[derive(Debug, Clone)]
struct MetricNames {
    inventory: String,
    success: String,
    failure: String,
    duration: String,
}

impl MetricNames {
    fn with_prefix(prefix: Option<&str>) -> Self {
        let prefix = prefix.unwrap_or_default();
        Self {
            inventory: format!("{}{}", prefix, INVENTORY_COUNT),
            success: format!("{}{}", prefix, SCRAPE_SUCCESS),
            failure: format!("{}{}", prefix, SCRAPE_FAILURE),
            duration: format!("{}{}", prefix, SCRAPE_DURATION_SECONDS),
        }
    }
}

/// [`MetricsSink`] backed by the `metrics` facade, rendered by the Prometheus exporter.
#[derive(Debug, Clone)]
pub struct PrometheusSink {
    names: MetricNames,
}

impl PrometheusSink {
    pub fn new(prefix: Option<&str>) -> Self {
        Self {
            names: MetricNames::with_prefix(prefix),
        }
    }

    /// Installs the global recorder and starts the `/metrics` HTTP listener.
    /// Must be called from within a tokio runtime.
    pub fn install(config: &MetricsConfig) -> Result<Self> {
        let addr: SocketAddr = config.listen_addr.parse().map_err(|e| {
            AppError::Metrics(format!("Invalid listen address '{}': {}", config.listen_addr, e))
        })?;

        let sink = Self::new(config.prefix.as_deref());
        sink.builder()?
            .with_http_listener(addr)
            .install()
            .map_err(|e| AppError::Metrics(format!("Failed to install Prometheus exporter: {}", e)))?;

        sink.describe();
        tracing::info!(%addr, "Metrics exporter listening");
        Ok(sink)
    }

    /// Exporter builder with this sink's histogram buckets applied.
    pub fn builder(&self) -> Result<PrometheusBuilder> {
        PrometheusBuilder::new()
            .set_buckets_for_metric(Matcher::Full(self.names.duration.clone()), DURATION_BUCKETS)
            .map_err(|e| AppError::Metrics(format!("Invalid histogram buckets: {}", e)))
    }

    /// Registers help text with whichever recorder is active.
    pub fn describe(&self) {
        describe_gauge!(
            self.names.inventory.clone(),
            "The current inventory count for a product at a specific store"
        );
        describe_counter!(self.names.success.clone(), "Total number of successful scrapes");
        describe_counter!(self.names.failure.clone(), "Total number of failed scrapes");
        describe_histogram!(
            self.names.duration.clone(),
            Unit::Seconds,
            "Duration of inventory scrape in seconds"
        );
    }
}

impl MetricsSink for PrometheusSink {
    fn set_inventory(&self, store: &str, product: &str, url: &str, count: u64) -> Result<()> {
        gauge!(
            self.names.inventory.clone(),
            "store" => store.to_string(),
            "product" => product.to_string(),
            "url" => url.to_string()
        )
        .set(count as f64);
        Ok(())
    }

    fn increment_success(&self, url: &str) -> Result<()> {
        counter!(self.names.success.clone(), "url" => url.to_string()).increment(1);
        Ok(())
    }

    fn increment_failure(&self, url: &str, error: &str) -> Result<()> {
        counter!(
            self.names.failure.clone(),
            "url" => url.to_string(),
            "error" => error.to_string()
        )
        .increment(1);
        Ok(())
    }

    fn observe_duration(&self, url: &str, seconds: f64) -> Result<()> {
        histogram!(self.names.duration.clone(), "url" => url.to_string()).record(seconds);
        Ok(())
    }
}
