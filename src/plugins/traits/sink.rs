use crate::Result;

/// Destination for the collector's measurements.
///
/// Implementations report an unavailable backend through the returned error;
/// callers treat that as metrics loss, never as a reason to stop probing.
pub trait MetricsSink: Send + Sync {
    /// Current stock for a product at a store.
    fn set_inventory(&self, store: &str, product: &str, url: &str, count: u64) -> Result<()>;

    fn increment_success(&self, url: &str) -> Result<()>;

    fn increment_failure(&self, url: &str, error: &str) -> Result<()>;

    fn observe_duration(&self, url: &str, seconds: f64) -> Result<()>;
}

impl<T: MetricsSink + ?Sized> MetricsSink for std::sync::Arc<T> {
    fn set_inventory(&self, store: &str, product: &str, url: &str, count: u64) -> Result<()> {
        (**self).set_inventory(store, product, url, count)
    }

    fn increment_success(&self, url: &str) -> Result<()> {
        (**self).increment_success(url)
    }

    fn increment_failure(&self, url: &str, error: &str) -> Result<()> {
        (**self).increment_failure(url, error)
    }

    fn observe_duration(&self, url: &str, seconds: f64) -> Result<()> {
        (**self).observe_duration(url, seconds)
    }
}
