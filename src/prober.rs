use chrono::Utc;

use crate::extractor::{StockReading, TextExtractor};
use crate::models::{ProbeError, ProbeOutcome, ProductSpec, StoreIdentity};
use crate::plugins::traits::PageDriver;

/// Runs single probes against a page driver it owns.
///
/// A probe never fails as a call: every driver failure is recorded in the
/// returned [`ProbeOutcome`] and the next tick is the only retry.
pub struct Prober<D> {
    driver: D,
    extractor: TextExtractor,
    locator: String,
}

impl<D: PageDriver> Prober<D> {
    pub fn new(driver: D, extractor: TextExtractor, locator: impl Into<String>) -> Self {
        Self {
            driver,
            extractor,
            locator: locator.into(),
        }
    }

    pub async fn probe(&mut self, store: &StoreIdentity, product: &ProductSpec) -> ProbeOutcome {
        let started_at = Utc::now();

        let text = match self.read_inventory_text(&product.url).await {
            Ok(text) => text,
            Err(error) => {
                tracing::debug!(product = %product.name, kind = %error.kind(), "Probe failed");
                return ProbeOutcome::failure(store, product, started_at, String::new(), error);
            }
        };

        let reading = self.extractor.classify(&text);
        if reading == StockReading::Unrecognized {
            tracing::warn!(
                product = %product.name,
                text = %text.trim(),
                "Inventory text not recognised, reporting zero"
            );
        }

        ProbeOutcome::success(store, product, started_at, text, reading.count())
    }

    async fn read_inventory_text(&mut self, url: &str) -> Result<String, ProbeError> {
        self.driver
            .navigate(url)
            .await
            .map_err(|e| ProbeError::NavigationFailed(e.to_string()))?;

        let element = self
            .driver
            .find_element(&self.locator)
            .await
            .map_err(|e| ProbeError::ElementNotFound {
                locator: self.locator.clone(),
                message: e.to_string(),
            })?;

        self.driver
            .element_text(&element)
            .await
            .map_err(|e| ProbeError::TextExtractionFailed(e.to_string()))
    }
}
