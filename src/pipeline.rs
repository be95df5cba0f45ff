use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

use crate::models::ProbeOutcome;
use crate::plugins::traits::MetricsSink;
use crate::Result;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub processed: u64,
    pub succeeded: u64,
    pub failed: u64,
}

/// Translates probe outcomes into metric emissions.
///
/// Failed probes never touch the inventory gauge, so the last good count
/// stays visible while a page is broken.
pub struct ResultPipeline<S> {
    sink: S,
}

impl<S: MetricsSink> ResultPipeline<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    /// Consumes outcomes in arrival order until every sender is dropped.
    pub async fn run(&self, mut outcomes: mpsc::Receiver<ProbeOutcome>) -> PipelineStats {
        let mut stats = PipelineStats::default();

        while let Some(outcome) = outcomes.recv().await {
            self.process(&outcome);
            stats.processed += 1;
            if outcome.is_success() {
                stats.succeeded += 1;
            } else {
                stats.failed += 1;
            }
        }

        tracing::info!(
            processed = stats.processed,
            succeeded = stats.succeeded,
            failed = stats.failed,
            "Result pipeline drained"
        );
        stats
    }

    pub fn process(&self, outcome: &ProbeOutcome) {
        // Includes time spent queued, not only the probe itself.
        let duration = elapsed_seconds(outcome.started_at, Utc::now());
        let url = outcome.product_url.as_str();

        match &outcome.result {
            Err(error) => {
                tracing::warn!(
                    product = %outcome.product_name,
                    url,
                    error = %error,
                    "Error checking inventory"
                );

                record("scrape_failure", self.sink.increment_failure(url, &error.to_string()));
                record("scrape_duration_seconds", self.sink.observe_duration(url, duration));
            }
            Ok(count) => {
                record(
                    "inventory_count",
                    self.sink.set_inventory(
                        outcome.store.as_str(),
                        &outcome.product_name,
                        url,
                        *count,
                    ),
                );
                record("scrape_success", self.sink.increment_success(url));
                record("scrape_duration_seconds", self.sink.observe_duration(url, duration));

                tracing::info!(
                    product = %outcome.product_name,
                    store = %outcome.store,
                    inventory = count,
                    "Inventory updated"
                );
            }
        }
    }
}

// Metrics loss is logged, never propagated.
fn record(metric: &str, result: Result<()>) {
    if let Err(e) = result {
        tracing::warn!(metric, error = %e, "Failed to record metric");
    }
}

fn elapsed_seconds(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from)
        .to_std()
        .map(|elapsed| elapsed.as_secs_f64())
        .unwrap_or(0.0)
}
