use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::models::{ProbeOutcome, ProductSpec, StoreIdentity};
use crate::plugins::traits::PageDriver;
use crate::prober::Prober;
use crate::{AppError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassSummary {
    pub probed: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Cancellation arrived before every product was probed.
    pub interrupted: bool,
}

/// Probes every configured product once at start and then once per interval,
/// until cancelled.
///
/// Products are probed one after another, in configuration order: the page
/// driver is a single browser session and cannot run two probes at once.
pub struct InventoryScheduler<D> {
    prober: Prober<D>,
    store: StoreIdentity,
    products: Vec<ProductSpec>,
    interval: Duration,
}

impl<D: PageDriver> InventoryScheduler<D> {
    /// Fails on a zero `interval`, which no ticker can honour.
    pub fn new(
        prober: Prober<D>,
        store: StoreIdentity,
        products: Vec<ProductSpec>,
        interval: Duration,
    ) -> Result<Self> {
        if interval.is_zero() {
            return Err(AppError::Validation(
                "Polling interval must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            prober,
            store,
            products,
            interval,
        })
    }

    /// Runs until `shutdown` is cancelled. Outcomes are sent as each probe
    /// finishes; dropping the scheduler afterwards closes the queue.
    ///
    /// Cancellation is observed while waiting for the next tick and between
    /// products, never in the middle of a probe.
    pub async fn run(
        mut self,
        outcomes: mpsc::Sender<ProbeOutcome>,
        shutdown: CancellationToken,
    ) -> Result<()> {
        tracing::info!(
            store = %self.store,
            products = self.products.len(),
            interval_secs = self.interval.as_secs(),
            "Inventory scheduler started"
        );

        // Do an initial pass immediately
        self.run_pass(&outcomes, &shutdown).await?;

        // A pass that outlasts the interval yields one catch-up tick, not a burst.
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    tracing::info!("Inventory scheduler stopping due to cancellation");
                    break;
                }
                _ = ticker.tick() => {
                    self.run_pass(&outcomes, &shutdown).await?;
                }
            }
        }

        Ok(())
    }

    /// Probes every product once, handing each outcome to `outcomes` as soon
    /// as it exists.
    pub async fn run_pass(
        &mut self,
        outcomes: &mpsc::Sender<ProbeOutcome>,
        shutdown: &CancellationToken,
    ) -> Result<PassSummary> {
        let mut summary = PassSummary::default();

        for product in &self.products {
            if shutdown.is_cancelled() {
                summary.interrupted = true;
                break;
            }

            let outcome = self.prober.probe(&self.store, product).await;
            summary.probed += 1;
            if outcome.is_success() {
                summary.succeeded += 1;
            } else {
                summary.failed += 1;
            }

            outcomes.send(outcome).await.map_err(|_| AppError::PipelineClosed)?;
        }

        tracing::debug!(
            probed = summary.probed,
            succeeded = summary.succeeded,
            failed = summary.failed,
            interrupted = summary.interrupted,
            "Inventory pass complete"
        );
        Ok(summary)
    }
}
