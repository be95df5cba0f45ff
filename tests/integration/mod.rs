// Integration tests for the inventory watcher
// These drive scheduler -> queue -> pipeline with scripted pages and a recording sink

pub mod scheduler_tests;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use inventory_watcher::plugins::{DriverError, ElementHandle, MetricsSink, PageDriver};
use inventory_watcher::{
    InventoryScheduler, Prober, ProductSpec, Result, StoreIdentity, TextExtractor,
};

pub const LOCATOR: &str = "#pnlInventory";

/// How a scripted product page behaves when probed.
#[derive(Debug, Clone)]
pub enum PageScript {
    Shows(&'static str),
    NavigationFails,
    ElementMissing,
    TextUnreadable,
}

#[derive(Debug, Clone)]
pub struct ProbeRecord {
    pub url: String,
    pub started: tokio::time::Instant,
    pub finished: Option<tokio::time::Instant>,
}

/// Page driver answering from a fixed script, optionally taking time per page.
pub struct ScriptedDriver {
    pages: HashMap<String, PageScript>,
    current: Option<PageScript>,
    page_delay: Duration,
    pub log: Arc<Mutex<Vec<ProbeRecord>>>,
}

impl ScriptedDriver {
    pub fn new(pages: &[(&str, PageScript)]) -> Self {
        Self {
            pages: pages
                .iter()
                .map(|(url, script)| (url.to_string(), script.clone()))
                .collect(),
            current: None,
            page_delay: Duration::ZERO,
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }

    fn finish(&self) {
        if let Some(record) = self.log.lock().unwrap().last_mut() {
            record.finished = Some(tokio::time::Instant::now());
        }
    }
}

#[async_trait]
impl PageDriver for ScriptedDriver {
    async fn navigate(&mut self, url: &str) -> std::result::Result<(), DriverError> {
        self.log.lock().unwrap().push(ProbeRecord {
            url: url.to_string(),
            started: tokio::time::Instant::now(),
            finished: None,
        });

        if !self.page_delay.is_zero() {
            tokio::time::sleep(self.page_delay).await;
        }

        match self.pages.get(url).cloned() {
            Some(PageScript::NavigationFails) | None => {
                self.finish();
                Err(DriverError::Navigation(format!("net::ERR_CONNECTION_REFUSED at {}", url)))
            }
            Some(script) => {
                self.current = Some(script);
                Ok(())
            }
        }
    }

    async fn find_element(&mut self, locator: &str) -> std::result::Result<ElementHandle, DriverError> {
        match &self.current {
            Some(PageScript::ElementMissing) => {
                self.finish();
                Err(DriverError::NotFound {
                    locator: locator.to_string(),
                    message: "timed out waiting for element".to_string(),
                })
            }
            _ => Ok(ElementHandle::new(locator, 11)),
        }
    }

    async fn element_text(&mut self, _element: &ElementHandle) -> std::result::Result<String, DriverError> {
        self.finish();
        match &self.current {
            Some(PageScript::Shows(text)) => Ok(text.to_string()),
            _ => Err(DriverError::Extraction("node is detached from document".to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Emission {
    Inventory { store: String, product: String, url: String, count: u64 },
    Success { url: String },
    Failure { url: String, error: String },
    Duration { url: String },
}

#[derive(Default)]
pub struct RecordingSink {
    emissions: Mutex<Vec<Emission>>,
}

impl RecordingSink {
    pub fn emissions(&self) -> Vec<Emission> {
        self.emissions.lock().unwrap().clone()
    }

    pub fn durations(&self) -> usize {
        self.emissions()
            .iter()
            .filter(|e| matches!(e, Emission::Duration { .. }))
            .count()
    }

    fn push(&self, emission: Emission) -> Result<()> {
        self.emissions.lock().unwrap().push(emission);
        Ok(())
    }
}

impl MetricsSink for RecordingSink {
    fn set_inventory(&self, store: &str, product: &str, url: &str, count: u64) -> Result<()> {
        self.push(Emission::Inventory {
            store: store.to_string(),
            product: product.to_string(),
            url: url.to_string(),
            count,
        })
    }

    fn increment_success(&self, url: &str) -> Result<()> {
        self.push(Emission::Success { url: url.to_string() })
    }

    fn increment_failure(&self, url: &str, error: &str) -> Result<()> {
        self.push(Emission::Failure {
            url: url.to_string(),
            error: error.to_string(),
        })
    }

    fn observe_duration(&self, url: &str, _seconds: f64) -> Result<()> {
        self.push(Emission::Duration { url: url.to_string() })
    }
}

pub fn store() -> StoreIdentity {
    StoreIdentity::from("141")
}

pub fn product(slug: &str) -> ProductSpec {
    ProductSpec::new(
        format!("Product {}", slug),
        format!("https://shop.example.com/product/{}", slug),
    )
}

pub fn scheduler_for(
    driver: ScriptedDriver,
    products: Vec<ProductSpec>,
    interval: Duration,
) -> InventoryScheduler<ScriptedDriver> {
    InventoryScheduler::new(
        Prober::new(driver, TextExtractor::default(), LOCATOR),
        store(),
        products,
        interval,
    )
    .expect("non-zero interval")
}

/// Helper to wait for async operations
pub async fn wait_for_condition<F>(mut condition: F, timeout_seconds: u64) -> bool
where
    F: FnMut() -> bool,
{
    let start = std::time::Instant::now();
    let timeout = Duration::from_secs(timeout_seconds);

    while start.elapsed() < timeout {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    false
}
