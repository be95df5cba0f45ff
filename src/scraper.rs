use anyhow::anyhow;
use async_trait::async_trait;
use headless_chrome::{Browser, Element, LaunchOptions, Tab};
use std::ffi::OsStr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{ScraperConfig, StoreConfig};
use crate::plugins::traits::{DriverError, ElementHandle, PageDriver};
use crate::{AppError, Result};

/// One headless Chrome instance with a single tab, shared by every probe in a run.
pub struct ChromeSession {
    // Dropping the browser shuts Chrome down, so it lives as long as the tab.
    _browser: Browser,
    tab: Arc<Tab>,
    timeout: Duration,
}

impl ChromeSession {
    /// Launches Chrome and applies session-wide settings. Failure here is fatal:
    /// without a session nothing can be probed.
    pub fn launch(config: &ScraperConfig) -> Result<Self> {
        let mut launch_options = LaunchOptions::default_builder()
            .headless(config.headless)
            .sandbox(false) // Often needed in containerized environments
            // Passes are minutes apart; the 30s default would drop the connection in between.
            .idle_browser_timeout(Duration::from_secs(24 * 60 * 60))
            .args(vec![
                OsStr::new("--no-sandbox"),
                OsStr::new("--disable-dev-shm-usage"),
                OsStr::new("--disable-gpu"),
                OsStr::new("--disable-extensions"),
                OsStr::new("--disable-background-timer-throttling"),
                OsStr::new("--disable-backgrounding-occluded-windows"),
                OsStr::new("--disable-renderer-backgrounding"),
            ])
            .build()
            .map_err(|e| AppError::Browser(format!("Failed to create launch options: {}", e)))?;

        if let Some(chrome_path) = &config.chrome_path {
            launch_options.path = Some(PathBuf::from(chrome_path));
        }

        let browser = Browser::new(launch_options)
            .map_err(|e| AppError::Browser(format!("Failed to launch browser: {}", e)))?;

        let tab = browser
            .new_tab()
            .map_err(|e| AppError::Browser(format!("Failed to create tab: {}", e)))?;

        tab.set_default_timeout(config.timeout());

        if let Some(user_agent) = &config.user_agent {
            tab.set_user_agent(user_agent, None, None)
                .map_err(|e| AppError::Browser(format!("Failed to set user agent: {}", e)))?;
        }

        tracing::info!(headless = config.headless, "Browser session started");

        Ok(Self {
            _browser: browser,
            tab,
            timeout: config.timeout(),
        })
    }

    /// Sets the store-selection cookie on the target site. Runs once, before any probe.
    pub async fn select_store(&mut self, store: &StoreConfig) -> Result<()> {
        let (Some(name), Some(url)) = (&store.cookie_name, &store.cookie_url) else {
            return Ok(());
        };

        let cookie = format!("{}={}; path=/", name, store.id.trim());
        // JSON string literals are valid JavaScript string literals.
        let script = format!("document.cookie = {};", serde_json::to_string(&cookie)?);
        let url = url.clone();

        self.blocking(move |tab| {
            tab.navigate_to(&url)?.wait_until_navigated()?;
            tab.evaluate(&script, false)?;
            Ok(())
        })
        .await
        .map_err(|e| AppError::Browser(format!("Failed to select store: {}", e)))?;

        tracing::info!(store = %store.id, cookie = %name, "Store selected for session");
        Ok(())
    }

    // headless_chrome blocks on the DevTools socket; keep it off the async workers.
    async fn blocking<T, F>(&self, f: F) -> anyhow::Result<T>
    where
        F: FnOnce(Arc<Tab>) -> anyhow::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let tab = Arc::clone(&self.tab);
        tokio::task::spawn_blocking(move || f(tab))
            .await
            .map_err(|e| anyhow!("browser task failed: {}", e))?
    }
}

#[async_trait]
impl PageDriver for ChromeSession {
    async fn navigate(&mut self, url: &str) -> std::result::Result<(), DriverError> {
        let url = url.to_string();
        self.blocking(move |tab| {
            tab.navigate_to(&url)?.wait_until_navigated()?;
            Ok(())
        })
        .await
        .map_err(|e| DriverError::Navigation(e.to_string()))
    }

    async fn find_element(&mut self, locator: &str) -> std::result::Result<ElementHandle, DriverError> {
        let selector = locator.to_string();
        let timeout = self.timeout;
        self.blocking(move |tab| {
            // Polls until the region is rendered, up to the session timeout.
            let element = tab.wait_for_element_with_custom_timeout(&selector, timeout)?;
            Ok(ElementHandle::new(selector, element.node_id))
        })
        .await
        .map_err(|e| DriverError::NotFound {
            locator: locator.to_string(),
            message: e.to_string(),
        })
    }

    async fn element_text(&mut self, element: &ElementHandle) -> std::result::Result<String, DriverError> {
        let node_id = element.node_id();
        self.blocking(move |tab| {
            let element = Element::new(&tab, node_id)?;
            element.get_inner_text()
        })
        .await
        .map_err(|e| DriverError::Extraction(e.to_string()))
    }
}
