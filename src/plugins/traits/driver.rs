use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DriverError {
    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("element not found: {message}")]
    NotFound { locator: String, message: String },

    #[error("text extraction failed: {0}")]
    Extraction(String),
}

/// A located element on the current page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementHandle {
    locator: String,
    node_id: u32,
}

impl ElementHandle {
    pub fn new(locator: impl Into<String>, node_id: u32) -> Self {
        Self {
            locator: locator.into(),
            node_id,
        }
    }

    pub fn locator(&self) -> &str {
        &self.locator
    }

    pub fn node_id(&self) -> u32 {
        self.node_id
    }
}

/// Page automation used by the probe: load a page, find a region, read its text.
///
/// A driver wraps one browser session, which cannot serve two pages at once.
/// Every call takes `&mut self` so a session is only ever driven by its owner.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageDriver: Send {
    async fn navigate(&mut self, url: &str) -> Result<(), DriverError>;
    async fn find_element(&mut self, locator: &str) -> Result<ElementHandle, DriverError>;
    async fn element_text(&mut self, element: &ElementHandle) -> Result<String, DriverError>;
}
