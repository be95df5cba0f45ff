use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::models::{ProductSpec, StoreIdentity};

/// Which step of a probe failed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ProbeErrorKind {
    NavigationFailed,
    ElementNotFound,
    TextExtractionFailed,
}

impl ProbeErrorKind {
    /// Stable name for the failed step, used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProbeErrorKind::NavigationFailed => "navigation_failed",
            ProbeErrorKind::ElementNotFound => "element_not_found",
            ProbeErrorKind::TextExtractionFailed => "text_extraction_failed",
        }
    }
}

impl fmt::Display for ProbeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ProbeError {
    #[error("failed to load page: {0}")]
    NavigationFailed(String),

    #[error("failed to find inventory element '{locator}': {message}")]
    ElementNotFound { locator: String, message: String },

    #[error("failed to get inventory text: {0}")]
    TextExtractionFailed(String),
}

impl ProbeError {
    pub fn kind(&self) -> ProbeErrorKind {
        match self {
            ProbeError::NavigationFailed(_) => ProbeErrorKind::NavigationFailed,
            ProbeError::ElementNotFound { .. } => ProbeErrorKind::ElementNotFound,
            ProbeError::TextExtractionFailed(_) => ProbeErrorKind::TextExtractionFailed,
        }
    }
}

/// The record of one probe attempt.
///
/// `result` holds either the observed count or the failure, never both.
/// `started_at` is taken before navigation begins, so the time between it and
/// processing approximates probe latency.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProbeOutcome {
    pub store: StoreIdentity,
    pub product_name: String,
    pub product_url: String,
    pub raw_text: String,
    pub started_at: DateTime<Utc>,
    pub result: Result<u64, ProbeError>,
}

impl ProbeOutcome {
    pub fn success(
        store: &StoreIdentity,
        product: &ProductSpec,
        started_at: DateTime<Utc>,
        raw_text: String,
        count: u64,
    ) -> Self {
        Self {
            store: store.clone(),
            product_name: product.name.clone(),
            product_url: product.url.clone(),
            raw_text,
            started_at,
            result: Ok(count),
        }
    }

    pub fn failure(
        store: &StoreIdentity,
        product: &ProductSpec,
        started_at: DateTime<Utc>,
        raw_text: String,
        error: ProbeError,
    ) -> Self {
        Self {
            store: store.clone(),
            product_name: product.name.clone(),
            product_url: product.url.clone(),
            raw_text,
            started_at,
            result: Err(error),
        }
    }

    pub fn count(&self) -> Option<u64> {
        self.result.as_ref().ok().copied()
    }

    pub fn error(&self) -> Option<&ProbeError> {
        self.result.as_ref().err()
    }

    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}
