use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

/// A product page to probe, as configured.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct ProductSpec {
    #[validate(length(min = 1, message = "product name must not be empty"))]
    pub name: String,
    #[validate(url(message = "product url must be a valid URL"))]
    pub url: String,
}

impl ProductSpec {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Store code scoping every probe in a run. Numeric codes are kept as text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct StoreIdentity(String);

impl StoreIdentity {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoreIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for StoreIdentity {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for StoreIdentity {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}
