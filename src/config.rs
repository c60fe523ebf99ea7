//! Runtime configuration for the payment list.

use crate::domain::pagination::PageSize;
use crate::error::{PaymentError, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Settings for the list controller and the gateway around it.
///
/// Every field is optional in a config file; missing ones take the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ListConfig {
    /// Quiet period after the last filter edit before a reload is issued.
    pub debounce_ms: u64,
    /// Upper bound on every call to the payment service.
    pub request_timeout_ms: u64,
    /// Initial page size; one of 10, 20 or 50.
    pub page_size: usize,
    /// How many notifications a slow subscriber may fall behind.
    pub notification_capacity: usize,
    /// How long each notification stays on screen.
    pub notification_display_ms: u64,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 1000,
            request_timeout_ms: 10_000,
            page_size: 10,
            notification_capacity: 64,
            notification_display_ms: 3000,
        }
    }
}

impl ListConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| PaymentError::Config(format!("invalid config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.request_timeout_ms == 0 {
            return Err(PaymentError::Config(
                "request_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.notification_capacity == 0 {
            return Err(PaymentError::Config(
                "notification_capacity must be greater than zero".to_string(),
            ));
        }
        if self.notification_display_ms == 0 {
            return Err(PaymentError::Config(
                "notification_display_ms must be greater than zero".to_string(),
            ));
        }
        self.initial_page_size()?;
        Ok(())
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn notification_display(&self) -> Duration {
        Duration::from_millis(self.notification_display_ms)
    }

    pub fn initial_page_size(&self) -> Result<PageSize> {
        PageSize::try_from(self.page_size).map_err(|e| PaymentError::Config(e.to_string()))
    }
}
