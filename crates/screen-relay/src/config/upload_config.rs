use crate::config::{default_base_url, default_endpoint};

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Media host configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Origin the upload endpoint is resolved against.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Upload path, relative to `base_url`.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Request timeout in seconds (None = wait indefinitely).
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl UploadConfig {
    /// Request timeout, if one is configured.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            endpoint: default_endpoint(),
            timeout_secs: None,
        }
    }
}
