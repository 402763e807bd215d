use crate::config::default_open_browser;

use serde::{Deserialize, Serialize};

/// Application behavior configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BehaviourConfig {
    /// Whether to open the record page in the browser on startup.
    #[serde(default = "default_open_browser")]
    pub open_browser: bool,
}

impl Default for BehaviourConfig {
    fn default() -> Self {
        Self {
            open_browser: default_open_browser(),
        }
    }
}
