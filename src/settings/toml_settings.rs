use serde::{Deserialize, Serialize};

use crate::utils::http::DEFAULT_TIMEOUT;

fn default_test_url() -> String {
    "http://www.gstatic.com/generate_204".to_string()
}

fn default_test_interval() -> u32 {
    900
}

fn default_main_group_name() -> String {
    "🚀 PROXY".to_string()
}

fn default_user_agent() -> String {
    "submerge".to_string()
}

fn default_request_timeout() -> u64 {
    DEFAULT_TIMEOUT
}

fn default_none() -> String {
    "NONE".to_string()
}

/// `[groups]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupSettings {
    /// URL probed by generated url-test groups
    #[serde(default = "default_test_url")]
    pub test_url: String,
    /// Probe interval in seconds
    #[serde(default = "default_test_interval")]
    pub test_interval: u32,
    /// Name of the select group listing every speed-test group and manual node
    #[serde(default = "default_main_group_name")]
    pub main_group_name: String,
}

impl Default for GroupSettings {
    fn default() -> Self {
        Self {
            test_url: default_test_url(),
            test_interval: default_test_interval(),
            main_group_name: default_main_group_name(),
        }
    }
}

/// `[fetch]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
    /// `NONE`, `SYSTEM` or a proxy URL
    #[serde(default = "default_none")]
    pub proxy_subscription: String,
    /// Log and skip subscriptions that cannot be fetched
    pub skip_failed_links: bool,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            request_timeout: default_request_timeout(),
            proxy_subscription: default_none(),
            skip_failed_links: false,
        }
    }
}

/// TOML settings file layout
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlSettings {
    pub groups: GroupSettings,
    pub fetch: FetchSettings,
}
