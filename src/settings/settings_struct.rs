use std::path::Path;
use std::sync::{Arc, LazyLock, RwLock};

use log::info;

use super::toml_settings::TomlSettings;
use crate::error::{Result, SubmergeError};
use crate::utils::file_get;
use crate::utils::http::{parse_proxy, RequestOptions};

/// Settings structure to hold global configuration
#[derive(Debug, Clone)]
pub struct Settings {
    pub pref_path: String,

    // Group generation
    pub test_url: String,
    pub test_interval: u32,
    pub main_group_name: String,

    // Subscription fetching
    pub user_agent: String,
    pub request_timeout: u64,
    pub proxy_subscription: String,
    pub skip_failed_links: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings::from(TomlSettings::default())
    }
}

impl From<TomlSettings> for Settings {
    fn from(toml: TomlSettings) -> Self {
        Settings {
            pref_path: String::new(),
            test_url: toml.groups.test_url,
            test_interval: toml.groups.test_interval,
            main_group_name: toml.groups.main_group_name,
            user_agent: toml.fetch.user_agent,
            request_timeout: toml.fetch.request_timeout,
            proxy_subscription: toml.fetch.proxy_subscription,
            skip_failed_links: toml.fetch.skip_failed_links,
        }
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the process-wide settings
    pub fn current() -> Arc<Settings> {
        match GLOBAL.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Request options for subscription fetches
    pub fn request_options(&self) -> RequestOptions {
        RequestOptions {
            proxy: parse_proxy(&self.proxy_subscription),
            user_agent: self.user_agent.clone(),
            timeout: self.request_timeout,
        }
    }

    pub fn load_from_content(content: &str) -> Result<Self> {
        let toml_settings: TomlSettings =
            toml::from_str(content).map_err(|e| SubmergeError::Settings(e.to_string()))?;
        let mut settings = Settings::from(toml_settings);
        if settings.main_group_name.trim().is_empty() {
            return Err(SubmergeError::Settings(
                "main_group_name must not be empty".to_string(),
            ));
        }
        if settings.request_timeout == 0 {
            settings.request_timeout = crate::utils::http::DEFAULT_TIMEOUT;
        }
        Ok(settings)
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = file_get(path)?;
        let mut settings = Settings::load_from_content(&content)?;
        settings.pref_path = path.display().to_string();
        Ok(settings)
    }
}

// Global settings instance
pub static GLOBAL: LazyLock<RwLock<Arc<Settings>>> =
    LazyLock::new(|| RwLock::new(Arc::new(Settings::new())));

fn replace_global(settings: Settings) {
    let mut guard = match GLOBAL.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    *guard = Arc::new(settings);
}

/// Update settings directly from file path
pub fn update_settings_from_file(path: impl AsRef<Path>) -> Result<()> {
    let settings = Settings::load_from_file(path)?;
    info!("Loaded settings from {}", settings.pref_path);
    replace_global(settings);
    Ok(())
}

pub fn update_settings_from_content(content: &str) -> Result<()> {
    replace_global(Settings::load_from_content(content)?);
    Ok(())
}
