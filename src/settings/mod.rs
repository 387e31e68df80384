//! Settings module
//!
//! Optional TOML preferences controlling group generation and subscription
//! fetching, plus the process-wide snapshot.

pub mod settings_struct;
pub mod toml_settings;

pub use settings_struct::{
    update_settings_from_content, update_settings_from_file, Settings, GLOBAL,
};
pub use toml_settings::TomlSettings;
