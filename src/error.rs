use thiserror::Error;

#[derive(Error, Debug)]
pub enum SubmergeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Template error: {0}")]
    Template(String),

    #[error("Expected '{key}' to be a list, got {found}")]
    InvalidSection { key: String, found: &'static str },

    #[error("Failed to fetch subscription {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("No valid links found in the subscription input")]
    NoLinks,

    #[error("No supported nodes were parsed from the subscription")]
    NoProxies,

    #[error("Settings error: {0}")]
    Settings(String),
}

pub type Result<T> = std::result::Result<T, SubmergeError>;
