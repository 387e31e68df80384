pub mod base64;
pub mod file;
pub mod http;
pub mod url;
pub mod yaml;

// Re-export common utilities
pub use file::{file_exists, file_get, file_write};
pub use http::{web_get, ProxyConfig, RequestOptions};
