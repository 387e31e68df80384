//! Core data models for the application
//!
//! This module contains the primary data structures used throughout the application,
//! separated from the logic that operates on them.
//!
//! # Usage
//!
//! ```rust
//! use submerge::models::{Proxy, ProxyType};
//!
//! let mut proxy = Proxy::default();
//! proxy.proxy_type = ProxyType::VMess;
//! proxy.hostname = "example.com".to_string();
//! proxy.port = 443;
//! assert_eq!(proxy.network(), "tcp");
//! ```

pub mod proxy;
pub mod proxy_group_config;

pub use proxy::*;
pub use proxy_group_config::{GroupLayout, ProxyGroupType, SpeedTestGroup};
