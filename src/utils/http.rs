use std::time::Duration;

use log::debug;
use reqwest::{Client, Proxy, StatusCode};

/// Default timeout for HTTP requests in seconds
pub const DEFAULT_TIMEOUT: u64 = 15;

/// How subscription requests reach the network
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ProxyConfig {
    /// Use the proxy from the environment (`HTTP_PROXY`, `HTTPS_PROXY`, ...)
    #[default]
    System,
    /// Connect directly
    Direct,
    /// Route through the given proxy URL
    Custom(String),
}

pub fn parse_proxy(proxy_str: &str) -> ProxyConfig {
    match proxy_str {
        "SYSTEM" => ProxyConfig::System,
        "NONE" | "" => ProxyConfig::Direct,
        other => ProxyConfig::Custom(other.to_string()),
    }
}

/// Request options for a single fetch
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub proxy: ProxyConfig,
    pub user_agent: String,
    pub timeout: u64,
}

impl Default for RequestOptions {
    fn default() -> Self {
        RequestOptions {
            proxy: ProxyConfig::default(),
            user_agent: "submerge".to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Makes an HTTP GET request to the specified URL
///
/// # Returns
/// * `Ok(String)` - The response body as a string
/// * `Err(String)` - Error message if the request failed
pub async fn web_get_async(url: &str, options: &RequestOptions) -> Result<String, String> {
    let mut client_builder = Client::builder()
        .timeout(Duration::from_secs(options.timeout))
        .user_agent(options.user_agent.as_str());

    match &options.proxy {
        ProxyConfig::System => {}
        ProxyConfig::Direct => {
            client_builder = client_builder.no_proxy();
        }
        ProxyConfig::Custom(proxy) => match Proxy::all(proxy) {
            Ok(proxy) => {
                client_builder = client_builder.proxy(proxy);
            }
            Err(e) => {
                return Err(format!("Failed to set proxy: {}", e));
            }
        },
    }

    let client = match client_builder.build() {
        Ok(client) => client,
        Err(e) => {
            return Err(format!("Failed to build HTTP client: {}", e));
        }
    };

    debug!("GET {}", url);
    let response = match client.get(url).send().await {
        Ok(resp) => resp,
        Err(e) => {
            return Err(format!("Failed to send request: {}", e));
        }
    };

    if response.status() != StatusCode::OK {
        return Err(format!("HTTP error: {}", response.status()));
    }

    match response.text().await {
        Ok(body) => Ok(body),
        Err(e) => Err(format!("Failed to read response body: {}", e)),
    }
}

/// Synchronous version of web_get_async that uses tokio runtime to run the async function
pub fn web_get(url: &str, options: &RequestOptions) -> Result<String, String> {
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            return Err(format!("Failed to create tokio runtime: {}", e));
        }
    };

    rt.block_on(web_get_async(url, options))
}
