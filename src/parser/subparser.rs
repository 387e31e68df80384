//! Subscription input handling
//!
//! Turns the free-form text a user enters for a group (direct links,
//! subscription URLs, inline base64 blobs, one per line) into proxy nodes.

use log::{debug, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Result, SubmergeError};
use crate::models::Proxy;
use crate::parser::explodes::{explode, is_proxy_link};
use crate::settings::Settings;
use crate::utils::base64::base64_decode_lenient;
use crate::utils::file::{file_exists, file_get};
use crate::utils::http::{web_get, RequestOptions};

/// Source of remote subscription bodies
pub trait Fetch {
    fn fetch(&self, url: &str) -> Result<String>;
}

/// Fetches subscriptions over HTTP(S)
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    pub options: RequestOptions,
}

impl HttpFetcher {
    pub fn new(options: RequestOptions) -> Self {
        Self { options }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.request_options())
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String> {
        web_get(url, &self.options).map_err(|reason| SubmergeError::Fetch {
            url: url.to_string(),
            reason,
        })
    }
}

fn non_empty_lines(content: &str) -> Vec<String> {
    content
        .split(['\r', '\n'])
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Interpret a subscription payload.
///
/// The payload is decoded as base64 first; the decoded lines are used when
/// at least one of them looks like a URI. Otherwise the input is treated as
/// plain text with one link per line.
pub fn parse_subscription(content: &str) -> Vec<String> {
    let content = content.trim();
    if content.is_empty() {
        return Vec::new();
    }

    match base64_decode_lenient(content) {
        Some(decoded) => {
            let lines = non_empty_lines(&decoded);
            if lines.iter().any(|line| line.contains("://")) {
                debug!("Decoded base64 subscription with {} lines", lines.len());
                return lines;
            }
        }
        None => debug!("Subscription is not base64, reading it as plain text"),
    }

    non_empty_lines(content)
}

static REMOTE_SUBSCRIPTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^https?://\S+$").unwrap());

fn is_remote(line: &str) -> bool {
    REMOTE_SUBSCRIPTION.is_match(line)
}

/// Resolve the lines of a group's input into individual node links.
///
/// Each non-empty line is a direct proxy link, an HTTP(S) subscription URL
/// whose body is fetched, or an inline subscription blob. A subscription
/// that cannot be fetched fails the whole call unless `skip_failed_links`
/// is set.
pub fn collect_links(
    input: &str,
    fetcher: &dyn Fetch,
    skip_failed_links: bool,
) -> Result<Vec<String>> {
    let mut links = Vec::new();

    for line in non_empty_lines(input) {
        if is_proxy_link(&line) {
            links.push(line);
        } else if is_remote(&line) {
            info!("Fetching subscription {}", line);
            match fetcher.fetch(&line) {
                Ok(body) => {
                    let resolved = parse_subscription(&body);
                    info!("Subscription {} provided {} links", line, resolved.len());
                    links.extend(resolved);
                }
                Err(e) if skip_failed_links => {
                    warn!("Skipping subscription: {}", e);
                }
                Err(e) => return Err(e),
            }
        } else {
            links.extend(parse_subscription(&line));
        }
    }

    Ok(links)
}

/// Convert each link into a proxy node, skipping unsupported or malformed
/// links.
pub fn convert_links_to_proxies<I, S>(links: I) -> Vec<Proxy>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut proxies = Vec::new();
    let mut skipped = 0usize;
    for link in links {
        let mut node = Proxy::default();
        if explode(link.as_ref(), &mut node) {
            proxies.push(node);
        } else {
            skipped += 1;
        }
    }
    if skipped > 0 {
        warn!("Skipped {} unsupported or malformed links", skipped);
    }
    proxies
}

/// Resolve a group's input text straight to nodes
pub fn parse_group_input(
    input: &str,
    fetcher: &dyn Fetch,
    skip_failed_links: bool,
) -> Result<Vec<Proxy>> {
    let links = collect_links(input, fetcher, skip_failed_links)?;
    Ok(convert_links_to_proxies(&links))
}

/// Read subscription data from a file path or directly from a string.
///
/// An existing path is read from disk; anything else is the subscription
/// content itself.
pub fn read_subscription_input(path_or_data: &str) -> Result<String> {
    if !path_or_data.contains('\n') && file_exists(path_or_data) {
        return Ok(file_get(path_or_data)?);
    }
    Ok(path_or_data.to_string())
}
