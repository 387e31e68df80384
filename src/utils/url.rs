//! URL encoding/decoding utilities

use std::collections::HashMap;

use url::{Host, Url};

/// Decodes a URL-encoded string
///
/// Returns the original string if decoding fails.
///
/// # Examples
/// ```
/// use submerge::utils::url::url_decode;
///
/// let decoded = url_decode("Hello%20World%21");
/// assert_eq!(decoded, "Hello World!");
/// ```
pub fn url_decode(input: &str) -> String {
    urlencoding::decode(input)
        .map(|cow| cow.into_owned())
        .unwrap_or_else(|_| input.to_string())
}

/// Host of a parsed URL, IPv6 addresses without their brackets
pub fn host_of(url: &Url) -> Option<String> {
    match url.host()? {
        Host::Domain(d) => Some(d.to_string()),
        Host::Ipv4(a) => Some(a.to_string()),
        Host::Ipv6(a) => Some(a.to_string()),
    }
}

/// Query parameters of a URL. Parameters with an empty value are treated
/// as absent; the first occurrence of a key wins.
pub fn query_params(url: &Url) -> HashMap<String, String> {
    let mut params = HashMap::new();
    for (key, value) in url.query_pairs() {
        if value.is_empty() {
            continue;
        }
        params
            .entry(key.to_string())
            .or_insert_with(|| value.to_string());
    }
    params
}

/// Returns the value of `key` in a `k1=v1&k2=v2` argument string, or an
/// empty string.
pub fn get_url_arg(args: &str, key: &str) -> String {
    for pair in args.split('&') {
        if let Some((k, v)) = pair.split_once('=') {
            if k == key {
                return v.to_string();
            }
        }
    }
    String::new()
}
