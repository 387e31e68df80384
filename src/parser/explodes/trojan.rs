use crate::models::{Proxy, ProxyType};
use crate::utils::url::{host_of, query_params, url_decode};
use log::warn;
use url::Url;

/// Parse a Trojan link into a Proxy object
///
/// Format: `trojan://password@host:port?sni=...#remark`
pub fn explode_trojan(trojan: &str, node: &mut Proxy) -> bool {
    if !trojan.starts_with("trojan://") {
        return false;
    }

    let url = match Url::parse(trojan) {
        Ok(url) => url,
        Err(e) => {
            warn!("Failed to parse Trojan link {}: {}", trojan, e);
            return false;
        }
    };

    let password = url_decode(url.username());
    if password.is_empty() {
        return false;
    }

    let host = match host_of(&url) {
        Some(host) if !host.is_empty() => host,
        _ => return false,
    };
    let port = match url.port() {
        Some(port) if port != 0 => port,
        _ => return false,
    };

    let params = query_params(&url);
    let sni = params.get("sni").cloned().unwrap_or_else(|| host.clone());

    let remark = match url.fragment().map(url_decode) {
        Some(remark) if !remark.is_empty() => remark,
        _ => ProxyType::Trojan.default_remark().to_string(),
    };

    *node = Proxy::trojan_construct(remark, host, port, password, Some(sni));

    true
}
