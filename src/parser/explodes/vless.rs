use crate::models::{Proxy, ProxyType};
use crate::utils::url::{host_of, query_params, url_decode};
use log::warn;
use url::Url;

/// Parse a VLESS link into a Proxy object
///
/// Format: `vless://uuid@host:port?type=ws&security=reality&...#remark`
pub fn explode_vless(vless: &str, node: &mut Proxy) -> bool {
    if !vless.starts_with("vless://") {
        return false;
    }

    let url = match Url::parse(vless) {
        Ok(url) => url,
        Err(e) => {
            warn!("Failed to parse VLESS link {}: {}", vless, e);
            return false;
        }
    };

    let uuid = url_decode(url.username());
    if uuid.is_empty() {
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
    let param = |key: &str| params.get(key).cloned();

    let remark = match url.fragment().map(url_decode) {
        Some(remark) if !remark.is_empty() => remark,
        _ => ProxyType::Vless.default_remark().to_string(),
    };

    let security = param("security").unwrap_or_default();
    let tls = security == "tls" || security == "reality";
    let network = param("type").unwrap_or_else(|| "tcp".to_string());
    let encryption = param("encryption").unwrap_or_else(|| "none".to_string());

    *node = Proxy::vless_construct(remark, host.clone(), port, uuid, network, tls, encryption);

    node.flow = param("flow");
    node.fingerprint = param("fp");

    // The ws Host header doubles as SNI when present
    let ws_host = param("host");
    if tls {
        node.server_name = Some(
            ws_host
                .clone()
                .or_else(|| param("sni"))
                .unwrap_or_else(|| host.clone()),
        );
    }

    if security == "reality" {
        node.public_key = Some(param("pbk").unwrap_or_default());
        node.short_id = Some(param("sid").unwrap_or_default());
    }

    let network = node.network().to_string();
    match network.as_str() {
        "ws" => {
            node.path = Some(param("path").unwrap_or_else(|| "/".to_string()));
            node.host = Some(ws_host.unwrap_or(host));
        }
        "grpc" => {
            node.path = Some(param("serviceName").unwrap_or_default());
        }
        _ => {}
    }

    true
}
