use crate::models::{Proxy, ProxyType};
use crate::utils::base64::base64_decode_lenient;
use log::warn;
use serde_json::Value;

/// Reads a JSON field that may be encoded as a string or a number
fn json_string(json: &Value, key: &str) -> Option<String> {
    match &json[key] {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Parse a VMess link into a Proxy object
///
/// Format: `vmess://base64({"ps":..,"add":..,"port":..,"id":..,...})`
pub fn explode_vmess(vmess: &str, node: &mut Proxy) -> bool {
    if !vmess.starts_with("vmess://") {
        return false;
    }

    let decoded = match base64_decode_lenient(&vmess[8..]) {
        Some(decoded) => decoded,
        None => {
            warn!("Failed to decode VMess link: {}", vmess);
            return false;
        }
    };

    let json: Value = match serde_json::from_str(&decoded) {
        Ok(json) => json,
        Err(e) => {
            warn!("Invalid VMess JSON payload in {}: {}", vmess, e);
            return false;
        }
    };

    let add = match json_string(&json, "add") {
        Some(add) => add,
        None => return false,
    };
    let port = match json_string(&json, "port").and_then(|p| p.parse::<u16>().ok()) {
        Some(port) if port != 0 => port,
        _ => return false,
    };
    let id = json_string(&json, "id").unwrap_or_default();
    let aid = json_string(&json, "aid")
        .and_then(|a| a.parse::<u16>().ok())
        .unwrap_or(0);
    let remark = json_string(&json, "ps")
        .unwrap_or_else(|| ProxyType::VMess.default_remark().to_string());
    let cipher = json_string(&json, "scy").unwrap_or_else(|| "auto".to_string());
    let net = json_string(&json, "net").unwrap_or_else(|| "tcp".to_string());
    let tls = json_string(&json, "tls").as_deref() == Some("tls");

    let server_name = if tls {
        Some(json_string(&json, "sni").unwrap_or_else(|| add.clone()))
    } else {
        None
    };

    let (path, host) = match net.as_str() {
        "ws" => (
            Some(json_string(&json, "path").unwrap_or_else(|| "/".to_string())),
            Some(json_string(&json, "host").unwrap_or_else(|| add.clone())),
        ),
        "grpc" => (Some(json_string(&json, "path").unwrap_or_default()), None),
        _ => (None, None),
    };

    *node = Proxy::vmess_construct(
        &remark,
        &add,
        port,
        &id,
        aid,
        &net,
        &cipher,
        path,
        host,
        tls,
        server_name,
    );

    true
}
