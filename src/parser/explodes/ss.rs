use crate::models::{Proxy, ProxyType};
use crate::utils::base64::base64_decode_lenient;
use crate::utils::url::url_decode;

/// Splits `method:password`
fn split_secret(secret: &str) -> Option<(String, String)> {
    let (method, password) = secret.split_once(':')?;
    if method.is_empty() {
        return None;
    }
    Some((method.to_string(), password.to_string()))
}

/// Splits `server:port`, accepting bracketed IPv6 servers
fn split_server_port(server_port: &str) -> Option<(String, u16)> {
    let (server, port) = server_port.rsplit_once(':')?;
    let server = server.trim_start_matches('[').trim_end_matches(']');
    let port = port.parse::<u16>().ok()?;
    if server.is_empty() || port == 0 {
        return None;
    }
    Some((server.to_string(), port))
}

/// Parse a Shadowsocks link into a Proxy object
///
/// Accepts both SIP002 (`ss://base64(method:password)@server:port`) and the
/// legacy layout (`ss://base64(method:password@server:port)`), each with an
/// optional `?plugin=` query and `#remark`.
pub fn explode_ss(ss: &str, node: &mut Proxy) -> bool {
    if !ss.starts_with("ss://") {
        return false;
    }

    let (body, mut ps) = match ss[5..].split_once('#') {
        Some((body, remark)) => (body, url_decode(remark)),
        None => (&ss[5..], String::new()),
    };
    let mut ss_content = body.replace("/?", "?");

    let mut plugin = String::new();
    let mut plugin_opts = String::new();
    if let Some(query_pos) = ss_content.find('?') {
        let addition = ss_content[query_pos + 1..].to_string();
        ss_content.truncate(query_pos);

        for (key, value) in url::form_urlencoded::parse(addition.as_bytes()) {
            if key == "plugin" {
                match value.split_once(';') {
                    Some((name, opts)) => {
                        plugin = name.to_string();
                        plugin_opts = opts.to_string();
                    }
                    None => plugin = value.to_string(),
                }
            }
        }
    }
    let ss_content = ss_content.trim_end_matches('/');

    let parsed = if let Some((secret, server_port)) = ss_content.rsplit_once('@') {
        // SIP002, userinfo is percent-encoded base64 or plain text
        let secret = url_decode(secret);
        let secret = match base64_decode_lenient(&secret) {
            Some(decoded) if decoded.contains(':') => decoded,
            _ => secret,
        };
        split_secret(&secret).zip(split_server_port(server_port))
    } else {
        base64_decode_lenient(ss_content).and_then(|decoded| {
            let (secret, server_port) = decoded.rsplit_once('@')?;
            split_secret(secret).zip(split_server_port(server_port))
        })
    };

    let ((method, password), (server, port)) = match parsed {
        Some(parsed) => parsed,
        None => return false,
    };

    if ps.is_empty() {
        ps = ProxyType::Shadowsocks.default_remark().to_string();
    }

    *node = Proxy::ss_construct(
        &ps,
        &server,
        port,
        &password,
        &method,
        &plugin,
        &plugin_opts,
    );

    true
}
