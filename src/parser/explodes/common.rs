use crate::Proxy;
use log::warn;

/// Link schemes with a node parser
pub const SUPPORTED_SCHEMES: [&str; 4] = ["vless://", "vmess://", "trojan://", "ss://"];

/// Whether `line` is a proxy link this crate can convert
pub fn is_proxy_link(line: &str) -> bool {
    let lower = line.trim_start().to_ascii_lowercase();
    SUPPORTED_SCHEMES.iter().any(|s| lower.starts_with(s))
}

/// Explode a proxy link into a Proxy object
///
/// This function detects the type of proxy link and calls the appropriate parser.
/// Scheme matching is case-insensitive.
pub fn explode(link: &str, node: &mut Proxy) -> bool {
    let link = link.trim();
    if link.is_empty() {
        return false;
    }

    let (scheme, rest) = match link.split_once("://") {
        Some(parts) => parts,
        None => {
            warn!("Invalid link format (missing '://'): {}", link);
            return false;
        }
    };
    let scheme = scheme.to_ascii_lowercase();
    let link = format!("{}://{}", scheme, rest);

    let parsed = match scheme.as_str() {
        "vless" => super::vless::explode_vless(&link, node),
        "vmess" => super::vmess::explode_vmess(&link, node),
        "trojan" => super::trojan::explode_trojan(&link, node),
        "ss" => super::ss::explode_ss(&link, node),
        _ => {
            warn!("Unsupported link scheme '{}': {}", scheme, link);
            return false;
        }
    };

    if !parsed {
        warn!("Failed to parse {} link: {}", scheme, link);
    }
    parsed
}
