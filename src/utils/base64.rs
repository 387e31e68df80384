use base64::{engine::general_purpose, Engine as _};

/// Encodes a string to Base64 format.
pub fn base64_encode(input: &str) -> String {
    general_purpose::STANDARD.encode(input)
}

/// Reverses a URL-safe Base64 string to standard Base64 format.
fn url_safe_base64_reverse(input: &str) -> String {
    input.replace('-', "+").replace('_', "/")
}

/// Decodes Base64 the way subscription servers actually emit it: standard
/// or URL-safe alphabet, with or without padding, surrounding whitespace
/// ignored.
///
/// Returns `None` unless the input decodes to valid UTF-8.
pub fn base64_decode_lenient(input: &str) -> Option<String> {
    let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return None;
    }
    let normalized = pad(&url_safe_base64_reverse(compact.trim_end_matches('=')));
    let bytes = general_purpose::STANDARD.decode(normalized).ok()?;
    String::from_utf8(bytes).ok()
}

fn pad(input: &str) -> String {
    let mut s = input.to_string();
    while s.len() % 4 != 0 {
        s.push('=');
    }
    s
}
