use subtle::ConstantTimeEq;

/// Compare two API keys without leaking how many leading bytes match
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Shorten an API key for log lines, keeping only its first four characters
pub fn redact_key(key: &str) -> String {
    let visible: String = key.chars().take(4).collect();
    if visible.len() == key.len() {
        "****".to_string()
    } else {
        format!("{}****", visible)
    }
}
