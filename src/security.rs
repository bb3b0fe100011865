use subtle::ConstantTimeEq;

/// Header carrying the admin API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Outcome of checking a request's admin key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCheck {
    /// No key is configured, so admin endpoints do not exist
    Disabled,
    Rejected,
    Accepted,
}

/// Compare the provided key against the configured one in constant time.
pub fn check_api_key(configured: Option<&str>, provided: Option<&str>) -> KeyCheck {
    let Some(expected) = configured.filter(|k| !k.is_empty()) else {
        return KeyCheck::Disabled;
    };

    match provided {
        Some(key) if constant_time_compare(key.trim(), expected) => KeyCheck::Accepted,
        _ => KeyCheck::Rejected,
    }
}

/// Constant-time string comparison; only the length leaks.
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("secret123", "secret123"));
        assert!(!constant_time_compare("secret123", "secret124"));
        assert!(!constant_time_compare("secret123", "secret12"));
        assert!(!constant_time_compare("", "secret"));
    }

    #[test]
    fn test_no_configured_key_disables_admin() {
        assert_eq!(check_api_key(None, Some("anything")), KeyCheck::Disabled);
        assert_eq!(check_api_key(Some(""), None), KeyCheck::Disabled);
    }

    #[test]
    fn test_key_must_match() {
        assert_eq!(check_api_key(Some("k3y"), Some("k3y")), KeyCheck::Accepted);
        assert_eq!(check_api_key(Some("k3y"), Some(" k3y ")), KeyCheck::Accepted);
        assert_eq!(check_api_key(Some("k3y"), Some("key")), KeyCheck::Rejected);
        assert_eq!(check_api_key(Some("k3y"), None), KeyCheck::Rejected);
    }
}
