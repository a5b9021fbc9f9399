//! Server fingerprint: a stable UUID identifying the server instance.
//!
//! The canonical key is built from `SERVER_ADDR` then `SERVER_NAME`. Each
//! present value is stringified, trimmed and ASCII-lowercased, and the
//! results are joined with no separator. Absent keys contribute nothing, so
//! `"12" + "3"` and `"1" + "23"` produce the same key. Changing this would
//! change every published fingerprint.
//!
//! The fingerprint is the version-5 UUID of that key in the URL namespace.
//! An empty key has no fingerprint.

use std::fmt;

use uuid::Uuid;

use crate::error::FingerprintError;
use crate::params::{ServerParams, SERVER_ADDR, SERVER_NAME};

/// Params hashed into the fingerprint, in order.
const IDENTITY_KEYS: [&str; 2] = [SERVER_ADDR, SERVER_NAME];

/// Namespace for the v5 hash (`6ba7b811-9dad-11d1-80b4-00c04fd430c8`).
pub const NAMESPACE: Uuid = Uuid::NAMESPACE_URL;

/// Fingerprint of a server instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServerId(Uuid);

impl ServerId {
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ServerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.hyphenated(), f)
    }
}

/// Build the canonical key from the identity params.
pub fn canonical_key(params: &ServerParams) -> Result<String, FingerprintError> {
    let mut key = String::new();

    for name in IDENTITY_KEYS {
        let Some(value) = params.get(name) else {
            continue;
        };
        let text = value
            .as_text()
            .map_err(|source| FingerprintError::InvalidUtf8 { key: name, source })?;
        key.push_str(&normalize(&text));
    }

    Ok(key)
}

/// Trim the whitespace set `" \t\n\r\0\x0B"` and lowercase ASCII letters.
/// Non-ASCII characters pass through unchanged.
fn normalize(value: &str) -> String {
    value
        .trim_matches(|c: char| matches!(c, ' ' | '\t' | '\n' | '\r' | '\0' | '\x0B'))
        .to_ascii_lowercase()
}

/// Compute the fingerprint, or `None` when the canonical key is empty.
pub fn server_id(params: &ServerParams) -> Result<Option<ServerId>, FingerprintError> {
    let key = canonical_key(params)?;
    if key.is_empty() {
        return Ok(None);
    }
    Ok(Some(ServerId(Uuid::new_v5(&NAMESPACE, key.as_bytes()))))
}

/// Fingerprint as header text. Never fails: no identity params and a failed
/// computation both yield `""`.
pub fn fingerprint(params: &ServerParams) -> String {
    match server_id(params) {
        Ok(Some(id)) => id.to_string(),
        Ok(None) => String::new(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to compute server fingerprint");
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{ParamValue, REQUEST_METHOD, REQUEST_URI, SERVER_PORT};

    const GOLDEN: &str = "78ac0e14-0f2b-529e-81e2-a0f50f6029c5";

    fn params(addr: Option<&str>, name: Option<&str>) -> ServerParams {
        let mut p = ServerParams::new();
        if let Some(addr) = addr {
            p.insert(SERVER_ADDR, addr);
        }
        if let Some(name) = name {
            p.insert(SERVER_NAME, name);
        }
        p
    }

    /// `^[0-9a-f]{8}-[0-9a-f]{4}-5[0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$`
    fn is_v5_text(s: &str) -> bool {
        let groups: Vec<&str> = s.split('-').collect();
        let lower_hex = |g: &str| g.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f'));
        groups.len() == 5
            && [8, 4, 4, 4, 12]
                .iter()
                .zip(&groups)
                .all(|(len, g)| g.len() == *len && lower_hex(g))
            && groups[2].starts_with('5')
            && groups[3].starts_with(|c: char| matches!(c, '8' | '9' | 'a' | 'b'))
    }

    #[test]
    fn test_golden_value() {
        let id = fingerprint(&params(Some("1.1.1.1"), Some("www.example.com")));
        assert_eq!(id, GOLDEN);
    }

    #[test]
    fn test_empty_params_yield_empty() {
        assert_eq!(fingerprint(&ServerParams::new()), "");
        assert!(server_id(&ServerParams::new()).unwrap().is_none());
    }

    #[test]
    fn test_present_but_empty_yield_empty() {
        assert_eq!(fingerprint(&params(Some(""), Some(""))), "");
        assert_eq!(fingerprint(&params(Some("  "), Some("\t\n"))), "");
    }

    #[test]
    fn test_case_and_whitespace_invariance() {
        let upper = fingerprint(&params(Some("1.1.1.1"), Some("WWW.EXAMPLE.COM")));
        let padded = fingerprint(&params(Some(" 1.1.1.1 "), Some(" www.example.com ")));
        assert_eq!(upper, padded);
        assert_eq!(upper, GOLDEN);
    }

    #[test]
    fn test_canonical_key_normalization() {
        let key = canonical_key(&params(Some(" 1.1.1.1\0"), Some("\x0BWWW.Example.COM\r\n"))).unwrap();
        assert_eq!(key, "1.1.1.1www.example.com");
    }

    #[test]
    fn test_changing_address_changes_fingerprint() {
        let a = fingerprint(&params(Some("10.0.0.1"), Some("www.example.com")));
        let b = fingerprint(&params(Some("10.0.0.2"), Some("www.example.com")));
        assert_ne!(a, b);
    }

    #[test]
    fn test_changing_name_changes_fingerprint() {
        let a = fingerprint(&params(Some("10.0.0.1"), Some("a.example.com")));
        let b = fingerprint(&params(Some("10.0.0.1"), Some("b.example.com")));
        assert_ne!(a, b);
    }

    #[test]
    fn test_single_field_is_well_formed_v5() {
        for p in [params(Some("192.168.1.1"), None), params(None, Some("www.example.com"))] {
            let id = fingerprint(&p);
            assert!(is_v5_text(&id), "not a v5 uuid: {id}");
        }
    }

    #[test]
    fn test_single_address_hashes_the_address_alone() {
        let id = server_id(&params(Some("192.168.1.1"), None)).unwrap().unwrap();
        assert_eq!(*id.as_uuid(), Uuid::new_v5(&Uuid::NAMESPACE_URL, b"192.168.1.1"));
        assert_eq!(id.as_uuid().get_version_num(), 5);
    }

    #[test]
    fn test_numeric_value_matches_digit_string() {
        let mut numeric = ServerParams::new();
        numeric.insert(SERVER_ADDR, 12345i64);
        let mut text = ServerParams::new();
        text.insert(SERVER_ADDR, "12345");

        assert_eq!(fingerprint(&numeric), fingerprint(&text));
        assert!(!fingerprint(&numeric).is_empty());
    }

    #[test]
    fn test_unrelated_params_ignored() {
        let base = params(Some("1.1.1.1"), Some("www.example.com"));
        let mut noisy = base.clone();
        noisy.insert(REQUEST_METHOD, "POST");
        noisy.insert(REQUEST_URI, "/some/other/path?q=1");
        noisy.insert(SERVER_PORT, 8443u16);
        noisy.insert("HTTP_USER_AGENT", "curl/8.0");

        assert_eq!(fingerprint(&noisy), fingerprint(&base));
    }

    #[test]
    fn test_fields_join_without_separator() {
        let a = fingerprint(&params(Some("12"), Some("3")));
        let b = fingerprint(&params(Some("1"), Some("23")));
        assert_eq!(a, b);
    }

    #[test]
    fn test_repeated_calls_are_stable() {
        let p = params(Some("1.1.1.1"), Some("www.example.com"));
        let first = fingerprint(&p);
        assert!((0..100).all(|_| fingerprint(&p) == first));
    }

    #[test]
    fn test_invalid_utf8_is_an_error_internally() {
        let mut p = ServerParams::new();
        p.insert(SERVER_ADDR, ParamValue::Bytes(vec![0xc3, 0x28]));
        p.insert(SERVER_NAME, "www.example.com");

        let err = server_id(&p).unwrap_err();
        assert!(matches!(err, FingerprintError::InvalidUtf8 { key: SERVER_ADDR, .. }));
        assert_eq!(fingerprint(&p), "");
    }

    #[test]
    fn test_concurrent_calls_agree() {
        let p = std::sync::Arc::new(params(Some("1.1.1.1"), Some("www.example.com")));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let p = p.clone();
                std::thread::spawn(move || fingerprint(&p))
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), GOLDEN);
        }
    }
}
