//! Cache key derivation
//!
//! Deterministic digest over the request parameters that define response
//! identity. Same inputs always produce the same key; keys carry a
//! `user:`/`shared:` prefix so user-scoped and shared entries are easy to
//! tell apart in diagnostics.

use sha2::{Digest, Sha256};

/// Build a cache key for a query.
///
/// `params` are extra identity-bearing parameters (tier, temperature, ...);
/// they are sorted by name before hashing so argument order never changes
/// the key. When `user_id` is present the key is user-scoped; otherwise all
/// users share it.
#[must_use]
pub fn cache_key(query: &str, user_id: Option<&str>, params: &[(&str, String)]) -> String {
    let mut parts: Vec<String> = vec![query.to_string()];
    if let Some(user_id) = user_id {
        parts.push(user_id.to_string());
    }

    let mut sorted: Vec<&(&str, String)> = params.iter().collect();
    sorted.sort_by_key(|(name, _)| *name);
    for (name, value) in sorted {
        parts.push(format!("{name}={value}"));
    }

    let digest = Sha256::digest(parts.join(":").as_bytes());
    let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();

    match user_id {
        Some(user_id) => {
            let short: String = user_id.chars().take(8).collect();
            format!("user:{short}:{hex}")
        }
        None => format!("shared:{hex}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(temperature: f32, tier: &str) -> Vec<(&'static str, String)> {
        vec![
            ("temperature", temperature.to_string()),
            ("user_tier", tier.to_string()),
        ]
    }

    #[test]
    fn test_same_inputs_same_key() {
        let a = cache_key("hello", None, &params(0.0, "free"));
        let b = cache_key("hello", None, &params(0.0, "free"));
        assert_eq!(a, b);
    }

    #[test]
    fn test_param_order_does_not_matter() {
        let a = cache_key(
            "hello",
            None,
            &[("x", "1".to_string()), ("y", "2".to_string())],
        );
        let b = cache_key(
            "hello",
            None,
            &[("y", "2".to_string()), ("x", "1".to_string())],
        );
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_inputs_diverge() {
        let base = cache_key("hello", None, &params(0.0, "free"));
        assert_ne!(base, cache_key("hello!", None, &params(0.0, "free")));
        assert_ne!(base, cache_key("hello", None, &params(0.0, "premium")));
        assert_ne!(base, cache_key("hello", None, &params(1.0, "free")));
    }

    #[test]
    fn test_user_scoped_key_differs_from_shared() {
        let shared = cache_key("hello", None, &params(0.0, "free"));
        let scoped = cache_key("hello", Some("user-123"), &params(0.0, "free"));
        assert_ne!(shared, scoped);
        assert!(shared.starts_with("shared:"));
        assert!(scoped.starts_with("user:user-123:"));
    }

    #[test]
    fn test_long_user_id_is_truncated_in_prefix_only() {
        let a = cache_key("q", Some("abcdefgh-first"), &[]);
        let b = cache_key("q", Some("abcdefgh-second"), &[]);
        // Prefixes collide but digests differ
        assert!(a.starts_with("user:abcdefgh:"));
        assert!(b.starts_with("user:abcdefgh:"));
        assert_ne!(a, b);
    }
}
