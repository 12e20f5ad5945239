//! Environment variable utilities
//!
//! Every tunable of the pool is read through these helpers so that an
//! unset or unparsable variable silently falls back to its default.
//!
//! ```ignore
//! use idpool_core::env::{env_get, env_get_str};
//!
//! let delay_us: u64 = env_get("IDP_LOOKUP_DELAY_US", 0);
//! let input = env_get_str("IDP_INPUT_PATH", "ids.txt");
//! ```

use std::str::FromStr;

/// Get environment variable parsed as type T, or return default
#[inline]
pub fn env_get<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    env_get_opt(key).unwrap_or(default)
}

/// Get environment variable as boolean
///
/// "1", "true", "yes" and "on" (any case) are true, anything else is false.
/// Unset returns the default.
#[inline]
pub fn env_get_bool(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(val) => matches!(val.to_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}

/// Get environment variable as `Some(T)` if set and parsable
#[inline]
pub fn env_get_opt<T>(key: &str) -> Option<T>
where
    T: FromStr,
{
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// Get environment variable as string, or return default
#[inline]
pub fn env_get_str(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Each test owns its variable names; tests run in parallel.

    #[test]
    fn test_unset_falls_back() {
        let delay: u64 = env_get("__IDP_TEST_UNSET_DELAY__", 250);
        assert_eq!(delay, 250);
        assert!(env_get_bool("__IDP_TEST_UNSET_FLAG__", true));
        assert_eq!(env_get_opt::<u64>("__IDP_TEST_UNSET_DELAY__"), None);
        assert_eq!(env_get_str("__IDP_TEST_UNSET_PATH__", "ids.txt"), "ids.txt");
    }

    #[test]
    fn test_parse_with_whitespace() {
        std::env::set_var("__IDP_TEST_DELAY__", " 1500 ");
        let delay: u64 = env_get("__IDP_TEST_DELAY__", 0);
        assert_eq!(delay, 1500);
        std::env::remove_var("__IDP_TEST_DELAY__");
    }

    #[test]
    fn test_unparsable_falls_back() {
        std::env::set_var("__IDP_TEST_BAD_DELAY__", "soon");
        let delay: u64 = env_get("__IDP_TEST_BAD_DELAY__", 7);
        assert_eq!(delay, 7);
        std::env::remove_var("__IDP_TEST_BAD_DELAY__");
    }

    #[test]
    fn test_bool_variants() {
        for (raw, expected) in [("1", true), ("ON", true), ("Yes", true), ("0", false), ("nope", false)] {
            std::env::set_var("__IDP_TEST_FLAG__", raw);
            assert_eq!(env_get_bool("__IDP_TEST_FLAG__", !expected), expected, "value {raw}");
        }
        std::env::remove_var("__IDP_TEST_FLAG__");
    }
}
