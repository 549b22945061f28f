//!
//! Utility types and functions shared across the crate.
//!
//! This module provides:
//! - [`Sensitive`] - A wrapper type for sensitive data that hides values in debug output
//! - [`generate_id`] - Generates trace and span ids for request correlation
//! - [`replace_handlebars_with_env`] - Template substitution for environment variables
//! - [`ApiVersion`] - The API version a request targets
//!

use {
    regex::{Captures, Regex},
    serde::Deserialize,
    std::{env, sync::LazyLock},
    uuid::{ContextV7, Timestamp, Uuid},
    zeroize::{Zeroize, ZeroizeOnDrop},
};

/// Regular expression pattern for matching handlebars-style environment variable references.
/// Matches patterns like `{{ VAR_NAME }}` with optional whitespace around the variable name.
static HANDLEBAR_REGEXP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([A-Z0-9_]+)\s*\}\}").unwrap());

/// A wrapper type for sensitive data that obscures the value in debug output
/// and securely zeros memory when dropped.
///
/// Used for API keys in the request configuration, so that a `Debug` print of the
/// configuration never leaks them.
///
/// ```
/// use corona::Sensitive;
///
/// let api_key = Sensitive::from("secret-key-12345");
/// assert_eq!(format!("{:?}", api_key), "Sensitive(****)");
///
/// let key_value: &str = &api_key.0;
/// ```
#[derive(Clone, Deserialize, Default, Zeroize, ZeroizeOnDrop)]
pub struct Sensitive<T: Default + Zeroize>(pub T);

impl Sensitive<String> {
    /// Creates a new `Sensitive<String>` from a string slice.
    pub fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl<T: Default + Zeroize + PartialEq> PartialEq for Sensitive<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T: Default + Zeroize> std::fmt::Debug for Sensitive<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sensitive(****)")
    }
}

/// Generates a new trace or span id.
///
/// Ids are UUIDv7 values rendered as 32 lowercase hex digits without dashes, so
/// they sort by creation time and fit tracing backends that expect hex ids.
pub fn generate_id() -> String {
    let cx = ContextV7::new().with_additional_precision();
    Uuid::new_v7(Timestamp::now(cx)).simple().to_string()
}

/// Replaces handlebars-style placeholders with environment variable values.
///
/// Searches through the input string for patterns like `{{ VAR_NAME }}` and replaces
/// them with the corresponding environment variable value. Variable names must consist
/// of uppercase letters, digits, or underscores. Missing variables become empty strings.
///
/// ```
/// use corona::replace_handlebars_with_env;
///
/// let template = "Value: {{ CORONA_DOC_MISSING_VAR }}";
/// assert_eq!(replace_handlebars_with_env(template), "Value: ");
/// ```
pub fn replace_handlebars_with_env(input: &str) -> String {
    HANDLEBAR_REGEXP
        .replace_all(input, |caps: &Captures| {
            let var_name = &caps[1];
            env::var(var_name).unwrap_or_else(|_| {
                tracing::warn!(
                    variable = %var_name,
                    "Environment variable not found, substituting with empty string"
                );
                String::new()
            })
        })
        .to_string()
}

/// API version a request targets.
///
/// Resolved by the API version parsers and compared against a minimum by
/// [`RequestGuard::validate_api_version`](crate::RequestGuard::validate_api_version).
///
/// ```
/// use corona::ApiVersion;
///
/// let version = ApiVersion::new(2);
/// assert_eq!(version.as_u32(), 2);
/// assert_eq!(version.to_string(), "v2");
/// assert!(version >= ApiVersion::new(1));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ApiVersion(u32);

impl ApiVersion {
    /// Creates a new API version
    pub fn new(version: u32) -> Self {
        Self(version)
    }

    /// Returns the version number as u32
    pub fn as_u32(&self) -> u32 {
        self.0
    }

    /// Extracts the API version from a header or argument value.
    ///
    /// Supports plain numbers (`2`), prefixed numbers (`v2`) and media type
    /// parameters (`application/json; version=2`).
    pub fn from_header(header_value: &str) -> Option<Self> {
        let trimmed = header_value.trim();
        let plain = trimmed
            .strip_prefix('v')
            .or_else(|| trimmed.strip_prefix('V'))
            .unwrap_or(trimmed);

        if let Ok(version) = plain.parse::<u32>() {
            return Some(ApiVersion::new(version));
        }

        static VERSION_HEADER_REGEX: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(r"version=(\d+)").unwrap());

        VERSION_HEADER_REGEX
            .captures(header_value)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<u32>().ok())
            .map(ApiVersion::new)
    }
}

impl std::fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl From<u32> for ApiVersion {
    fn from(version: u32) -> Self {
        ApiVersion::new(version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // ========================================================================
    // Property-based tests for replace_handlebars_with_env
    // ========================================================================

    proptest! {
        /// Strings without handlebars patterns should pass through unchanged
        #[test]
        fn handlebars_no_pattern_unchanged(s in "[^{}]*") {
            let result = replace_handlebars_with_env(&s);
            prop_assert_eq!(result, s);
        }

        /// Valid patterns with set env vars should be substituted
        #[test]
        fn handlebars_valid_pattern_substituted(
            var_name in "[A-Z][A-Z0-9_]{0,10}",
            var_value in "[a-zA-Z0-9_]{1,20}",
            prefix in "[^{}]{0,10}",
            suffix in "[^{}]{0,10}"
        ) {
            let test_var = format!("CORONA_PROPTEST_{var_name}");
            unsafe { std::env::set_var(&test_var, &var_value); }

            let input = format!("{prefix}{{{{ {test_var} }}}}{suffix}");
            let result = replace_handlebars_with_env(&input);
            let expected = format!("{prefix}{var_value}{suffix}");

            unsafe { std::env::remove_var(&test_var); }

            prop_assert_eq!(result, expected);
        }

        /// Missing env vars should become empty strings
        #[test]
        fn handlebars_missing_var_empty(var_name in "[A-Z][A-Z0-9_]{5,15}") {
            let test_var = format!("CORONA_PROPTEST_MISSING_{var_name}");
            unsafe { std::env::remove_var(&test_var); }

            let input = format!("value={{{{ {test_var} }}}}");
            prop_assert_eq!(replace_handlebars_with_env(&input), "value=");
        }
    }

    // ========================================================================
    // Property-based tests for ApiVersion
    // ========================================================================

    proptest! {
        #[test]
        fn api_version_from_header_direct(version in 0u32..1000) {
            prop_assert_eq!(ApiVersion::from_header(&version.to_string()), Some(ApiVersion::new(version)));
        }

        #[test]
        fn api_version_from_header_prefixed(version in 0u32..1000) {
            prop_assert_eq!(ApiVersion::from_header(&format!("v{version}")), Some(ApiVersion::new(version)));
        }

        #[test]
        fn api_version_from_header_param(version in 1u32..100) {
            let header = format!("application/json; version={version}");
            prop_assert_eq!(ApiVersion::from_header(&header), Some(ApiVersion::new(version)));
        }

        #[test]
        fn api_version_ordering_matches_numbers(a in 0u32..1000, b in 0u32..1000) {
            prop_assert_eq!(ApiVersion::new(a) >= ApiVersion::new(b), a >= b);
        }
    }

    #[test]
    fn test_api_version_from_garbage() {
        assert_eq!(ApiVersion::from_header("latest"), None);
        assert_eq!(ApiVersion::from_header(""), None);
    }

    // ========================================================================
    // Id generation
    // ========================================================================

    #[test]
    fn test_generate_id_is_hex() {
        let id = generate_id();
        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_generate_id_is_unique() {
        assert_ne!(generate_id(), generate_id());
    }

    // ========================================================================
    // Sensitive wrapper
    // ========================================================================

    proptest! {
        #[test]
        fn sensitive_debug_hides_value(s in "[a-zA-Z0-9]{5,50}") {
            let sensitive = Sensitive::from(s.as_str());
            let debug_output = format!("{:?}", sensitive);
            prop_assert!(debug_output.contains("****"));
            prop_assert!(!debug_output.contains(&s));
        }
    }

    #[test]
    fn sensitive_clone_creates_independent_copy() {
        let original = Sensitive::from("original-secret");
        let cloned = original.clone();
        assert_eq!(original.0, cloned.0);

        drop(original);
        assert_eq!(cloned.0, "original-secret");
    }
}
