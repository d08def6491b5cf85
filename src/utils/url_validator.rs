//! Validation and scheme normalization for submitted URLs.
//!
//! Runs before anything reaches the key deriver or the store. Each stage
//! short-circuits on the first failure.

use std::fmt;

use url::{Host, Url};

use crate::config::ValidationSettings;

/// Schemes that are never accepted, whatever their letter case.
const BLOCKED_SCHEMES: &[&str] = &["javascript", "data", "vbscript", "file", "ftp"];

/// Host names rejected in production mode. Addresses are checked by kind.
const LOOPBACK_NAMES: &[&str] = &["localhost"];

/// Errors that can occur during URL validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UrlValidationError {
    #[error("Please enter a URL")]
    Empty,

    #[error("URL is too short (minimum {min} characters)")]
    TooShort { min: usize },

    #[error("URL is too long (maximum {max} characters)")]
    TooLong { max: usize },

    #[error("Please enter a valid URL")]
    InvalidFormat(String),

    #[error("This URL appears to be potentially harmful")]
    UnsafeScheme(String),

    #[error("Localhost URLs are not allowed")]
    LoopbackHost,
}

impl UrlValidationError {
    /// Short machine-readable reason, used in error details.
    pub fn reason(&self) -> String {
        match self {
            Self::Empty => "empty".to_string(),
            Self::TooShort { .. } => "too_short".to_string(),
            Self::TooLong { .. } => "too_long".to_string(),
            Self::InvalidFormat(cause) => format!("invalid_format: {}", cause),
            Self::UnsafeScheme(scheme) => format!("blocked_scheme: {}", scheme),
            Self::LoopbackHost => "loopback_host".to_string(),
        }
    }
}

/// A URL that passed validation, with its scheme applied.
///
/// This is the exact string that is hashed, stored and compared for
/// deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedUrl(String);

impl NormalizedUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Pure URL validator configured once at startup.
#[derive(Debug, Clone, Default)]
pub struct UrlValidator {
    settings: ValidationSettings,
}

impl UrlValidator {
    pub fn new(settings: ValidationSettings) -> Self {
        Self { settings }
    }

    /// Validates a raw URL and returns it with a scheme applied.
    ///
    /// # Rules
    ///
    /// 1. Surrounding whitespace is trimmed; empty input and lengths outside
    ///    the configured bounds are rejected
    /// 2. A declared `javascript:`, `data:`, `vbscript:`, `file:` or `ftp:`
    ///    scheme is rejected (checked before prefixing, which would mask it)
    /// 3. Input without `http://` or `https://` gets `https://` prepended
    /// 4. The result must parse as a URL with a blocked-free scheme
    /// 5. In production mode loopback hosts are rejected
    ///
    /// Path and query are returned untouched: URLs are case-sensitive beyond
    /// the host.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let validator = UrlValidator::default();
    /// assert_eq!(validator.validate("example.com")?.as_str(), "https://example.com");
    /// assert!(validator.validate("javascript:alert(1)").is_err());
    /// ```
    pub fn validate(&self, raw_url: &str) -> Result<NormalizedUrl, UrlValidationError> {
        let trimmed = raw_url.trim();
        if trimmed.is_empty() {
            return Err(UrlValidationError::Empty);
        }

        let length = trimmed.chars().count();
        if length < self.settings.min_length {
            return Err(UrlValidationError::TooShort {
                min: self.settings.min_length,
            });
        }
        if length > self.settings.max_length {
            return Err(UrlValidationError::TooLong {
                max: self.settings.max_length,
            });
        }

        if let Some(scheme) = declared_scheme(trimmed)
            && is_blocked_scheme(scheme)
        {
            return Err(UrlValidationError::UnsafeScheme(scheme.to_ascii_lowercase()));
        }

        let processed = if has_http_prefix(trimmed) {
            trimmed.to_string()
        } else {
            format!("https://{}", trimmed)
        };

        let parsed =
            Url::parse(&processed).map_err(|e| UrlValidationError::InvalidFormat(e.to_string()))?;

        if is_blocked_scheme(parsed.scheme()) {
            return Err(UrlValidationError::UnsafeScheme(parsed.scheme().to_string()));
        }

        let host = parsed
            .host()
            .ok_or_else(|| UrlValidationError::InvalidFormat("missing host".to_string()))?;

        if self.settings.production && is_loopback_host(host) {
            return Err(UrlValidationError::LoopbackHost);
        }

        Ok(NormalizedUrl(processed))
    }
}

/// Case-insensitive check for an explicit `http://` or `https://` prefix.
fn has_http_prefix(input: &str) -> bool {
    let lower = input
        .get(..8)
        .unwrap_or(input)
        .to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Returns the scheme the input declares, if it starts with `scheme:`.
fn declared_scheme(input: &str) -> Option<&str> {
    let (candidate, _) = input.split_once(':')?;
    let mut chars = candidate.chars();
    let first = chars.next()?;
    let valid = first.is_ascii_alphabetic()
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then_some(candidate)
}

fn is_blocked_scheme(scheme: &str) -> bool {
    BLOCKED_SCHEMES
        .iter()
        .any(|blocked| blocked.eq_ignore_ascii_case(scheme))
}

/// Loopback or unspecified addresses in any spelling the URL parser accepts.
fn is_loopback_host(host: Host<&str>) -> bool {
    match host {
        Host::Domain(name) => {
            let name = name.strip_suffix('.').unwrap_or(name);
            LOOPBACK_NAMES
                .iter()
                .any(|loopback| loopback.eq_ignore_ascii_case(name))
        }
        Host::Ipv4(addr) => addr.is_loopback() || addr.is_unspecified(),
        Host::Ipv6(addr) => {
            addr.is_loopback()
                || addr.is_unspecified()
                || addr
                    .to_ipv4_mapped()
                    .is_some_and(|v4| v4.is_loopback() || v4.is_unspecified())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn production() -> UrlValidator {
        UrlValidator::new(ValidationSettings {
            production: true,
            ..ValidationSettings::default()
        })
    }

    #[test]
    fn test_bare_domain_gets_https() {
        let result = UrlValidator::default().validate("example.com");
        assert_eq!(result.unwrap().as_str(), "https://example.com");
    }

    #[test]
    fn test_http_url_kept_as_is() {
        let result = UrlValidator::default().validate("http://example.com/Path?Q=1");
        assert_eq!(result.unwrap().as_str(), "http://example.com/Path?Q=1");
    }

    #[test]
    fn test_uppercase_scheme_not_prefixed_twice() {
        let result = UrlValidator::default().validate("HTTPS://example.com/a");
        assert_eq!(result.unwrap().as_str(), "HTTPS://example.com/a");
    }

    #[test]
    fn test_whitespace_trimmed() {
        let result = UrlValidator::default().validate("   https://example.com/a \n");
        assert_eq!(result.unwrap().as_str(), "https://example.com/a");
    }

    #[test]
    fn test_path_case_preserved() {
        let result = UrlValidator::default().validate("https://example.com/CaseSensitive/Path");
        assert_eq!(
            result.unwrap().as_str(),
            "https://example.com/CaseSensitive/Path"
        );
    }

    #[test]
    fn test_empty_rejected() {
        assert_eq!(
            UrlValidator::default().validate("   "),
            Err(UrlValidationError::Empty)
        );
    }

    #[test]
    fn test_too_short_rejected() {
        assert_eq!(
            UrlValidator::default().validate("a.io"),
            Err(UrlValidationError::TooShort { min: 10 })
        );
    }

    #[test]
    fn test_too_long_rejected() {
        let url = format!("https://example.com/{}", "a".repeat(2048));
        assert_eq!(
            UrlValidator::default().validate(&url),
            Err(UrlValidationError::TooLong { max: 2048 })
        );
    }

    #[test]
    fn test_length_bounds_inclusive() {
        let validator = UrlValidator::default();
        assert!(validator.validate("abcdef.io").is_err());
        assert!(validator.validate("abcdefg.io").is_ok());

        let path = "a".repeat(2048 - "https://example.com/".len());
        let url = format!("https://example.com/{}", path);
        assert_eq!(url.len(), 2048);
        assert!(validator.validate(&url).is_ok());
    }

    #[test]
    fn test_javascript_rejected() {
        let result = UrlValidator::default().validate("javascript:alert(1)");
        assert!(matches!(result, Err(UrlValidationError::UnsafeScheme(_))));
    }

    #[test]
    fn test_blocked_schemes_case_insensitive() {
        let validator = UrlValidator::default();
        for input in [
            "JavaScript:alert(document.cookie)",
            "data:text/html;base64,PHNjcmlwdD4=",
            "VBScript:msgbox(1)",
            "file:///etc/passwd",
            "ftp://files.example.com/a.txt",
        ] {
            let result = validator.validate(input);
            assert!(
                matches!(result, Err(UrlValidationError::UnsafeScheme(_))),
                "{} should be rejected",
                input
            );
        }
    }

    #[test]
    fn test_unparseable_rejected() {
        let result = UrlValidator::default().validate("https://exa mple.com/");
        assert!(matches!(result, Err(UrlValidationError::InvalidFormat(_))));
    }

    #[test]
    fn test_localhost_allowed_outside_production() {
        assert!(
            UrlValidator::default()
                .validate("http://localhost:3000/test")
                .is_ok()
        );
    }

    #[test]
    fn test_loopback_rejected_in_production() {
        let validator = production();
        for input in [
            "http://localhost:3000/test",
            "http://127.0.0.1:8080/api",
            "http://0.0.0.0/admin/panel",
            "LOCALHOST:8080/path",
            "http://localhost./admin",
            "http://LOCALHOST.:8080/x",
            "http://127.0.0.1./admin",
            "http://127.1.2.3/admin",
            "http://[::1]/admin",
            "http://[::ffff:127.0.0.1]/admin",
        ] {
            assert_eq!(
                validator.validate(input),
                Err(UrlValidationError::LoopbackHost),
                "{} should be rejected",
                input
            );
        }
    }

    #[test]
    fn test_public_host_accepted_in_production() {
        let validator = production();
        assert!(validator.validate("https://example.com/page").is_ok());
        assert!(validator.validate("https://localhost.example.com/").is_ok());
        assert!(validator.validate("http://[::ffff:93.184.216.34]/").is_ok());
    }

    #[test]
    fn test_blocked_word_in_query_is_not_a_scheme() {
        let result = UrlValidator::default().validate("https://example.com/?next=data:123");
        assert!(result.is_ok());
    }

    #[test]
    fn test_declared_scheme() {
        assert_eq!(declared_scheme("javascript:alert(1)"), Some("javascript"));
        assert_eq!(declared_scheme("example.com:8080/path"), Some("example.com"));
        assert_eq!(declared_scheme("example.com/path"), None);
        assert_eq!(declared_scheme("1abc:x"), None);
    }
}
