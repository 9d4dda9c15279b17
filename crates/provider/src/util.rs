//! Shared helpers for the provider client.

use lg_domain::Error;

/// Upstream error bodies are clipped to this many characters before
/// they are embedded in an error or logged.
pub(crate) const MAX_ERROR_BODY_CHARS: usize = 500;

/// Convert a [`reqwest::Error`] into the domain [`Error`] type.
///
/// Timeouts map to [`Error::Timeout`]; every other network-level
/// failure (DNS, connection refused, TLS) maps to
/// [`Error::Connectivity`].
pub(crate) fn from_reqwest(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout(e.to_string())
    } else {
        Error::Connectivity(e.to_string())
    }
}

/// Clip an upstream response body to [`MAX_ERROR_BODY_CHARS`]
/// characters, respecting UTF-8 boundaries.
pub(crate) fn truncate_body(body: &str) -> String {
    match body.char_indices().nth(MAX_ERROR_BODY_CHARS) {
        Some((idx, _)) => body[..idx].to_owned(),
        None => body.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_bodies_pass_through_unchanged() {
        assert_eq!(truncate_body("oops"), "oops");
        assert_eq!(truncate_body(""), "");
    }

    #[test]
    fn long_bodies_are_clipped_to_500_chars() {
        let body = "x".repeat(2000);
        let clipped = truncate_body(&body);
        assert_eq!(clipped.chars().count(), 500);
    }

    #[test]
    fn clipping_respects_multibyte_boundaries() {
        let body = "é".repeat(600);
        let clipped = truncate_body(&body);
        assert_eq!(clipped.chars().count(), 500);
        assert!(clipped.chars().all(|c| c == 'é'));
    }

    #[test]
    fn exactly_500_chars_is_not_clipped() {
        let body = "y".repeat(500);
        assert_eq!(truncate_body(&body), body);
    }
}
