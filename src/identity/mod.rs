/**
 * Identity
 *
 * Token verification seam for the HTTP and streaming surfaces. The
 * server only needs a user id back from a token; how the token is
 * minted and validated is somebody else's concern, so the seam is a
 * trait and the default implementation is deliberately trivial.
 */
use axum::http::HeaderMap;

use crate::shared::UserId;

/// Resolves a bearer token to a user id
///
/// Returning `None` means the token is invalid and the request should be
/// rejected with 401.
pub trait Identity: Send + Sync {
    /// Authenticate a raw token string
    fn authenticate(&self, token: &str) -> Option<UserId>;
}

/// Development identity: any non-empty token names its own user
///
/// Stands in for a real token service. A production deployment swaps
/// this for an implementation that verifies signatures or calls an auth
/// service.
#[derive(Debug, Default, Clone)]
pub struct TokenIdentity;

impl Identity for TokenIdentity {
    fn authenticate(&self, token: &str) -> Option<UserId> {
        let token = token.trim();
        if token.is_empty() {
            None
        } else {
            Some(token.to_string())
        }
    }
}

/// Extract the token from an `Authorization: Bearer ...` header
///
/// Returns `None` when the header is missing, malformed, or not a
/// bearer scheme.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_token_identity_accepts_non_empty() {
        let identity = TokenIdentity;
        assert_eq!(identity.authenticate("user-7"), Some("user-7".to_string()));
        assert_eq!(identity.authenticate("   "), None);
        assert_eq!(identity.authenticate(""), None);
    }

    #[test]
    fn test_bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_static("Bearer abc123"),
        );
        assert_eq!(bearer_token(&headers), Some("abc123"));

        headers.insert(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_static("Basic abc123"),
        );
        assert_eq!(bearer_token(&headers), None);
    }
}
