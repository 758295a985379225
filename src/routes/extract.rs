use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};

use crate::error::AppError;
use crate::models::Account;
use crate::AppState;

/// Header accepted alongside `Authorization`
pub const ACCESS_TOKEN_HEADER: &str = "x-access-token";

/// JSON body extractor whose rejections go through [`AppError`]
///
/// Missing fields, wrong types and non-JSON bodies all answer 400 with the
/// usual `{"error": ...}` body.
#[derive(Debug, Clone, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// The account behind the request's bearer token
///
/// Rejects with 401 when no token is present or the token is unknown or
/// revoked.
#[derive(Debug, Clone)]
pub struct CurrentAccount(pub Account);

/// Pull a bearer token out of `Authorization` or `x-access-token`
///
/// A leading `Bearer ` is optional on either header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    [AUTHORIZATION.as_str(), ACCESS_TOKEN_HEADER]
        .into_iter()
        .filter_map(|name| headers.get(name)?.to_str().ok())
        .map(|value| {
            let value = value.trim();
            value
                .strip_prefix("Bearer ")
                .or_else(|| value.strip_prefix("bearer "))
                .unwrap_or(value)
                .trim()
        })
        .find(|token| !token.is_empty())
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentAccount {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(&parts.headers) else {
            tracing::debug!("Request without access token");
            return Err(AppError::Unauthorized);
        };

        match state.accounts.resolve_by_token(token).await {
            Ok(account) => Ok(CurrentAccount(account)),
            Err(AppError::AccountNotFound) => {
                tracing::warn!("Request with unknown or revoked access token");
                Err(AppError::Unauthorized)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token_from_authorization() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc123"));
        assert_eq!(bearer_token(&headers), Some("abc123"));
    }

    #[test]
    fn test_bearer_token_from_access_token_header() {
        let mut headers = HeaderMap::new();
        headers.insert(ACCESS_TOKEN_HEADER, HeaderValue::from_static("abc123"));
        assert_eq!(bearer_token(&headers), Some("abc123"));

        headers.insert(ACCESS_TOKEN_HEADER, HeaderValue::from_static("Bearer def456"));
        assert_eq!(bearer_token(&headers), Some("def456"));
    }

    #[test]
    fn test_bearer_token_missing_or_blank() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer   "));
        assert_eq!(bearer_token(&headers), None);
    }
}
