//! Authorization guards: higher-order wrappers that validate a bearer
//! credential and, optionally, a required permission before invoking
//! application logic.

use std::collections::HashMap;
use std::future::Future;

use actix_web::http::header;
use actix_web::HttpRequest;
use log::warn;

use crate::error::{SdkError, SdkResult};
use crate::gateway::IdentityProvider;
use crate::types::UserRecord;

/// A source the `Authorization` header can be read from.
///
/// Implemented for the request shapes a collaborating web framework
/// typically hands over: a full request object, its header map, and a plain
/// string map.
pub trait BearerSource {
    fn authorization_header(&self) -> Option<&str>;
}

impl BearerSource for HttpRequest {
    fn authorization_header(&self) -> Option<&str> {
        self.headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
    }
}

impl BearerSource for header::HeaderMap {
    fn authorization_header(&self) -> Option<&str> {
        self.get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
    }
}

impl BearerSource for HashMap<String, String> {
    fn authorization_header(&self) -> Option<&str> {
        self.get("Authorization").map(String::as_str)
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header.
///
/// Returns `None` when the header is missing or lacks the exact
/// case-sensitive `"Bearer "` prefix; extraction itself never fails.
pub fn bearer_token<S>(source: &S) -> Option<&str>
where
    S: BearerSource + ?Sized,
{
    source
        .authorization_header()
        .and_then(|value| value.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
}

/// Validate the bearer credential, then run `handler` with the
/// authenticated user. Provider errors propagate untouched.
pub async fn with_auth<P, S, F, Fut, T>(provider: &P, source: &S, handler: F) -> SdkResult<T>
where
    P: IdentityProvider + ?Sized,
    S: BearerSource + ?Sized,
    F: FnOnce(UserRecord) -> Fut,
    Fut: Future<Output = SdkResult<T>>,
{
    let token = bearer_token(source)
        .ok_or_else(|| SdkError::Unauthorized("missing bearer token".to_string()))?;

    let user = provider.validate_credential(token).await?;
    handler(user).await
}

/// As [`with_auth`], additionally requiring `scope_id` for `application`
/// before the handler runs.
pub async fn with_permission<P, S, F, Fut, T>(
    provider: &P,
    source: &S,
    application: &str,
    scope_id: &str,
    handler: F,
) -> SdkResult<T>
where
    P: IdentityProvider + ?Sized,
    S: BearerSource + ?Sized,
    F: FnOnce(UserRecord) -> Fut,
    Fut: Future<Output = SdkResult<T>>,
{
    let token = bearer_token(source)
        .ok_or_else(|| SdkError::Unauthorized("missing bearer token".to_string()))?;

    let user = provider.validate_credential(token).await?;

    let allowed = provider
        .check_permission(&user.eth_address, application, scope_id, token)
        .await?;
    if !allowed {
        warn!(
            "user {} denied access: permission '{}' required",
            user.eth_address, scope_id
        );
        return Err(SdkError::Forbidden(format!(
            "permission '{}' required",
            scope_id
        )));
    }

    handler(user).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway_mock::GatewayMock;
    use actix_web::test::TestRequest;

    fn header_map(value: &str) -> HashMap<String, String> {
        HashMap::from([("Authorization".to_string(), value.to_string())])
    }

    #[test]
    fn test_bearer_token_from_plain_map() {
        assert_eq!(bearer_token(&header_map("Bearer abc123")), Some("abc123"));
    }

    #[test]
    fn test_bearer_token_missing_or_malformed() {
        let empty: HashMap<String, String> = HashMap::new();
        assert_eq!(bearer_token(&empty), None);

        // Prefix match is case-sensitive
        assert_eq!(bearer_token(&header_map("bearer abc123")), None);
        assert_eq!(bearer_token(&header_map("Token abc123")), None);
        assert_eq!(bearer_token(&header_map("Bearer ")), None);
    }

    #[test]
    fn test_bearer_token_from_http_request() {
        let req = TestRequest::get()
            .insert_header(("Authorization", "Bearer abc123"))
            .to_http_request();
        assert_eq!(bearer_token(&req), Some("abc123"));
        assert_eq!(bearer_token(req.headers()), Some("abc123"));
    }

    #[tokio::test]
    async fn test_with_auth_missing_token() {
        let mock = GatewayMock::new();
        let headers: HashMap<String, String> = HashMap::new();

        let result = with_auth(&mock, &headers, |user| async move {
            Ok(user.character_name)
        })
        .await;

        assert!(matches!(result, Err(SdkError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_with_auth_invokes_handler_with_user() {
        let mock = GatewayMock::new().with_user("abc123", UserRecord::new("0xabc", "Pilot"));

        let name = with_auth(&mock, &header_map("Bearer abc123"), |user| async move {
            Ok(user.character_name)
        })
        .await
        .unwrap();

        assert_eq!(name, "Pilot");
    }

    #[tokio::test]
    async fn test_with_auth_propagates_provider_error() {
        let mock = GatewayMock::new();

        let result = with_auth(&mock, &header_map("Bearer unknown"), |_user| async move {
            Ok(())
        })
        .await;

        assert!(matches!(result, Err(SdkError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_with_permission_denies_without_grant() {
        let mock = GatewayMock::new().with_user("abc123", UserRecord::new("0xabc", "Pilot"));

        let result = with_permission(
            &mock,
            &header_map("Bearer abc123"),
            "acme",
            "tribes:read",
            |_user| async move { Ok(()) },
        )
        .await;

        match result {
            Err(SdkError::Forbidden(message)) => {
                assert_eq!(message, "permission 'tribes:read' required")
            }
            other => panic!("expected Forbidden, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_with_permission_allows_granted_scope() {
        let mock = GatewayMock::new()
            .with_user("abc123", UserRecord::new("0xabc", "Pilot"))
            .with_grant("0xabc", "acme", "tribes:read");

        let address = with_permission(
            &mock,
            &header_map("Bearer abc123"),
            "acme",
            "tribes:read",
            |user| async move { Ok(user.eth_address) },
        )
        .await
        .unwrap();

        assert_eq!(address, "0xabc");
    }
}
