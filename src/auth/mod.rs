//! # Authentication and Authorization
//!
//! Bearer-token authentication for protected endpoints plus the building
//! blocks it relies on: roles, password hashing, session tokens and the
//! tenancy/ownership authorizer.

pub mod authorize;
pub mod password;
pub mod role;
pub mod token;

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};

pub use authorize::{Action, Caller, Decision, DenyReason, Scope, Target, authorize, scope_for};
pub use role::Role;
pub use token::{SessionClaims, TokenError, TokenService};

use crate::error::{ApiError, unauthorized};

/// Why a request failed authentication. Only logged; every variant produces
/// the same outward 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GateRejection {
    MissingHeader,
    UnreadableHeader,
    NotBearer,
    EmptyToken,
    Token(TokenError),
}

/// Authentication middleware: verifies the bearer token and attaches the
/// caller's identity to the request.
pub async fn auth_middleware(
    State(tokens): State<Arc<TokenService>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = match authenticate(&tokens, request.headers()) {
        Ok(claims) => claims,
        Err(reason) => {
            tracing::debug!(?reason, path = %request.uri().path(), "Rejected unauthenticated request");
            return Err(unauthorized(None));
        }
    };

    let caller = claims.caller();
    tracing::debug!(
        user_id = caller.user_id,
        tenant_id = caller.tenant_id,
        role = %caller.role,
        "Authenticated request"
    );

    request.extensions_mut().insert(caller);
    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}

fn authenticate(tokens: &TokenService, headers: &HeaderMap) -> Result<SessionClaims, GateRejection> {
    let token = extract_bearer_token(headers)?;
    tokens.verify(token).map_err(GateRejection::Token)
}

fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, GateRejection> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or(GateRejection::MissingHeader)?
        .to_str()
        .map_err(|_| GateRejection::UnreadableHeader)?;

    let (scheme, token) = header.split_once(' ').ok_or(GateRejection::NotBearer)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(GateRejection::NotBearer);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(GateRejection::EmptyToken);
    }
    Ok(token)
}

impl<S> FromRequestParts<S> for Caller
where
    S: Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Caller>()
            .copied()
            .ok_or_else(|| unauthorized(None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{Request, StatusCode},
        routing::get,
    };
    use chrono::{Duration, Utc};
    use tower::ServiceExt;

    fn token_service() -> Arc<TokenService> {
        Arc::new(TokenService::new("gate-test-secret-0123456789abcdef", Duration::hours(24)).unwrap())
    }

    fn caller() -> Caller {
        Caller {
            user_id: 5,
            role: Role::User,
            tenant_id: 2,
        }
    }

    async fn whoami(caller: Caller) -> String {
        format!("{}:{}:{}", caller.user_id, caller.tenant_id, caller.role)
    }

    async fn run_middleware(tokens: Arc<TokenService>, request: Request<Body>) -> Response {
        Router::new()
            .route("/test", get(whoami))
            .layer(axum::middleware::from_fn_with_state(tokens, auth_middleware))
            .oneshot(request)
            .await
            .unwrap()
    }

    async fn body_of(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let mut value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        // Trace ids differ per request.
        value.as_object_mut().unwrap().remove("trace_id");
        value
    }

    fn request_with(auth: Option<&str>) -> Request<Body> {
        let builder = Request::builder().uri("/test");
        let builder = match auth {
            Some(value) => builder.header("Authorization", value),
            None => builder,
        };
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn valid_token_attaches_caller() {
        let tokens = token_service();
        let issued = tokens.issue(&caller()).unwrap();

        let response = run_middleware(
            Arc::clone(&tokens),
            request_with(Some(&format!("Bearer {}", issued.token))),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"5:2:user");
    }

    #[tokio::test]
    async fn every_failure_yields_identical_401() {
        let tokens = token_service();
        let expired = tokens
            .issue_at(&caller(), Utc::now() - Duration::hours(48))
            .unwrap()
            .token;
        let foreign = TokenService::new("some-other-secret", Duration::hours(1))
            .unwrap()
            .issue(&caller())
            .unwrap()
            .token;

        let cases = [
            None,
            Some("Basic dGVzdDoxMjM=".to_string()),
            Some("Bearer".to_string()),
            Some("Bearer    ".to_string()),
            Some("Bearer not-a-jwt".to_string()),
            Some(format!("Bearer {expired}")),
            Some(format!("Bearer {foreign}")),
        ];

        let mut bodies = Vec::new();
        for auth in cases {
            let response = run_middleware(Arc::clone(&tokens), request_with(auth.as_deref())).await;
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{auth:?}");
            bodies.push(body_of(response).await);
        }

        assert!(bodies.windows(2).all(|pair| pair[0] == pair[1]));
        assert_eq!(bodies[0]["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn caller_extractor_without_gate_is_401() {
        let response = Router::new()
            .route("/test", get(whoami))
            .oneshot(request_with(None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn bearer_scheme_is_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, "bearer abc.def.ghi".parse().unwrap());
        assert_eq!(extract_bearer_token(&headers), Ok("abc.def.ghi"));
    }
}
