// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! JWT authentication middleware.

use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    http::{header, Request},
    response::{IntoResponse, Response},
};
use tower::{Layer, Service};

use crate::auth::{JwtManager, Session};
use crate::error::ApiError;

// =============================================================================
// AuthLayer
// =============================================================================

/// Layer for JWT authentication.
///
/// Extracts the bearer token from the Authorization header, validates it,
/// and attaches a [`Session`] to the request. Public paths pass through
/// with an anonymous session instead of a 401, which is what lets the
/// permission-check facade fail closed on them.
#[derive(Clone)]
pub struct AuthLayer {
    jwt: Arc<JwtManager>,
    public_paths: Arc<HashSet<String>>,
}

impl AuthLayer {
    /// Creates a new auth layer.
    pub fn new(jwt: Arc<JwtManager>) -> Self {
        Self {
            jwt,
            public_paths: Arc::new(HashSet::new()),
        }
    }

    /// Adds public paths that don't require authentication.
    pub fn with_public_paths(mut self, paths: Vec<String>) -> Self {
        self.public_paths = Arc::new(paths.into_iter().collect());
        self
    }

    /// Creates with default public paths.
    pub fn with_default_public_paths(self) -> Self {
        self.with_public_paths(vec![
            "/health".to_string(),
            "/api/v1/auth/login".to_string(),
            "/api/v1/auth/refresh".to_string(),
        ])
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            jwt: self.jwt.clone(),
            public_paths: self.public_paths.clone(),
        }
    }
}

// =============================================================================
// AuthMiddleware
// =============================================================================

/// Middleware for JWT authentication.
#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    jwt: Arc<JwtManager>,
    public_paths: Arc<HashSet<String>>,
}

/// Extracts the bearer token from the Authorization header.
fn bearer_token(req: &Request<Body>) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

impl<S> Service<Request<Body>> for AuthMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let jwt = self.jwt.clone();
        let is_public = self.public_paths.contains(req.uri().path());
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let session = match bearer_token(&req) {
                Some(token) => match jwt.validate_access_token(token) {
                    Ok(claims) => Session::from_claims(&claims),
                    Err(e) if is_public => {
                        tracing::debug!(
                            error_type = e.error_type(),
                            "invalid token on public path, continuing anonymously"
                        );
                        Session::anonymous()
                    }
                    Err(e) => {
                        tracing::debug!(error_type = e.error_type(), "token rejected");
                        return Ok(ApiError::from(e).into_response());
                    }
                },
                None if is_public => Session::anonymous(),
                None => {
                    return Ok(
                        ApiError::unauthorized("Authentication required").into_response()
                    );
                }
            };

            req.extensions_mut().insert(session);
            inner.call(req).await
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{JwtConfig, SessionClaims};
    use std::convert::Infallible;
    use tower::ServiceExt;

    fn jwt() -> Arc<JwtManager> {
        Arc::new(JwtManager::new(JwtConfig::new("test-secret-key-that-is-long-enough!!")).unwrap())
    }

    fn echo_session_service() -> impl Service<
        Request<Body>,
        Response = Response,
        Error = Infallible,
        Future = impl Future<Output = Result<Response, Infallible>> + Send,
    > + Clone
           + Send {
        tower::service_fn(|req: Request<Body>| async move {
            let session = req.extensions().get::<Session>().cloned().unwrap();
            Ok::<_, Infallible>(session.user_id.into_response())
        })
    }

    #[tokio::test]
    async fn test_valid_token_attaches_session() {
        let jwt = jwt();
        let token = jwt
            .create_access_token("u1", None, SessionClaims::empty())
            .unwrap();

        let layer = AuthLayer::new(jwt);
        let mut service = layer.layer(echo_session_service());

        let req = Request::builder()
            .uri("/protected")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();

        let response = service.ready().await.unwrap().call(req).await.unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_token_rejected_on_protected_path() {
        let layer = AuthLayer::new(jwt());
        let mut service = layer.layer(echo_session_service());

        let req = Request::builder()
            .uri("/protected")
            .body(Body::empty())
            .unwrap();

        let response = service.ready().await.unwrap().call(req).await.unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_public_path_passes_anonymously() {
        let layer = AuthLayer::new(jwt()).with_default_public_paths();
        let mut service = layer.layer(echo_session_service());

        let req = Request::builder()
            .uri("/api/v1/auth/login")
            .body(Body::empty())
            .unwrap();

        let response = service.ready().await.unwrap().call(req).await.unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::OK);
    }

    #[tokio::test]
    async fn test_garbage_token_rejected() {
        let layer = AuthLayer::new(jwt());
        let mut service = layer.layer(echo_session_service());

        let req = Request::builder()
            .uri("/protected")
            .header(header::AUTHORIZATION, "Bearer not.a.token")
            .body(Body::empty())
            .unwrap();

        let response = service.ready().await.unwrap().call(req).await.unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_refresh_token_not_accepted_for_requests() {
        let jwt = jwt();
        let token = jwt.create_refresh_token("u1").unwrap();

        let layer = AuthLayer::new(jwt);
        let mut service = layer.layer(echo_session_service());

        let req = Request::builder()
            .uri("/protected")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();

        let response = service.ready().await.unwrap().call(req).await.unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::UNAUTHORIZED);
    }
}
