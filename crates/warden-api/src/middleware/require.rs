// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Route guard middleware.
//!
//! Enforces permission-check facade predicates on routes. An anonymous
//! session yields 401; an authenticated session that fails the predicate
//! yields 403 with the missing permission names in the body.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    http::Request,
    response::{IntoResponse, Response},
};
use tower::{Layer, Service};

use crate::auth::Session;
use crate::error::ApiError;
use crate::facade;

// =============================================================================
// Requirement
// =============================================================================

/// What a guarded route requires of the session.
#[derive(Debug, Clone)]
enum Requirement {
    /// All of the named permissions.
    AllPermissions(Vec<String>),
    /// At least one of the named permissions.
    AnyPermission(Vec<String>),
    /// The named role.
    Role(String),
    /// At least one of the named roles.
    AnyRole(Vec<String>),
    /// Access to the application at the given path.
    Application(String),
}

// =============================================================================
// RequireLayer
// =============================================================================

/// Layer enforcing a facade predicate on a route.
#[derive(Clone)]
pub struct RequireLayer {
    requirement: Arc<Requirement>,
}

impl RequireLayer {
    /// Requires all of the named permissions.
    pub fn permissions(names: Vec<String>) -> Self {
        Self {
            requirement: Arc::new(Requirement::AllPermissions(names)),
        }
    }

    /// Requires at least one of the named permissions.
    pub fn any_permission(names: Vec<String>) -> Self {
        Self {
            requirement: Arc::new(Requirement::AnyPermission(names)),
        }
    }

    /// Requires the named role.
    pub fn role(name: impl Into<String>) -> Self {
        Self {
            requirement: Arc::new(Requirement::Role(name.into())),
        }
    }

    /// Requires at least one of the named roles.
    pub fn any_role(names: Vec<String>) -> Self {
        Self {
            requirement: Arc::new(Requirement::AnyRole(names)),
        }
    }

    /// Requires access to the application at the given path.
    pub fn application(path: impl Into<String>) -> Self {
        Self {
            requirement: Arc::new(Requirement::Application(path.into())),
        }
    }
}

impl<S> Layer<S> for RequireLayer {
    type Service = RequireMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequireMiddleware {
            inner,
            requirement: self.requirement.clone(),
        }
    }
}

// =============================================================================
// RequireMiddleware
// =============================================================================

/// Middleware enforcing a [`RequireLayer`] requirement.
#[derive(Clone)]
pub struct RequireMiddleware<S> {
    inner: S,
    requirement: Arc<Requirement>,
}

fn evaluate(requirement: &Requirement, session: &Session) -> Result<(), ApiError> {
    let claims = session.access();

    match requirement {
        Requirement::AllPermissions(names) => {
            let required: Vec<&str> = names.iter().map(String::as_str).collect();
            let check = facade::has_all_permissions(claims, &required);
            if check.allowed {
                Ok(())
            } else {
                Err(ApiError::forbidden_missing(
                    "Insufficient permissions",
                    check.missing,
                ))
            }
        }
        Requirement::AnyPermission(names) => {
            let required: Vec<&str> = names.iter().map(String::as_str).collect();
            let check = facade::has_any_permission(claims, &required);
            if check.allowed {
                Ok(())
            } else {
                Err(ApiError::forbidden_missing(
                    "Insufficient permissions",
                    check.missing,
                ))
            }
        }
        Requirement::Role(name) => {
            if facade::has_role(claims, name) {
                Ok(())
            } else {
                Err(ApiError::forbidden("Insufficient role"))
            }
        }
        Requirement::AnyRole(names) => {
            let required: Vec<&str> = names.iter().map(String::as_str).collect();
            if facade::has_any_role(claims, &required) {
                Ok(())
            } else {
                Err(ApiError::forbidden("Insufficient role"))
            }
        }
        Requirement::Application(path) => {
            if facade::has_application_access(claims, path) {
                Ok(())
            } else {
                Err(ApiError::forbidden("No access to application"))
            }
        }
    }
}

impl<S> Service<Request<Body>> for RequireMiddleware<S>
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

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let requirement = self.requirement.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let Some(session) = req.extensions().get::<Session>().cloned() else {
                tracing::warn!("no session on guarded route, denying");
                return Ok(
                    ApiError::unauthorized("Authentication required").into_response()
                );
            };

            if session.is_anonymous() {
                return Ok(
                    ApiError::unauthorized("Authentication required").into_response()
                );
            }

            match evaluate(&requirement, &session) {
                Ok(()) => inner.call(req).await,
                Err(denied) => {
                    tracing::warn!(
                        user_id = %session.user_id,
                        requirement = ?requirement,
                        "access denied"
                    );
                    Ok(denied.into_response())
                }
            }
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::SessionClaims;
    use std::convert::Infallible;
    use tower::ServiceExt;

    fn mock_service() -> impl Service<
        Request<Body>,
        Response = Response,
        Error = Infallible,
        Future = impl Future<Output = Result<Response, Infallible>> + Send,
    > + Clone
           + Send {
        tower::service_fn(|_req| async { Ok::<_, Infallible>(Response::new(Body::empty())) })
    }

    fn session_with(permissions: &[&str], roles: &[&str], paths: &[&str]) -> Session {
        let mut session = Session::anonymous();
        session.user_id = "u1".to_string();
        session.claims = SessionClaims {
            role_names: roles.iter().map(|s| s.to_string()).collect(),
            permission_names: permissions.iter().map(|s| s.to_string()).collect(),
            application_paths: paths.iter().map(|s| s.to_string()).collect(),
            elevated: false,
            role: None,
        };
        session
    }

    fn request_with(session: Session) -> Request<Body> {
        let mut req = Request::builder().uri("/test").body(Body::empty()).unwrap();
        req.extensions_mut().insert(session);
        req
    }

    #[tokio::test]
    async fn test_permission_granted() {
        let layer = RequireLayer::permissions(vec!["users:read".to_string()]);
        let mut service = layer.layer(mock_service());

        let req = request_with(session_with(&["users:read"], &[], &[]));
        let response = service.ready().await.unwrap().call(req).await.unwrap();

        assert_eq!(response.status(), axum::http::StatusCode::OK);
    }

    #[tokio::test]
    async fn test_permission_denied_with_missing_list() {
        let layer =
            RequireLayer::permissions(vec!["users:read".to_string(), "users:delete".to_string()]);
        let mut service = layer.layer(mock_service());

        let req = request_with(session_with(&["users:read"], &[], &[]));
        let response = service.ready().await.unwrap().call(req).await.unwrap();

        assert_eq!(response.status(), axum::http::StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_anonymous_session_unauthorized() {
        let layer = RequireLayer::permissions(vec!["users:read".to_string()]);
        let mut service = layer.layer(mock_service());

        let req = request_with(Session::anonymous());
        let response = service.ready().await.unwrap().call(req).await.unwrap();

        assert_eq!(response.status(), axum::http::StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_missing_session_unauthorized() {
        let layer = RequireLayer::role("admin");
        let mut service = layer.layer(mock_service());

        let req = Request::builder().uri("/test").body(Body::empty()).unwrap();
        let response = service.ready().await.unwrap().call(req).await.unwrap();

        assert_eq!(response.status(), axum::http::StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_any_role() {
        let layer = RequireLayer::any_role(vec!["admin".to_string(), "auditor".to_string()]);
        let mut service = layer.layer(mock_service());

        let req = request_with(session_with(&[], &["auditor"], &[]));
        let response = service.ready().await.unwrap().call(req).await.unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::OK);

        let req = request_with(session_with(&[], &["viewer"], &[]));
        let response = service.ready().await.unwrap().call(req).await.unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_application_access() {
        let layer = RequireLayer::application("/billing");
        let mut service = layer.layer(mock_service());

        let req = request_with(session_with(&[], &[], &["/billing"]));
        let response = service.ready().await.unwrap().call(req).await.unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::OK);

        let req = request_with(session_with(&[], &[], &["/cms"]));
        let response = service.ready().await.unwrap().call(req).await.unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::FORBIDDEN);
    }
}
