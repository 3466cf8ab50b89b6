// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API server implementation.

use std::future::Future;

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::handlers;
use crate::middleware::{AuthLayer, RequireLayer};
use crate::state::AppState;

// =============================================================================
// ApiServer
// =============================================================================

/// The API server.
///
/// This is the main entry point for creating and running the HTTP server.
pub struct ApiServer {
    state: AppState,
}

impl ApiServer {
    /// Creates a new API server with the given state.
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Creates the router with all routes and middleware.
    pub fn router(&self) -> Router {
        let auth = AuthLayer::new(self.state.jwt.clone()).with_default_public_paths();

        let middleware_stack = ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::new(self.state.config.request_timeout))
            .layer(auth);

        let elevated_role = self.state.config.auth.elevated_role.clone();

        Router::new()
            // Health endpoint (public)
            .route("/health", get(handlers::health))
            // Auth endpoints
            .route("/api/v1/auth/login", post(handlers::login))
            .route("/api/v1/auth/refresh", post(handlers::refresh_token))
            .route("/api/v1/auth/logout", post(handlers::logout))
            .route("/api/v1/auth/me", get(handlers::current_user))
            // Operator endpoints (elevated role only)
            .route(
                "/api/v1/system/stats",
                get(handlers::system_stats).layer(RequireLayer::role(elevated_role)),
            )
            .layer(middleware_stack)
            .with_state(self.state.clone())
    }

    /// Runs the server until the shutdown future resolves.
    pub async fn run<F>(self, shutdown: F) -> ApiResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.state.config.socket_addr();
        let router = self.router();

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ApiError::internal(format!("Failed to bind {}: {}", addr, e)))?;

        info!(%addr, "API server listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| ApiError::internal(format!("Server error: {}", e)))?;

        info!("API server stopped");
        Ok(())
    }

    /// Returns the state.
    pub fn state(&self) -> &AppState {
        &self.state
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::JwtConfig;
    use crate::config::ApiConfig;
    use std::sync::Arc;
    use warden_store::MemoryStore;

    #[test]
    fn test_router_builds() {
        let state = AppState::builder()
            .config(ApiConfig::default().with_jwt(JwtConfig::new("long-enough-secret-for-testing!!")))
            .store(Arc::new(MemoryStore::new()))
            .build()
            .unwrap();

        let server = ApiServer::new(state);
        let _router = server.router();
    }
}
