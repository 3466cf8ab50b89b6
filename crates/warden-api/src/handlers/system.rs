// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! System handlers.

use axum::{extract::State, response::IntoResponse, Json};
use serde::Serialize;

use warden_core::bus::BusStats;
use warden_core::cache::CacheStats;

use crate::error::ApiResult;
use crate::state::AppState;

// =============================================================================
// Health
// =============================================================================

/// GET /health
///
/// Liveness probe.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": crate::VERSION,
    }))
}

// =============================================================================
// Stats
// =============================================================================

/// System statistics response.
#[derive(Debug, Serialize)]
pub struct SystemStatsResponse {
    /// Resolution cache statistics.
    pub cache: CacheStats,
    /// Event bus statistics.
    pub bus: BusStats,
}

/// GET /api/v1/system/stats
///
/// Operator view of cache and bus health. Guarded by the elevated role.
pub async fn system_stats(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    Ok(Json(SystemStatsResponse {
        cache: state.cache().stats(),
        bus: state.bus().stats(),
    }))
}
