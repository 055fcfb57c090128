// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::StatusCode, Json};
use tracing::warn;

use crate::{
    models::{GatewayHealthResponse, ProxyHealthResponse},
    state::ProxyState,
};

/// Gateway liveness probe.
///
/// Always returns 200 if the process is running; the provider is not contacted.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Gateway is alive", body = GatewayHealthResponse)
    )
)]
pub async fn gateway_health() -> Json<GatewayHealthResponse> {
    Json(GatewayHealthResponse {
        success: true,
        status: "healthy".to_string(),
        enoki: "ready".to_string(),
    })
}

/// Proxy health check.
///
/// Runs `walrus --version`; returns 503 if the CLI cannot be run.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Walrus CLI available", body = ProxyHealthResponse),
        (status = 503, description = "Walrus CLI not available", body = ProxyHealthResponse)
    )
)]
pub async fn proxy_health(
    State(state): State<ProxyState>,
) -> (StatusCode, Json<ProxyHealthResponse>) {
    match state.store.version().await {
        Ok(version) => (
            StatusCode::OK,
            Json(ProxyHealthResponse {
                success: true,
                status: "healthy".to_string(),
                walrus_cli: Some("available".to_string()),
                version: Some(version).filter(|v| !v.is_empty()),
                error: None,
            }),
        ),
        Err(e) => {
            warn!(error = %e, "Walrus CLI health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ProxyHealthResponse {
                    success: false,
                    status: "unhealthy".to_string(),
                    walrus_cli: None,
                    version: None,
                    error: Some("Walrus CLI not available".to_string()),
                }),
            )
        }
    }
}
