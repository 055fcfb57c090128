// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    config::Network,
    models::{
        ExecuteSponsoredTransactionRequest, ExecuteSponsoredTransactionResponse,
        GatewayHealthResponse, ProxyHealthResponse, SponsorTransactionRequest,
        SponsorTransactionResponse, UploadForm, UploadResponse,
    },
    state::{GatewayState, ProxyState},
};

pub mod health;
pub mod sponsor;
pub mod storage;

/// Room for multipart boundaries, part headers and the `epochs` field on top
/// of the file size limit. The file itself is checked in `upload_file`.
pub const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Routes of the `sponsor-gateway` binary.
pub fn gateway_router(state: GatewayState) -> Router {
    let routes = Router::new()
        .route("/api/sponsor-transaction", post(sponsor::sponsor_transaction))
        .route(
            "/api/execute-sponsored-transaction",
            post(sponsor::execute_sponsored_transaction),
        )
        .route("/health", get(health::gateway_health))
        .with_state(state);

    with_common_layers(
        routes.merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", GatewayApiDoc::openapi())),
    )
}

/// Routes of the `storage-proxy` binary.
pub fn proxy_router(state: ProxyState) -> Router {
    let body_limit = state
        .config
        .max_upload_bytes
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    let routes = Router::new()
        .route(
            "/upload",
            post(storage::upload_file).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/read/{blob_id}", get(storage::read_blob))
        .route("/health", get(health::proxy_health))
        .with_state(state);

    with_common_layers(
        routes.merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ProxyApiDoc::openapi())),
    )
}

fn with_common_layers(router: Router) -> Router {
    router
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        sponsor::sponsor_transaction,
        sponsor::execute_sponsored_transaction,
        health::gateway_health
    ),
    components(
        schemas(
            Network,
            SponsorTransactionRequest,
            SponsorTransactionResponse,
            ExecuteSponsoredTransactionRequest,
            ExecuteSponsoredTransactionResponse,
            GatewayHealthResponse
        )
    ),
    tags(
        (name = "Sponsorship", description = "Gas-sponsored transactions via Enoki"),
        (name = "Health", description = "Liveness")
    )
)]
struct GatewayApiDoc;

#[derive(OpenApi)]
#[openapi(
    paths(storage::upload_file, storage::read_blob, health::proxy_health),
    components(schemas(UploadForm, UploadResponse, ProxyHealthResponse)),
    tags(
        (name = "Storage", description = "Walrus blob upload and retrieval"),
        (name = "Health", description = "Walrus CLI availability")
    )
)]
struct ProxyApiDoc;
