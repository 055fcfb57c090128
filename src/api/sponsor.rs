// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Sponsored transaction endpoints.
//!
//! Two stateless relays to the sponsorship provider. Nothing is kept between
//! the sponsor and execute calls: if either fails the client starts over from
//! sponsor.

use axum::{body::Bytes, extract::State, Json};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{info, warn};

use crate::{
    error::ApiError,
    models::{
        ExecuteSponsoredTransactionRequest, ExecuteSponsoredTransactionResponse,
        SponsorTransactionRequest, SponsorTransactionResponse,
    },
    providers::SponsorParams,
    state::GatewayState,
};

pub const MISSING_SPONSOR_FIELDS: &str = "Missing required fields: transactionKindBytes, sender";
pub const MISSING_EXECUTE_FIELDS: &str = "Missing required fields: digest, signature";
const SPONSOR_FALLBACK: &str = "Failed to sponsor transaction";
const EXECUTE_FALLBACK: &str = "Failed to execute transaction";

/// Empty strings count as missing.
fn required(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Decode a request body, checking `fields` before anything else.
///
/// The body is read whatever its content type. Anything that is not a JSON
/// object, or lacks one of `fields` as a non-empty string, gets `missing`.
/// Only then are the remaining fields decoded strictly.
fn parse_request<T: DeserializeOwned>(
    body: &Bytes,
    fields: &[&str],
    missing: &'static str,
) -> Result<T, ApiError> {
    let value: Value = serde_json::from_slice(body).unwrap_or_default();
    let present = |field: &&str| {
        value
            .get(*field)
            .and_then(Value::as_str)
            .is_some_and(|v| !v.is_empty())
    };
    if !fields.iter().all(present) {
        return Err(ApiError::bad_request(missing));
    }

    serde_json::from_value(value)
        .map_err(|e| ApiError::bad_request(format!("Invalid request body: {e}")))
}

#[utoipa::path(
    post,
    path = "/api/sponsor-transaction",
    request_body = SponsorTransactionRequest,
    tag = "Sponsorship",
    responses(
        (status = 200, description = "Transaction sponsored", body = SponsorTransactionResponse),
        (status = 400, description = "Missing transactionKindBytes or sender"),
        (status = 500, description = "Provider failure")
    )
)]
pub async fn sponsor_transaction(
    State(state): State<GatewayState>,
    body: Bytes,
) -> Result<Json<SponsorTransactionResponse>, ApiError> {
    let request: SponsorTransactionRequest = parse_request(
        &body,
        &["transactionKindBytes", "sender"],
        MISSING_SPONSOR_FIELDS,
    )?;

    let (Some(transaction_kind_bytes), Some(sender)) = (
        required(request.transaction_kind_bytes),
        required(request.sender),
    ) else {
        return Err(ApiError::bad_request(MISSING_SPONSOR_FIELDS));
    };

    let params = SponsorParams {
        network: request.network.unwrap_or(state.default_network),
        transaction_kind_bytes,
        sender,
        allowed_move_call_targets: request.allowed_move_call_targets.unwrap_or_default(),
        allowed_addresses: request.allowed_addresses.unwrap_or_default(),
    };

    info!(
        sender = %params.sender,
        network = %params.network,
        allowed_targets = ?params.allowed_move_call_targets,
        allowed_addresses = ?params.allowed_addresses,
        "Sponsoring transaction"
    );

    let sponsored = state
        .provider
        .create_sponsored_transaction(params)
        .await
        .map_err(|e| {
            warn!(error = %e, "Sponsorship failed");
            ApiError::provider(&e, SPONSOR_FALLBACK)
        })?;

    info!(digest = %sponsored.digest, "Transaction sponsored");

    Ok(Json(SponsorTransactionResponse {
        success: true,
        bytes: sponsored.bytes,
        digest: sponsored.digest,
    }))
}

#[utoipa::path(
    post,
    path = "/api/execute-sponsored-transaction",
    request_body = ExecuteSponsoredTransactionRequest,
    tag = "Sponsorship",
    responses(
        (status = 200, description = "Transaction executed", body = ExecuteSponsoredTransactionResponse),
        (status = 400, description = "Missing digest or signature"),
        (status = 500, description = "Provider failure")
    )
)]
pub async fn execute_sponsored_transaction(
    State(state): State<GatewayState>,
    body: Bytes,
) -> Result<Json<ExecuteSponsoredTransactionResponse>, ApiError> {
    let request: ExecuteSponsoredTransactionRequest =
        parse_request(&body, &["digest", "signature"], MISSING_EXECUTE_FIELDS)?;

    let (Some(digest), Some(signature)) = (required(request.digest), required(request.signature))
    else {
        return Err(ApiError::bad_request(MISSING_EXECUTE_FIELDS));
    };

    info!(digest = %digest, "Executing sponsored transaction");

    let executed = state
        .provider
        .execute_sponsored_transaction(&digest, &signature)
        .await
        .map_err(|e| {
            warn!(digest = %digest, error = %e, "Sponsored execution failed");
            ApiError::provider(&e, EXECUTE_FALLBACK)
        })?;

    info!(tx_digest = %executed.digest, "Sponsored transaction executed");

    Ok(Json(ExecuteSponsoredTransactionResponse {
        success: true,
        tx_digest: executed.digest,
        effects: executed.effects,
    }))
}
