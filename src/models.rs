// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies for both servers. Field names are camelCase on
//! the wire to match the browser client. All types derive `Serialize`,
//! `Deserialize`, and `ToSchema` so the gateway client in [`crate::client`]
//! can reuse them and the OpenAPI documents stay in sync.
//!
//! ## Model Categories
//!
//! - **Sponsorship**: sponsor / execute round trips
//! - **Storage**: upload results and the multipart form
//! - **Health**: liveness responses

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::config::Network;

// =============================================================================
// Sponsorship Models
// =============================================================================

/// Request to sponsor a transaction.
///
/// `transactionKindBytes` and `sender` are required; they are optional here so
/// that a missing field produces the gateway's own 400 body instead of a
/// deserialization rejection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SponsorTransactionRequest {
    /// Base64-encoded transaction-kind bytes (`onlyTransactionKind` build).
    pub transaction_kind_bytes: Option<String>,
    /// Sui address of the transaction sender.
    pub sender: Option<String>,
    /// Move call targets the sponsor may pay for (default: none).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_move_call_targets: Option<Vec<String>>,
    /// Addresses the transaction may transfer to (default: none).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_addresses: Option<Vec<String>>,
    /// Network to sponsor on (default: the gateway's configured network).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<Network>,
}

/// Sponsored transaction ready for the user's signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SponsorTransactionResponse {
    pub success: bool,
    /// Base64 transaction bytes to sign.
    pub bytes: String,
    /// Correlation digest to pass to the execute endpoint.
    pub digest: String,
}

/// Request to execute a previously sponsored transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ExecuteSponsoredTransactionRequest {
    /// Digest returned by the sponsor endpoint.
    pub digest: Option<String>,
    /// User signature over the sponsored bytes (base64, serialized Sui signature).
    pub signature: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteSponsoredTransactionResponse {
    pub success: bool,
    /// Digest of the finalized on-chain transaction.
    pub tx_digest: String,
    /// Transaction effects as reported by the provider, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub effects: Option<Value>,
}

// =============================================================================
// Storage Models
// =============================================================================

/// Multipart form accepted by `POST /upload`.
#[derive(Debug, ToSchema)]
pub struct UploadForm {
    /// File contents.
    #[schema(value_type = String)]
    pub file: Vec<u8>,
    /// Storage epochs (default 5).
    pub epochs: Option<u32>,
}

/// Result of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    /// Blob id (same value as `blobId`).
    pub file_id: String,
    pub blob_id: String,
    /// Public retrieval URL for the blob.
    pub url: String,
    /// Uploaded size in bytes.
    pub size: u64,
    /// RFC 3339 upload time.
    pub uploaded_at: String,
    pub original_name: String,
    pub content_type: String,
}

// =============================================================================
// Health Models
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct GatewayHealthResponse {
    pub success: bool,
    pub status: String,
    pub enoki: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProxyHealthResponse {
    pub success: bool,
    /// `healthy` or `unhealthy`.
    pub status: String,
    #[serde(rename = "walrusCLI", skip_serializing_if = "Option::is_none")]
    pub walrus_cli: Option<String>,
    /// CLI version string when available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
