// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Transaction sponsorship providers.

use async_trait::async_trait;
use serde_json::Value;

use crate::config::Network;

pub mod enoki;

pub use enoki::EnokiClient;

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Provider request failed: {0}")]
    Request(String),

    #[error("Provider returned {status}: {body}")]
    Rejected {
        status: u16,
        message: Option<String>,
        body: String,
    },

    #[error("Provider response was not recognized: {0}")]
    UnrecognizedResponse(String),
}

impl ProviderError {
    /// Human-readable message supplied by the provider itself, if any.
    pub fn provider_message(&self) -> Option<&str> {
        match self {
            ProviderError::Rejected { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

/// Everything the provider needs to sponsor a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SponsorParams {
    pub network: Network,
    /// Base64 transaction-kind bytes, forwarded verbatim.
    pub transaction_kind_bytes: String,
    pub sender: String,
    pub allowed_move_call_targets: Vec<String>,
    pub allowed_addresses: Vec<String>,
}

/// Sponsored transaction awaiting the user's signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SponsoredTransaction {
    /// Base64 transaction bytes for the user to sign.
    pub bytes: String,
    /// Correlates the later execute call with this sponsorship.
    pub digest: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExecutedTransaction {
    pub digest: String,
    pub effects: Option<Value>,
}

/// A service that pays gas on behalf of the sender.
///
/// Both calls are single attempts; failures are reported to the caller as-is.
#[async_trait]
pub trait SponsorProvider: Send + Sync {
    async fn create_sponsored_transaction(
        &self,
        params: SponsorParams,
    ) -> Result<SponsoredTransaction, ProviderError>;

    async fn execute_sponsored_transaction(
        &self,
        digest: &str,
        signature: &str,
    ) -> Result<ExecutedTransaction, ProviderError>;
}
