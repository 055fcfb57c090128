// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Sponsorship Gateway Client
//!
//! Drives the two-phase sponsored transaction flow from the caller's side:
//!
//! 1. build transaction-kind bytes ([`TransactionKindBuilder`]),
//! 2. `POST /api/sponsor-transaction`,
//! 3. have the user sign the sponsored bytes ([`TransactionSigner`]),
//! 4. `POST /api/execute-sponsored-transaction`,
//! 5. return the final transaction digest.
//!
//! The flow is not atomic. A failure at any step aborts it; the caller must
//! start again from step 1, since the digest from step 2 cannot be resumed.
//! Nothing here retries on its own; wrap calls in [`retry_with_backoff`] when
//! a retry policy is wanted.

use std::{future::Future, time::Duration};

use async_trait::async_trait;
use base64ct::{Base64, Encoding};
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Deserialize};
use tracing::{info, warn};

use crate::{
    config::Network,
    models::{
        ExecuteSponsoredTransactionRequest, ExecuteSponsoredTransactionResponse,
        SponsorTransactionRequest, SponsorTransactionResponse,
    },
};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Failed to build transaction: {0}")]
    Build(String),

    #[error("Gateway request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Sponsorship(String),

    #[error("Sponsored bytes are not valid base64: {0}")]
    Decode(String),

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("{0}")]
    Execution(String),
}

/// Produces BCS transaction-kind bytes (no gas data) for a network.
#[async_trait]
pub trait TransactionKindBuilder: Send + Sync {
    async fn build_kind(&self, network: Network) -> Result<Vec<u8>, ClientError>;
}

/// Transaction-kind bytes built ahead of time.
#[derive(Debug, Clone)]
pub struct PrebuiltKind(pub Vec<u8>);

#[async_trait]
impl TransactionKindBuilder for PrebuiltKind {
    async fn build_kind(&self, _network: Network) -> Result<Vec<u8>, ClientError> {
        Ok(self.0.clone())
    }
}

/// Signs sponsored transaction bytes on the user's behalf (usually a wallet
/// prompt). Returns the serialized signature.
#[async_trait]
pub trait TransactionSigner: Send + Sync {
    async fn sign(&self, bytes: &[u8]) -> Result<String, ClientError>;
}

#[derive(Deserialize)]
struct ErrorMessage {
    message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SponsorClient {
    base_url: String,
    network: Network,
    http: Client,
}

impl SponsorClient {
    pub fn new(base_url: impl Into<String>, network: Network) -> Result<Self, ClientError> {
        let http = Client::builder().timeout(DEFAULT_TIMEOUT).build()?;
        Ok(Self {
            base_url: base_url.into(),
            network,
            http,
        })
    }

    pub fn network(&self) -> Network {
        self.network
    }

    /// Ask the gateway to sponsor `kind_bytes` for `sender`.
    pub async fn sponsor(
        &self,
        kind_bytes: &[u8],
        sender: &str,
        allowed_move_call_targets: &[String],
        allowed_addresses: &[String],
    ) -> Result<SponsorTransactionResponse, ClientError> {
        let request = SponsorTransactionRequest {
            transaction_kind_bytes: Some(Base64::encode_string(kind_bytes)),
            sender: Some(sender.to_string()),
            allowed_move_call_targets: Some(allowed_move_call_targets.to_vec()),
            allowed_addresses: Some(allowed_addresses.to_vec()),
            network: Some(self.network),
        };

        let response = self
            .http
            .post(self.url("/api/sponsor-transaction"))
            .json(&request)
            .send()
            .await?;

        let sponsored: SponsorTransactionResponse =
            read_json(response, ClientError::Sponsorship, "Sponsorship failed").await?;
        info!(digest = %sponsored.digest, "Transaction sponsored");
        Ok(sponsored)
    }

    /// Submit the user's signature for a sponsored transaction.
    pub async fn execute(
        &self,
        digest: &str,
        signature: &str,
    ) -> Result<ExecuteSponsoredTransactionResponse, ClientError> {
        let request = ExecuteSponsoredTransactionRequest {
            digest: Some(digest.to_string()),
            signature: Some(signature.to_string()),
        };

        let response = self
            .http
            .post(self.url("/api/execute-sponsored-transaction"))
            .json(&request)
            .send()
            .await?;

        let executed: ExecuteSponsoredTransactionResponse =
            read_json(response, ClientError::Execution, "Execution failed").await?;
        info!(tx_digest = %executed.tx_digest, "Sponsored transaction executed");
        Ok(executed)
    }

    /// Run the whole build / sponsor / sign / execute sequence and return the
    /// final transaction digest.
    pub async fn sponsor_and_execute(
        &self,
        builder: &dyn TransactionKindBuilder,
        sender: &str,
        signer: &dyn TransactionSigner,
        allowed_move_call_targets: &[String],
        allowed_addresses: &[String],
    ) -> Result<String, ClientError> {
        let kind_bytes = builder.build_kind(self.network).await?;

        let sponsored = self
            .sponsor(
                &kind_bytes,
                sender,
                allowed_move_call_targets,
                allowed_addresses,
            )
            .await?;

        let signable =
            Base64::decode_vec(&sponsored.bytes).map_err(|e| ClientError::Decode(e.to_string()))?;

        info!(digest = %sponsored.digest, "Requesting user signature");
        let signature = signer.sign(&signable).await?;

        let executed = self.execute(&sponsored.digest, &signature).await?;
        Ok(executed.tx_digest)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// Decode a success body, or turn an error body into `wrap(message)`.
async fn read_json<T: DeserializeOwned>(
    response: Response,
    wrap: fn(String) -> ClientError,
    failure_prefix: &str,
) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let message = response
        .json::<ErrorMessage>()
        .await
        .ok()
        .and_then(|body| body.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| format!("{failure_prefix}: {status}"));
    Err(wrap(message))
}

/// Exponential backoff settings for [`retry_with_backoff`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts after the first one.
    pub retries: u32,
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 3,
            initial_delay: Duration::from_secs(1),
        }
    }
}

/// Run `op` until it succeeds or the policy's retries are used up, doubling
/// the delay after each failure. Returns the last error.
pub async fn retry_with_backoff<T, E, F, Fut>(policy: RetryPolicy, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut delay = policy.initial_delay;
    let mut remaining = policy.retries;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if remaining > 0 => {
                warn!(error = %e, retry_in_ms = delay.as_millis() as u64, "retrying");
                tokio::time::sleep(delay).await;
                delay = delay.saturating_mul(2);
                remaining -= 1;
            }
            Err(e) => return Err(e),
        }
    }
}
