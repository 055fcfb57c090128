// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Enoki sponsored-transaction API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use url::Url;

use super::{
    ExecutedTransaction, ProviderError, SponsorParams, SponsorProvider, SponsoredTransaction,
};
use crate::config::GatewayConfig;

const SPONSOR_SEGMENTS: [&str; 3] = ["v1", "transaction-blocks", "sponsor"];

#[derive(Debug, Clone)]
pub struct EnokiClient {
    api_base_url: String,
    api_key: String,
    http: Client,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SponsorBody<'a> {
    network: &'a str,
    transaction_block_kind_bytes: &'a str,
    sender: &'a str,
    allowed_move_call_targets: &'a [String],
    allowed_addresses: &'a [String],
}

#[derive(Serialize)]
struct ExecuteBody<'a> {
    signature: &'a str,
}

#[derive(Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

#[derive(Deserialize)]
struct SponsorData {
    bytes: String,
    digest: String,
}

#[derive(Deserialize)]
struct ExecuteData {
    digest: String,
    #[serde(default)]
    effects: Option<Value>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    errors: Vec<ErrorItem>,
}

#[derive(Deserialize)]
struct ErrorItem {
    message: Option<String>,
}

impl EnokiClient {
    pub fn new(
        api_base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_base_url: api_base_url.into(),
            api_key: api_key.into(),
            http,
        })
    }

    pub fn from_config(config: &GatewayConfig) -> Result<Self, ProviderError> {
        Self::new(
            config.enoki_api_url.clone(),
            config.enoki_api_key.clone(),
            config.provider_timeout,
        )
    }

    /// `{base}/v1/transaction-blocks/sponsor[/extra]`, each segment
    /// percent-encoded as a path segment.
    fn sponsor_url(&self, extra: Option<&str>) -> Result<Url, ProviderError> {
        let mut url = Url::parse(&self.api_base_url).map_err(|e| {
            ProviderError::Request(format!("invalid Enoki base URL {}: {e}", self.api_base_url))
        })?;
        url.path_segments_mut()
            .map_err(|()| {
                ProviderError::Request(format!(
                    "Enoki base URL cannot take a path: {}",
                    self.api_base_url
                ))
            })?
            .pop_if_empty()
            .extend(SPONSOR_SEGMENTS)
            .extend(extra);
        Ok(url)
    }

    async fn post_json<B, T>(&self, url: Url, body: &B) -> Result<T, ProviderError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let path = url.path().to_string();
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| ProviderError::Request(format!("POST {path} failed: {e}")))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::Request(format!("POST {path} body unreadable: {e}")))?;

        if !status.is_success() {
            return Err(ProviderError::Rejected {
                status: status.as_u16(),
                message: first_error_message(&text),
                body: text,
            });
        }

        serde_json::from_str::<DataEnvelope<T>>(&text)
            .map(|envelope| envelope.data)
            .map_err(|e| ProviderError::UnrecognizedResponse(format!("POST {path}: {e}")))
    }
}

fn first_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()?
        .errors
        .into_iter()
        .find_map(|item| item.message)
        .filter(|m| !m.trim().is_empty())
}

#[async_trait]
impl SponsorProvider for EnokiClient {
    async fn create_sponsored_transaction(
        &self,
        params: SponsorParams,
    ) -> Result<SponsoredTransaction, ProviderError> {
        let body = SponsorBody {
            network: params.network.as_str(),
            transaction_block_kind_bytes: &params.transaction_kind_bytes,
            sender: &params.sender,
            allowed_move_call_targets: &params.allowed_move_call_targets,
            allowed_addresses: &params.allowed_addresses,
        };

        let data: SponsorData = self.post_json(self.sponsor_url(None)?, &body).await?;

        info!(
            sender = %params.sender,
            network = %params.network,
            digest = %data.digest,
            "Enoki: transaction sponsored"
        );

        Ok(SponsoredTransaction {
            bytes: data.bytes,
            digest: data.digest,
        })
    }

    async fn execute_sponsored_transaction(
        &self,
        digest: &str,
        signature: &str,
    ) -> Result<ExecutedTransaction, ProviderError> {
        let url = self.sponsor_url(Some(digest))?;
        let data: ExecuteData = self.post_json(url, &ExecuteBody { signature }).await?;

        info!(digest = %data.digest, "Enoki: sponsored transaction executed");

        Ok(ExecutedTransaction {
            digest: data.digest,
            effects: data.effects,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::Network, test_support::spawn_server};
    use axum::{
        extract::{Path, State},
        http::{HeaderMap, StatusCode},
        routing::post,
        Json, Router,
    };
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Recorded {
        calls: Arc<Mutex<Vec<(String, Option<String>, Value)>>>,
    }

    fn auth_header(headers: &HeaderMap) -> Option<String> {
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }

    async fn fake_enoki() -> (String, Recorded) {
        let recorded = Recorded::default();
        let app = Router::new()
            .route(
                "/v1/transaction-blocks/sponsor",
                post(
                    |State(rec): State<Recorded>, headers: HeaderMap, Json(body): Json<Value>| async move {
                        rec.calls.lock().unwrap().push((
                            "sponsor".to_string(),
                            auth_header(&headers),
                            body,
                        ));
                        Json(json!({ "data": { "bytes": "AAEC", "digest": "D1GEST" } }))
                    },
                ),
            )
            .route(
                "/v1/transaction-blocks/sponsor/{digest}",
                post(
                    |State(rec): State<Recorded>,
                     Path(digest): Path<String>,
                     Json(body): Json<Value>| async move {
                        rec.calls
                            .lock()
                            .unwrap()
                            .push((format!("execute:{digest}"), None, body));
                        if digest == "unknown" {
                            return (
                                StatusCode::NOT_FOUND,
                                Json(json!({ "errors": [{ "code": "not_found", "message": "Sponsored transaction not found" }] })),
                            );
                        }
                        (StatusCode::OK, Json(json!({ "data": { "digest": digest } })))
                    },
                ),
            )
            .with_state(recorded.clone());
        (spawn_server(app).await, recorded)
    }

    fn params() -> SponsorParams {
        SponsorParams {
            network: Network::Mainnet,
            transaction_kind_bytes: "a2luZA==".to_string(),
            sender: "0xabc".to_string(),
            allowed_move_call_targets: vec!["0x2::linktree::create".to_string()],
            allowed_addresses: vec![],
        }
    }

    #[tokio::test]
    async fn sponsor_sends_enoki_shape_and_returns_data() {
        let (base, recorded) = fake_enoki().await;
        let client = EnokiClient::new(base, "enoki_private_1", Duration::from_secs(5)).unwrap();

        let sponsored = client.create_sponsored_transaction(params()).await.unwrap();

        assert_eq!(sponsored.bytes, "AAEC");
        assert_eq!(sponsored.digest, "D1GEST");

        let calls = recorded.calls.lock().unwrap();
        let (name, auth, body) = &calls[0];
        assert_eq!(name, "sponsor");
        assert_eq!(auth.as_deref(), Some("Bearer enoki_private_1"));
        assert_eq!(
            body,
            &json!({
                "network": "mainnet",
                "transactionBlockKindBytes": "a2luZA==",
                "sender": "0xabc",
                "allowedMoveCallTargets": ["0x2::linktree::create"],
                "allowedAddresses": []
            })
        );
    }

    #[tokio::test]
    async fn execute_posts_signature_to_digest_path() {
        let (base, recorded) = fake_enoki().await;
        let client = EnokiClient::new(base, "k", Duration::from_secs(5)).unwrap();

        let executed = client
            .execute_sponsored_transaction("D1GEST", "c2ln")
            .await
            .unwrap();

        assert_eq!(executed.digest, "D1GEST");
        assert!(executed.effects.is_none());
        let calls = recorded.calls.lock().unwrap();
        assert_eq!(calls[0].0, "execute:D1GEST");
        assert_eq!(calls[0].2, json!({ "signature": "c2ln" }));
    }

    #[tokio::test]
    async fn error_envelope_message_is_surfaced() {
        let (base, _) = fake_enoki().await;
        let client = EnokiClient::new(base, "k", Duration::from_secs(5)).unwrap();

        let err = client
            .execute_sponsored_transaction("unknown", "c2ln")
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::Rejected { status: 404, .. }));
        assert_eq!(err.provider_message(), Some("Sponsored transaction not found"));
    }

    #[tokio::test]
    async fn unexpected_success_shape_is_unrecognized() {
        let app = Router::new().route(
            "/v1/transaction-blocks/sponsor",
            post(|| async { Json(json!({ "bytes": "flat", "digest": "shape" })) }),
        );
        let base = spawn_server(app).await;
        let client = EnokiClient::new(base, "k", Duration::from_secs(5)).unwrap();

        let err = client
            .create_sponsored_transaction(params())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::UnrecognizedResponse(_)));
        assert_eq!(err.provider_message(), None);
    }

    #[tokio::test]
    async fn digest_is_encoded_as_a_single_path_segment() {
        let (base, recorded) = fake_enoki().await;
        let client = EnokiClient::new(base, "k", Duration::from_secs(5)).unwrap();

        client
            .execute_sponsored_transaction("a b/c+d", "c2ln")
            .await
            .unwrap();

        let calls = recorded.calls.lock().unwrap();
        assert_eq!(calls[0].0, "execute:a b/c+d");
    }

    #[test]
    fn sponsor_url_keeps_base_path_and_escapes_segments() {
        let client =
            EnokiClient::new("https://enoki.example/api/", "k", Duration::from_secs(1)).unwrap();

        assert_eq!(
            client.sponsor_url(None).unwrap().as_str(),
            "https://enoki.example/api/v1/transaction-blocks/sponsor"
        );
        assert_eq!(
            client.sponsor_url(Some("a b/c")).unwrap().as_str(),
            "https://enoki.example/api/v1/transaction-blocks/sponsor/a%20b%2Fc"
        );
    }

    #[test]
    fn unusable_base_url_is_a_request_error() {
        let client = EnokiClient::new("not a url", "k", Duration::from_secs(1)).unwrap();
        assert!(matches!(
            client.sponsor_url(None),
            Err(ProviderError::Request(_))
        ));
    }

    #[test]
    fn first_error_message_skips_blank_entries() {
        let body = r#"{"errors":[{"code":"x"},{"message":"second"}]}"#;
        assert_eq!(first_error_message(body).as_deref(), Some("second"));
        assert_eq!(first_error_message("not json"), None);
    }
}
