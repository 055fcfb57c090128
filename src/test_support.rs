// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared fixtures for unit tests.

use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use axum::Router;
use tokio::net::TcpListener;

use crate::{
    providers::{
        ExecutedTransaction, ProviderError, SponsorParams, SponsorProvider, SponsoredTransaction,
    },
    storage::{ContentId, ContentStore, StoreError},
};

/// Serve `app` on an ephemeral localhost port and return its base URL.
pub async fn spawn_server(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Scratch files are unlinked on the blocking pool when dropped; wait for it.
pub async fn wait_until_gone(path: &Path) {
    for _ in 0..100 {
        if !path.exists() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("{} was not removed", path.display());
}

/// Provider that records every call and answers from fixed results.
#[derive(Default)]
pub struct MockSponsorProvider {
    pub sponsor_calls: Mutex<Vec<SponsorParams>>,
    pub execute_calls: Mutex<Vec<(String, String)>>,
    /// When set, every call fails with this provider message.
    pub fail_with: Option<Option<String>>,
}

impl MockSponsorProvider {
    pub fn failing(message: Option<&str>) -> Self {
        Self {
            fail_with: Some(message.map(str::to_string)),
            ..Self::default()
        }
    }

    fn failure(&self) -> Option<ProviderError> {
        self.fail_with.as_ref().map(|message| ProviderError::Rejected {
            status: 400,
            message: message.clone(),
            body: "{}".to_string(),
        })
    }
}

#[async_trait]
impl SponsorProvider for MockSponsorProvider {
    async fn create_sponsored_transaction(
        &self,
        params: SponsorParams,
    ) -> Result<SponsoredTransaction, ProviderError> {
        self.sponsor_calls.lock().unwrap().push(params.clone());
        if let Some(err) = self.failure() {
            return Err(err);
        }
        Ok(SponsoredTransaction {
            bytes: format!("signable:{}", params.transaction_kind_bytes),
            digest: format!("digest-for-{}", params.sender),
        })
    }

    async fn execute_sponsored_transaction(
        &self,
        digest: &str,
        signature: &str,
    ) -> Result<ExecutedTransaction, ProviderError> {
        self.execute_calls
            .lock()
            .unwrap()
            .push((digest.to_string(), signature.to_string()));
        if let Some(err) = self.failure() {
            return Err(err);
        }
        Ok(ExecutedTransaction {
            digest: format!("final-{digest}"),
            effects: Some(serde_json::json!({ "status": { "status": "success" } })),
        })
    }
}

/// How [`MockContentStore::store`] responds.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum StoreBehavior {
    /// Blob id derived from the file contents.
    Echo,
    /// Non-zero exit.
    Fail,
    /// Exit 0 with unparseable output.
    Garbage,
    /// Binary missing.
    Missing,
}

/// In-memory content store that records the scratch paths it was handed.
pub struct MockContentStore {
    pub behavior: StoreBehavior,
    pub stored_paths: Mutex<Vec<PathBuf>>,
    pub read_ids: Mutex<Vec<ContentId>>,
}

impl MockContentStore {
    pub fn new(behavior: StoreBehavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            stored_paths: Mutex::new(Vec::new()),
            read_ids: Mutex::new(Vec::new()),
        })
    }

    fn missing() -> StoreError {
        StoreError::Spawn(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "No such file or directory (os error 2)",
        ))
    }
}

#[async_trait]
impl ContentStore for MockContentStore {
    async fn store(&self, path: &Path, _epochs: u32) -> Result<ContentId, StoreError> {
        self.stored_paths.lock().unwrap().push(path.to_path_buf());
        match self.behavior {
            StoreBehavior::Echo => {
                let contents = tokio::fs::read_to_string(path).await?;
                ContentId::parse(&format!("blob-{contents}"))
            }
            StoreBehavior::Fail => Err(StoreError::Subprocess {
                status: "exit status: 1".to_string(),
                stderr: "could not reach storage nodes".to_string(),
            }),
            StoreBehavior::Garbage => Err(StoreError::UnrecognizedOutput),
            StoreBehavior::Missing => Err(Self::missing()),
        }
    }

    async fn read(&self, id: &ContentId) -> Result<Vec<u8>, StoreError> {
        self.read_ids.lock().unwrap().push(id.clone());
        match self.behavior {
            StoreBehavior::Missing => Err(Self::missing()),
            StoreBehavior::Fail => Err(StoreError::Subprocess {
                status: "exit status: 1".to_string(),
                stderr: "blob not found".to_string(),
            }),
            _ => Ok(format!("content-of-{id}").into_bytes()),
        }
    }

    async fn version(&self) -> Result<String, StoreError> {
        match self.behavior {
            StoreBehavior::Missing => Err(Self::missing()),
            _ => Ok("walrus 1.0.0".to_string()),
        }
    }
}
