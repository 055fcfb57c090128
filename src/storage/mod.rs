// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Content Storage
//!
//! The upload proxy never talks to Walrus directly. Everything goes through
//! the [`ContentStore`] adapter, whose production implementation
//! ([`WalrusCli`]) drives the `walrus` command-line client as a subprocess.
//!
//! Data handed to and from the CLI passes through [`ScratchFile`]s: uniquely
//! named temporary files that are removed when the guard is dropped.

use std::{fmt, io, path::Path};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod scratch;
pub mod walrus;

pub use scratch::ScratchFile;
pub use walrus::{parse_blob_id, WalrusCli};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to execute Walrus CLI: {0}")]
    Spawn(#[source] io::Error),

    #[error("Walrus CLI failed ({status}): {stderr}")]
    Subprocess { status: String, stderr: String },

    #[error("Could not parse blob ID from Walrus output")]
    UnrecognizedOutput,

    #[error("Invalid blob ID: {0}")]
    InvalidContentId(String),

    #[error("Scratch file error: {0}")]
    Scratch(#[from] io::Error),
}

impl StoreError {
    /// Stable code reported in the `error` field of failed responses.
    pub fn kind(&self) -> &'static str {
        match self {
            StoreError::Spawn(_) => "spawn_error",
            StoreError::Subprocess { .. } => "subprocess_error",
            StoreError::UnrecognizedOutput => "parse_error",
            StoreError::InvalidContentId(_) => "validation_error",
            StoreError::Scratch(_) => "io_error",
        }
    }
}

/// Identifier of a stored blob.
///
/// Non-empty, ASCII alphanumerics plus `_` and `-` (the alphabet of Walrus'
/// URL-safe base64 blob ids).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
pub struct ContentId(String);

impl ContentId {
    pub fn parse(raw: &str) -> Result<Self, StoreError> {
        if is_content_id(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(StoreError::InvalidContentId(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

pub(crate) fn is_content_id(raw: &str) -> bool {
    !raw.is_empty()
        && raw
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ContentId {
    type Error = StoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ContentId> for String {
    fn from(value: ContentId) -> Self {
        value.0
    }
}

/// Blob storage backend used by the upload proxy.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Store the file at `path` for `epochs` storage epochs.
    async fn store(&self, path: &Path, epochs: u32) -> Result<ContentId, StoreError>;

    /// Fetch the full contents of a blob.
    async fn read(&self, id: &ContentId) -> Result<Vec<u8>, StoreError>;

    /// Backend version string; an error means the backend is unavailable.
    async fn version(&self) -> Result<String, StoreError>;
}
