// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! [`ContentStore`] backed by the `walrus` command-line client.
//!
//! The CLI has no machine-readable output for `store`, so the blob id is
//! scraped from its human-readable summary. That scraping is confined to
//! [`parse_blob_id`].

use std::{
    ffi::{OsStr, OsString},
    path::{Path, PathBuf},
    process::Stdio,
    sync::LazyLock,
};

use async_trait::async_trait;
use regex::Regex;
use tokio::process::Command;
use tracing::{debug, info};

use super::{ContentId, ContentStore, StoreError};

/// Label patterns tried in order; the first match wins.
static BLOB_ID_PATTERNS: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        Regex::new(r"Blob ID:\s*([A-Za-z0-9_-]+)").expect("valid regex"),
        Regex::new(r"blob_id:\s*([A-Za-z0-9_-]+)").expect("valid regex"),
    ]
});

/// Extract the blob id from `walrus store` output.
pub fn parse_blob_id(output: &str) -> Result<ContentId, StoreError> {
    BLOB_ID_PATTERNS
        .iter()
        .find_map(|re| re.captures(output))
        .and_then(|caps| caps.get(1))
        .map(|m| ContentId(m.as_str().to_string()))
        .ok_or(StoreError::UnrecognizedOutput)
}

#[derive(Debug, Clone)]
pub struct WalrusCli {
    binary: PathBuf,
    /// Passed before every subcommand (e.g. `--config <path>`).
    leading_args: Vec<OsString>,
}

impl WalrusCli {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            leading_args: Vec::new(),
        }
    }

    pub fn with_config(self, config: impl AsRef<Path>) -> Self {
        self.with_leading_args([OsStr::new("--config"), config.as_ref().as_os_str()])
    }

    pub fn with_leading_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.leading_args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    /// Run the CLI and return its stdout; non-zero exit is an error.
    async fn run(&self, args: &[&OsStr]) -> Result<Vec<u8>, StoreError> {
        debug!(binary = %self.binary.display(), ?args, "running walrus CLI");

        let output = Command::new(&self.binary)
            .args(&self.leading_args)
            .args(args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(StoreError::Spawn)?;

        if !output.status.success() {
            return Err(StoreError::Subprocess {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(output.stdout)
    }
}

#[async_trait]
impl ContentStore for WalrusCli {
    async fn store(&self, path: &Path, epochs: u32) -> Result<ContentId, StoreError> {
        let epochs = epochs.to_string();
        let stdout = self
            .run(&[
                OsStr::new("store"),
                path.as_os_str(),
                OsStr::new("--epochs"),
                OsStr::new(&epochs),
            ])
            .await?;

        let output = String::from_utf8_lossy(&stdout);
        debug!(output = %output.chars().take(500).collect::<String>(), "walrus store output");

        let blob_id = parse_blob_id(&output)?;
        info!(blob_id = %blob_id, epochs = %epochs, "stored blob");
        Ok(blob_id)
    }

    async fn read(&self, id: &ContentId) -> Result<Vec<u8>, StoreError> {
        let bytes = self
            .run(&[OsStr::new("read"), OsStr::new(id.as_str())])
            .await?;
        info!(blob_id = %id, size = bytes.len(), "read blob");
        Ok(bytes)
    }

    async fn version(&self) -> Result<String, StoreError> {
        let stdout = self.run(&[OsStr::new("--version")]).await?;
        Ok(String::from_utf8_lossy(&stdout).trim().to_string())
    }
}
