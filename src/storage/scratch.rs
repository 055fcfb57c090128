// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Temporary files used to pass data to and from the storage CLI.

use std::{
    io,
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use tokio::fs;
use tracing::warn;
use uuid::Uuid;

/// A scratch file that is deleted when dropped.
///
/// Names embed a millisecond timestamp and a random UUID, so concurrent
/// requests sharing a directory never collide.
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    /// Create `dir` if needed and write `contents` to a fresh file in it.
    pub async fn create(dir: &Path, prefix: &str, contents: &[u8]) -> io::Result<Self> {
        fs::create_dir_all(dir).await?;
        // Guard first so a failed write still cleans up the partial file.
        let file = Self {
            path: dir.join(unique_name(prefix)),
        };
        fs::write(&file.path, contents).await?;
        Ok(file)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the file now. Succeeds if it is already gone.
    pub async fn remove(&self) -> io::Result<()> {
        match fs::remove_file(&self.path).await {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        let path = std::mem::take(&mut self.path);
        // Unlink off the runtime thread; a dropped response stream lands here.
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn_blocking(move || remove_quietly(&path));
            }
            Err(_) => remove_quietly(&path),
        }
    }
}

fn remove_quietly(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        if e.kind() != io::ErrorKind::NotFound {
            warn!(path = %path.display(), error = %e, "failed to remove scratch file");
        }
    }
}

fn unique_name(prefix: &str) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    format!("{prefix}-{millis}-{}", Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::wait_until_gone;
    use std::collections::HashSet;
    use tempfile::TempDir;

    #[tokio::test]
    async fn create_writes_contents_and_drop_removes() {
        let dir = TempDir::new().unwrap();
        let path = {
            let file = ScratchFile::create(dir.path(), "upload", b"hello").await.unwrap();
            assert_eq!(std::fs::read(file.path()).unwrap(), b"hello");
            file.path().to_path_buf()
        };
        wait_until_gone(&path).await;
    }

    #[test]
    fn drop_outside_runtime_removes_synchronously() {
        let dir = TempDir::new().unwrap();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        let file = runtime
            .block_on(ScratchFile::create(dir.path(), "read", b"bytes"))
            .unwrap();
        let path = file.path().to_path_buf();
        drop(runtime);

        drop(file);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn drop_inside_runtime_does_not_stall_the_caller() {
        let dir = TempDir::new().unwrap();
        let file = ScratchFile::create(dir.path(), "read", b"bytes").await.unwrap();
        let path = file.path().to_path_buf();

        drop(file);
        // the runtime thread keeps running while the unlink is pending
        tokio::task::yield_now().await;
        wait_until_gone(&path).await;
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let file = ScratchFile::create(dir.path(), "upload", b"x").await.unwrap();
        file.remove().await.unwrap();
        file.remove().await.unwrap();
        assert!(!file.path().exists());
    }

    #[tokio::test]
    async fn creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        let file = ScratchFile::create(&nested, "read", b"").await.unwrap();
        assert!(file.path().starts_with(&nested));
    }

    #[tokio::test]
    async fn names_are_unique_within_a_millisecond() {
        let dir = TempDir::new().unwrap();
        let mut files = Vec::new();
        for _ in 0..32 {
            files.push(ScratchFile::create(dir.path(), "upload", b"x").await.unwrap());
        }
        let names: HashSet<_> = files.iter().map(|f| f.path().to_path_buf()).collect();
        assert_eq!(names.len(), files.len());
    }
}
