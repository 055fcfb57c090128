// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Walrus upload and read endpoints.

use std::{
    io,
    pin::Pin,
    task::{Context, Poll},
};

use axum::{
    body::{Body, Bytes},
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};
use futures::Stream;
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use tracing::{info, warn};

use crate::{
    error::ApiError,
    models::{UploadForm, UploadResponse},
    state::ProxyState,
    storage::{ContentId, ScratchFile, StoreError},
};

pub const NO_FILE_UPLOADED: &str = "No file uploaded";
pub const FILE_TOO_LARGE: &str = "File too large";
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

struct IncomingFile {
    original_name: String,
    content_type: String,
    bytes: Bytes,
}

/// Missing, non-numeric, or zero values fall back to the default.
fn parse_epochs(raw: Option<&str>, default: u32) -> u32 {
    raw.and_then(|v| v.trim().parse::<u32>().ok())
        .filter(|&epochs| epochs >= 1)
        .unwrap_or(default)
}

#[utoipa::path(
    post,
    path = "/upload",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    tag = "Storage",
    responses(
        (status = 200, description = "File stored on Walrus", body = UploadResponse),
        (status = 400, description = "No file uploaded"),
        (status = 413, description = "Upload too large"),
        (status = 500, description = "Walrus CLI failure")
    )
)]
pub async fn upload_file(
    State(state): State<ProxyState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut file = None;
    let mut epochs_field = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let original_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or(DEFAULT_CONTENT_TYPE)
                    .to_string();
                let bytes = field.bytes().await?;
                file = Some(IncomingFile {
                    original_name,
                    content_type,
                    bytes,
                });
            }
            "epochs" => epochs_field = Some(field.text().await?),
            _ => {}
        }
    }

    let file = file.ok_or_else(|| ApiError::bad_request(NO_FILE_UPLOADED))?;
    if file.bytes.len() > state.config.max_upload_bytes {
        return Err(ApiError::new(StatusCode::PAYLOAD_TOO_LARGE, FILE_TOO_LARGE));
    }
    let epochs = parse_epochs(epochs_field.as_deref(), state.config.default_epochs);

    let scratch = ScratchFile::create(&state.config.upload_dir, "upload", &file.bytes)
        .await
        .map_err(StoreError::from)?;

    info!(
        original_name = %file.original_name,
        path = %scratch.path().display(),
        size = file.bytes.len(),
        epochs,
        "Uploading file to Walrus"
    );

    let stored = state.store.store(scratch.path(), epochs).await;

    if let Err(e) = scratch.remove().await {
        warn!(path = %scratch.path().display(), error = %e, "failed to remove upload scratch file");
    }

    let blob_id = stored.inspect_err(|e| warn!(error = %e, "Upload failed"))?;
    let url = state.config.retrieval_url(blob_id.as_str());

    info!(blob_id = %blob_id, url = %url, "File uploaded");

    Ok(Json(UploadResponse {
        success: true,
        file_id: blob_id.to_string(),
        blob_id: blob_id.to_string(),
        url,
        size: file.bytes.len() as u64,
        uploaded_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        original_name: file.original_name,
        content_type: file.content_type,
    }))
}

/// Body stream that owns the scratch file it reads from, so the file is
/// removed once the response is finished or abandoned.
struct ScratchBody {
    stream: ReaderStream<File>,
    _scratch: ScratchFile,
}

impl Stream for ScratchBody {
    type Item = io::Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.get_mut().stream).poll_next(cx)
    }
}

#[utoipa::path(
    get,
    path = "/read/{blob_id}",
    tag = "Storage",
    params(("blob_id" = String, Path, description = "Walrus blob id")),
    responses(
        (status = 200, description = "Blob contents as application/octet-stream"),
        (status = 400, description = "Malformed blob id"),
        (status = 500, description = "Walrus CLI failure")
    )
)]
pub async fn read_blob(
    State(state): State<ProxyState>,
    Path(blob_id): Path<String>,
) -> Result<Response, ApiError> {
    let id = ContentId::parse(&blob_id)?;

    info!(blob_id = %id, "Reading file from Walrus");

    let bytes = state
        .store
        .read(&id)
        .await
        .inspect_err(|e| warn!(blob_id = %id, error = %e, "Read failed"))?;

    let scratch = ScratchFile::create(&state.config.upload_dir, &format!("walrus-{id}"), &bytes)
        .await
        .map_err(StoreError::from)?;
    let file = File::open(scratch.path()).await.map_err(StoreError::from)?;

    let body = Body::from_stream(ScratchBody {
        stream: ReaderStream::new(file),
        _scratch: scratch,
    });

    Ok((
        [
            (header::CONTENT_TYPE, DEFAULT_CONTENT_TYPE.to_string()),
            (header::CONTENT_LENGTH, bytes.len().to_string()),
        ],
        body,
    )
        .into_response())
}
