// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Portal-independent Walrus Sites links.
//!
//! A Walrus Sites portal resolves `blobid.walrus` and `*.suiobj` hosts itself,
//! so links built here work on any portal.

use std::{fmt, sync::LazyLock};

use regex::Regex;

/// Legacy HTTP aggregator URL, e.g.
/// `https://aggregator.walrus-testnet.walrus.space/v1/<blob id>`.
static AGGREGATOR_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://aggregator\.walrus-[^/]+/v1/([^/?]+)").expect("valid regex")
});

/// A link target on a Walrus Site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SiteLink<'a> {
    /// Raw blob; the browser sniffs the content type.
    Blob(&'a str),
    /// Resource on another site, addressed by SuiNS name (`.sui` optional).
    Suins { name: &'a str, path: &'a str },
    /// Resource on another site, addressed by its site object id.
    Object { id: &'a str, path: &'a str },
}

impl fmt::Display for SiteLink<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (host, path) = match *self {
            SiteLink::Blob(blob_id) => return write!(f, "https://blobid.walrus/{blob_id}"),
            SiteLink::Suins { name, path } => (name.strip_suffix(".sui").unwrap_or(name), path),
            SiteLink::Object { id, path } => (id.strip_prefix("0x").unwrap_or(id), path),
        };

        let path = path.strip_prefix('/').unwrap_or(path);
        if path.is_empty() {
            write!(f, "https://{host}.suiobj")
        } else {
            write!(f, "https://{host}.suiobj/{path}")
        }
    }
}

pub fn blob_link(blob_id: &str) -> String {
    SiteLink::Blob(blob_id).to_string()
}

pub fn suins_link(name: &str, path: &str) -> String {
    SiteLink::Suins { name, path }.to_string()
}

pub fn object_link(id: &str, path: &str) -> String {
    SiteLink::Object { id, path }.to_string()
}

/// Heuristic: blob ids are bare base64url tokens, not URLs.
pub fn is_blob_id(value: &str) -> bool {
    !value.starts_with("http://") && !value.starts_with("https://") && value.len() > 20
}

/// Rewrite a legacy aggregator URL as a blob link; anything else is returned
/// unchanged.
pub fn convert_aggregator_url(url: &str) -> String {
    match AGGREGATOR_URL.captures(url).and_then(|c| c.get(1)) {
        Some(blob_id) => blob_link(blob_id.as_str()),
        None => url.to_string(),
    }
}
