// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{process::ExitCode, sync::Arc};

use suinks_server::{
    api::proxy_router, config::ProxyConfig, logging::init_tracing, server::serve,
    state::ProxyState, storage::{ContentStore, WalrusCli},
};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let config = match ProxyConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid storage proxy configuration");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = tokio::fs::create_dir_all(&config.upload_dir).await {
        error!(dir = %config.upload_dir.display(), error = %e, "Cannot create upload directory");
        return ExitCode::FAILURE;
    }

    let mut cli = WalrusCli::new(config.walrus_bin.clone());
    if let Some(walrus_config) = &config.walrus_config {
        cli = cli.with_config(walrus_config);
    }

    info!(
        walrus_bin = %config.walrus_bin.display(),
        upload_dir = %config.upload_dir.display(),
        default_epochs = config.default_epochs,
        "Storage proxy configured"
    );

    // Not fatal: the CLI may be installed after start, /health reports it.
    if let Err(e) = cli.version().await {
        warn!(error = %e, "Walrus CLI not available at startup");
    }

    let addr = config.bind_addr;
    let state = ProxyState::new(Arc::new(cli), config);
    if let Err(e) = serve(proxy_router(state), addr, "storage-proxy").await {
        error!(error = %e, "Storage proxy failed");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
