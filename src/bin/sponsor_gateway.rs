// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{process::ExitCode, sync::Arc};

use suinks_server::{
    api::gateway_router, config::GatewayConfig, logging::init_tracing,
    providers::EnokiClient, server::serve, state::GatewayState,
};
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let config = match GatewayConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid gateway configuration");
            return ExitCode::FAILURE;
        }
    };

    let provider = match EnokiClient::from_config(&config) {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "Failed to build Enoki client");
            return ExitCode::FAILURE;
        }
    };

    info!(
        network = %config.default_network,
        enoki = %config.enoki_api_url,
        "Sponsorship gateway configured"
    );

    let state = GatewayState::new(Arc::new(provider), config.default_network);
    if let Err(e) = serve(gateway_router(state), config.bind_addr, "sponsor-gateway").await {
        error!(error = %e, "Sponsorship gateway failed");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
