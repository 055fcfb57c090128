// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::{
    config::{Network, ProxyConfig},
    providers::SponsorProvider,
    storage::ContentStore,
};

/// State shared by the sponsorship gateway handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub provider: Arc<dyn SponsorProvider>,
    pub default_network: Network,
}

impl GatewayState {
    pub fn new(provider: Arc<dyn SponsorProvider>, default_network: Network) -> Self {
        Self {
            provider,
            default_network,
        }
    }
}

/// State shared by the storage proxy handlers.
#[derive(Clone)]
pub struct ProxyState {
    pub store: Arc<dyn ContentStore>,
    pub config: Arc<ProxyConfig>,
}

impl ProxyState {
    pub fn new(store: Arc<dyn ContentStore>, config: ProxyConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }
}
