// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Suinks Server - Backend services for the Suinks link-in-bio dApp
//!
//! Two small HTTP services and a client helper that sit between the browser
//! app and the Sui / Walrus ecosystem:
//!
//! - **Sponsorship Gateway** (`sponsor-gateway` binary) relays gas-sponsored
//!   transactions to the Enoki API so users pay no gas.
//! - **Storage Upload Proxy** (`storage-proxy` binary) stores and reads blobs
//!   by running the local `walrus` CLI.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `client` - Caller side of the sponsor / sign / execute flow
//! - `config` - Environment-driven configuration
//! - `links` - Walrus Sites link helpers
//! - `logging` - Tracing subscriber setup
//! - `providers` - Sponsorship provider integrations (Enoki)
//! - `server` - Listener and graceful shutdown
//! - `storage` - Walrus CLI content store and scratch files

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod links;
pub mod logging;
pub mod models;
pub mod providers;
pub mod server;
pub mod state;
pub mod storage;

#[cfg(test)]
mod test_support;
