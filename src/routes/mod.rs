// ABOUTME: Route module organization for the sync service HTTP endpoints
// ABOUTME: Assembles the trigger and health routes behind a request tracing layer
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Health check routes
pub mod health;
/// Synchronization trigger routes
pub mod sync;

pub use health::HealthRoutes;
pub use sync::{SyncResponse, SyncRoutes};

use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::config::SyncConfig;

/// Full application router
#[must_use]
pub fn router(config: Arc<SyncConfig>) -> Router {
    Router::new()
        .merge(SyncRoutes::routes(config))
        .merge(HealthRoutes::routes())
        .layer(TraceLayer::new_for_http())
}
