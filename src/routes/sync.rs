// ABOUTME: HTTP trigger that runs one synchronization per request
// ABOUTME: Always answers 200 with a success flag, a summary message and an optional error
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use axum::{extract::State, routing::get, Json, Router};
use garmin_mirror_core::{SyncOutcome, SyncResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

use crate::config::SyncConfig;
use crate::sync::synchronize;

/// Body returned by the sync trigger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncResponse {
    /// Outcome success flag; false when the run aborted
    pub success: bool,
    /// Outcome summary, empty when the run aborted
    pub message: String,
    /// Fatal error text, if the run aborted
    pub error: Option<String>,
}

impl From<SyncResult<SyncOutcome>> for SyncResponse {
    fn from(result: SyncResult<SyncOutcome>) -> Self {
        match result {
            Ok(outcome) => Self {
                success: outcome.success,
                message: outcome.summary,
                error: None,
            },
            Err(e) => Self {
                success: false,
                message: String::new(),
                error: Some(e.to_string()),
            },
        }
    }
}

/// Sync trigger routes
pub struct SyncRoutes;

impl SyncRoutes {
    /// Create the trigger routes over a shared configuration
    #[must_use]
    pub fn routes(config: Arc<SyncConfig>) -> Router {
        Router::new()
            .route("/sync", get(Self::handle_sync).post(Self::handle_sync))
            .with_state(config)
    }

    async fn handle_sync(State(config): State<Arc<SyncConfig>>) -> Json<SyncResponse> {
        info!("Sync triggered");
        let result = synchronize(&config).await;
        if let Err(e) = &result {
            error!(error = %e, "Sync aborted");
        }
        Json(SyncResponse::from(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use garmin_mirror_core::SyncError;

    #[test]
    fn test_outcome_maps_to_response() {
        let outcome = SyncOutcome::from_results(vec![1], vec![2], vec![]);
        let response = SyncResponse::from(Ok(outcome));
        assert!(response.success);
        assert_eq!(response.message, "id[1] succeeded. id[2] failed. id[] skipped.");
        assert_eq!(response.error, None);
    }

    #[test]
    fn test_fatal_error_maps_to_response() {
        let response = SyncResponse::from(Err(SyncError::WrongCredentials));
        assert!(!response.success);
        assert!(response.message.is_empty());
        assert_eq!(response.error.as_deref(), Some("wrong credentials"));
    }
}
