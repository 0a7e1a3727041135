// ABOUTME: Synchronization entry point wiring two Garmin accounts into the sync engine
// ABOUTME: Exposes the diff, the engine and the top-level synchronize operation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Source/destination activity diff
pub mod diff;
/// Concurrent listing and sequential transfer loop
pub mod engine;

pub use diff::{plan_transfers, TransferPlan};
pub use engine::{ListLimits, SyncEngine, DEFAULT_DESTINATION_LIMIT, DEFAULT_SOURCE_LIMIT};

use garmin_mirror_core::{SyncOutcome, SyncResult};

use crate::config::SyncConfig;
use crate::providers::GarminClient;

/// Account label used for the source side in logs
pub const SOURCE_LABEL: &str = "primary";

/// Account label used for the destination side in logs
pub const DESTINATION_LABEL: &str = "mirror";

/// Mirror recent source activities into the destination account
///
/// Each call builds fresh clients, so no session state survives between runs.
///
/// # Errors
///
/// Returns an error if either transport cannot be built, or if either
/// account fails to authenticate or list its activities
pub async fn synchronize(config: &SyncConfig) -> SyncResult<SyncOutcome> {
    let source = GarminClient::new(
        SOURCE_LABEL,
        config.source.clone(),
        config.source_endpoint.clone(),
        &config.transport,
    )?;
    let destination = GarminClient::new(
        DESTINATION_LABEL,
        config.destination.clone(),
        config.destination_endpoint.clone(),
        &config.transport,
    )?;

    SyncEngine::new(source, destination, config.limits)
        .run()
        .await
}
