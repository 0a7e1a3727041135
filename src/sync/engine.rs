// ABOUTME: Sync engine that mirrors recent activities from a source account to a destination
// ABOUTME: Fetches both lists concurrently, diffs them and transfers each missing activity in order
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use garmin_mirror_core::{ActivitySummary, SyncOutcome, SyncResult};
use tracing::{error, info, instrument};

use super::diff::plan_transfers;
use crate::providers::ActivityAccount;

/// Default number of recent source activities considered per run
pub const DEFAULT_SOURCE_LIMIT: u32 = 3;

/// Default number of recent destination activities compared against
pub const DEFAULT_DESTINATION_LIMIT: u32 = 10;

/// How many recent activities each side lists
///
/// The destination window is larger so activities mirrored by earlier runs
/// are still visible to the diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListLimits {
    /// Activities listed on the source account
    pub source: u32,
    /// Activities listed on the destination account
    pub destination: u32,
}

impl Default for ListLimits {
    fn default() -> Self {
        Self {
            source: DEFAULT_SOURCE_LIMIT,
            destination: DEFAULT_DESTINATION_LIMIT,
        }
    }
}

/// Mirrors activities from `source` to `destination`
///
/// Authentication and listing errors abort the run. Download and upload
/// errors only mark the affected activity as failed.
pub struct SyncEngine<S, D> {
    source: S,
    destination: D,
    limits: ListLimits,
}

impl<S: ActivityAccount, D: ActivityAccount> SyncEngine<S, D> {
    /// Create an engine over two accounts
    #[must_use]
    pub const fn new(source: S, destination: D, limits: ListLimits) -> Self {
        Self {
            source,
            destination,
            limits,
        }
    }

    /// Run one synchronization pass
    ///
    /// # Errors
    ///
    /// Returns the first authentication or listing error of either account;
    /// nothing is transferred in that case
    #[instrument(skip(self), fields(source = %self.source.label(), destination = %self.destination.label()))]
    pub async fn run(&mut self) -> SyncResult<SyncOutcome> {
        let (source_activities, destination_activities) = tokio::try_join!(
            fetch_recent(&mut self.source, self.limits.source),
            fetch_recent(&mut self.destination, self.limits.destination),
        )?;

        let plan = plan_transfers(&source_activities, &destination_activities);
        info!(
            listed = source_activities.len(),
            pending = plan.pending.len(),
            skipped = plan.skipped.len(),
            "Computed transfer plan"
        );

        let mut succeeded = Vec::new();
        let mut failed = Vec::new();
        for activity in plan.pending {
            if self.transfer(activity).await {
                succeeded.push(activity.activity_id);
            } else {
                failed.push(activity.activity_id);
            }
        }

        let outcome = SyncOutcome::from_results(succeeded, failed, plan.skipped);
        info!(
            success = outcome.success,
            succeeded = ?outcome.succeeded,
            failed = ?outcome.failed,
            skipped = ?outcome.skipped,
            "Sync finished"
        );
        Ok(outcome)
    }

    /// Download from the source and upload to the destination
    ///
    /// Returns whether both steps succeeded; errors are logged, not returned.
    async fn transfer(&mut self, activity: &ActivitySummary) -> bool {
        let activity_id = activity.activity_id;

        let file = match self.source.download_activity(activity_id).await {
            Ok(file) => file,
            Err(e) => {
                error!(activity_id, error = %e, "Activity download failed");
                return false;
            }
        };

        let file_name = file.file_name.clone();
        match self.destination.upload_activity(file).await {
            Ok(()) => {
                info!(activity_id, file_name = %file_name, "Activity mirrored");
                true
            }
            Err(e) => {
                error!(activity_id, file_name = %file_name, error = %e, "Activity upload failed");
                false
            }
        }
    }

    /// Give the accounts back, e.g. to reuse their sessions
    pub fn into_accounts(self) -> (S, D) {
        (self.source, self.destination)
    }
}

async fn fetch_recent<A: ActivityAccount>(
    account: &mut A,
    limit: u32,
) -> SyncResult<Vec<ActivitySummary>> {
    account.authenticate(false).await?;
    let activities = account.list_activities(0, limit).await?;
    info!(
        account = %account.label(),
        count = activities.len(),
        "Listed recent activities"
    );
    Ok(activities)
}
