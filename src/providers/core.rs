// ABOUTME: Account trait the sync engine drives, implemented by the Garmin Connect client
// ABOUTME: Lets the engine run against in-memory accounts without a live service
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Activity Account Contract
//!
//! The sync engine only needs four operations from an account: sign in,
//! list recent activities, download one activity file and upload one. The
//! [`ActivityAccount`] trait captures exactly that, so the engine can be
//! exercised with scripted accounts and the Garmin client stays free to
//! manage its session however the service requires.

use async_trait::async_trait;
use garmin_mirror_core::{ActivityFile, ActivitySummary, SyncResult};

/// One logged-in account on one service instance
///
/// Methods take `&mut self`: an account owns its session exclusively and is
/// never shared between concurrent tasks.
#[async_trait]
pub trait ActivityAccount: Send {
    /// Short label for logs (`primary`, `mirror`)
    fn label(&self) -> &str;

    /// Sign in, unless already signed in and `force` is false
    async fn authenticate(&mut self, force: bool) -> SyncResult<()>;

    /// Most recent activities, newest first
    async fn list_activities(&mut self, offset: u32, limit: u32)
        -> SyncResult<Vec<ActivitySummary>>;

    /// Original file of one activity
    async fn download_activity(&mut self, activity_id: i64) -> SyncResult<ActivityFile>;

    /// Import an activity file
    async fn upload_activity(&mut self, file: ActivityFile) -> SyncResult<()>;
}
