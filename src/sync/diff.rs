// ABOUTME: Set difference between the source and destination activity lists
// ABOUTME: Splits source activities into already-mirrored (skipped) and pending transfers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use garmin_mirror_core::ActivitySummary;

/// Source activities split by whether the destination already has them
#[derive(Debug, Default)]
pub struct TransferPlan<'a> {
    /// Source activities with no equivalent on the destination, in source order
    pub pending: Vec<&'a ActivitySummary>,
    /// Ids of source activities the destination already has, in source order
    pub skipped: Vec<i64>,
}

/// Compare every source activity against the destination list
///
/// Each source activity lands in exactly one of `pending` or `skipped`.
/// Destination items are never compared with each other.
#[must_use]
pub fn plan_transfers<'a>(
    source: &'a [ActivitySummary],
    destination: &[ActivitySummary],
) -> TransferPlan<'a> {
    let mut plan = TransferPlan::default();
    for activity in source {
        if destination
            .iter()
            .any(|existing| activity.is_same_activity(existing))
        {
            plan.skipped.push(activity.activity_id);
        } else {
            plan.pending.push(activity);
        }
    }
    plan
}
