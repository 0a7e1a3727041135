// ABOUTME: Error types shared by the transport, the account client and the sync engine
// ABOUTME: Re-exports the core error enum so callers need a single import path
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub use garmin_mirror_core::errors::{Marker, SyncError, SyncResult};
