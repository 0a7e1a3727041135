// ABOUTME: Core types for the Garmin Connect activity mirror
// ABOUTME: Foundation crate with error types, activity models, and service endpoint constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Garmin Mirror Core
//!
//! Dependency-light types shared between the account client, the sync engine
//! and the HTTP trigger:
//!
//! - [`errors`]: the `SyncError` enum every layer returns
//! - [`models`]: activity summaries, credentials and the sync outcome
//! - [`endpoint`]: the two service instances activities move between

/// Service endpoints and fixed request constants
pub mod endpoint;

/// Unified error type for transport, handshake and archive failures
pub mod errors;

/// Activity, credential and sync outcome models
pub mod models;

pub use endpoint::ServiceEndpoint;
pub use errors::{Marker, SyncError, SyncResult};
pub use models::{ActivityDetail, ActivityFile, ActivitySummary, Credential, SyncOutcome};
