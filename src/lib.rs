// ABOUTME: Main library entry point for mirroring Garmin Connect activities between instances
// ABOUTME: Provides the cookie transport, the Garmin account client, the sync engine and the HTTP trigger
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Garmin Mirror Sync
//!
//! Copies the most recent activities of an account on the international
//! Garmin Connect instance into an account on the regional instance.
//!
//! ## Architecture
//!
//! - **Transport**: cookie-aware HTTP client, one per account
//! - **Providers**: Garmin account client with the SSO sign-in handshake
//! - **Sync**: concurrent listing, diff, sequential download and upload
//! - **Routes**: HTTP trigger returning the run outcome as JSON
//!
//! ## Example
//!
//! ```rust,no_run
//! use garmin_mirror_sync::config::SyncConfig;
//! use garmin_mirror_sync::sync::synchronize;
//! use garmin_mirror_core::Credential;
//!
//! # async fn run() -> garmin_mirror_core::SyncResult<()> {
//! let config = SyncConfig::new(
//!     Credential::new("runner@example.com", "source-password"),
//!     Credential::new("runner@example.cn", "mirror-password"),
//! );
//! let outcome = synchronize(&config).await?;
//! println!("{}", outcome.summary);
//! # Ok(())
//! # }
//! ```

/// Environment and per-run configuration
pub mod config;

/// Error types
pub mod errors;

/// Structured logging setup
pub mod logging;

/// Activity account abstraction and the Garmin client
pub mod providers;

/// HTTP trigger routes
pub mod routes;

/// Synchronization engine
pub mod sync;

/// HTTP transport utilities
pub mod utils;
