// ABOUTME: Service account integrations the sync engine reads from and writes to
// ABOUTME: Defines the account trait and the Garmin Connect implementation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Account trait driven by the sync engine
pub mod core;

/// Garmin Connect client and sign-in handshake
pub mod garmin;

pub use self::core::ActivityAccount;
pub use garmin::GarminClient;
