// ABOUTME: Configuration module for the sync service
// ABOUTME: Environment loading for the server and the explicit per-run sync configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Environment and server configuration
pub mod environment;
/// Configuration handed to each synchronization run
pub mod sync;

pub use environment::ServerConfig;
pub use sync::SyncConfig;
