// ABOUTME: Utility module for shared infrastructure helpers
// ABOUTME: Holds the cookie-aware HTTP transport used by every account client
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Cookie-aware HTTP transport
pub mod http_client;
