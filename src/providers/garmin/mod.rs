// ABOUTME: Garmin Connect account client and SSO handshake extraction rules
// ABOUTME: Screen-scraped sign-in plus activity list, detail, download and upload endpoints
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Account client for one Garmin Connect instance
pub mod client;

/// Markup extraction rules for the SSO sign-in handshake
pub mod handshake;

pub use client::{unpack_single_file, GarminClient};
pub use handshake::HandshakeStage;
