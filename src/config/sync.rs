// ABOUTME: Explicit configuration object handed to a synchronization run
// ABOUTME: Bundles both account credentials, their service endpoints, list limits and transport settings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use garmin_mirror_core::{Credential, ServiceEndpoint};

use crate::sync::ListLimits;
use crate::utils::http_client::TransportConfig;

/// Everything one synchronization run needs
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Account activities are read from
    pub source: Credential,
    /// Account activities are mirrored into
    pub destination: Credential,
    /// Service hosting the source account
    pub source_endpoint: ServiceEndpoint,
    /// Service hosting the destination account
    pub destination_endpoint: ServiceEndpoint,
    /// Size of the recent-activity windows
    pub limits: ListLimits,
    /// HTTP settings applied to both accounts
    pub transport: TransportConfig,
}

impl SyncConfig {
    /// Primary-to-mirror configuration with default limits and transport
    #[must_use]
    pub fn new(source: Credential, destination: Credential) -> Self {
        Self {
            source,
            destination,
            source_endpoint: ServiceEndpoint::primary(),
            destination_endpoint: ServiceEndpoint::mirror(),
            limits: ListLimits::default(),
            transport: TransportConfig::default(),
        }
    }

    /// Replace both service endpoints
    #[must_use]
    pub fn with_endpoints(mut self, source: ServiceEndpoint, destination: ServiceEndpoint) -> Self {
        self.source_endpoint = source;
        self.destination_endpoint = destination;
        self
    }

    /// Replace the list limits
    #[must_use]
    pub const fn with_limits(mut self, limits: ListLimits) -> Self {
        self.limits = limits;
        self
    }
}
