// ABOUTME: Environment configuration for the sync service
// ABOUTME: Reads listen address, account credentials, transport and list-window settings from env vars
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Environment-based configuration

use anyhow::{Context, Result};
use garmin_mirror_core::Credential;
use std::env;
use std::time::Duration;

use super::sync::SyncConfig;
use crate::sync::{ListLimits, DEFAULT_DESTINATION_LIMIT, DEFAULT_SOURCE_LIMIT};
use crate::utils::http_client::{
    parse_tls_version, TlsRange, TransportConfig, DEFAULT_TIMEOUT_SECS,
};

/// Default HTTP listen port
pub const DEFAULT_HTTP_PORT: u16 = 38080;

/// Default HTTP listen host
pub const DEFAULT_HTTP_HOST: &str = "127.0.0.1";

/// Server configuration loaded at startup
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface the trigger endpoint binds to
    pub host: String,
    /// Port the trigger endpoint listens on
    pub http_port: u16,
    /// Settings for every synchronization run
    pub sync: SyncConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a credential variable is missing or a numeric or
    /// TLS variable cannot be parsed
    pub fn from_env() -> Result<Self> {
        let http_port = env_var_or("PORT", &DEFAULT_HTTP_PORT.to_string())
            .parse::<u16>()
            .context("Invalid PORT value")?;
        let host = env_var_or("HOST", DEFAULT_HTTP_HOST);

        let source = credential_from_env("GARMIN_EMAIL", "GARMIN_PASSWORD")?;
        let destination = credential_from_env("GARMIN_CN_EMAIL", "GARMIN_CN_PASSWORD")?;

        let limits = ListLimits {
            source: env_var_or("SYNC_SOURCE_LIMIT", &DEFAULT_SOURCE_LIMIT.to_string())
                .parse::<u32>()
                .context("Invalid SYNC_SOURCE_LIMIT value")?,
            destination: env_var_or(
                "SYNC_DESTINATION_LIMIT",
                &DEFAULT_DESTINATION_LIMIT.to_string(),
            )
            .parse::<u32>()
            .context("Invalid SYNC_DESTINATION_LIMIT value")?,
        };

        let timeout_secs = env_var_or("HTTP_TIMEOUT_SECS", &DEFAULT_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .context("Invalid HTTP_TIMEOUT_SECS value")?;
        let transport = TransportConfig {
            timeout: Duration::from_secs(timeout_secs),
            tls: tls_range_from_env()?,
            ..TransportConfig::default()
        };

        let config = Self {
            host,
            http_port,
            sync: SyncConfig {
                limits,
                transport,
                ..SyncConfig::new(source, destination)
            },
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make every run a no-op or fail
    ///
    /// # Errors
    ///
    /// Returns an error if a list limit is zero or the TLS range is inverted
    pub fn validate(&self) -> Result<()> {
        if self.sync.limits.source == 0 || self.sync.limits.destination == 0 {
            return Err(anyhow::anyhow!(
                "SYNC_SOURCE_LIMIT and SYNC_DESTINATION_LIMIT must be positive"
            ));
        }
        if self.sync.transport.tls.min > self.sync.transport.tls.max {
            return Err(anyhow::anyhow!(
                "HTTP_TLS_MIN cannot be newer than HTTP_TLS_MAX"
            ));
        }
        Ok(())
    }

    /// Credential-free summary for the startup log
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Garmin Mirror Sync Configuration:\n\
             - Listen: {}:{}\n\
             - Source: {} @ {}\n\
             - Destination: {} @ {}\n\
             - List Limits: source {} / destination {}\n\
             - HTTP Timeout: {}s",
            self.host,
            self.http_port,
            self.sync.source.identifier,
            self.sync.source_endpoint.api_host,
            self.sync.destination.identifier,
            self.sync.destination_endpoint.api_host,
            self.sync.limits.source,
            self.sync.limits.destination,
            self.sync.transport.timeout.as_secs(),
        )
    }
}

fn credential_from_env(identifier_key: &str, secret_key: &str) -> Result<Credential> {
    let identifier =
        env::var(identifier_key).with_context(|| format!("{identifier_key} must be set"))?;
    let secret = env::var(secret_key).with_context(|| format!("{secret_key} must be set"))?;
    Ok(Credential::new(identifier, secret))
}

fn tls_range_from_env() -> Result<TlsRange> {
    let defaults = TlsRange::default();
    let min = match env::var("HTTP_TLS_MIN") {
        Ok(value) => parse_tls_version(&value)
            .with_context(|| format!("Invalid HTTP_TLS_MIN value: {value}"))?,
        Err(_) => defaults.min,
    };
    let max = match env::var("HTTP_TLS_MAX") {
        Ok(value) => parse_tls_version(&value)
            .with_context(|| format!("Invalid HTTP_TLS_MAX value: {value}"))?,
        Err(_) => defaults.max,
    };
    Ok(TlsRange { min, max })
}

/// Get environment variable or default value
fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}
