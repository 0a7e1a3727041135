// ABOUTME: Error types for transport, SSO handshake, archive and decoding failures
// ABOUTME: Distinguishes fatal authentication errors from per-activity transfer errors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Sync Error Types
//!
//! Every fallible operation in the mirror returns [`SyncError`]. The variants
//! line up with the failure classes the sync engine reasons about:
//!
//! - transport: network failures, timeouts and unexpected status codes
//! - extraction: an expected HTML/JS marker is missing or unterminated
//! - credentials: the sign-in response carried no ticket URL
//! - archive: the downloaded activity archive is unreadable or empty
//! - decode: a JSON body does not have the expected shape

use std::fmt;

/// Result alias used across the mirror
pub type SyncResult<T> = Result<T, SyncError>;

/// Markers scraped out of SSO responses during the sign-in handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// Hidden `_csrf` input on the sign-in page
    CsrfToken,
    /// Inline social profile assignment on the post-login page
    SocialProfile,
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CsrfToken => write!(f, "CSRF token"),
            Self::SocialProfile => write!(f, "social profile"),
        }
    }
}

/// Errors raised while talking to a Garmin Connect instance
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The service answered with a status other than 200 or 201
    #[error("unexpected status code {status} from {url}")]
    UnexpectedStatus {
        /// HTTP status code returned by the service
        status: u16,
        /// Request URL, without credentials
        url: String,
    },

    /// Network failure, timeout or client construction error
    #[error("transport error: {0}")]
    Transport(String),

    /// The opening marker was not found in the response body
    #[error("{marker} not found")]
    MarkerNotFound {
        /// Which marker was being extracted
        marker: Marker,
    },

    /// The opening marker was found but its closing delimiter was not
    #[error("malformed {marker}")]
    MarkerMalformed {
        /// Which marker was being extracted
        marker: Marker,
    },

    /// The sign-in response did not contain a ticket URL
    #[error("wrong credentials")]
    WrongCredentials,

    /// The downloaded archive held no file
    #[error("no file in archive for activity {activity_id}")]
    EmptyArchive {
        /// Activity whose download was empty
        activity_id: i64,
    },

    /// The downloaded archive could not be read
    #[error("archive error: {0}")]
    Archive(String),

    /// A JSON body did not match the expected shape
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Invalid or missing configuration
    #[error("configuration error: {0}")]
    Config(String),
}

impl SyncError {
    /// Create a transport error from any displayable cause
    #[must_use]
    pub fn transport(message: impl fmt::Display) -> Self {
        Self::Transport(message.to_string())
    }

    /// Create an archive error from any displayable cause
    #[must_use]
    pub fn archive(message: impl fmt::Display) -> Self {
        Self::Archive(message.to_string())
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Whether the service rejected the request because the session is gone
    #[must_use]
    pub const fn is_session_expired(&self) -> bool {
        matches!(
            self,
            Self::UnexpectedStatus {
                status: 401 | 403,
                ..
            }
        )
    }

    /// Whether this error came out of the sign-in handshake
    #[must_use]
    pub const fn is_authentication_failure(&self) -> bool {
        matches!(
            self,
            Self::MarkerNotFound { .. } | Self::MarkerMalformed { .. } | Self::WrongCredentials
        )
    }
}

#[cfg(feature = "transport-errors")]
impl From<reqwest::Error> for SyncError {
    fn from(error: reqwest::Error) -> Self {
        if let Some(status) = error.status() {
            return Self::UnexpectedStatus {
                status: status.as_u16(),
                url: error.url().map(ToString::to_string).unwrap_or_default(),
            };
        }
        if error.is_timeout() {
            return Self::Transport(format!("request timed out: {error}"));
        }
        Self::Transport(error.to_string())
    }
}
