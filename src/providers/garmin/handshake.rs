// ABOUTME: Extraction rules for the Garmin SSO sign-in handshake
// ABOUTME: Scrapes the CSRF token, ticket URL and social profile marker out of HTML/JS responses
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # SSO Handshake Extraction
//!
//! Garmin Connect has no documented login API. Signing in means replaying
//! what the browser does and pulling three values out of the markup:
//!
//! 1. the `_csrf` hidden input of the sign-in page
//! 2. the escaped ticket URL embedded in the sign-in POST response
//! 3. the `VIEWER_SOCIAL_PROFILE` assignment on the page the ticket opens
//!
//! All three rules live here so a markup change upstream only touches this
//! file and its fixtures.

use garmin_mirror_core::{Marker, ServiceEndpoint, SyncError, SyncResult};
use regex::Regex;
use std::fmt;

use crate::utils::http_client::{encode_form, QueryParams};

const CSRF_PREFIX: &str = r#"<input type="hidden" name="_csrf" value=""#;
const CSRF_SUFFIX: &str = r#"" />"#;
const PROFILE_PREFIX: &str = r#"window.VIEWER_SOCIAL_PROFILE = JSON.parse(""#;
const PROFILE_SUFFIX: &str = r#"");"#;

/// Progress of one sign-in attempt
///
/// Any failure drops back to `Unauthenticated`; an attempt never resumes
/// from the middle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeStage {
    /// Nothing extracted yet
    Unauthenticated,
    /// CSRF token read from the sign-in page
    TokensExtracted,
    /// Ticket URL read from the sign-in response
    TicketObtained,
    /// Profile marker found on the post-login page
    ProfileConfirmed,
}

impl fmt::Display for HandshakeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthenticated => write!(f, "unauthenticated"),
            Self::TokensExtracted => write!(f, "tokens-extracted"),
            Self::TicketObtained => write!(f, "ticket-obtained"),
            Self::ProfileConfirmed => write!(f, "profile-confirmed"),
        }
    }
}

fn extract_between<'a>(
    body: &'a str,
    prefix: &str,
    suffix: &str,
    marker: Marker,
) -> SyncResult<&'a str> {
    let start = body
        .find(prefix)
        .ok_or(SyncError::MarkerNotFound { marker })?
        + prefix.len();
    let rest = &body[start..];
    let end = rest
        .find(suffix)
        .ok_or(SyncError::MarkerMalformed { marker })?;
    Ok(&rest[..end])
}

/// Read the CSRF token from the sign-in page
///
/// # Errors
///
/// Returns `MarkerNotFound` when the hidden input is absent and
/// `MarkerMalformed` when its closing `" />` is missing
pub fn extract_csrf_token(body: &str) -> SyncResult<String> {
    extract_between(body, CSRF_PREFIX, CSRF_SUFFIX, Marker::CsrfToken).map(str::to_owned)
}

/// Read the social profile blob from the post-login page, backslashes removed
///
/// Only its presence matters; the content is not parsed.
///
/// # Errors
///
/// Returns `MarkerNotFound` / `MarkerMalformed` like [`extract_csrf_token`]
pub fn extract_social_profile(body: &str) -> SyncResult<String> {
    extract_between(body, PROFILE_PREFIX, PROFILE_SUFFIX, Marker::SocialProfile)
        .map(|profile| profile.replace('\\', ""))
}

/// Matcher for the escaped ticket URL of one service instance
#[derive(Debug, Clone)]
pub struct TicketPattern {
    regex: Regex,
}

impl TicketPattern {
    /// Build the matcher for `endpoint`'s API base URL
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the derived pattern does not compile
    pub fn for_endpoint(endpoint: &ServiceEndpoint) -> SyncResult<Self> {
        let escaped_base = regex::escape(&endpoint.api_base_url.replace('/', "\\/"));
        let pattern = format!(r"{escaped_base}\\/modern(?:\\/)?\?ticket=[A-Za-z0-9-]*");
        let regex = Regex::new(&pattern)
            .map_err(|e| SyncError::config(format!("invalid ticket pattern: {e}")))?;
        Ok(Self { regex })
    }

    /// Find the ticket URL in the sign-in response and undo the `\/` escaping
    ///
    /// # Errors
    ///
    /// Returns `WrongCredentials` when no ticket URL is present; the service
    /// gives no other signal for a rejected login
    pub fn extract(&self, body: &str) -> SyncResult<String> {
        self.regex
            .find(body)
            .map(|found| found.as_str().replace("\\/", "/"))
            .ok_or(SyncError::WrongCredentials)
    }
}

/// Referer the sign-in POST must carry: the sign-in URL with its query
#[must_use]
pub fn signin_referer(signin_url: &str, params: &QueryParams) -> String {
    format!("{signin_url}?{}", encode_form(params))
}
