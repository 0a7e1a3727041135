// ABOUTME: Garmin Connect account client driving the SSO handshake and activity endpoints
// ABOUTME: Owns one cookie transport per account and downloads/uploads activity files
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use async_trait::async_trait;
use garmin_mirror_core::endpoint::{paths, BROWSER_USER_AGENT};
use garmin_mirror_core::{
    ActivityDetail, ActivityFile, ActivitySummary, Credential, ServiceEndpoint, SyncError,
    SyncResult,
};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ORIGIN, REFERER, USER_AGENT};
use std::io::{Cursor, Read};
use tracing::{debug, info, instrument, warn};
use zip::ZipArchive;

use super::handshake::{self, HandshakeStage, TicketPattern};
use crate::providers::core::ActivityAccount;
use crate::utils::http_client::{CookieTransport, RequestBody, TransportConfig};

/// Multipart field the upload service reads the file from
const UPLOAD_FIELD_NAME: &str = "file";

/// Client for one account on one Garmin Connect instance
///
/// Signs in lazily on first use. The `authenticated` flag is only a hint: a
/// session that expired server-side is discovered by the next failing call,
/// which triggers one forced re-login for listing and downloading.
pub struct GarminClient {
    label: String,
    credential: Credential,
    endpoint: ServiceEndpoint,
    transport: CookieTransport,
    ticket_pattern: TicketPattern,
    authenticated: bool,
}

impl GarminClient {
    /// Create an unauthenticated client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built for the TLS range
    pub fn new(
        label: impl Into<String>,
        credential: Credential,
        endpoint: ServiceEndpoint,
        transport_config: &TransportConfig,
    ) -> SyncResult<Self> {
        Ok(Self {
            label: label.into(),
            ticket_pattern: TicketPattern::for_endpoint(&endpoint)?,
            transport: CookieTransport::new(transport_config)?,
            credential,
            endpoint,
            authenticated: false,
        })
    }

    /// Whether the last sign-in succeeded
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Service instance this client talks to
    #[must_use]
    pub const fn endpoint(&self) -> &ServiceEndpoint {
        &self.endpoint
    }

    /// Account identifier (email)
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.credential.identifier
    }

    /// Sign in through the SSO handshake
    ///
    /// Returns immediately without any request when already signed in,
    /// unless `force` is set.
    ///
    /// # Errors
    ///
    /// Returns a transport error, a marker extraction error, or
    /// `WrongCredentials` when the sign-in response carries no ticket
    pub async fn authenticate(&mut self, force: bool) -> SyncResult<()> {
        if force {
            self.authenticated = false;
        }
        if self.authenticated {
            debug!(account = %self.label, "Already authenticated");
            return Ok(());
        }

        self.sign_in().await
    }

    #[instrument(skip(self), fields(account = %self.label, sso = %self.endpoint.sso_base_url))]
    async fn sign_in(&mut self) -> SyncResult<()> {
        self.authenticated = false;
        let mut stage = HandshakeStage::Unauthenticated;

        let signin_url = self.endpoint.sso_url(paths::SSO_SIGNIN);
        let params = self.endpoint.sso_signin_params();

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        self.transport.set_headers(headers.clone());

        let page = self.transport.get(&signin_url, &params).await?;
        let csrf_token = handshake::extract_csrf_token(&page)?;
        stage = advance(stage, HandshakeStage::TokensExtracted);

        headers.insert(ORIGIN, header_value(&self.endpoint.sso_base_url)?);
        headers.insert(
            REFERER,
            header_value(&handshake::signin_referer(&signin_url, &params))?,
        );
        self.transport.set_headers(headers);

        let form = RequestBody::form([
            ("username", self.credential.identifier.as_str()),
            ("password", self.credential.secret()),
            ("embed", "false"),
            ("_csrf", csrf_token.as_str()),
        ]);
        let response = self.transport.post(&signin_url, &params, form).await?;
        let ticket_url = self.ticket_pattern.extract(&response)?;
        stage = advance(stage, HandshakeStage::TicketObtained);

        let landing = self.transport.get(&ticket_url, &[]).await?;
        let profile = handshake::extract_social_profile(&landing)?;
        stage = advance(stage, HandshakeStage::ProfileConfirmed);
        debug!(profile_len = profile.len(), stage = %stage, "Social profile found");

        self.authenticated = true;
        info!(account = %self.label, "Signed in to Garmin Connect");
        Ok(())
    }

    /// Recent activities, `limit` entries starting at `offset`
    ///
    /// # Errors
    ///
    /// Returns an error if signing in fails, the request fails, or the
    /// payload is not an activity list
    #[instrument(skip(self), fields(account = %self.label))]
    pub async fn get_activity_list(
        &mut self,
        offset: u32,
        limit: u32,
    ) -> SyncResult<Vec<ActivitySummary>> {
        self.authenticate(false).await?;
        match self.fetch_activity_list(offset, limit).await {
            Err(e) if e.is_session_expired() => {
                warn!(error = %e, "Session rejected while listing, signing in again");
                self.authenticate(true).await?;
                self.fetch_activity_list(offset, limit).await
            }
            result => result,
        }
    }

    async fn fetch_activity_list(
        &self,
        offset: u32,
        limit: u32,
    ) -> SyncResult<Vec<ActivitySummary>> {
        let url = self.endpoint.api_url(paths::ACTIVITY_SEARCH);
        let query = [
            ("start".to_owned(), offset.to_string()),
            ("limit".to_owned(), limit.to_string()),
        ];
        let activities: Vec<ActivitySummary> = self.transport.get_json(&url, &query).await?;
        debug!(count = activities.len(), "Fetched activity list");
        Ok(activities)
    }

    /// Full detail of one activity
    ///
    /// # Errors
    ///
    /// Returns an error if signing in or the request fails, or the payload
    /// has no activity id
    #[instrument(skip(self), fields(account = %self.label))]
    pub async fn get_activity_detail(&mut self, activity_id: i64) -> SyncResult<ActivityDetail> {
        self.authenticate(false).await?;
        match self.fetch_activity_detail(activity_id).await {
            Err(e) if e.is_session_expired() => {
                warn!(error = %e, "Session rejected while reading detail, signing in again");
                self.authenticate(true).await?;
                self.fetch_activity_detail(activity_id).await
            }
            result => result,
        }
    }

    async fn fetch_activity_detail(&self, activity_id: i64) -> SyncResult<ActivityDetail> {
        let url = format!(
            "{}/{activity_id}",
            self.endpoint.api_url(paths::ACTIVITY_DETAIL)
        );
        self.transport.get_json(&url, &[]).await
    }

    /// Download the original file of one activity
    ///
    /// # Errors
    ///
    /// Returns an error if the download fails or the archive is empty
    #[instrument(skip(self), fields(account = %self.label))]
    pub async fn download_activity(&mut self, activity_id: i64) -> SyncResult<ActivityFile> {
        self.authenticate(false).await?;
        let archive = match self.fetch_archive(activity_id).await {
            Err(e) if e.is_session_expired() => {
                warn!(error = %e, "Session rejected while downloading, signing in again");
                self.authenticate(true).await?;
                self.fetch_archive(activity_id).await?
            }
            result => result?,
        };
        unpack_single_file(activity_id, archive)
    }

    async fn fetch_archive(&self, activity_id: i64) -> SyncResult<Vec<u8>> {
        let url = format!(
            "{}/{activity_id}",
            self.endpoint.api_url(paths::ACTIVITY_DOWNLOAD)
        );
        self.transport.get_file(&url, &[]).await
    }

    /// Upload an activity file through the import endpoint
    ///
    /// The response body is logged, not inspected; only the status code
    /// decides success.
    ///
    /// # Errors
    ///
    /// Returns an error if signing in fails or the service rejects the upload
    #[instrument(skip(self, file), fields(account = %self.label, file_name = %file.file_name))]
    pub async fn upload_activity(&mut self, file: ActivityFile) -> SyncResult<()> {
        self.authenticate(false).await?;

        let mut headers = HeaderMap::new();
        headers.insert(ORIGIN, header_value(&self.endpoint.api_base_url)?);
        headers.insert(
            REFERER,
            header_value(&self.endpoint.api_url(paths::IMPORT_PAGE))?,
        );
        headers.insert(HeaderName::from_static("nk"), HeaderValue::from_static("NT"));
        self.transport.merge_headers(headers);

        let url = self.endpoint.api_url(paths::ACTIVITY_UPLOAD);
        let response = self
            .transport
            .upload_file(&url, &[], UPLOAD_FIELD_NAME, &file.file_name, file.content)
            .await?;

        info!(response = %response, "Activity uploaded");
        Ok(())
    }
}

#[async_trait]
impl ActivityAccount for GarminClient {
    fn label(&self) -> &str {
        &self.label
    }

    async fn authenticate(&mut self, force: bool) -> SyncResult<()> {
        Self::authenticate(self, force).await
    }

    async fn list_activities(
        &mut self,
        offset: u32,
        limit: u32,
    ) -> SyncResult<Vec<ActivitySummary>> {
        self.get_activity_list(offset, limit).await
    }

    async fn download_activity(&mut self, activity_id: i64) -> SyncResult<ActivityFile> {
        Self::download_activity(self, activity_id).await
    }

    async fn upload_activity(&mut self, file: ActivityFile) -> SyncResult<()> {
        Self::upload_activity(self, file).await
    }
}

fn advance(from: HandshakeStage, to: HandshakeStage) -> HandshakeStage {
    debug!(from = %from, to = %to, "Handshake progressed");
    to
}

fn header_value(value: &str) -> SyncResult<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| SyncError::config(format!("invalid header value {value:?}: {e}")))
}

/// Read the single entry of an activity download archive
///
/// Only the first entry is returned if the archive holds several.
///
/// # Errors
///
/// Returns `EmptyArchive` for an archive without entries and `Archive` for
/// bytes that are not a readable ZIP
pub fn unpack_single_file(activity_id: i64, archive: Vec<u8>) -> SyncResult<ActivityFile> {
    let mut archive = ZipArchive::new(Cursor::new(archive)).map_err(SyncError::archive)?;
    if archive.is_empty() {
        return Err(SyncError::EmptyArchive { activity_id });
    }

    let mut entry = archive.by_index(0).map_err(SyncError::archive)?;
    let file_name = entry.name().to_owned();
    let mut content = Vec::with_capacity(usize::try_from(entry.size()).unwrap_or_default());
    entry.read_to_end(&mut content).map_err(SyncError::archive)?;
    debug!(activity_id, file_name = %file_name, size = content.len(), "Unpacked activity file");

    Ok(ActivityFile { file_name, content })
}
