// ABOUTME: Activity summaries, credentials and the aggregate sync outcome
// ABOUTME: Holds the permissive equivalence rule deciding whether two activities are the same
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Login for one Garmin Connect account
///
/// The secret is wrapped in [`SecretString`] so it never shows up in `Debug`
/// output or structured log fields.
pub struct Credential {
    /// Account identifier (email address)
    pub identifier: String,
    secret: SecretString,
}

impl Credential {
    /// Create a credential from an identifier and a cleartext secret
    #[must_use]
    pub fn new(identifier: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            secret: SecretString::new(secret.into()),
        }
    }

    /// Cleartext secret, only for building the sign-in form
    #[must_use]
    pub fn secret(&self) -> &str {
        self.secret.expose_secret()
    }
}

impl Clone for Credential {
    fn clone(&self) -> Self {
        Self::new(self.identifier.clone(), self.secret.expose_secret().clone())
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("identifier", &self.identifier)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// One entry of the activity search endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivitySummary {
    /// Numeric activity id, unique within one instance
    #[serde(rename = "activityId")]
    pub activity_id: i64,
    /// Display name
    #[serde(rename = "activityName", default)]
    pub activity_name: Option<String>,
    /// Start time in the athlete's local time zone
    #[serde(rename = "startTimeLocal", default)]
    pub start_time_local: String,
    /// Start time in UTC
    #[serde(rename = "startTimeGMT", default)]
    pub start_time_gmt: String,
}

impl ActivitySummary {
    /// Whether `other` represents the same real-world activity
    ///
    /// Matches on the id, then the UTC start, then the local start. The rule
    /// is a permissive OR and is not transitive, so it is only ever applied
    /// pairwise between a source and a destination item. Two unrelated
    /// activities that started at the same local clock time compare equal.
    #[must_use]
    pub fn is_same_activity(&self, other: &Self) -> bool {
        self.activity_id == other.activity_id
            || self.start_time_gmt == other.start_time_gmt
            || self.start_time_local == other.start_time_local
    }
}

/// Full activity detail as returned by the activity service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityDetail {
    /// Numeric activity id
    #[serde(rename = "activityId")]
    pub activity_id: i64,
    /// Display name
    #[serde(rename = "activityName", default)]
    pub activity_name: Option<String>,
    /// Every other field of the payload, untouched
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

/// An activity file unpacked from a download archive
#[derive(Clone, PartialEq, Eq)]
pub struct ActivityFile {
    /// Entry name inside the archive (`12345_ACTIVITY.fit`)
    pub file_name: String,
    /// Raw file content
    pub content: Vec<u8>,
}

impl fmt::Debug for ActivityFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActivityFile")
            .field("file_name", &self.file_name)
            .field("size", &self.content.len())
            .finish()
    }
}

/// Result of one synchronize run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncOutcome {
    /// Source ids copied to the destination
    pub succeeded: Vec<i64>,
    /// Source ids whose download or upload failed
    pub failed: Vec<i64>,
    /// Source ids already present on the destination
    pub skipped: Vec<i64>,
    /// False only when nothing succeeded and at least one transfer failed
    pub success: bool,
    /// Human-readable listing of the three id lists
    pub summary: String,
}

impl SyncOutcome {
    /// Aggregate the per-activity classifications of a run
    #[must_use]
    pub fn from_results(succeeded: Vec<i64>, failed: Vec<i64>, skipped: Vec<i64>) -> Self {
        let success = !(succeeded.is_empty() && !failed.is_empty());
        let summary = format!(
            "id{} succeeded. id{} failed. id{} skipped.",
            id_list(&succeeded),
            id_list(&failed),
            id_list(&skipped)
        );
        Self {
            succeeded,
            failed,
            skipped,
            success,
            summary,
        }
    }

    /// Number of source activities the run classified
    #[must_use]
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len() + self.skipped.len()
    }
}

/// Bracketed, space-separated ids (`[1 2 3]`)
fn id_list(ids: &[i64]) -> String {
    let joined = ids
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    format!("[{joined}]")
}
