// ABOUTME: Garmin Connect service instances and the fixed request constants they share
// ABOUTME: Primary (international) and mirror (regional) endpoints plus SSO and API paths
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};

/// API host of the international instance
pub const PRIMARY_API_HOST: &str = "connect.garmin.com";

/// SSO origin of the international instance
pub const PRIMARY_SSO_BASE_URL: &str = "https://sso.garmin.com";

/// API host of the regional mirror instance
pub const MIRROR_API_HOST: &str = "connect.garmin.cn";

/// SSO origin of the regional mirror instance
pub const MIRROR_SSO_BASE_URL: &str = "https://sso.garmin.cn";

/// Browser User-Agent sent during the SSO handshake
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/90.0.4430.212 Safari/537.36";

/// SSO client id expected by the sign-in page
pub const SSO_CLIENT_ID: &str = "GarminConnect";

/// API paths relative to the API base URL
pub mod paths {
    /// Activity search (list) endpoint
    pub const ACTIVITY_SEARCH: &str = "/proxy/activitylist-service/activities/search/activities";
    /// Activity detail endpoint, followed by `/{id}`
    pub const ACTIVITY_DETAIL: &str = "/proxy/activity-service/activity";
    /// Original file download endpoint, followed by `/{id}`
    pub const ACTIVITY_DOWNLOAD: &str = "/modern/proxy/download-service/files/activity";
    /// FIT upload endpoint
    pub const ACTIVITY_UPLOAD: &str = "/modern/proxy/upload-service/upload/.fit";
    /// Import page used as the upload referer
    pub const IMPORT_PAGE: &str = "/modern/import-data";
    /// Landing page the SSO ticket is issued for
    pub const MODERN: &str = "/modern";
    /// SSO sign-in page, relative to the SSO base URL
    pub const SSO_SIGNIN: &str = "/sso/signin";
    /// SSO gauth host path, relative to the SSO base URL
    pub const SSO_GAUTH: &str = "/sso";
}

/// One Garmin Connect deployment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceEndpoint {
    /// Host name of the API (`connect.garmin.com`)
    pub api_host: String,
    /// Scheme and host of the API (`https://connect.garmin.com`)
    pub api_base_url: String,
    /// Scheme and host of the SSO service (`https://sso.garmin.com`)
    pub sso_base_url: String,
}

impl ServiceEndpoint {
    /// The international instance activities are copied from
    #[must_use]
    pub fn primary() -> Self {
        Self::from_host(PRIMARY_API_HOST, PRIMARY_SSO_BASE_URL)
    }

    /// The regional instance activities are copied to
    #[must_use]
    pub fn mirror() -> Self {
        Self::from_host(MIRROR_API_HOST, MIRROR_SSO_BASE_URL)
    }

    /// Build an HTTPS endpoint from an API host and an SSO origin
    #[must_use]
    pub fn from_host(api_host: &str, sso_base_url: &str) -> Self {
        Self {
            api_host: api_host.to_owned(),
            api_base_url: format!("https://{api_host}"),
            sso_base_url: sso_base_url.trim_end_matches('/').to_owned(),
        }
    }

    /// Build an endpoint from explicit base URLs (local proxies, test doubles)
    #[must_use]
    pub fn from_base_urls(api_base_url: &str, sso_base_url: &str) -> Self {
        let api_base_url = api_base_url.trim_end_matches('/');
        let api_host = api_base_url
            .split_once("://")
            .map_or(api_base_url, |(_, rest)| rest)
            .to_owned();
        Self {
            api_host,
            api_base_url: api_base_url.to_owned(),
            sso_base_url: sso_base_url.trim_end_matches('/').to_owned(),
        }
    }

    /// Absolute URL of an API path
    #[must_use]
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{path}", self.api_base_url)
    }

    /// Absolute URL of an SSO path
    #[must_use]
    pub fn sso_url(&self, path: &str) -> String {
        format!("{}{path}", self.sso_base_url)
    }

    /// Query parameters the SSO sign-in page expects, in request order
    #[must_use]
    pub fn sso_signin_params(&self) -> Vec<(String, String)> {
        vec![
            ("service".to_owned(), self.api_url(paths::MODERN)),
            ("clientId".to_owned(), SSO_CLIENT_ID.to_owned()),
            ("gauthHost".to_owned(), self.sso_url(paths::SSO_GAUTH)),
            ("generateExtraServiceTicket".to_owned(), "true".to_owned()),
            ("generateTwoExtraServiceTickets".to_owned(), "true".to_owned()),
            ("consumeServiceTicket".to_owned(), "false".to_owned()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_instances_differ() {
        let primary = ServiceEndpoint::primary();
        let mirror = ServiceEndpoint::mirror();

        assert_eq!(primary.api_base_url, "https://connect.garmin.com");
        assert_eq!(mirror.api_base_url, "https://connect.garmin.cn");
        assert_ne!(primary.sso_base_url, mirror.sso_base_url);
    }

    #[test]
    fn test_from_base_urls_derives_host() {
        let endpoint =
            ServiceEndpoint::from_base_urls("http://127.0.0.1:4100/", "http://127.0.0.1:4100");
        assert_eq!(endpoint.api_host, "127.0.0.1:4100");
        assert_eq!(endpoint.api_base_url, "http://127.0.0.1:4100");
        assert_eq!(
            endpoint.api_url(paths::ACTIVITY_SEARCH),
            "http://127.0.0.1:4100/proxy/activitylist-service/activities/search/activities"
        );
    }

    #[test]
    fn test_signin_params_point_at_own_instance() {
        let params = ServiceEndpoint::mirror().sso_signin_params();
        assert_eq!(params.len(), 6);
        assert_eq!(params[0].1, "https://connect.garmin.cn/modern");
        assert_eq!(params[2].1, "https://sso.garmin.cn/sso");
    }
}
