// ABOUTME: Cookie-aware HTTP transport with pinned TLS range and fixed request timeout
// ABOUTME: One instance per account so the session cookie jar is never shared between logins
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use garmin_mirror_core::{SyncError, SyncResult};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::tls::Version;
use reqwest::{Client, ClientBuilder, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};
use url::{form_urlencoded, Url};

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default connection timeout in seconds
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const JSON_CONTENT_TYPE: &str = "application/json";

/// Query parameters merged into a request URL
pub type QueryParams = [(String, String)];

/// Allowed TLS protocol versions
///
/// The upstream edge proxy rejects handshakes negotiated at the newest TLS
/// version, so the default range stops at TLS 1.2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TlsRange {
    /// Lowest version offered
    pub min: Version,
    /// Highest version offered
    pub max: Version,
}

impl Default for TlsRange {
    fn default() -> Self {
        Self {
            min: Version::TLS_1_2,
            max: Version::TLS_1_2,
        }
    }
}

/// Parse a TLS version written as `1.0`, `1.1`, `1.2` or `1.3`
#[must_use]
pub fn parse_tls_version(value: &str) -> Option<Version> {
    match value.trim().to_lowercase().trim_start_matches("tls").trim() {
        "1.0" | "1" => Some(Version::TLS_1_0),
        "1.1" => Some(Version::TLS_1_1),
        "1.2" => Some(Version::TLS_1_2),
        "1.3" => Some(Version::TLS_1_3),
        _ => None,
    }
}

/// Settings shared by every transport instance
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Per-request timeout
    pub timeout: Duration,
    /// Connection establishment timeout
    pub connect_timeout: Duration,
    /// Negotiable TLS versions
    pub tls: TlsRange,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            tls: TlsRange::default(),
        }
    }
}

/// Request body variants
#[derive(Debug, Clone)]
pub enum RequestBody {
    /// No body
    Empty,
    /// Form-url-encoded key/value pairs
    Form(Vec<(String, String)>),
    /// JSON document, sent with a forced JSON content type
    Json(serde_json::Value),
    /// Pre-encoded bytes, sent as is
    Raw {
        /// Encoded body
        bytes: Vec<u8>,
        /// Content type to send, if any
        content_type: Option<HeaderValue>,
    },
}

impl RequestBody {
    /// Build a form body from borrowed pairs
    #[must_use]
    pub fn form<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self::Form(
            pairs
                .into_iter()
                .map(|(key, value)| (key.to_owned(), value.to_owned()))
                .collect(),
        )
    }
}

/// Merge `params` into the query of `url`
///
/// Parameters already present under the same name are replaced; every other
/// existing parameter is kept.
///
/// # Errors
///
/// Returns an error if `url` is not an absolute URL
pub fn merge_query(url: &str, params: &QueryParams) -> SyncResult<Url> {
    let mut parsed =
        Url::parse(url).map_err(|e| SyncError::transport(format!("invalid URL {url}: {e}")))?;
    if params.is_empty() {
        return Ok(parsed);
    }

    let mut pairs: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(key, _)| !params.iter().any(|(name, _)| name.as_str() == key.as_ref()))
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    pairs.extend(params.iter().cloned());

    parsed.query_pairs_mut().clear().extend_pairs(pairs);
    Ok(parsed)
}

/// Encode pairs as `application/x-www-form-urlencoded`
#[must_use]
pub fn encode_form(pairs: &QueryParams) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

/// HTTP client that keeps one cookie jar across all its requests
///
/// The jar is what carries the authenticated session after the SSO
/// handshake, so an instance must stay bound to a single account.
pub struct CookieTransport {
    client: Client,
    headers: HeaderMap,
}

impl CookieTransport {
    /// Build a transport with its own cookie store
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend rejects the configured range
    pub fn new(config: &TransportConfig) -> SyncResult<Self> {
        let client = ClientBuilder::new()
            .use_rustls_tls()
            .cookie_store(true)
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .min_tls_version(config.tls.min)
            .max_tls_version(config.tls.max)
            .build()
            .map_err(|e| SyncError::transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            headers: HeaderMap::new(),
        })
    }

    /// Replace the headers sent with every request
    pub fn set_headers(&mut self, headers: HeaderMap) {
        self.headers = headers;
    }

    /// Add or overwrite individual headers, keeping the rest
    pub fn merge_headers(&mut self, headers: HeaderMap) {
        for (name, value) in &headers {
            self.headers.insert(name.clone(), value.clone());
        }
    }

    /// Headers currently sent with every request
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// GET `url` and return the body as text
    ///
    /// # Errors
    ///
    /// Returns an error on network failure or a status other than 200/201
    pub async fn get(&self, url: &str, query: &QueryParams) -> SyncResult<String> {
        let response = self
            .send(Method::GET, url, query, RequestBody::Empty)
            .await?;
        Self::read_text(response).await
    }

    /// GET `url` and decode the JSON body
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or if the body does not decode into `T`
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &QueryParams,
    ) -> SyncResult<T> {
        let text = self.get(url, query).await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// POST `body` to `url` and return the response body as text
    ///
    /// # Errors
    ///
    /// Returns an error on network failure or a status other than 200/201
    pub async fn post(
        &self,
        url: &str,
        query: &QueryParams,
        body: RequestBody,
    ) -> SyncResult<String> {
        let response = self.send(Method::POST, url, query, body).await?;
        Self::read_text(response).await
    }

    /// POST `body` to `url` and decode the JSON response
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or if the body does not decode into `T`
    pub async fn post_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &QueryParams,
        body: RequestBody,
    ) -> SyncResult<T> {
        let text = self.post(url, query, body).await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// GET `url` and return the raw response bytes
    ///
    /// # Errors
    ///
    /// Returns an error on network failure or a status other than 200/201
    pub async fn get_file(&self, url: &str, query: &QueryParams) -> SyncResult<Vec<u8>> {
        let response = self
            .send(Method::GET, url, query, RequestBody::Empty)
            .await?;
        let bytes = response.bytes().await?;
        debug!(size = bytes.len(), "Downloaded file");
        Ok(bytes.to_vec())
    }

    /// POST `content` as a multipart file field, with `params` as extra fields
    ///
    /// # Errors
    ///
    /// Returns an error on network failure or a status other than 200/201
    pub async fn upload_file(
        &self,
        url: &str,
        params: &QueryParams,
        field_name: &str,
        file_name: &str,
        content: Vec<u8>,
    ) -> SyncResult<String> {
        let part = Part::bytes(content).file_name(file_name.to_owned());
        let form = params
            .iter()
            .fold(Form::new().part(field_name.to_owned(), part), |form, (key, value)| {
                form.text(key.clone(), value.clone())
            });

        let mut headers = self.headers.clone();
        headers.remove(CONTENT_TYPE);

        debug!(url = %url, file_name = %file_name, "Uploading file");
        let builder = self.client.post(url).headers(headers).multipart(form);
        let response = Self::execute(builder).await?;
        Self::read_text(response).await
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        query: &QueryParams,
        body: RequestBody,
    ) -> SyncResult<Response> {
        let url = merge_query(url, query)?;
        let mut headers = self.headers.clone();

        let builder = self.client.request(method.clone(), url.clone());
        let builder = match body {
            RequestBody::Empty => {
                if method == Method::POST && !headers.contains_key(CONTENT_TYPE) {
                    headers.insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
                }
                builder
            }
            RequestBody::Form(pairs) => {
                if !headers.contains_key(CONTENT_TYPE) {
                    headers.insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
                }
                builder.body(encode_form(&pairs))
            }
            RequestBody::Json(value) => {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
                builder.body(serde_json::to_vec(&value)?)
            }
            RequestBody::Raw {
                bytes,
                content_type,
            } => {
                if let Some(content_type) = content_type {
                    headers.insert(CONTENT_TYPE, content_type);
                }
                builder.body(bytes)
            }
        };

        debug!(method = %method, url = %redacted(&url), "Sending request");
        Self::execute(builder.headers(headers)).await
    }

    async fn execute(builder: RequestBuilder) -> SyncResult<Response> {
        let response = builder.send().await?;
        let status = response.status();
        if status == StatusCode::OK || status == StatusCode::CREATED {
            return Ok(response);
        }

        let url = redacted(response.url());
        let body = response.text().await.unwrap_or_default();
        warn!(
            status = status.as_u16(),
            url = %url,
            body_len = body.len(),
            "Unexpected status code"
        );
        debug!(body = %body, "Unexpected status body");

        Err(SyncError::UnexpectedStatus {
            status: status.as_u16(),
            url,
        })
    }

    async fn read_text(response: Response) -> SyncResult<String> {
        let text = response.text().await?;
        debug!(body = %text, "Response body");
        Ok(text)
    }
}

/// URL without its query string, safe to log (tickets travel in the query)
fn redacted(url: &Url) -> String {
    let mut url = url.clone();
    url.set_query(None);
    url.to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn test_merge_query_keeps_existing_params() {
        let url = merge_query(
            "https://connect.garmin.com/search?sort=desc&start=5",
            &params(&[("start", "0"), ("limit", "3")]),
        )
        .unwrap();

        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(pairs, params(&[("sort", "desc"), ("start", "0"), ("limit", "3")]));
    }

    #[test]
    fn test_merge_query_without_params_leaves_url_untouched() {
        let raw = "https://connect.garmin.com/modern/?ticket=ST-0123-abc-cas";
        let url = merge_query(raw, &[]).unwrap();
        assert_eq!(url.as_str(), raw);
    }

    #[test]
    fn test_merge_query_rejects_relative_url() {
        assert!(merge_query("/sso/signin", &[]).is_err());
    }

    #[test]
    fn test_encode_form() {
        let encoded = encode_form(&params(&[
            ("username", "athlete@example.com"),
            ("embed", "false"),
        ]));
        assert_eq!(encoded, "username=athlete%40example.com&embed=false");
    }

    #[test]
    fn test_parse_tls_version() {
        assert_eq!(parse_tls_version("1.2"), Some(Version::TLS_1_2));
        assert_eq!(parse_tls_version("TLS1.3"), Some(Version::TLS_1_3));
        assert_eq!(parse_tls_version("2.0"), None);
    }

    async fn spawn_echo() -> String {
        use axum::{body::Bytes, http::HeaderMap as AxumHeaders, routing::post, Json, Router};

        async fn echo(headers: AxumHeaders, body: Bytes) -> Json<serde_json::Value> {
            let content_type = headers
                .get("content-type")
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_owned();
            Json(serde_json::json!({
                "content_type": content_type,
                "body": body.to_vec(),
            }))
        }

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let app = Router::new().route("/echo", post(echo));
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("{base_url}/echo")
    }

    #[derive(Debug, serde::Deserialize)]
    struct Echoed {
        content_type: String,
        body: Vec<u8>,
    }

    #[tokio::test]
    async fn test_json_body_overrides_transport_content_type() {
        let url = spawn_echo().await;
        let mut transport = CookieTransport::new(&TransportConfig::default()).unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        transport.set_headers(headers);

        let echoed: Echoed = transport
            .post_json(&url, &[], RequestBody::Json(serde_json::json!({"k": 1})))
            .await
            .unwrap();

        assert_eq!(echoed.content_type, "application/json");
        assert_eq!(echoed.body, br#"{"k":1}"#.to_vec());
        assert_eq!(
            transport.headers().get(CONTENT_TYPE).unwrap(),
            "text/plain"
        );
    }

    #[tokio::test]
    async fn test_raw_body_is_sent_unencoded() {
        let url = spawn_echo().await;
        let transport = CookieTransport::new(&TransportConfig::default()).unwrap();
        let bytes = vec![0x0e, 0x10, 0x43, 0x08, 0xff, b'=', b'&'];

        let echoed: Echoed = transport
            .post_json(
                &url,
                &[],
                RequestBody::Raw {
                    bytes: bytes.clone(),
                    content_type: Some(HeaderValue::from_static("application/octet-stream")),
                },
            )
            .await
            .unwrap();

        assert_eq!(echoed.content_type, "application/octet-stream");
        assert_eq!(echoed.body, bytes);
    }

    #[tokio::test]
    async fn test_form_body_is_url_encoded() {
        let url = spawn_echo().await;
        let transport = CookieTransport::new(&TransportConfig::default()).unwrap();

        let echoed: Echoed = transport
            .post_json(
                &url,
                &[],
                RequestBody::form([("username", "athlete@example.com"), ("embed", "false")]),
            )
            .await
            .unwrap();

        assert_eq!(echoed.content_type, FORM_CONTENT_TYPE);
        assert_eq!(echoed.body, b"username=athlete%40example.com&embed=false".to_vec());
    }

    #[test]
    fn test_merge_headers_overwrites_and_keeps() {
        let mut transport = CookieTransport::new(&TransportConfig::default()).unwrap();
        let mut initial = HeaderMap::new();
        initial.insert("user-agent", HeaderValue::from_static("browser"));
        initial.insert("origin", HeaderValue::from_static("https://sso.garmin.com"));
        transport.set_headers(initial);

        let mut update = HeaderMap::new();
        update.insert("origin", HeaderValue::from_static("https://connect.garmin.cn"));
        transport.merge_headers(update);

        assert_eq!(transport.headers().len(), 2);
        assert_eq!(
            transport.headers().get("origin").unwrap(),
            "https://connect.garmin.cn"
        );
    }
}
