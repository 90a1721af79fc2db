//! Generic request layer shared by all service facades.
//!
//! # Design
//! `RawsClient` holds the connection parameters and an injected `Transport`.
//! Every verb is split in two: a `build_*` method producing an
//! `HttpRequest` (pure, unit-testable) and an executing method that sends it
//! and maps the status to success or `ApiError::HttpError`.
//!
//! Accepted statuses: GET/HEAD 200, POST/PUT 200 or 201, DELETE 204.
//! Nothing is retried and redirects are not followed.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::config::ServiceConfig;
use crate::error::{ApiError, ApiResult};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
use crate::media::MediaSource;

pub(crate) const JSON: &str = "application/json";
const BOUNDARY: &str = "END_OF_PART";

/// Extra request headers supplied by a caller.
pub type Headers = [(String, String)];

#[derive(Debug, Clone)]
pub struct RawsClient<T = UreqTransport> {
    config: ServiceConfig,
    transport: T,
}

impl RawsClient<UreqTransport> {
    /// Client using the default blocking transport.
    pub fn connect(config: ServiceConfig) -> Self {
        Self::new(config, UreqTransport::new())
    }
}

impl<T: Transport> RawsClient<T> {
    pub fn new(config: ServiceConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn username(&self) -> &str {
        &self.config.username
    }

    /// Resolve a service path against the configured host. Absolute URLs
    /// pass through unchanged.
    pub fn url(&self, uri: &str) -> String {
        if uri.starts_with("http://") || uri.starts_with("https://") {
            return uri.to_string();
        }
        if uri.starts_with('/') {
            format!("{}{uri}", self.config.base_url())
        } else {
            format!("{}/{uri}", self.config.base_url())
        }
    }

    fn headers(&self, accept: &str, extra: &Headers) -> Vec<(String, String)> {
        let mut headers = vec![
            ("Accept".to_string(), accept.to_string()),
            ("Authorization".to_string(), self.config.authorization()),
            ("User-Agent".to_string(), self.config.user_agent()),
        ];
        headers.extend(
            extra
                .iter()
                .filter(|(name, _)| {
                    !name.eq_ignore_ascii_case("accept") && !name.eq_ignore_ascii_case("authorization")
                })
                .cloned(),
        );
        headers
    }

    pub fn build_get(&self, uri: &str, extra_headers: &Headers) -> HttpRequest {
        self.build_bodyless(HttpMethod::Get, uri, JSON, extra_headers)
    }

    pub fn build_head(&self, uri: &str) -> HttpRequest {
        self.build_bodyless(HttpMethod::Head, uri, JSON, &[])
    }

    pub fn build_delete(&self, uri: &str, extra_headers: &Headers) -> HttpRequest {
        self.build_bodyless(HttpMethod::Delete, uri, JSON, extra_headers)
    }

    fn build_bodyless(
        &self,
        method: HttpMethod,
        uri: &str,
        accept: &str,
        extra_headers: &Headers,
    ) -> HttpRequest {
        HttpRequest {
            method,
            path: self.url(uri),
            headers: self.headers(accept, extra_headers),
            body: None,
        }
    }

    /// Build a POST or PUT.
    ///
    /// With both `body` and `media` the request is `multipart/related`; with
    /// only `media` the body is the raw media content; otherwise the body is
    /// `body` as JSON text (`null` when absent).
    pub fn build_write(
        &self,
        method: HttpMethod,
        body: Option<&Value>,
        uri: &str,
        extra_headers: &Headers,
        media: Option<&MediaSource>,
    ) -> ApiResult<HttpRequest> {
        let mut headers = self.headers(JSON, extra_headers);
        let payload = match (body, media) {
            (Some(body), Some(media)) => {
                let json = serde_json::to_vec(body)
                    .map_err(|e| ApiError::SerializationError(e.to_string()))?;
                let payload = multipart(&json, media);
                headers.push(("MIME-version".to_string(), "1.0".to_string()));
                headers.push((
                    "Content-Type".to_string(),
                    format!("multipart/related; boundary={BOUNDARY}"),
                ));
                headers.push(("Content-Length".to_string(), payload.len().to_string()));
                payload
            }
            (None, Some(media)) => {
                headers.push(("Content-Type".to_string(), media.content_type.clone()));
                headers.push(("Content-Length".to_string(), media.content_length().to_string()));
                headers.push(("Slug".to_string(), media.filename.clone()));
                media.content.clone()
            }
            (body, None) => {
                let payload = serde_json::to_vec(body.unwrap_or(&Value::Null))
                    .map_err(|e| ApiError::SerializationError(e.to_string()))?;
                headers.push(("Content-Type".to_string(), JSON.to_string()));
                headers.push(("Content-Length".to_string(), payload.len().to_string()));
                payload
            }
        };
        Ok(HttpRequest {
            method,
            path: self.url(uri),
            headers,
            body: Some(payload),
        })
    }

    fn send(&self, request: &HttpRequest) -> ApiResult<HttpResponse> {
        debug!(method = %request.method, url = %request.path, "sending request");
        let response = self.transport.execute(request)?;
        debug!(method = %request.method, url = %request.path, status = response.status, "received response");
        Ok(response)
    }

    /// GET a JSON document.
    pub fn get(&self, uri: &str, extra_headers: &Headers) -> ApiResult<Value> {
        let response = self.send(&self.build_get(uri, extra_headers))?;
        check_status(&response, &[200])?;
        parse_json(&response)
    }

    /// GET a non-JSON document (atom, mrss) and return the raw body.
    pub fn get_text(&self, uri: &str, accept: &str) -> ApiResult<String> {
        let request = self.build_bodyless(HttpMethod::Get, uri, accept, &[]);
        let response = self.send(&request)?;
        check_status(&response, &[200])?;
        Ok(response.body)
    }

    pub fn post(
        &self,
        body: Option<&Value>,
        uri: &str,
        extra_headers: &Headers,
        media: Option<&MediaSource>,
    ) -> ApiResult<Value> {
        self.write(HttpMethod::Post, body, uri, extra_headers, media)
    }

    pub fn put(
        &self,
        body: Option<&Value>,
        uri: &str,
        extra_headers: &Headers,
        media: Option<&MediaSource>,
    ) -> ApiResult<Value> {
        self.write(HttpMethod::Put, body, uri, extra_headers, media)
    }

    fn write(
        &self,
        method: HttpMethod,
        body: Option<&Value>,
        uri: &str,
        extra_headers: &Headers,
        media: Option<&MediaSource>,
    ) -> ApiResult<Value> {
        let request = self.build_write(method, body, uri, extra_headers, media)?;
        let response = self.send(&request)?;
        check_status(&response, &[200, 201])?;
        parse_json(&response)
    }

    /// DELETE a resource; `true` once the server confirms with 204.
    pub fn delete(&self, uri: &str, extra_headers: &Headers) -> ApiResult<bool> {
        let response = self.send(&self.build_delete(uri, extra_headers))?;
        check_status(&response, &[204])?;
        Ok(true)
    }

    /// HEAD a resource and return its status code (always 200 on success).
    pub fn head(&self, uri: &str) -> ApiResult<u16> {
        let response = self.send(&self.build_head(uri))?;
        check_status(&response, &[200])?;
        Ok(response.status)
    }

    /// HEAD-based existence check: 200 means present, any `HttpError`
    /// means absent. Transport failures still propagate.
    pub fn exists(&self, uri: &str) -> ApiResult<bool> {
        match self.head(uri) {
            Ok(status) => Ok(status == 200),
            Err(ApiError::HttpError { status, .. }) => {
                debug!(uri, status, "resource reported absent");
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }
}

fn multipart(json: &[u8], media: &MediaSource) -> Vec<u8> {
    let head = format!(
        "Media multipart posting\r\n--{BOUNDARY}\r\nContent-Type: {JSON}\r\n\r\n"
    );
    let middle = format!("\r\n--{BOUNDARY}\r\nContent-Type: {}\r\n\r\n", media.content_type);
    let tail = format!("\r\n--{BOUNDARY}--\r\n");

    let mut payload =
        Vec::with_capacity(head.len() + json.len() + middle.len() + media.content_length() + tail.len());
    payload.extend_from_slice(head.as_bytes());
    payload.extend_from_slice(json);
    payload.extend_from_slice(middle.as_bytes());
    payload.extend_from_slice(&media.content);
    payload.extend_from_slice(tail.as_bytes());
    payload
}

/// Map a status outside `accepted` to `ApiError::HttpError`.
fn check_status(response: &HttpResponse, accepted: &[u16]) -> ApiResult<()> {
    if accepted.contains(&response.status) {
        return Ok(());
    }
    Err(ApiError::http(
        response.status,
        response.reason.clone(),
        response.body.clone(),
    ))
}

/// An empty body decodes as `null`.
fn parse_json(response: &HttpResponse) -> ApiResult<Value> {
    if response.body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

pub(crate) fn decode<D: DeserializeOwned>(value: Value) -> ApiResult<D> {
    serde_json::from_value(value).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

pub(crate) fn encode<S: serde::Serialize>(value: &S) -> ApiResult<Value> {
    serde_json::to_value(value).map_err(|e| ApiError::SerializationError(e.to_string()))
}
