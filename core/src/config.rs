//! Connection parameters shared by every request a facade issues.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};

/// Credentials and endpoint for one RAWS service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceConfig {
    pub username: String,
    pub password: String,
    /// Server name without scheme, e.g. `meta.meta01.rambla.be`.
    pub host: String,
    /// Explicit port; the scheme default applies when absent.
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub tls: bool,
    /// Name of the calling application, reported in `User-Agent`.
    #[serde(default)]
    pub source: Option<String>,
}

impl ServiceConfig {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        host: impl Into<String>,
        tls: bool,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            host: host.into(),
            port: None,
            tls,
            source: None,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Create config from `RAWS_*` environment variables.
    pub fn from_env() -> ApiResult<Self> {
        let required = |key: &str| {
            std::env::var(key).map_err(|_| ApiError::Config(format!("{key} not set")))
        };
        let port = match std::env::var("RAWS_PORT") {
            Ok(raw) => Some(
                raw.parse::<u16>()
                    .map_err(|_| ApiError::Config(format!("RAWS_PORT is not a port: {raw}")))?,
            ),
            Err(_) => None,
        };
        let tls = std::env::var("RAWS_TLS")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            username: required("RAWS_USERNAME")?,
            password: required("RAWS_PASSWORD")?,
            host: required("RAWS_HOST")?,
            port,
            tls,
            source: std::env::var("RAWS_SOURCE").ok(),
        })
    }

    /// `scheme://host[:port]`, without a trailing slash.
    pub fn base_url(&self) -> String {
        let scheme = if self.tls { "https" } else { "http" };
        let host = self.host.trim_end_matches('/');
        match self.port {
            Some(port) => format!("{scheme}://{host}:{port}"),
            None => format!("{scheme}://{host}"),
        }
    }

    /// Value of the `Authorization` header for HTTP Basic auth.
    pub fn authorization(&self) -> String {
        let token = STANDARD.encode(format!("{}:{}", self.username, self.password));
        format!("Basic {token}")
    }

    pub fn user_agent(&self) -> String {
        let agent = concat!("raws-core/", env!("CARGO_PKG_VERSION"));
        match &self.source {
            Some(source) => format!("{source} {agent}"),
            None => agent.to_string(),
        }
    }
}
