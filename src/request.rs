//! The request and response values exchanged with a [`Transport`](crate::transport::Transport).

use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use url::Url;

use crate::error::ConfigurationError;

/// The base URL all request paths are resolved against.
///
/// Stored without a trailing slash; a host given without a scheme is taken
/// to be `https`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiHost(String);

impl ApiHost {
    pub const LIVE: &'static str = "https://bitpay.com";
    pub const TEST: &'static str = "https://test.bitpay.com";

    pub fn parse(host: &str) -> Result<Self, ConfigurationError> {
        let host = host.trim();
        let with_scheme = if host.contains("://") {
            host.to_string()
        } else {
            format!("https://{host}")
        };
        let parsed = Url::parse(&with_scheme).map_err(|source| ConfigurationError::InvalidHost {
            host: host.to_string(),
            source,
        })?;
        if parsed.cannot_be_a_base() || parsed.host_str().is_none() {
            return Err(ConfigurationError::InvalidHost {
                host: host.to_string(),
                source: url::ParseError::EmptyHost,
            });
        }
        Ok(Self(parsed.as_str().trim_end_matches('/').to_string()))
    }

    pub fn live() -> Self {
        Self(Self::LIVE.to_string())
    }

    pub fn test() -> Self {
        Self(Self::TEST.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Resolves a relative path (which may carry a query string) to the full
    /// URL the request is transmitted to.
    pub fn url_for(&self, path: &str) -> Result<Url, ConfigurationError> {
        let full = format!("{}/{}", self.0, path.trim_start_matches('/'));
        Url::parse(&full).map_err(|source| ConfigurationError::InvalidHost {
            host: self.0.clone(),
            source,
        })
    }
}

impl Default for ApiHost {
    fn default() -> Self {
        Self::live()
    }
}

impl FromStr for ApiHost {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Display for ApiHost {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How an operation authenticates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Auth {
    /// Never signed.
    Anonymous,
    /// Signed when both a public key and a signing key are configured.
    Optional,
    /// Must be signed; missing keys fail before dispatch.
    Required,
}

/// A fully-formed API request.
///
/// Headers are case-insensitive and last-write-wins. The body is the exact
/// byte string that is both signed and transmitted.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    method: Method,
    path: String,
    url: Url,
    headers: HeaderMap,
    body: Vec<u8>,
    auth: Auth,
}

impl ApiRequest {
    pub fn new(method: Method, host: &ApiHost, path: impl Into<String>, auth: Auth) -> Result<Self, ConfigurationError> {
        let path = path.into();
        let url = host.url_for(&path)?;
        Ok(Self {
            method,
            path,
            url,
            headers: HeaderMap::new(),
            body: Vec::new(),
            auth,
        })
    }

    pub fn with_json_body(mut self, body: &serde_json::Value) -> Self {
        self.body = body.to_string().into_bytes();
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The path relative to the host, including any query string.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The full URI exactly as transmitted.
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn auth(&self) -> Auth {
        self.auth
    }

    pub(crate) fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }
}

/// A raw response as produced by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Appends a query string to `path`, form-encoding every value.
pub(crate) fn with_query(path: &str, params: &[(&str, &str)]) -> String {
    let query = params
        .iter()
        .map(|(name, value)| {
            let encoded: String = url::form_urlencoded::byte_serialize(value.as_bytes()).collect();
            format!("{name}={encoded}")
        })
        .collect::<Vec<_>>()
        .join("&");
    if query.is_empty() {
        path.to_string()
    } else {
        format!("{path}?{query}")
    }
}
