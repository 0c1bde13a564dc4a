#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! A [`Transport`] for `bitpay-rs` backed by [`reqwest`].
//!
//! ## Example
//!
//! ```rust,ignore
//! use bitpay_reqwest::ReqwestTransport;
//! use bitpay_rs::{ApiClient, ApiHost};
//! use std::time::Duration;
//!
//! let transport = ReqwestTransport::new().with_timeout(Duration::from_secs(30));
//! let mut client = ApiClient::new(ApiHost::test(), transport);
//! let currencies = client.get_currencies().await?;
//! ```
//!
//! ## Features
//!
//! - Optional per-request timeout and extra headers
//! - Integrates with `tracing` if the `telemetry` feature is enabled
//!
//! Headers set by the API client take precedence over extra headers with
//! the same name.

use async_trait::async_trait;
use bitpay_rs::{ApiRequest, ApiResponse, Transport, TransportError};
use http::HeaderMap;
use reqwest::Client;
use std::time::Duration;

#[cfg(feature = "telemetry")]
use tracing::{Span, instrument};

/// Sends API requests with a shared [`reqwest::Client`].
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport {
    client: Client,
    /// Extra headers sent with each request
    headers: HeaderMap,
    /// Optional request timeout
    timeout: Option<Duration>,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an existing client, e.g. one with custom TLS or proxy settings.
    pub fn from_client(client: Client) -> Self {
        Self {
            client,
            headers: HeaderMap::new(),
            timeout: None,
        }
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Attaches extra headers to all future requests.
    pub fn with_headers(&self, headers: HeaderMap) -> Self {
        let mut this = self.clone();
        this.headers = headers;
        this
    }

    /// Sets a timeout for all future requests.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        let mut this = self.clone();
        this.timeout = Some(timeout);
        this
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    #[cfg_attr(
        feature = "telemetry",
        instrument(
            name = "bitpay.reqwest.send",
            skip_all,
            fields(method = %request.method(), url = %request.url(), otel.status_code = tracing::field::Empty, error.message = tracing::field::Empty),
            err
        )
    )]
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        let context = format!("{} {}", request.method(), request.path());

        let mut headers = self.headers.clone();
        headers.extend(request.headers().clone());

        let mut req = self
            .client
            .request(request.method().clone(), request.url().clone())
            .headers(headers);
        if !request.body().is_empty() {
            req = req.body(request.body().to_vec());
        }
        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }

        let result = match req.send().await {
            Ok(response) => {
                let status = response.status();
                response
                    .bytes()
                    .await
                    .map(|body| ApiResponse::new(status, body.to_vec()))
                    .map_err(|e| transport_error(context, e))
            }
            Err(e) => Err(transport_error(context, e)),
        };

        record_result_on_span(&result);

        result
    }
}

fn transport_error(context: String, error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout { context }
    } else {
        TransportError::http(context, error)
    }
}

/// Records the outcome of a request on a tracing span, including status and errors.
#[cfg(feature = "telemetry")]
fn record_result_on_span(result: &Result<ApiResponse, TransportError>) {
    let span = Span::current();
    match result {
        Ok(_) => {
            span.record("otel.status_code", "OK");
        }
        Err(err) => {
            span.record("otel.status_code", "ERROR");
            span.record("error.message", tracing::field::display(err));
            tracing::event!(tracing::Level::ERROR, error = %err, "Request to BitPay API failed");
        }
    }
}

/// Records the outcome of a request on a tracing span, including status and errors.
/// Noop if telemetry feature is off.
#[cfg(not(feature = "telemetry"))]
fn record_result_on_span(_result: &Result<ApiResponse, TransportError>) {}
