//! The pluggable HTTP capability requests are sent through.
//!
//! Connection handling, TLS, redirects and timeouts belong to the
//! implementation. See the `bitpay-reqwest` crate for one backed by `reqwest`.

use async_trait::async_trait;
use std::sync::Arc;

use crate::request::{ApiRequest, ApiResponse};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A request never reached the server, or its response never came back.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {context}: {source}")]
    Http {
        context: String,
        #[source]
        source: BoxError,
    },
    #[error("Request timed out: {context}")]
    Timeout { context: String },
}

impl TransportError {
    pub fn http(context: impl Into<String>, source: impl Into<BoxError>) -> Self {
        TransportError::Http {
            context: context.into(),
            source: source.into(),
        }
    }
}

/// Sends one request and returns the raw response.
///
/// Implementations must transmit [`ApiRequest::url`] and [`ApiRequest::body`]
/// unchanged, since both are covered by the request signature. Non-success
/// statuses are returned as responses, not errors.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        (**self).send(request).await
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Box<T> {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        (**self).send(request).await
    }
}
