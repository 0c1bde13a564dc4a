//! Authentication headers and hand-off to the transport.
//!
//! A signed request carries two extra headers:
//!
//! - `x-identity`: the caller's public key, as given by [`PublicKeyRef`]
//! - `x-signature`: hex of the signature over the full URI followed by the body
//!
//! The URI is the one the transport transmits, query string included, so a
//! signature cannot be replayed against another resource or filter.

use http::header::{CONTENT_TYPE, USER_AGENT};
use http::{HeaderName, HeaderValue};

use crate::error::{ClientError, ConfigurationError};
use crate::request::{ApiRequest, ApiResponse, Auth};
use crate::signer::{PublicKeyRef, SigningKey};
use crate::transport::{Transport, TransportError};

#[cfg(feature = "telemetry")]
use tracing::instrument;

pub const ACCEPT_VERSION: &str = "2.0.0";

pub const X_IDENTITY: HeaderName = HeaderName::from_static("x-identity");
pub const X_SIGNATURE: HeaderName = HeaderName::from_static("x-signature");
pub const X_ACCEPT_VERSION: HeaderName = HeaderName::from_static("x-accept-version");
pub const X_BITPAY_PLUGIN_INFO: HeaderName = HeaderName::from_static("x-bitpay-plugin-info");

/// The keys a request may be signed with.
#[derive(Clone, Copy, Default)]
pub struct Credentials<'a> {
    pub identity: Option<&'a dyn PublicKeyRef>,
    pub signer: Option<&'a dyn SigningKey>,
}

/// The exact bytes a request signature covers: full URI, then body.
pub fn signature_message(request: &ApiRequest) -> Vec<u8> {
    let uri = request.url().as_str().as_bytes();
    let mut message = Vec::with_capacity(uri.len() + request.body().len());
    message.extend_from_slice(uri);
    message.extend_from_slice(request.body());
    message
}

/// Adds standard and authentication headers, then sends through a [`Transport`].
///
/// Does not retry and does not look at the response status.
#[derive(Debug, Clone)]
pub struct SignedRequestDispatcher<T> {
    transport: T,
    user_agent: HeaderValue,
    plugin_info: HeaderValue,
}

impl<T> SignedRequestDispatcher<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            user_agent: HeaderValue::from_static(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION"),
                " (Rust)"
            )),
            plugin_info: HeaderValue::from_static(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            )),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Finalizes `request` for transmission.
    ///
    /// Fails with [`ConfigurationError`] if the request must be signed and a
    /// key is missing. An [`Auth::Optional`] request is signed only when
    /// both keys are present.
    pub fn prepare(&self, mut request: ApiRequest, credentials: Credentials<'_>) -> Result<ApiRequest, ClientError> {
        request.set_header(USER_AGENT, self.user_agent.clone());
        request.set_header(X_BITPAY_PLUGIN_INFO, self.plugin_info.clone());
        request.set_header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        request.set_header(X_ACCEPT_VERSION, HeaderValue::from_static(ACCEPT_VERSION));

        let keys = match (request.auth(), credentials.identity, credentials.signer) {
            (Auth::Anonymous, _, _) => None,
            (Auth::Optional, Some(identity), Some(signer)) => Some((identity, signer)),
            (Auth::Optional, _, _) => None,
            (Auth::Required, None, _) => return Err(ConfigurationError::MissingPublicKey.into()),
            (Auth::Required, _, None) => return Err(ConfigurationError::MissingSigningKey.into()),
            (Auth::Required, Some(identity), Some(signer)) => Some((identity, signer)),
        };
        if let Some((identity, signer)) = keys {
            let identity = HeaderValue::try_from(identity.to_identity_string())
                .map_err(|_| ConfigurationError::InvalidHeader("x-identity"))?;
            request.set_header(X_IDENTITY, identity);
            let signature = signer.sign(&signature_message(&request))?;
            let signature = HeaderValue::try_from(hex::encode(signature))
                .map_err(|_| ConfigurationError::InvalidHeader("x-signature"))?;
            request.set_header(X_SIGNATURE, signature);
        }
        Ok(request)
    }
}

impl<T: Transport> SignedRequestDispatcher<T> {
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "bitpay.dispatch", skip_all, fields(method = %request.method(), path = request.path()), err)
    )]
    pub async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        tracing::debug!(
            method = %request.method(),
            path = request.path(),
            signed = request.headers().contains_key(&X_SIGNATURE),
            "dispatching request"
        );
        let response = self.transport.send(request).await?;
        tracing::debug!(status = response.status.as_u16(), "response received");
        Ok(response)
    }
}
