//! The [`ApiClient`] façade.
//!
//! Each operation builds its request, signs it when required, sends it, and
//! decodes the response envelope. Error fields in the envelope are checked
//! before any entity is constructed, so a failed call never yields a
//! partially populated value.
//!
//! ## Example
//!
//! ```rust,ignore
//! use bitpay_rs::{ApiClient, ApiHost, EcdsaKeyPair};
//! use bitpay_types::token::{Facade, Token};
//!
//! let mut client = ApiClient::new(ApiHost::test(), transport)
//!     .with_key_pair(EcdsaKeyPair::from_hex(&private_key)?)
//!     .with_token(Token::new(Facade::Merchant, merchant_token));
//! let invoice = client.get_invoice("Hpqc63wvE1ZjzeeH4kEycF").await?;
//! ```

use bitpay_types::currency::Currency;
use bitpay_types::invoice::{Invoice, InvoiceRequest};
use bitpay_types::payout::{Payout, PayoutRequest};
use bitpay_types::token::{Token, TokenRequest};
use bitpay_types::wire::{self, Envelope};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::builder::RequestBuilder;
use crate::dispatcher::{Credentials, SignedRequestDispatcher};
use crate::error::{ClientError, ConfigurationError};
use crate::request::{ApiHost, ApiRequest, ApiResponse};
use crate::signer::{EcdsaKeyPair, PublicKeyRef, SigningKey};
use crate::transport::Transport;

#[cfg(feature = "telemetry")]
use tracing::instrument;

/// A client for one API session.
///
/// Holds at most one token and one key pair at a time; setting either
/// replaces the previous value. Operations take `&mut self`, so a client is
/// used by one caller at a time.
pub struct ApiClient<T> {
    host: ApiHost,
    dispatcher: SignedRequestDispatcher<T>,
    token: Option<Token>,
    public_key: Option<Arc<dyn PublicKeyRef>>,
    signing_key: Option<Arc<dyn SigningKey>>,
    last_request: Option<ApiRequest>,
    last_response: Option<ApiResponse>,
}

impl<T> fmt::Debug for ApiClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("host", &self.host)
            .field("token", &self.token.as_ref().map(|token| token.facade))
            .field(
                "identity",
                &self.public_key.as_ref().map(|key| key.to_identity_string()),
            )
            .field("signing_key", &self.signing_key.is_some())
            .finish_non_exhaustive()
    }
}

impl<T> ApiClient<T> {
    pub fn new(host: ApiHost, transport: T) -> Self {
        Self {
            host,
            dispatcher: SignedRequestDispatcher::new(transport),
            token: None,
            public_key: None,
            signing_key: None,
            last_request: None,
            last_response: None,
        }
    }

    pub fn with_token(mut self, token: Token) -> Self {
        self.set_token(token);
        self
    }

    pub fn with_key_pair(mut self, pair: EcdsaKeyPair) -> Self {
        self.set_key_pair(pair);
        self
    }

    pub fn host(&self) -> &ApiHost {
        &self.host
    }

    pub fn transport(&self) -> &T {
        self.dispatcher.transport()
    }

    pub fn token(&self) -> Option<&Token> {
        self.token.as_ref()
    }

    pub fn set_token(&mut self, token: Token) {
        self.token = Some(token);
    }

    pub fn clear_token(&mut self) -> Option<Token> {
        self.token.take()
    }

    pub fn set_public_key(&mut self, key: impl PublicKeyRef + 'static) {
        self.public_key = Some(Arc::new(key));
    }

    pub fn set_signing_key(&mut self, key: impl SigningKey + 'static) {
        self.signing_key = Some(Arc::new(key));
    }

    /// Installs one key pair as both the identity and the signer.
    pub fn set_key_pair(&mut self, pair: EcdsaKeyPair) {
        let pair = Arc::new(pair);
        self.public_key = Some(pair.clone());
        self.signing_key = Some(pair);
    }

    /// The request most recently handed to the transport.
    pub fn last_request(&self) -> Option<&ApiRequest> {
        self.last_request.as_ref()
    }

    /// The response to [`ApiClient::last_request`], if one arrived.
    pub fn last_response(&self) -> Option<&ApiResponse> {
        self.last_response.as_ref()
    }

    fn builder(&self) -> RequestBuilder<'_> {
        RequestBuilder::new(&self.host)
    }

    fn require_token(&self, operation: &'static str) -> Result<&Token, ConfigurationError> {
        self.token
            .as_ref()
            .ok_or(ConfigurationError::MissingToken(operation))
    }
}

impl<T: Transport> ApiClient<T> {
    /// Creates an invoice. Signed when a key pair is installed; the held
    /// token, if any, is sent along.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "bitpay.client.create_invoice", skip_all, err)
    )]
    pub async fn create_invoice(&mut self, request: &InvoiceRequest) -> Result<Invoice, ClientError> {
        let api_request = self.builder().create_invoice(request, self.token.as_ref())?;
        let data = self.execute(api_request).await?;
        Ok(wire::decode_invoice(data)?)
    }

    /// Fetches an invoice. Signed only when a merchant token is held.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "bitpay.client.get_invoice", skip(self), err)
    )]
    pub async fn get_invoice(&mut self, invoice_id: &str) -> Result<Invoice, ClientError> {
        let api_request = self.builder().get_invoice(invoice_id, self.token.as_ref())?;
        let data = self.execute(api_request).await?;
        Ok(wire::decode_invoice(data)?)
    }

    /// Requests a payout, authorized by the held token.
    ///
    /// The returned payout is the request merged with the server's echo:
    /// ids, account, status and payout token come from the server.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "bitpay.client.create_payout", skip_all, err)
    )]
    pub async fn create_payout(&mut self, request: &PayoutRequest) -> Result<Payout, ClientError> {
        let token = self.require_token("createPayout")?;
        let api_request = self.builder().create_payout(request, token)?;
        let data = self.execute(api_request).await?;
        Ok(wire::decode_created_payout(request, data)?)
    }

    /// Lists payouts, optionally filtered by status.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "bitpay.client.get_payouts", skip(self), err)
    )]
    pub async fn get_payouts(&mut self, status: Option<&str>) -> Result<Vec<Payout>, ClientError> {
        let token = self.require_token("getPayouts")?;
        let api_request = self.builder().get_payouts(token, status)?;
        let data = self.execute(api_request).await?;
        Ok(wire::decode_payouts(data)?)
    }

    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "bitpay.client.get_payout", skip(self), err)
    )]
    pub async fn get_payout(&mut self, payout_id: &str) -> Result<Payout, ClientError> {
        let token = self.require_token("getPayout")?;
        let api_request = self.builder().get_payout(payout_id, token)?;
        let data = self.execute(api_request).await?;
        Ok(wire::decode_payout(data)?)
    }

    /// Cancels a payout using its own payout token.
    ///
    /// Returns a copy of `payout` carrying the status the server reports.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "bitpay.client.delete_payout", skip_all, fields(payout_id = %payout.id), err)
    )]
    pub async fn delete_payout(&mut self, payout: &Payout) -> Result<Payout, ClientError> {
        let api_request = self.builder().delete_payout(payout)?;
        let data = self.execute(api_request).await?;
        let status = wire::decode_payout_status(data)?;
        Ok(Payout {
            status,
            ..payout.clone()
        })
    }

    /// Lists the tokens associated with the installed key, in wire order.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "bitpay.client.get_tokens", skip_all, err)
    )]
    pub async fn get_tokens(&mut self) -> Result<Vec<Token>, ClientError> {
        let api_request = self.builder().get_tokens()?;
        let data = self.execute(api_request).await?;
        Ok(wire::decode_tokens(data)?)
    }

    /// Creates a token, typically to complete pairing. Never signed.
    ///
    /// A malformed pairing code fails before anything is sent.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "bitpay.client.create_token", skip_all, err)
    )]
    pub async fn create_token(&mut self, request: &TokenRequest) -> Result<Token, ClientError> {
        let api_request = self.builder().create_token(request)?;
        let data = self.execute(api_request).await?;
        Ok(wire::decode_created_token(data)?)
    }

    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "bitpay.client.get_currencies", skip_all, err)
    )]
    pub async fn get_currencies(&mut self) -> Result<Vec<Currency>, ClientError> {
        let api_request = self.builder().get_currencies()?;
        let data = self.execute(api_request).await?;
        Ok(wire::decode_currencies(data)?)
    }

    /// Signs, sends, and unwraps the response envelope to its `data` member.
    async fn execute(&mut self, request: ApiRequest) -> Result<Value, ClientError> {
        let credentials = Credentials {
            identity: self.public_key.as_deref(),
            signer: self.signing_key.as_deref(),
        };
        let request = self.dispatcher.prepare(request, credentials)?;
        self.last_response = None;
        let request = self.last_request.insert(request);
        let response = self.dispatcher.send(request).await?;
        let response = self.last_response.insert(response);
        unwrap_envelope(response)
    }
}

fn unwrap_envelope(response: &ApiResponse) -> Result<Value, ClientError> {
    let status = response.status;
    let envelope = Envelope::parse(&response.body)?;
    if let Some(message) = envelope.error_message() {
        tracing::warn!(status = status.as_u16(), %message, "API returned an error");
        return Err(ClientError::Api { message, status });
    }
    if status.as_u16() >= 400 {
        tracing::warn!(status = status.as_u16(), "API returned a failure status");
        return Err(ClientError::Api {
            message: format!("invalid status code: {}", status.as_u16()),
            status,
        });
    }
    Ok(envelope.into_data()?)
}
