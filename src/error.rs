//! Error taxonomy for API operations.
//!
//! Every failure an [`ApiClient`](crate::client::ApiClient) operation can
//! report is a [`ClientError`]. Local failures (configuration, validation,
//! signing) happen before anything is sent; the rest describe what came back.

use bitpay_types::util::FormatError;
use bitpay_types::wire::DecodeError;
use http::StatusCode;

use crate::signer::SignerError;
use crate::transport::TransportError;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    /// The server answered with an `error`/`errors` field or a failure status.
    #[error("{}: {message}", .status.as_u16())]
    Api { message: String, status: StatusCode },
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    Signing(#[from] SignerError),
}

impl ClientError {
    /// The HTTP status of an [`ClientError::Api`] failure.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<DecodeError> for ClientError {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::Format { source, .. } => ClientError::Format(source),
            other => ClientError::Protocol(ProtocolError(other)),
        }
    }
}

/// Client state required by an operation is missing or unusable.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("no public key set")]
    MissingPublicKey,
    #[error("no private key set")]
    MissingSigningKey,
    #[error("no token set; {0} requires one")]
    MissingToken(&'static str),
    #[error("Invalid API host {host}: {source}")]
    InvalidHost {
        host: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Value for header {0} is not a valid header value")]
    InvalidHeader(&'static str),
}

/// Caller input rejected before a request is built.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("The pairing code provided is not legal: {0:?}")]
    PairingCode(String),
    #[error("Invalid {kind} id: {value:?}")]
    ResourceId { kind: &'static str, value: String },
    #[error("A payout needs at least one instruction")]
    EmptyInstructions,
}

/// The response does not have the shape the operation expects.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ProtocolError(pub DecodeError);
