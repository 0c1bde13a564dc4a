//! Mapping between the API's JSON wire format and the entity model.
//!
//! Decoding is two-phase: serde first reads the payload into private wire
//! structs where every field the API may omit has an explicit default, then a
//! conversion step coerces amounts and assembles the entity. Either phase
//! failing yields a [`DecodeError`] and no entity at all.
//!
//! Encoders produce `serde_json::Value` request bodies. Every write payload
//! carries a fresh `guid`.
//!
//! - [`envelope`] - The `{data, error, errors}` response wrapper
//! - [`invoice`] - Invoice decoding and invoice-creation payloads
//! - [`payout`] - Payout decoding and payout-creation payloads
//! - [`token`] - Token decoding and token-creation payloads
//! - [`currency`] - Currency list decoding

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::util::FormatError;

pub mod currency;
pub mod envelope;
pub mod invoice;
pub mod payout;
pub mod token;

pub use currency::*;
pub use envelope::*;
pub use invoice::*;
pub use payout::*;
pub use token::*;

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("Response body is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),
    #[error("Error with request: no data returned")]
    MissingData,
    #[error("Failed to decode {entity}: {source}")]
    Field {
        entity: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("Malformed amount in {entity}: {source}")]
    Format {
        entity: &'static str,
        #[source]
        source: FormatError,
    },
    #[error("Unexpected {entity} payload: {reason}")]
    Shape {
        entity: &'static str,
        reason: String,
    },
}

pub(crate) fn from_value<T: DeserializeOwned>(
    entity: &'static str,
    value: Value,
) -> Result<T, DecodeError> {
    serde_json::from_value(value).map_err(|source| DecodeError::Field { entity, source })
}

pub(crate) trait FormatContext<T> {
    fn in_entity(self, entity: &'static str) -> Result<T, DecodeError>;
}

impl<T> FormatContext<T> for Result<T, FormatError> {
    fn in_entity(self, entity: &'static str) -> Result<T, DecodeError> {
        self.map_err(|source| DecodeError::Format { entity, source })
    }
}
