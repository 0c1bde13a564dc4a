use serde::Deserialize;
use serde_json::{Map, Value};
use serde_with::{DefaultOnNull, serde_as};

use crate::timestamp::WireTime;
use crate::token::{Facade, Policy, Token, TokenRequest};
use crate::util::Guid;
use crate::wire::{DecodeError, from_value};

const ENTITY: &str = "token";

#[serde_as]
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedTokenWire {
    token: String,
    facade: Facade,
    #[serde(default)]
    #[serde_as(as = "DefaultOnNull")]
    policies: Vec<Policy>,
    #[serde(default)]
    date_created: Option<WireTime>,
    #[serde(default)]
    resource: Option<String>,
    #[serde(default)]
    pairing_code: Option<String>,
    #[serde(default)]
    pairing_expiration: Option<WireTime>,
}

impl From<CreatedTokenWire> for Token {
    fn from(wire: CreatedTokenWire) -> Self {
        // Expiration is only meaningful alongside a pairing code.
        let pairing_expiration = wire
            .pairing_code
            .as_ref()
            .and(wire.pairing_expiration)
            .and_then(|time| time.as_unix());
        Token {
            token: wire.token,
            facade: wire.facade,
            pairing_code: wire.pairing_code,
            pairing_expiration,
            created_at: wire.date_created.and_then(|time| time.as_unix()),
            policies: wire.policies,
            resource: wire.resource,
        }
    }
}

/// Decodes the `data` member of a `POST tokens` response.
///
/// The API answers with a list; only its first element describes the new token.
pub fn decode_created_token(data: Value) -> Result<Token, DecodeError> {
    let first = match data {
        Value::Array(items) => items.into_iter().next(),
        _ => None,
    };
    let Some(first) = first else {
        return Err(DecodeError::Shape {
            entity: ENTITY,
            reason: "expected a non-empty list of tokens".to_string(),
        });
    };
    let wire: CreatedTokenWire = from_value(ENTITY, first)?;
    Ok(wire.into())
}

/// Decodes the `data` member of a `GET tokens` response.
///
/// Each element is a single-entry object mapping a facade name to a token.
pub fn decode_tokens(data: Value) -> Result<Vec<Token>, DecodeError> {
    let Value::Array(items) = data else {
        return Err(DecodeError::Shape {
            entity: ENTITY,
            reason: "expected a list of tokens".to_string(),
        });
    };
    items
        .into_iter()
        .map(|item| {
            let entry = match item {
                Value::Object(map) if map.len() == 1 => map.into_iter().next(),
                _ => None,
            };
            let Some((facade, token)) = entry else {
                return Err(DecodeError::Shape {
                    entity: ENTITY,
                    reason: "expected a single facade entry".to_string(),
                });
            };
            let facade: Facade = facade.parse().map_err(|err| DecodeError::Shape {
                entity: ENTITY,
                reason: format!("{err}"),
            })?;
            let Value::String(token) = token else {
                return Err(DecodeError::Shape {
                    entity: ENTITY,
                    reason: format!("token for facade {facade} is not a string"),
                });
            };
            Ok(Token::new(facade, token))
        })
        .collect()
}

/// Builds the body of a `POST tokens` request.
pub fn encode_token_request(request: &TokenRequest, guid: &Guid) -> Value {
    let fields = [
        ("id", request.id.as_deref()),
        ("label", request.label.as_deref()),
        ("facade", request.facade.as_ref().map(Facade::as_str)),
        ("pairingCode", request.pairing_code.as_deref()),
    ];
    let mut body = Map::new();
    for (name, value) in fields {
        if let Some(value) = value {
            body.insert(name.into(), Value::from(value));
        }
    }
    body.insert("guid".into(), guid.clone().into());
    Value::Object(body)
}
