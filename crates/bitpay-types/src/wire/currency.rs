use serde::Deserialize;
use serde_json::Value;
use serde_with::{DefaultOnNull, serde_as};

use crate::currency::Currency;
use crate::util::{RawAmount, coerce_or_zero};
use crate::wire::{DecodeError, FormatContext, from_value};

const ENTITY: &str = "currency";

/// `alts` arrives either as a space-separated string or as a list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AltsWire {
    Joined(String),
    Listed(Vec<String>),
}

impl Default for AltsWire {
    fn default() -> Self {
        AltsWire::Listed(Vec::new())
    }
}

impl From<AltsWire> for Vec<String> {
    fn from(alts: AltsWire) -> Self {
        match alts {
            AltsWire::Joined(joined) => joined.split_whitespace().map(str::to_owned).collect(),
            AltsWire::Listed(listed) => listed,
        }
    }
}

#[serde_as]
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CurrencyWire {
    code: String,
    #[serde(default)]
    #[serde_as(as = "DefaultOnNull")]
    symbol: String,
    #[serde(default)]
    #[serde_as(as = "DefaultOnNull")]
    precision: u32,
    #[serde(default)]
    exchange_pct_fee: Option<RawAmount>,
    #[serde(default)]
    #[serde_as(as = "DefaultOnNull")]
    payout_enabled: bool,
    #[serde(default)]
    #[serde_as(as = "DefaultOnNull")]
    name: String,
    #[serde(default, rename = "plural")]
    #[serde_as(as = "DefaultOnNull")]
    plural_name: String,
    #[serde(default)]
    #[serde_as(as = "DefaultOnNull")]
    alts: AltsWire,
    #[serde(default)]
    #[serde_as(as = "DefaultOnNull")]
    payout_fields: Vec<String>,
}

impl TryFrom<CurrencyWire> for Currency {
    type Error = DecodeError;

    fn try_from(wire: CurrencyWire) -> Result<Self, Self::Error> {
        Ok(Currency {
            code: wire.code,
            symbol: wire.symbol,
            precision: wire.precision,
            exchange_pct_fee: coerce_or_zero(wire.exchange_pct_fee.as_ref()).in_entity(ENTITY)?,
            payout_enabled: wire.payout_enabled,
            name: wire.name,
            plural_name: wire.plural_name,
            alts: wire.alts.into(),
            payout_fields: wire.payout_fields,
        })
    }
}

/// Decodes the `data` member of a `GET currencies` response, preserving
/// wire order. An empty list decodes to an empty `Vec`.
pub fn decode_currencies(data: Value) -> Result<Vec<Currency>, DecodeError> {
    let Value::Array(items) = data else {
        return Err(DecodeError::Shape {
            entity: ENTITY,
            reason: "expected a list of currencies".to_string(),
        });
    };
    items
        .into_iter()
        .map(|item| {
            let wire: CurrencyWire = from_value(ENTITY, item)?;
            Currency::try_from(wire)
        })
        .collect()
}
