use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::fmt::Display;
use std::str::FromStr;

/// A price-like decimal value.
///
/// Accepts native numbers as well as en_US formatted strings such as
/// `"1,000.50"` or `"$9.99"`: anything that isn't a digit, dot, minus sign or
/// exponent marker is stripped before parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(pub Decimal);

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormatError {
    #[error("Invalid amount format: {0:?}")]
    InvalidFormat(String),
}

static NON_NUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\d\.\-eE]+").expect("valid regex"));
static NON_NUMERIC_OR_COMMA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\d\.,\-eE]+").expect("valid regex"));
static EN_US_GROUPED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?\d{1,3}(,\d{3})+(\.\d+)?$").expect("valid regex"));

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    /// Parses an en_US formatted amount.
    ///
    /// Commas are only accepted as thousands separators in groups of three
    /// digits, so decimal-comma strings such as `"1.000,50"` or `"2,5"` are
    /// rejected instead of being misread.
    pub fn parse(input: &str) -> Result<Self, FormatError> {
        let marked = NON_NUMERIC_OR_COMMA.replace_all(input, "");
        if marked.contains(',') && !EN_US_GROUPED.is_match(&marked) {
            return Err(FormatError::InvalidFormat(input.to_owned()));
        }
        let cleaned = NON_NUMERIC.replace_all(input, "");
        if cleaned.is_empty() {
            return Err(FormatError::InvalidFormat(input.to_owned()));
        }
        Decimal::from_str(&cleaned)
            .or_else(|_| Decimal::from_scientific(&cleaned))
            .map(Amount)
            .map_err(|_| FormatError::InvalidFormat(input.to_owned()))
    }

    /// Renders the amount as a JSON number, the shape the API expects on writes.
    pub fn to_json(&self) -> serde_json::Value {
        let text = self.0.normalize().to_string();
        serde_json::Number::from_str(&text)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::String(text))
    }
}

impl FromStr for Amount {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Amount::parse(s)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount(value)
    }
}

macro_rules! impl_from_integer {
    ($($int:ty),*) => {
        $(
            impl From<$int> for Amount {
                fn from(value: $int) -> Self {
                    Amount(Decimal::from(value))
                }
            }
        )*
    };
}

impl_from_integer!(i32, i64, u32, u64);

impl From<Amount> for Decimal {
    fn from(value: Amount) -> Self {
        value.0
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// A price-like value exactly as it arrived on the wire, before coercion.
///
/// Coercion is deferred so that a malformed amount surfaces as a
/// [`FormatError`] rather than a generic deserialization failure.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawAmount {
    Number(serde_json::Number),
    Text(String),
}

impl RawAmount {
    pub fn coerce(&self) -> Result<Amount, FormatError> {
        match self {
            RawAmount::Number(n) => Amount::parse(&n.to_string()),
            RawAmount::Text(s) => Amount::parse(s),
        }
    }

    /// Like [`RawAmount::coerce`], but an empty string counts as zero.
    pub fn coerce_lenient(&self) -> Result<Amount, FormatError> {
        match self {
            RawAmount::Text(s) if s.trim().is_empty() => Ok(Amount::ZERO),
            _ => self.coerce(),
        }
    }
}

/// Coerces an optional wire amount, defaulting to zero when absent.
pub fn coerce_or_zero(raw: Option<&RawAmount>) -> Result<Decimal, FormatError> {
    raw.map(RawAmount::coerce_lenient)
        .transpose()
        .map(|amount| amount.unwrap_or_default().0)
}
