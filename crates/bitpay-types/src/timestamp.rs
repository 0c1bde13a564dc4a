//! Time values exchanged with the BitPay API.
//!
//! The API reports instants as milliseconds since the Unix epoch, while some
//! endpoints (payouts, mostly) hand back pre-formatted date strings instead.
//! [`WireTime`] captures both shapes; numeric values are normalized to whole
//! seconds on ingestion via [`UnixTimestamp::from_millis`].

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{self, Display, Formatter};

/// A Unix timestamp representing whole seconds since the Unix epoch (UTC).
///
/// # Example
///
/// ```
/// use bitpay_types::timestamp::UnixTimestamp;
///
/// let ts = UnixTimestamp::from_millis(1440994025331);
/// assert_eq!(ts.as_secs(), 1440994025);
/// assert_eq!(ts.as_millis(), 1440994025000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Ord, Eq, Hash)]
pub struct UnixTimestamp(i64);

impl UnixTimestamp {
    /// Creates a new [`UnixTimestamp`] from a raw seconds value.
    pub fn from_secs(secs: i64) -> Self {
        Self(secs)
    }

    /// Converts a milliseconds value into seconds, truncating toward zero.
    pub fn from_millis(millis: i64) -> Self {
        Self(millis / 1000)
    }

    pub fn as_secs(&self) -> i64 {
        self.0
    }

    /// The timestamp in milliseconds, the unit the API expects on writes.
    pub fn as_millis(&self) -> i64 {
        self.0.saturating_mul(1000)
    }
}

impl Display for UnixTimestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Serialized as milliseconds, mirroring what the API sends.
impl Serialize for UnixTimestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.as_millis())
    }
}

/// A time field as it arrived on the wire.
///
/// Numeric values (JSON numbers, or strings that parse as numbers) are taken
/// to be milliseconds and normalized to a [`UnixTimestamp`]. Anything else is
/// kept verbatim, since the decoder cannot assume a single representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireTime {
    Unix(UnixTimestamp),
    Formatted(String),
}

impl WireTime {
    /// Returns the normalized timestamp when the wire value was numeric.
    pub fn as_unix(&self) -> Option<UnixTimestamp> {
        match self {
            WireTime::Unix(ts) => Some(*ts),
            WireTime::Formatted(_) => None,
        }
    }

    fn from_millis_f64(millis: f64) -> Self {
        WireTime::Unix(UnixTimestamp::from_secs((millis / 1000.0).trunc() as i64))
    }

    fn from_text(text: &str) -> Self {
        let trimmed = text.trim();
        if let Ok(millis) = trimmed.parse::<i64>() {
            return WireTime::Unix(UnixTimestamp::from_millis(millis));
        }
        match trimmed.parse::<f64>() {
            Ok(millis) if millis.is_finite() => WireTime::from_millis_f64(millis),
            _ => WireTime::Formatted(text.to_owned()),
        }
    }
}

impl From<UnixTimestamp> for WireTime {
    fn from(value: UnixTimestamp) -> Self {
        WireTime::Unix(value)
    }
}

impl Display for WireTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            WireTime::Unix(ts) => write!(f, "{ts}"),
            WireTime::Formatted(s) => f.write_str(s),
        }
    }
}

impl<'de> Deserialize<'de> for WireTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct WireTimeVisitor;

        impl Visitor<'_> for WireTimeVisitor {
            type Value = WireTime;

            fn expecting(&self, formatter: &mut Formatter) -> fmt::Result {
                formatter.write_str("milliseconds since the epoch or a formatted date")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(WireTime::Unix(UnixTimestamp::from_millis(v)))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                let millis = i64::try_from(v)
                    .map_err(|_| E::custom("timestamp out of range"))?;
                Ok(WireTime::Unix(UnixTimestamp::from_millis(millis)))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
                if !v.is_finite() {
                    return Err(E::custom("timestamp must be finite"));
                }
                Ok(WireTime::from_millis_f64(v))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(WireTime::from_text(v))
            }
        }

        deserializer.deserialize_any(WireTimeVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_millis_are_truncated_to_seconds() {
        let time: WireTime = serde_json::from_str("1440994025331").unwrap();
        assert_eq!(time, WireTime::Unix(UnixTimestamp::from_secs(1440994025)));
    }

    #[test]
    fn test_fractional_millis_truncate_toward_zero() {
        let time: WireTime = serde_json::from_str("1440994025999.9").unwrap();
        assert_eq!(time.as_unix().unwrap().as_secs(), 1440994025);
        let negative: WireTime = serde_json::from_str("-1500").unwrap();
        assert_eq!(negative.as_unix().unwrap().as_secs(), -1);
    }

    #[test]
    fn test_numeric_string_is_normalized() {
        let time: WireTime = serde_json::from_str("\"1440994025331\"").unwrap();
        assert_eq!(time.as_unix().unwrap().as_secs(), 1440994025);
    }

    #[test]
    fn test_formatted_date_passes_through() {
        let time: WireTime = serde_json::from_str("\"2015-08-31T04:06:58.052Z\"").unwrap();
        assert_eq!(
            time,
            WireTime::Formatted("2015-08-31T04:06:58.052Z".to_string())
        );
        assert!(time.as_unix().is_none());
    }

    #[test]
    fn test_serialize_as_millis() {
        let ts = UnixTimestamp::from_secs(1440994025);
        assert_eq!(serde_json::to_string(&ts).unwrap(), "1440994025000");
    }
}
