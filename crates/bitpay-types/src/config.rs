//! Configuration values that may be read from the environment.
//!
//! Client configuration files should not carry secrets such as private keys
//! or API tokens. [`LiteralOrEnv`] lets any string-typed setting be written
//! either literally or as a reference to an environment variable:
//!
//! ```json
//! {
//!   "host": "https://test.bitpay.com",
//!   "privateKey": "$BITPAY_PRIVATE_KEY",
//!   "token": { "token": "${BITPAY_MERCHANT_TOKEN}", "facade": "merchant" }
//! }
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::ops::Deref;
use std::str::FromStr;

/// A value deserialized from a literal string or an environment variable.
///
/// - Literal: `"https://bitpay.com"`
/// - Simple env var: `"$BITPAY_HOST"`
/// - Braced env var: `"${BITPAY_HOST}"`
///
/// The variable is resolved once, at deserialization time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralOrEnv<T>(T);

impl<T> LiteralOrEnv<T> {
    pub fn from_literal(value: T) -> Self {
        Self(value)
    }

    pub fn inner(&self) -> &T {
        &self.0
    }

    pub fn into_inner(self) -> T {
        self.0
    }

    /// Returns the variable name if `s` is written as `$VAR` or `${VAR}`.
    fn env_var_name(s: &str) -> Option<&str> {
        if let Some(braced) = s.strip_prefix("${").and_then(|r| r.strip_suffix('}')) {
            return Some(braced);
        }
        let bare = s.strip_prefix('$')?;
        let valid = !bare.is_empty() && bare.chars().all(|c| c.is_alphanumeric() || c == '_');
        valid.then_some(bare)
    }
}

impl<T> Deref for LiteralOrEnv<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'de, T> Deserialize<'de> for LiteralOrEnv<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        let value = match Self::env_var_name(&raw) {
            Some(var_name) => {
                tracing::debug!(var_name, "resolving configuration value from environment");
                std::env::var(var_name).map_err(|_| {
                    serde::de::Error::custom(format!(
                        "Environment variable '{var_name}' not found (referenced as '{raw}')"
                    ))
                })?
            }
            None => raw,
        };
        let parsed = value
            .parse::<T>()
            .map_err(|e| serde::de::Error::custom(format!("Failed to parse value: {e}")))?;
        Ok(LiteralOrEnv(parsed))
    }
}

impl<T: Serialize> Serialize for LiteralOrEnv<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}
