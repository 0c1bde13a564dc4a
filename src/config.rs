//! Client configuration loaded from JSON.
//!
//! Any string value may be written literally or as `$VAR` / `${VAR}`, in
//! which case it is read from the environment while parsing:
//!
//! ```json
//! {
//!   "host": "https://test.bitpay.com",
//!   "privateKey": "$BITPAY_PRIVATE_KEY",
//!   "token": { "token": "${BITPAY_MERCHANT_TOKEN}", "facade": "merchant" }
//! }
//! ```
//!
//! All fields are optional; the host defaults to the live API.

use bitpay_types::config::LiteralOrEnv;
use bitpay_types::token::{Facade, Token};
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::client::ApiClient;
use crate::error::ConfigurationError;
use crate::request::ApiHost;
use crate::signer::{EcdsaKeyPair, SignerError};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {0}: {1}")]
    FileRead(PathBuf, std::io::Error),
    #[error("Failed to parse config file: {0}")]
    JsonParse(#[from] serde_json::Error),
    #[error("Invalid host in config: {0}")]
    Host(#[from] ConfigurationError),
    #[error("Invalid private key in config: {0}")]
    PrivateKey(#[from] SignerError),
}

#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    #[serde(default)]
    host: Option<LiteralOrEnv<String>>,
    #[serde(default)]
    private_key: Option<LiteralOrEnv<String>>,
    #[serde(default)]
    token: Option<TokenConfig>,
}

#[derive(Clone, Deserialize)]
pub struct TokenConfig {
    token: LiteralOrEnv<String>,
    facade: LiteralOrEnv<Facade>,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("host", &self.host)
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .field("token", &self.token.as_ref().map(|token| *token.facade.inner()))
            .finish()
    }
}

impl ClientConfig {
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::FileRead(path.to_path_buf(), e))?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn host(&self) -> Result<ApiHost, ConfigurationError> {
        match &self.host {
            Some(host) => ApiHost::parse(host),
            None => Ok(ApiHost::live()),
        }
    }

    pub fn key_pair(&self) -> Result<Option<EcdsaKeyPair>, SignerError> {
        self.private_key
            .as_ref()
            .map(|key| EcdsaKeyPair::from_hex(key))
            .transpose()
    }

    pub fn token(&self) -> Option<Token> {
        self.token
            .as_ref()
            .map(|token| Token::new(*token.facade.inner(), token.token.inner().clone()))
    }

    /// Builds a client with the configured host, key pair and token.
    pub fn into_client<T>(self, transport: T) -> Result<ApiClient<T>, ConfigError> {
        let mut client = ApiClient::new(self.host()?, transport);
        if let Some(pair) = self.key_pair()? {
            client.set_key_pair(pair);
        }
        if let Some(token) = self.token() {
            client.set_token(token);
        }
        tracing::debug!(host = %client.host(), "client configured");
        Ok(client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signer::PublicKeyRef;

    const KEY: &str = "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

    #[test]
    fn test_empty_config_uses_live_host() {
        let config = ClientConfig::from_json_str("{}").unwrap();
        let client = config.into_client(()).unwrap();
        assert_eq!(client.host().as_str(), ApiHost::LIVE);
        assert!(client.token().is_none());
    }

    #[test]
    fn test_full_config() {
        let json = format!(
            r#"{{"host": "test.bitpay.com", "privateKey": "{KEY}", "token": {{"token": "abc", "facade": "payroll"}}}}"#
        );
        let config = ClientConfig::from_json_str(&json).unwrap();
        let expected_identity = EcdsaKeyPair::from_hex(KEY).unwrap().to_identity_string();
        assert_eq!(
            config.key_pair().unwrap().unwrap().to_identity_string(),
            expected_identity
        );
        let client = config.into_client(()).unwrap();
        assert_eq!(client.host().as_str(), ApiHost::TEST);
        assert_eq!(client.token(), Some(&Token::new(Facade::Payroll, "abc")));
    }

    #[test]
    fn test_values_from_environment() {
        // SAFETY: the variable name is unique to this test.
        unsafe { std::env::set_var("BITPAY_RS_CONFIG_TEST_TOKEN", "env-token") };
        let config = ClientConfig::from_json_str(
            r#"{"token": {"token": "${BITPAY_RS_CONFIG_TEST_TOKEN}", "facade": "merchant"}}"#,
        )
        .unwrap();
        assert_eq!(config.token(), Some(Token::new(Facade::Merchant, "env-token")));
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            ClientConfig::from_json_str(r#"{"token": {"token": "a", "facade": "public"}}"#),
            Err(ConfigError::JsonParse(_))
        ));
        let config = ClientConfig::from_json_str(r#"{"privateKey": "not-hex"}"#).unwrap();
        assert!(matches!(config.into_client(()), Err(ConfigError::PrivateKey(_))));
    }

    #[test]
    fn test_debug_redacts_private_key() {
        let config = ClientConfig::from_json_str(&format!(r#"{{"privateKey": "{KEY}"}}"#)).unwrap();
        assert!(!format!("{config:?}").contains(KEY));
    }

    #[test]
    fn test_load_from_missing_path() {
        let err = ClientConfig::load_from_path("/nonexistent/bitpay.json").unwrap_err();
        assert!(matches!(err, ConfigError::FileRead(..)));
    }
}
