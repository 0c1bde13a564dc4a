//! API tokens and the facades (permission scopes) they grant.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use crate::timestamp::UnixTimestamp;

/// An API permission scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facade {
    Merchant,
    Pos,
    Payroll,
    User,
}

impl Facade {
    pub fn as_str(&self) -> &'static str {
        match self {
            Facade::Merchant => "merchant",
            Facade::Pos => "pos",
            Facade::Payroll => "payroll",
            Facade::User => "user",
        }
    }
}

impl Display for Facade {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown facade: {0}")]
pub struct UnknownFacade(pub String);

impl FromStr for Facade {
    type Err = UnknownFacade;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "merchant" => Ok(Facade::Merchant),
            "pos" => Ok(Facade::Pos),
            "payroll" => Ok(Facade::Payroll),
            "user" => Ok(Facade::User),
            other => Err(UnknownFacade(other.to_owned())),
        }
    }
}

/// A capability restriction attached to a token.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct Policy {
    #[serde(default)]
    pub policy: String,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub params: Vec<String>,
}

/// An API token bound to a facade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub token: String,
    pub facade: Facade,
    pub pairing_code: Option<String>,
    pub pairing_expiration: Option<UnixTimestamp>,
    pub created_at: Option<UnixTimestamp>,
    pub policies: Vec<Policy>,
    pub resource: Option<String>,
}

impl Token {
    pub fn new(facade: Facade, token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            facade,
            pairing_code: None,
            pairing_expiration: None,
            created_at: None,
            policies: Vec::new(),
            resource: None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.token
    }
}

/// Payload for the `createToken` call.
///
/// During initial pairing `id` is the client identifier derived from the
/// public key, and `pairing_code` is the short code shown in the merchant
/// dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facade: Option<Facade>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pairing_code: Option<String>,
}

impl TokenRequest {
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_facade(mut self, facade: Facade) -> Self {
        self.facade = Some(facade);
        self
    }

    pub fn with_pairing_code(mut self, code: impl Into<String>) -> Self {
        self.pairing_code = Some(code.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facade_round_trip_through_str() {
        for facade in [Facade::Merchant, Facade::Pos, Facade::Payroll, Facade::User] {
            assert_eq!(facade.as_str().parse::<Facade>().unwrap(), facade);
        }
        assert_eq!(
            "public".parse::<Facade>(),
            Err(UnknownFacade("public".into()))
        );
    }

    #[test]
    fn test_token_request_skips_unset_fields() {
        let request = TokenRequest::default()
            .with_id("Tf2yYi7fvGFS4gYXz5sZwHrmvCvyn5PpDrE")
            .with_pairing_code("AB12345");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "Tf2yYi7fvGFS4gYXz5sZwHrmvCvyn5PpDrE",
                "pairingCode": "AB12345"
            })
        );
    }
}
