use std::fmt::{self, Display, Formatter};
use uuid::Uuid;

/// A fresh, globally-unique request identifier.
///
/// Every write payload carries one so the server can deduplicate retried
/// `POST`s.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Guid(String);

impl Guid {
    pub fn generate() -> Self {
        Guid(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Guid {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Guid> for serde_json::Value {
    fn from(value: Guid) -> Self {
        serde_json::Value::String(value.0)
    }
}
