//! 流名（非空）
//!
use crate::error::{MessageStoreError, MessageStoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 流名（非空）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StreamName(String);

impl StreamName {
    pub fn new(name: impl Into<String>) -> MessageStoreResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(MessageStoreError::InvalidArgument {
                reason: "stream name must not be empty".to_string(),
            });
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for StreamName {
    type Error = MessageStoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<StreamName> for String {
    fn from(value: StreamName) -> Self {
        value.0
    }
}

impl AsRef<str> for StreamName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StreamName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_names() {
        assert!(StreamName::new("").is_err());
        assert!(StreamName::new("  ").is_err());
        assert_eq!(StreamName::new("event_stream").unwrap().as_str(), "event_stream");
    }

    #[test]
    fn deserializes_with_validation() {
        let name: StreamName = serde_json::from_str("\"orders\"").unwrap();
        assert_eq!(name.to_string(), "orders");
        assert!(serde_json::from_str::<StreamName>("\"\"").is_err());
    }
}
