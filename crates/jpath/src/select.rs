//! Convenience selection directly on document values.
use crate::error::JPathError;
use crate::path::JsonPath;
use serde_json::Value;

/// Selects tokens from a document with a path given as text.
pub trait SelectToken {
    /// At most one match; a second match is an error.
    fn select_token(&self, path: &str, strict: bool) -> Result<Option<&Value>, JPathError>;

    /// Every match in document order.
    fn select_tokens(&self, path: &str, strict: bool) -> Result<Vec<&Value>, JPathError>;
}

impl SelectToken for Value {
    fn select_token(&self, path: &str, strict: bool) -> Result<Option<&Value>, JPathError> {
        JsonPath::parse(path)?.select_token(self, strict)
    }

    fn select_tokens(&self, path: &str, strict: bool) -> Result<Vec<&Value>, JPathError> {
        JsonPath::parse(path)?.select_all(self, strict)
    }
}
