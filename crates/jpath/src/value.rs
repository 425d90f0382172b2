//! Kind classification and coercions for document values.
use serde_json::Value;
use std::borrow::Cow;

/// The kind of a document value, in comparison rank order.
///
/// `true` and `false` are distinct kinds and rank above every other kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ValueKind {
    /// Never produced by serde_json; kept so the rank order is complete.
    Undefined,
    Null,
    Number,
    String,
    Object,
    Array,
    False,
    True,
}

impl ValueKind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => ValueKind::Null,
            Value::Bool(false) => ValueKind::False,
            Value::Bool(true) => ValueKind::True,
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Array(_) => ValueKind::Array,
            Value::Object(_) => ValueKind::Object,
        }
    }

    /// The name used in evaluation error messages.
    pub fn type_name(self) -> &'static str {
        match self {
            ValueKind::Undefined => "JsonUndefined",
            ValueKind::Null => "JsonNull",
            ValueKind::Number => "JsonNumber",
            ValueKind::String => "JsonString",
            ValueKind::Object => "JsonObject",
            ValueKind::Array => "JsonArray",
            ValueKind::False | ValueKind::True => "JsonBoolean",
        }
    }
}

pub(crate) fn type_name(value: &Value) -> &'static str {
    ValueKind::of(value).type_name()
}

pub(crate) fn is_container(value: &Value) -> bool {
    matches!(value, Value::Array(_) | Value::Object(_))
}

/// Text form used by loose equality against a string.
pub(crate) fn text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s),
        Value::Number(n) => Cow::Owned(n.to_string()),
        Value::Bool(true) => Cow::Borrowed("True"),
        Value::Bool(false) => Cow::Borrowed("False"),
        Value::Null => Cow::Borrowed(""),
        Value::Array(_) | Value::Object(_) => Cow::Owned(value.to_string()),
    }
}

/// Numbers, and strings that parse as a number, coerce for ordering.
pub(crate) fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}
