//! JSON path selection.
//!
//! A path such as `$.store.book[?(@.price < 10)].title` is compiled once into
//! a [`JsonPath`] and evaluated lazily against any number of
//! `serde_json::Value` documents. Supported syntax covers dot and bracket
//! member access, wildcards, indexes, slices, recursive scans (`..`) and
//! boolean filters with `@` and `$` sub-paths.

pub mod ast;
pub mod engine;
pub mod error;
mod operators;
mod parser;
mod path;
pub mod scan;
mod select;
pub mod value;

// --- Public API ---
pub use ast::{CompositeOperator, Operand, PathStep, QueryExpression, QueryOperator};
pub use engine::{EvaluationContext, Matches};
pub use error::JPathError;
pub use operators::{compare, loose_equals, regex_equals, strict_equals};
pub use parser::parse_path;
pub use path::JsonPath;
pub use scan::{ScanValues, scan_values};
pub use select::SelectToken;
pub use value::ValueKind;
