//! Defines the compiled form of a path: an ordered chain of filter steps with
//! embedded boolean query expressions.
use serde_json::Value;
use std::fmt;

/// A single filter in a compiled path.
#[derive(Debug, Clone, PartialEq)]
pub enum PathStep {
    /// Jumps to the document root (`$` inside a query).
    Root,
    /// `.name`, `['name']` or the `*` wildcard (`None`).
    Field(Option<String>),
    /// `['a','b']`
    MultiField(Vec<String>),
    /// `[3]` or the `[*]` wildcard (`None`).
    Index(Option<i64>),
    /// `[1,3,5]`
    MultiIndex(Vec<i64>),
    /// `[start:end:step]`, every part optional.
    Slice {
        start: Option<i64>,
        end: Option<i64>,
        step: Option<i64>,
    },
    /// `..name` or `..*` (`None`).
    Scan(Option<String>),
    /// `..['a','b']`
    ScanMultiple(Vec<String>),
    /// `[?(...)]` over the direct children of each node.
    Query(QueryExpression),
    /// `..[?(...)]` over every node reached by a scan.
    QueryScan(QueryExpression),
}

/// Operators usable inside `[?(...)]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOperator {
    Equals,
    NotEquals,
    StrictEquals,
    StrictNotEquals,
    LessThan,
    LessThanOrEquals,
    GreaterThan,
    GreaterThanOrEquals,
    RegexEquals,
    Exists,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositeOperator {
    And,
    Or,
}

/// One side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Literal(Value),
    /// A sub-path. `$`-rooted paths begin with [`PathStep::Root`]; `@`-rooted
    /// paths are evaluated from the node under test.
    Path(Vec<PathStep>),
}

/// A boolean filter predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryExpression {
    Comparison {
        operator: QueryOperator,
        left: Operand,
        /// Absent for [`QueryOperator::Exists`].
        right: Option<Operand>,
    },
    Composite {
        operator: CompositeOperator,
        expressions: Vec<QueryExpression>,
    },
}

impl fmt::Display for QueryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            QueryOperator::Equals => "==",
            QueryOperator::NotEquals => "!=",
            QueryOperator::StrictEquals => "===",
            QueryOperator::StrictNotEquals => "!==",
            QueryOperator::LessThan => "<",
            QueryOperator::LessThanOrEquals => "<=",
            QueryOperator::GreaterThan => ">",
            QueryOperator::GreaterThanOrEquals => ">=",
            QueryOperator::RegexEquals => "=~",
            QueryOperator::Exists => "exists",
        };
        f.write_str(symbol)
    }
}

impl fmt::Display for CompositeOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CompositeOperator::And => "&&",
            CompositeOperator::Or => "||",
        })
    }
}
