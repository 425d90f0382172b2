//! Pairwise comparison of document values for query operators.
use crate::ast::QueryOperator;
use crate::error::JPathError;
use crate::value::{ValueKind, as_number, is_container, text};
use regex::Regex;
use serde_json::Value;
use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Decides whether one (left, right) pair satisfies `operator`.
///
/// Only a regex that fails to compile is an error.
pub(crate) fn matches_pair(
    operator: QueryOperator,
    left: &Value,
    right: &Value,
    regexes: &RegexCache,
) -> Result<bool, JPathError> {
    if is_container(left) || is_container(right) {
        return Ok(matches!(
            operator,
            QueryOperator::Exists | QueryOperator::NotEquals
        ));
    }

    let outcome = match operator {
        QueryOperator::Equals => loose_equals(left, right),
        QueryOperator::NotEquals => !loose_equals(left, right),
        QueryOperator::StrictEquals => strict_equals(left, right),
        QueryOperator::StrictNotEquals => !strict_equals(left, right),
        QueryOperator::LessThan => compare(left, right) == Ordering::Less,
        QueryOperator::LessThanOrEquals => compare(left, right) != Ordering::Greater,
        QueryOperator::GreaterThan => compare(left, right) == Ordering::Greater,
        QueryOperator::GreaterThanOrEquals => compare(left, right) != Ordering::Less,
        QueryOperator::RegexEquals => return regexes.regex_equals(left, right),
        QueryOperator::Exists => true,
    };
    Ok(outcome)
}

/// `==`: raw equality, then numeric equality, then the text of `value`
/// against a string `query`.
pub fn loose_equals(value: &Value, query: &Value) -> bool {
    if value == query {
        return true;
    }
    if let (Value::Number(a), Value::Number(b)) = (value, query) {
        return a.as_f64() == b.as_f64();
    }
    match query {
        Value::String(q) => text(value) == q.as_str(),
        _ => false,
    }
}

/// `===`: same kind and the ordering comparator reports equal.
pub fn strict_equals(value: &Value, query: &Value) -> bool {
    ValueKind::of(value) == ValueKind::of(query) && compare(value, query) == Ordering::Equal
}

/// Total order used by `<`, `<=`, `>` and `>=`.
pub fn compare(left: &Value, right: &Value) -> Ordering {
    let (left_kind, right_kind) = (ValueKind::of(left), ValueKind::of(right));
    if left_kind == right_kind {
        return match (left, right) {
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
                (Some(a), Some(b)) => compare_f64(a, b),
                _ => Ordering::Equal,
            },
            _ => Ordering::Equal,
        };
    }

    match (as_number(left), as_number(right)) {
        (Some(a), Some(b)) => compare_f64(a, b),
        _ => left_kind.cmp(&right_kind),
    }
}

/// NaN equals itself and sorts below every other number.
fn compare_f64(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

/// `=~`: `pattern` is a `/body/flags` literal, searched for anywhere in
/// `input`. Non-string operands never match.
pub fn regex_equals(input: &Value, pattern: &Value) -> Result<bool, JPathError> {
    RegexCache::default().regex_equals(input, pattern)
}

/// Compiled `/body/flags` literals, keyed by their text. One cache lives for
/// one query step of one evaluation.
#[derive(Debug, Default)]
pub(crate) struct RegexCache {
    compiled: RefCell<HashMap<String, Option<Regex>>>,
}

impl RegexCache {
    pub(crate) fn regex_equals(&self, input: &Value, pattern: &Value) -> Result<bool, JPathError> {
        let (Value::String(input), Value::String(pattern)) = (input, pattern) else {
            return Ok(false);
        };
        let mut compiled = self.compiled.borrow_mut();
        if !compiled.contains_key(pattern.as_str()) {
            let regex = build_regex(pattern)?;
            compiled.insert(pattern.clone(), regex);
        }
        Ok(compiled[pattern.as_str()]
            .as_ref()
            .is_some_and(|regex| regex.is_match(input)))
    }
}

/// Splits `/body/flags` and compiles it. Returns `None` when the literal has
/// no closing slash.
fn build_regex(literal: &str) -> Result<Option<Regex>, JPathError> {
    let Some(close) = literal.rfind('/') else {
        return Ok(None);
    };
    if close == 0 || !literal.starts_with('/') {
        return Ok(None);
    }
    let body = &literal[1..close];
    let flags = &literal[close + 1..];

    // `x` is explicit capture, which does not change what matches.
    let mut pattern = String::new();
    if flags.contains('i') {
        pattern.push_str("(?i)");
    }
    if flags.contains('m') {
        pattern.push_str("(?m)");
    }
    if flags.contains('s') {
        pattern.push_str("(?s)");
    }
    pattern.push_str(body);

    Regex::new(&pattern).map(Some).map_err(|e| {
        log::debug!("Regex '{}' failed to compile: {}", literal, e);
        JPathError::evaluation(format!("Invalid regex pattern: {e}"))
    })
}
