//! The evaluation engine: threads a lazy sequence of nodes through each
//! compiled step.
//!
//! `'a` is the lifetime of the document, `'p` the lifetime of the compiled
//! path the iterators borrow from.

use crate::ast::{CompositeOperator, Operand, PathStep, QueryExpression, QueryOperator};
use crate::error::JPathError;
use crate::operators::{RegexCache, matches_pair};
use crate::scan::scan_values;
use crate::value::type_name;
use itertools::Itertools;
use serde_json::Value;
use std::iter;
use std::rc::Rc;

/// A lazy sequence of matched nodes. Strict-mode failures surface as `Err`
/// items; the sequence returned by [`evaluate`] ends after the first one.
pub type Matches<'a, 'p> = Box<dyn Iterator<Item = Result<&'a Value, JPathError>> + 'p>;

/// State shared by every step of one evaluation.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationContext<'a> {
    pub root: &'a Value,
    /// If true, a step that cannot resolve fails instead of contributing
    /// nothing.
    pub strict: bool,
}

impl<'a> EvaluationContext<'a> {
    pub fn new(root: &'a Value, strict: bool) -> Self {
        Self { root, strict }
    }
}

/// Evaluates `steps` starting from `start`.
pub fn evaluate<'a: 'p, 'p>(
    steps: &'p [PathStep],
    ctx: EvaluationContext<'a>,
    start: &'a Value,
) -> Matches<'a, 'p> {
    let seed = single(start);
    let pipeline = steps
        .iter()
        .fold(seed, |input, step| apply_step(step, input, ctx));
    Box::new(pipeline.take_while_inclusive(Result::is_ok))
}

fn apply_step<'a: 'p, 'p>(
    step: &'p PathStep,
    input: Matches<'a, 'p>,
    ctx: EvaluationContext<'a>,
) -> Matches<'a, 'p> {
    let strict = ctx.strict;
    match step {
        PathStep::Root => single(ctx.root),
        PathStep::Field(name) => for_each_node(input, move |node| {
            select_field(node, name.as_deref(), strict)
        }),
        PathStep::MultiField(names) => {
            for_each_node(input, move |node| select_fields(node, names, strict))
        }
        PathStep::Index(Some(index)) => {
            let index = *index;
            for_each_node(input, move |node| select_index(node, index, strict))
        }
        PathStep::Index(None) => for_each_node(input, move |node| select_elements(node, strict)),
        PathStep::MultiIndex(indexes) => for_each_node(input, move |node| {
            Box::new(
                indexes
                    .iter()
                    .flat_map(move |&index| select_index(node, index, strict)),
            )
        }),
        PathStep::Slice { start, end, step } => {
            let step = step.unwrap_or(1);
            if step == 0 {
                return fail(JPathError::evaluation("Step cannot be zero."));
            }
            let bounds = SliceBounds {
                start: *start,
                end: *end,
                step,
            };
            for_each_node(input, move |node| select_slice(node, bounds, strict))
        }
        PathStep::Scan(name) => for_each_node(input, move |node| {
            let name = name.as_deref();
            Box::new(
                scan_values(node)
                    .filter(move |(key, _)| *key == name)
                    .map(|(_, value)| Ok(value)),
            )
        }),
        PathStep::ScanMultiple(names) => for_each_node(input, move |node| {
            Box::new(
                scan_values(node)
                    .filter(move |(key, _)| key.is_some_and(|k| names.iter().any(|n| n == k)))
                    .map(|(_, value)| Ok(value)),
            )
        }),
        PathStep::Query(expression) => {
            let regexes = Rc::new(RegexCache::default());
            for_each_node(input, move |node| {
                filter_matching(children(node), expression, ctx.root, Rc::clone(&regexes))
            })
        }
        PathStep::QueryScan(expression) => {
            let regexes = Rc::new(RegexCache::default());
            for_each_node(input, move |node| {
                let candidates = scan_values(node).map(|(_, value)| value);
                filter_matching(candidates, expression, ctx.root, Rc::clone(&regexes))
            })
        }
    }
}

// --- Sequence helpers ---

fn single<'a: 'p, 'p>(node: &'a Value) -> Matches<'a, 'p> {
    Box::new(iter::once(Ok(node)))
}

fn nothing<'a: 'p, 'p>() -> Matches<'a, 'p> {
    Box::new(iter::empty())
}

fn fail<'a: 'p, 'p>(error: JPathError) -> Matches<'a, 'p> {
    Box::new(iter::once(Err(error)))
}

/// Skips, or fails in strict mode.
fn unresolved<'a: 'p, 'p>(strict: bool, message: impl FnOnce() -> String) -> Matches<'a, 'p> {
    if strict {
        fail(JPathError::evaluation(message()))
    } else {
        nothing()
    }
}

/// Applies `select` to every node of `input`, passing errors through.
fn for_each_node<'a: 'p, 'p, F>(input: Matches<'a, 'p>, mut select: F) -> Matches<'a, 'p>
where
    F: FnMut(&'a Value) -> Matches<'a, 'p> + 'p,
{
    Box::new(input.flat_map(move |item| match item {
        Ok(node) => select(node),
        Err(error) => fail(error),
    }))
}

fn children(node: &Value) -> Box<dyn Iterator<Item = &Value> + '_> {
    match node {
        Value::Array(items) => Box::new(items.iter()),
        Value::Object(map) => Box::new(map.values()),
        _ => Box::new(iter::empty()),
    }
}

// --- Steps ---

fn select_field<'a: 'p, 'p>(node: &'a Value, name: Option<&'p str>, strict: bool) -> Matches<'a, 'p> {
    match (node, name) {
        (Value::Object(map), Some(name)) => match map.get(name) {
            Some(value) => single(value),
            None => unresolved(strict, || {
                format!("Property '{name}' does not exist on JsonObject.")
            }),
        },
        (Value::Object(map), None) => Box::new(map.values().map(Ok)),
        (other, name) => unresolved(strict, || {
            format!(
                "Property '{}' not valid on {}.",
                name.unwrap_or("*"),
                type_name(other)
            )
        }),
    }
}

fn select_fields<'a: 'p, 'p>(node: &'a Value, names: &'p [String], strict: bool) -> Matches<'a, 'p> {
    match node {
        Value::Object(map) => Box::new(names.iter().filter_map(move |name| {
            match map.get(name) {
                Some(value) => Some(Ok(value)),
                None if strict => Some(Err(JPathError::evaluation(format!(
                    "Property '{name}' does not exist on JsonObject."
                )))),
                None => None,
            }
        })),
        other => unresolved(strict, || {
            format!(
                "Properties {} not valid on {}.",
                names.iter().map(|name| format!("'{name}'")).join(", "),
                type_name(other)
            )
        }),
    }
}

fn select_index<'a: 'p, 'p>(node: &'a Value, index: i64, strict: bool) -> Matches<'a, 'p> {
    match node {
        Value::Array(items) => match usize::try_from(index).ok().and_then(|i| items.get(i)) {
            Some(value) => single(value),
            None => unresolved(strict, || {
                format!("Index {index} outside the bounds of JsonArray.")
            }),
        },
        other => unresolved(strict, || {
            format!("Index {index} not valid on {}.", type_name(other))
        }),
    }
}

fn select_elements<'a: 'p, 'p>(node: &'a Value, strict: bool) -> Matches<'a, 'p> {
    match node {
        Value::Array(items) => Box::new(items.iter().map(Ok)),
        other => unresolved(strict, || {
            format!("Index * not valid on {}.", type_name(other))
        }),
    }
}

#[derive(Debug, Clone, Copy)]
struct SliceBounds {
    start: Option<i64>,
    end: Option<i64>,
    /// Never zero.
    step: i64,
}

impl SliceBounds {
    /// Resolves the written bounds against an array of `len` elements,
    /// returning the first index and the exclusive stop.
    fn resolve(&self, len: i64) -> (i64, i64) {
        let forward = self.step > 0;
        let mut from = self.start.unwrap_or(if forward { 0 } else { len - 1 });
        let mut to = self.end.unwrap_or(if forward { len } else { -1 });
        if self.start.is_some_and(|s| s < 0) {
            from += len;
        }
        if self.end.is_some_and(|e| e < 0) {
            to += len;
        }

        let from = if forward {
            from.clamp(0, len)
        } else {
            from.min(len - 1)
        };
        (from, to.clamp(-1, len))
    }

    fn in_range(&self, index: i64, stop: i64) -> bool {
        if self.step > 0 { index < stop } else { index > stop }
    }

    fn describe(bound: Option<i64>) -> String {
        bound.map_or_else(|| "*".to_string(), |b| b.to_string())
    }
}

fn select_slice<'a: 'p, 'p>(node: &'a Value, bounds: SliceBounds, strict: bool) -> Matches<'a, 'p> {
    let Value::Array(items) = node else {
        return unresolved(strict, || {
            format!("Array slice is not valid on {}.", type_name(node))
        });
    };

    let (from, stop) = bounds.resolve(items.len() as i64);
    if !bounds.in_range(from, stop) {
        return unresolved(strict, || {
            format!(
                "Array slice of {} to {} returned no results.",
                SliceBounds::describe(bounds.start),
                SliceBounds::describe(bounds.end)
            )
        });
    }

    let stride = bounds.step.unsigned_abs() as usize;
    let indexes: Box<dyn Iterator<Item = i64>> = if bounds.step > 0 {
        Box::new((from..stop).step_by(stride))
    } else {
        Box::new((stop + 1..=from).rev().step_by(stride))
    };
    Box::new(
        indexes
            .filter_map(move |i| usize::try_from(i).ok().and_then(|i| items.get(i)))
            .map(Ok),
    )
}

fn filter_matching<'a: 'p, 'p>(
    candidates: impl Iterator<Item = &'a Value> + 'p,
    expression: &'p QueryExpression,
    root: &'a Value,
    regexes: Rc<RegexCache>,
) -> Matches<'a, 'p> {
    Box::new(candidates.filter_map(move |candidate| {
        match expression.matches(root, candidate, &regexes) {
            Ok(true) => Some(Ok(candidate)),
            Ok(false) => None,
            Err(error) => Some(Err(error)),
        }
    }))
}

// --- Query expressions ---

impl QueryExpression {
    /// Tests `node` against this expression. `$` operands resolve from
    /// `root`, `@` operands from `node`.
    pub fn is_match(&self, root: &Value, node: &Value) -> Result<bool, JPathError> {
        self.matches(root, node, &RegexCache::default())
    }

    fn matches(&self, root: &Value, node: &Value, regexes: &RegexCache) -> Result<bool, JPathError> {
        match self {
            QueryExpression::Composite {
                operator: CompositeOperator::And,
                expressions,
            } => {
                for expression in expressions {
                    if !expression.matches(root, node, regexes)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            QueryExpression::Composite {
                operator: CompositeOperator::Or,
                expressions,
            } => {
                for expression in expressions {
                    if expression.matches(root, node, regexes)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            QueryExpression::Comparison {
                operator,
                left,
                right,
            } => compare_operands(*operator, left, right.as_ref(), root, node, regexes),
        }
    }
}

impl Operand {
    /// Operand values for one node under test. Sub-paths never run strict.
    fn resolve<'v>(&'v self, root: &'v Value, node: &'v Value) -> Matches<'v, 'v> {
        match self {
            Operand::Literal(value) => single(value),
            Operand::Path(steps) => evaluate(steps, EvaluationContext::new(root, false), node),
        }
    }
}

fn compare_operands(
    operator: QueryOperator,
    left: &Operand,
    right: Option<&Operand>,
    root: &Value,
    node: &Value,
    regexes: &RegexCache,
) -> Result<bool, JPathError> {
    let mut lefts = left.resolve(root, node);
    let Some(first) = lefts.next().transpose()? else {
        return Ok(false);
    };
    if operator == QueryOperator::Exists {
        return Ok(true);
    }

    let rights = match right {
        Some(right) => right.resolve(root, node).collect::<Result<Vec<_>, _>>()?,
        None => Vec::new(),
    };
    for value in iter::once(Ok(first)).chain(lefts) {
        let value = value?;
        for query in &rights {
            if matches_pair(operator, value, query, regexes)? {
                return Ok(true);
            }
        }
    }
    Ok(false)
}
