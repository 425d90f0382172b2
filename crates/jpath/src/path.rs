//! The compiled path handle and its selection entry points.
use crate::ast::PathStep;
use crate::engine::{self, EvaluationContext, Matches};
use crate::error::JPathError;
use crate::parser::parse_path;
use serde_json::Value;
use std::str::FromStr;

/// A compiled path. Immutable and reusable across documents and threads.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JsonPath {
    steps: Vec<PathStep>,
}

impl JsonPath {
    pub fn parse(text: &str) -> Result<Self, JPathError> {
        parse_path(text).map(|steps| Self { steps })
    }

    pub fn from_steps(steps: Vec<PathStep>) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    /// `true` for `""` and `"$"`, which select the start node itself.
    pub fn is_identity(&self) -> bool {
        self.steps.is_empty()
    }

    /// Lazily selects every match, starting at `root`.
    pub fn evaluate<'a: 'p, 'p>(&'p self, root: &'a Value, strict: bool) -> Matches<'a, 'p> {
        self.evaluate_from(root, root, strict)
    }

    /// Lazily selects every match, starting at `start` inside the document
    /// rooted at `root`.
    pub fn evaluate_from<'a: 'p, 'p>(
        &'p self,
        root: &'a Value,
        start: &'a Value,
        strict: bool,
    ) -> Matches<'a, 'p> {
        log::trace!("Evaluating {} step(s), strict: {}", self.steps.len(), strict);
        engine::evaluate(&self.steps, EvaluationContext::new(root, strict), start)
    }

    /// The first match, if any.
    pub fn select_first<'a>(&self, root: &'a Value, strict: bool) -> Result<Option<&'a Value>, JPathError> {
        self.evaluate(root, strict).next().transpose()
    }

    /// At most one match; a second match is an error.
    pub fn select_token<'a>(&self, root: &'a Value, strict: bool) -> Result<Option<&'a Value>, JPathError> {
        let mut matches = self.evaluate(root, strict);
        let token = matches.next().transpose()?;
        if token.is_some() && matches.next().transpose()?.is_some() {
            return Err(JPathError::evaluation("Path returned multiple tokens."));
        }
        Ok(token)
    }

    /// Every match, or the first error.
    pub fn select_all<'a>(&self, root: &'a Value, strict: bool) -> Result<Vec<&'a Value>, JPathError> {
        self.evaluate(root, strict).collect()
    }
}

impl FromStr for JsonPath {
    type Err = JPathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
