use thiserror::Error;

/// Errors raised while compiling or evaluating a path.
///
/// The display text is the bare message so callers can surface it unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JPathError {
    /// The path text is malformed.
    #[error("{0}")]
    SyntaxError(String),

    /// A step could not resolve under strict evaluation, or a runtime
    /// failure that is independent of the strict flag.
    #[error("{0}")]
    EvaluationError(String),
}

impl JPathError {
    pub fn syntax(message: impl Into<String>) -> Self {
        Self::SyntaxError(message.into())
    }

    pub fn evaluation(message: impl Into<String>) -> Self {
        Self::EvaluationError(message.into())
    }

    pub fn unexpected_character(context: &str, c: char) -> Self {
        Self::SyntaxError(format!("Unexpected character {context}: {c}"))
    }

    pub fn is_syntax(&self) -> bool {
        matches!(self, Self::SyntaxError(_))
    }

    pub fn is_evaluation(&self) -> bool {
        matches!(self, Self::EvaluationError(_))
    }

    pub fn message(&self) -> &str {
        match self {
            Self::SyntaxError(m) | Self::EvaluationError(m) => m,
        }
    }
}
