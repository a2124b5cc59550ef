use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormulaError {
    #[error("lex error at {pos}: unexpected character '{ch}'")]
    UnexpectedChar { ch: char, pos: usize },
    #[error("lex error at {pos}: unrecognized operator '{op}'")]
    UnknownOperator { op: String, pos: usize },
    #[error("lex error at {pos}: invalid number '{text}'")]
    InvalidNumber { text: String, pos: usize },
    #[error("lex error at {pos}: field reference is missing its closing ']'")]
    UnterminatedField { pos: usize },
    #[error("syntax error: expected {expected}, found {found}")]
    Syntax { expected: String, found: String },
    #[error("unsupported node kind: {0}")]
    UnsupportedNodeKind(String),
    #[error("formula too long: {len} bytes exceeds the limit of {max}")]
    TooLong { len: usize, max: usize },
    #[error("formula has too many tokens: {count} exceeds the limit of {max}")]
    TooManyTokens { count: usize, max: usize },
    #[error("formula nests deeper than the limit of {max}")]
    TooDeep { max: usize },
}

/// Coarse classification of a [`FormulaError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Lex,
    Syntax,
    UnsupportedNodeKind,
    Limit,
}

impl FormulaError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FormulaError::UnexpectedChar { .. }
            | FormulaError::UnknownOperator { .. }
            | FormulaError::InvalidNumber { .. }
            | FormulaError::UnterminatedField { .. } => ErrorKind::Lex,
            FormulaError::Syntax { .. } => ErrorKind::Syntax,
            FormulaError::UnsupportedNodeKind(_) => ErrorKind::UnsupportedNodeKind,
            FormulaError::TooLong { .. }
            | FormulaError::TooManyTokens { .. }
            | FormulaError::TooDeep { .. } => ErrorKind::Limit,
        }
    }

    pub(crate) fn syntax(expected: impl Into<String>, found: impl ToString) -> Self {
        FormulaError::Syntax {
            expected: expected.into(),
            found: found.to_string(),
        }
    }
}
