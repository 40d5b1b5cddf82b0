use crate::ast::AstError;
use crate::types::{ConstraintError, TypeBuildError, TypeSystemError};
use thiserror::Error;

/// Malformed DSL text. Offsets are byte indices into `pattern`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PatternError {
    #[error("unclosed group starting at {index} in pattern '{pattern}'")]
    UnclosedGroup { pattern: String, index: usize },
    #[error("unclosed optional subsequence starting at {index} in pattern '{pattern}'")]
    UnclosedSubSequence { pattern: String, index: usize },
    #[error("invalid group syntax '{content}' at {index} in pattern '{pattern}'")]
    InvalidGroupSyntax {
        pattern: String,
        index: usize,
        content: String,
    },
    #[error(
        "group name '{name}' at {index} in pattern '{pattern}' must start with a letter or underscore and contain only letters, digits and underscores"
    )]
    InvalidGroupName {
        pattern: String,
        index: usize,
        name: String,
    },
    #[error("empty literal at {index} in pattern '{pattern}'")]
    EmptyLiteral { pattern: String, index: usize },
    #[error("pattern '{pattern}' produced an invalid regex '{regex}': {error}")]
    RegexBuild {
        pattern: String,
        regex: String,
        error: String,
    },
}

pub type PatternResult<T> = Result<T, PatternError>;

/// Anything that can stop a parse: bad syntax, an unknown type, or a bad constraint.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error(transparent)]
    Syntax(#[from] PatternError),
    #[error(transparent)]
    TypeSystem(#[from] TypeSystemError),
    #[error(transparent)]
    Constraint(#[from] ConstraintError),
    #[error(transparent)]
    Ast(#[from] AstError),
}

impl From<TypeBuildError> for ParseError {
    fn from(err: TypeBuildError) -> Self {
        match err {
            TypeBuildError::TypeSystem(e) => ParseError::TypeSystem(e),
            TypeBuildError::Constraint(e) => ParseError::Constraint(e),
        }
    }
}

pub type ParseResult<T> = Result<T, ParseError>;
