use crate::ast::AstError;
use crate::types::{TypeBuildError, ValueError};
use thiserror::Error;

/// Generation stops at the first group that cannot be rendered.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerateError {
    #[error("cannot generate group '{group}': {source}")]
    Value {
        group: String,
        #[source]
        source: ValueError,
    },
}

pub type GenerateResult<T> = Result<T, GenerateError>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HydrationError {
    #[error("stored regex '{regex}' does not compile: {error}")]
    Regex { regex: String, error: String },
    #[error("stored tree must start with a sequence node")]
    MissingRoot,
    #[error(transparent)]
    TypeBuild(#[from] TypeBuildError),
    #[error(transparent)]
    Ast(#[from] AstError),
}

pub type HydrationResult<T> = Result<T, HydrationError>;
