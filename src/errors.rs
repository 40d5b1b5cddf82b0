use crate::ast::AstError;
use crate::compiler::{GenerateError, HydrationError};
use crate::options::EngineOptionsError;
use crate::pattern::{ParseError, PatternError};
use crate::types::{ConstraintError, TypeBuildError, TypeSystemError};
use crate::validation::ValidationError;
use thiserror::Error;

/// Every failure the engine surface can report.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Pattern(#[from] PatternError),
    #[error(transparent)]
    TypeSystem(#[from] TypeSystemError),
    #[error(transparent)]
    Constraint(#[from] ConstraintError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Generate(#[from] GenerateError),
    #[error(transparent)]
    Hydration(#[from] HydrationError),
    #[error(transparent)]
    Options(#[from] EngineOptionsError),
    #[error(transparent)]
    Ast(#[from] AstError),
}

impl From<ParseError> for EngineError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::Syntax(e) => EngineError::Pattern(e),
            ParseError::TypeSystem(e) => EngineError::TypeSystem(e),
            ParseError::Constraint(e) => EngineError::Constraint(e),
            ParseError::Ast(e) => EngineError::Ast(e),
        }
    }
}

impl From<TypeBuildError> for EngineError {
    fn from(err: TypeBuildError) -> Self {
        ParseError::from(err).into()
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
