mod error;
mod rules;

pub use error::{
    RULE_ADJACENT_GREEDY, RULE_DUPLICATE_GROUP, RULE_EMPTY_CONSTRAINT, RULE_TREE_CONTEXT,
    ValidationError, ValidationResult,
};
pub use rules::{
    ConstraintValidator, DuplicateGroupValidator, GreedyValidator, TreeContextValidator, Validator,
};

use crate::ast::Ast;

/// Ordered list of validators; stops at the first failure.
pub struct ValidationPipeline {
    validators: Vec<Box<dyn Validator>>,
}

impl std::fmt::Debug for ValidationPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationPipeline")
            .field("rules", &self.rules())
            .finish()
    }
}

impl Default for ValidationPipeline {
    fn default() -> Self {
        Self::new()
            .with(TreeContextValidator)
            .with(DuplicateGroupValidator)
            .with(ConstraintValidator)
            .with(GreedyValidator)
    }
}

impl ValidationPipeline {
    /// Pipeline with no validators.
    pub fn new() -> Self {
        Self {
            validators: Vec::new(),
        }
    }

    pub fn with<V: Validator + 'static>(mut self, validator: V) -> Self {
        self.validators.push(Box::new(validator));
        self
    }

    pub fn rules(&self) -> Vec<&'static str> {
        self.validators.iter().map(|v| v.rule()).collect()
    }

    #[tracing::instrument(level = "trace", skip(self, ast), fields(nodes = ast.len()))]
    pub fn validate(&self, ast: &Ast) -> ValidationResult<()> {
        for validator in &self.validators {
            if let Err(err) = validator.validate(ast) {
                tracing::event!(
                    tracing::Level::DEBUG,
                    operation = "validate",
                    rule = validator.rule(),
                    error = %err
                );
                return Err(err);
            }
        }
        Ok(())
    }
}
