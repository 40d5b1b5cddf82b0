use thiserror::Error;

pub const RULE_TREE_CONTEXT: &str = "tree-context";
pub const RULE_DUPLICATE_GROUP: &str = "no-duplicate-group-names";
pub const RULE_EMPTY_CONSTRAINT: &str = "no-empty-constraint-values";
pub const RULE_ADJACENT_GREEDY: &str = "no-adjacent-greedy-groups";

/// A well-formed pattern that breaks a structural rule.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("empty optional subsequence '()' (node {node}); optional sections need at least one element")]
    EmptySubSequence { node: usize },
    #[error(
        "default constraint cannot be used on required group '{group}'; make it optional with '{{{group}:...(default={default})}}?' or move it into '( ... )'"
    )]
    DefaultOnRequiredGroup { group: String, default: String },
    #[error("duplicate group name '{group}'")]
    DuplicateGroup { group: String },
    #[error("constraint '{constraint}' on group '{group}' has an empty value")]
    EmptyConstraintValue { group: String, constraint: String },
    #[error(
        "adjacent greedy groups '{first}' and '{second}'; separate them with a literal or cap one with a constraint"
    )]
    AdjacentGreedyGroups { first: String, second: String },
}

impl ValidationError {
    /// Stable id of the rule that failed.
    pub fn rule(&self) -> &'static str {
        match self {
            ValidationError::EmptySubSequence { .. }
            | ValidationError::DefaultOnRequiredGroup { .. } => RULE_TREE_CONTEXT,
            ValidationError::DuplicateGroup { .. } => RULE_DUPLICATE_GROUP,
            ValidationError::EmptyConstraintValue { .. } => RULE_EMPTY_CONSTRAINT,
            ValidationError::AdjacentGreedyGroups { .. } => RULE_ADJACENT_GREEDY,
        }
    }

    /// Names of the pattern elements involved.
    pub fn elements(&self) -> Vec<&str> {
        match self {
            ValidationError::EmptySubSequence { .. } => Vec::new(),
            ValidationError::DefaultOnRequiredGroup { group, .. }
            | ValidationError::DuplicateGroup { group }
            | ValidationError::EmptyConstraintValue { group, .. } => vec![group.as_str()],
            ValidationError::AdjacentGreedyGroups { first, second } => {
                vec![first.as_str(), second.as_str()]
            }
        }
    }
}

pub type ValidationResult<T> = Result<T, ValidationError>;
