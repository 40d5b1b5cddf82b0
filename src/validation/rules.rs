use super::error::{
    RULE_ADJACENT_GREEDY, RULE_DUPLICATE_GROUP, RULE_EMPTY_CONSTRAINT, RULE_TREE_CONTEXT,
    ValidationError, ValidationResult,
};
use crate::ast::{Ast, NodeKind, NodeOps, NodeRef};
use hashbrown::HashSet as FastHashSet;

/// One structural check over a complete tree.
pub trait Validator: Send + Sync {
    fn rule(&self) -> &'static str;

    fn validate(&self, ast: &Ast) -> ValidationResult<()>;
}

/// Runs each node's own context check.
#[derive(Debug, Default)]
pub struct TreeContextValidator;

impl Validator for TreeContextValidator {
    fn rule(&self) -> &'static str {
        RULE_TREE_CONTEXT
    }

    fn validate(&self, ast: &Ast) -> ValidationResult<()> {
        ast.walk()
            .iter()
            .try_for_each(|node| node.validate_tree_context())
    }
}

#[derive(Debug, Default)]
pub struct DuplicateGroupValidator;

impl Validator for DuplicateGroupValidator {
    fn rule(&self) -> &'static str {
        RULE_DUPLICATE_GROUP
    }

    fn validate(&self, ast: &Ast) -> ValidationResult<()> {
        let mut seen = FastHashSet::new();
        for (_, group) in ast.groups() {
            if !seen.insert(group.name()) {
                return Err(ValidationError::DuplicateGroup {
                    group: group.name().to_string(),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct ConstraintValidator;

impl Validator for ConstraintValidator {
    fn rule(&self) -> &'static str {
        RULE_EMPTY_CONSTRAINT
    }

    fn validate(&self, ast: &Ast) -> ValidationResult<()> {
        for (_, group) in ast.groups() {
            let args = group.pattern_type().constraint_arguments();
            if let Some((constraint, _)) = args.iter().find(|(_, value)| value.trim().is_empty()) {
                return Err(ValidationError::EmptyConstraintValue {
                    group: group.name().to_string(),
                    constraint: constraint.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Rejects two greedy groups with nothing between them in the same scope.
#[derive(Debug, Default)]
pub struct GreedyValidator;

impl GreedyValidator {
    fn check_node(node: NodeRef<'_>) -> ValidationResult<()> {
        if node.kind().children().is_empty() {
            return Ok(());
        }
        for child in node.children() {
            Self::check_node(child)?;
        }

        let mut previous: Option<&str> = None;
        for child in node.children() {
            match child.kind() {
                NodeKind::Group(group) if group.is_greedy() => {
                    if let Some(first) = previous {
                        return Err(ValidationError::AdjacentGreedyGroups {
                            first: first.to_string(),
                            second: group.name().to_string(),
                        });
                    }
                    previous = Some(group.name());
                }
                NodeKind::Group(_) | NodeKind::Literal(_) => previous = None,
                // nested scopes neither set nor reset adjacency
                NodeKind::Sequence(_) | NodeKind::SubSequence(_) => {}
            }
        }
        Ok(())
    }
}

impl Validator for GreedyValidator {
    fn rule(&self) -> &'static str {
        RULE_ADJACENT_GREEDY
    }

    fn validate(&self, ast: &Ast) -> ValidationResult<()> {
        Self::check_node(ast.root())
    }
}
