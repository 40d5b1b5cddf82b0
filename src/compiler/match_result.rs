use crate::types::{ConstraintArgs, Value, ValueError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A resolved group: value plus the type it was parsed with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMatch {
    pub value: Value,
    pub type_name: String,
    pub constraints: ConstraintArgs,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupError {
    pub group: String,
    pub error: ValueError,
}

/// Outcome of one successful regex match. Per-group failures are kept, not raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    input: String,
    groups: BTreeMap<String, GroupMatch>,
    errors: Vec<GroupError>,
}

impl MatchResult {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            groups: BTreeMap::new(),
            errors: Vec::new(),
        }
    }

    pub(crate) fn add_group(&mut self, name: &str, value: Value, type_name: &str, constraints: &ConstraintArgs) {
        self.groups.insert(
            name.to_string(),
            GroupMatch {
                value,
                type_name: type_name.to_string(),
                constraints: constraints.clone(),
            },
        );
    }

    pub(crate) fn add_error(&mut self, group: &str, error: ValueError) {
        self.errors.push(GroupError {
            group: group.to_string(),
            error,
        });
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.groups.get(name).map(|g| &g.value)
    }

    pub fn groups(&self) -> &BTreeMap<String, GroupMatch> {
        &self.groups
    }

    pub fn errors(&self) -> &[GroupError] {
        &self.errors
    }

    pub fn is_failed(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Flat name to value map, suitable for `generate`.
    pub fn values(&self) -> BTreeMap<String, Value> {
        self.groups
            .iter()
            .map(|(name, group)| (name.clone(), group.value.clone()))
            .collect()
    }
}
