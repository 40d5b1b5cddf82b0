use super::error::{GenerateResult, HydrationError, HydrationResult};
use super::match_result::MatchResult;
use super::source::ValueSource;
use crate::ast::{Ast, NodeOps, NodeRecord};
use crate::pattern::{PatternError, PatternResult};
use crate::types::{ConstraintArgs, PatternType, TypeRegistry, Value};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug)]
struct CompiledGroup {
    group_id: String,
    name: String,
    ty: Arc<dyn PatternType>,
}

/// Immutable result of compiling one pattern: regex, tree and group metadata.
#[derive(Debug)]
pub struct CompiledPattern {
    pattern: String,
    regex_source: String,
    regex: Regex,
    ast: Ast,
    groups: Vec<CompiledGroup>,
    named_groups: Vec<(String, String)>,
    group_types: BTreeMap<String, String>,
    group_constraints: BTreeMap<String, ConstraintArgs>,
}

/// Plain persisted form of a [`CompiledPattern`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledPatternRecord {
    pub pattern: String,
    pub regex: String,
    pub ast: NodeRecord,
    /// `(group id, group name)` in pattern order.
    pub named_groups: Vec<(String, String)>,
    pub group_types: BTreeMap<String, String>,
    pub group_constraints: BTreeMap<String, ConstraintArgs>,
}

fn collect_groups(ast: &Ast) -> Vec<CompiledGroup> {
    ast.groups()
        .into_iter()
        .map(|(_, group)| CompiledGroup {
            group_id: group.group_id().to_string(),
            name: group.name().to_string(),
            ty: Arc::clone(group.pattern_type()),
        })
        .collect()
}

impl CompiledPattern {
    /// Builds the anchored regex and group maps for an already validated tree.
    pub fn create(pattern: &str, ast: Ast) -> PatternResult<Self> {
        let regex_source = format!("^{}$", ast.regex());
        let regex = Regex::new(&regex_source).map_err(|e| PatternError::RegexBuild {
            pattern: pattern.to_string(),
            regex: regex_source.clone(),
            error: e.to_string(),
        })?;

        let groups = collect_groups(&ast);
        let named_groups = groups
            .iter()
            .map(|g| (g.group_id.clone(), g.name.clone()))
            .collect();
        let group_types = groups
            .iter()
            .map(|g| (g.name.clone(), g.ty.name().to_string()))
            .collect();
        let group_constraints = groups
            .iter()
            .map(|g| (g.name.clone(), g.ty.constraint_arguments().clone()))
            .collect();

        Ok(Self {
            pattern: pattern.to_string(),
            regex_source,
            regex,
            ast,
            groups,
            named_groups,
            group_types,
            group_constraints,
        })
    }

    /// Restores a pattern from its record, instantiating types from `registry`.
    pub fn hydrate(record: &CompiledPatternRecord, registry: &TypeRegistry) -> HydrationResult<Self> {
        let ast = Ast::from_record(&record.ast, registry)?;
        let regex = Regex::new(&record.regex).map_err(|e| HydrationError::Regex {
            regex: record.regex.clone(),
            error: e.to_string(),
        })?;

        Ok(Self {
            pattern: record.pattern.clone(),
            regex_source: record.regex.clone(),
            regex,
            groups: collect_groups(&ast),
            ast,
            named_groups: record.named_groups.clone(),
            group_types: record.group_types.clone(),
            group_constraints: record.group_constraints.clone(),
        })
    }

    pub fn dehydrate(&self) -> CompiledPatternRecord {
        CompiledPatternRecord {
            pattern: self.pattern.clone(),
            regex: self.regex_source.clone(),
            ast: self.ast.to_record(),
            named_groups: self.named_groups.clone(),
            group_types: self.group_types.clone(),
            group_constraints: self.group_constraints.clone(),
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Anchored regex source.
    pub fn regex(&self) -> &str {
        &self.regex_source
    }

    pub fn ast(&self) -> &Ast {
        &self.ast
    }

    pub fn named_groups(&self) -> &[(String, String)] {
        &self.named_groups
    }

    pub fn group_types(&self) -> &BTreeMap<String, String> {
        &self.group_types
    }

    pub fn group_constraints(&self) -> &BTreeMap<String, ConstraintArgs> {
        &self.group_constraints
    }

    /// Types of every group in pattern order.
    pub fn types(&self) -> impl Iterator<Item = (&str, &Arc<dyn PatternType>)> {
        self.groups.iter().map(|g| (g.name.as_str(), &g.ty))
    }

    /// Matches the whole input. Empty input never matches.
    #[tracing::instrument(level = "trace", skip(self, input), fields(pattern = %self.pattern, input_len = input.len()))]
    pub fn match_input(&self, input: &str) -> Option<MatchResult> {
        if input.is_empty() {
            return None;
        }
        let captures = self.regex.captures(input)?;

        let mut result = MatchResult::new(input);
        for group in &self.groups {
            let captured = captures
                .name(&group.group_id)
                .map(|m| m.as_str())
                .filter(|raw| !raw.is_empty());
            let parsed = match captured {
                Some(raw) => group.ty.parse_value(Some(&Value::Str(raw.to_string()))),
                None if group.ty.has_default() => group.ty.parse_value(None),
                None => continue,
            };
            match parsed {
                Ok(value) => result.add_group(
                    &group.name,
                    value,
                    group.ty.name(),
                    group.ty.constraint_arguments(),
                ),
                Err(error) => result.add_error(&group.name, error),
            }
        }

        tracing::event!(
            tracing::Level::TRACE,
            operation = "match",
            groups = result.groups().len(),
            failed = result.is_failed()
        );
        Some(result)
    }

    /// Renders the pattern from named values; see [`ValueSource`] for accepted shapes.
    #[tracing::instrument(level = "trace", skip(self, values), fields(pattern = %self.pattern))]
    pub fn generate(&self, values: &dyn ValueSource) -> GenerateResult<String> {
        let output = self.ast.root().generate(values)?;
        tracing::event!(
            tracing::Level::TRACE,
            operation = "generate",
            output_len = output.len()
        );
        Ok(output)
    }
}
