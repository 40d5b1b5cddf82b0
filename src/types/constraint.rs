use super::error::{ConstraintError, ValueError, ValueResult};
use super::fragment::{bound_repetition, unquote};
use super::value::Value;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

bitflags! {
    /// Classification of a constraint, driving rewrite order and greediness.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ConstraintTraits: u8 {
        const BOUNDING = 1 << 0;
        const REFINEMENT = 1 << 1;
        const CAPS_GREEDINESS = 1 << 2;
        const FALLBACK = 1 << 3;
    }
}

/// A named check attached to a type instance.
pub trait Constraint: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Argument exactly as declared in the pattern.
    fn raw(&self) -> &str;

    fn traits(&self) -> ConstraintTraits;

    /// Validates an already converted value and may transform it.
    fn check(&self, value: Value) -> ValueResult<Value>;

    fn modify_pattern(&self, pattern: &str) -> String {
        pattern.to_string()
    }
}

pub type ConstraintCtor = fn(&str) -> Result<Box<dyn Constraint>, ConstraintError>;

/// Constraint name paired with its constructor; types list the ones they accept.
#[derive(Clone, Copy)]
pub struct ConstraintSpec {
    pub name: &'static str,
    pub build: ConstraintCtor,
}

impl fmt::Debug for ConstraintSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstraintSpec")
            .field("name", &self.name)
            .finish()
    }
}

/// Ordered `key=value` constraint arguments. A repeated key overwrites the earlier value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConstraintArgs(Vec<(String, String)>);

impl ConstraintArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ConstraintArgs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut args = ConstraintArgs::new();
        for (k, v) in iter {
            args.insert(k, v);
        }
        args
    }
}

/// The constraints of one type instance, in declaration order.
#[derive(Debug, Default)]
pub struct ConstraintSet {
    constraints: Vec<Box<dyn Constraint>>,
    arguments: ConstraintArgs,
}

impl ConstraintSet {
    pub fn build(
        type_name: &str,
        supported: &[ConstraintSpec],
        args: &ConstraintArgs,
    ) -> Result<Self, ConstraintError> {
        let mut constraints: Vec<Box<dyn Constraint>> = Vec::with_capacity(args.len());
        for (name, raw) in args.iter() {
            let spec = supported.iter().find(|spec| spec.name == name).ok_or_else(|| {
                ConstraintError::UnknownConstraint {
                    type_name: type_name.to_string(),
                    constraint: name.to_string(),
                    supported: supported
                        .iter()
                        .map(|spec| spec.name)
                        .collect::<Vec<_>>()
                        .join(", "),
                }
            })?;

            // rejected later by the validation pipeline
            if raw.trim().is_empty() {
                constraints.push(Box::new(Unset {
                    name: name.to_string(),
                }));
                continue;
            }
            constraints.push((spec.build)(raw)?);
        }

        Ok(Self {
            constraints,
            arguments: args.clone(),
        })
    }

    pub fn arguments(&self) -> &ConstraintArgs {
        &self.arguments
    }

    pub fn get(&self, name: &str) -> Option<&dyn Constraint> {
        self.constraints
            .iter()
            .find(|c| c.name() == name)
            .map(|c| c.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Constraint> {
        self.constraints.iter().map(|c| c.as_ref())
    }

    /// Declared argument `name` read as an integer.
    pub fn int_argument(&self, name: &str) -> Option<i64> {
        self.arguments
            .get(name)
            .and_then(|raw| unquote(raw).parse::<i64>().ok())
    }

    /// Unquoted default argument, if a `default` constraint is declared.
    pub fn default_raw(&self) -> Option<String> {
        self.get(DEFAULT)
            .filter(|c| c.traits().contains(ConstraintTraits::FALLBACK))
            .map(|c| unquote(c.raw()))
    }

    pub fn caps_greediness(&self) -> bool {
        self.constraints
            .iter()
            .any(|c| c.traits().contains(ConstraintTraits::CAPS_GREEDINESS))
    }

    pub fn check(&self, mut value: Value) -> ValueResult<Value> {
        for constraint in &self.constraints {
            value = constraint.check(value)?;
        }
        Ok(value)
    }

    /// Bounding rewrites first, then refinement, then the rest.
    pub fn constrained_pattern(&self, base: &str) -> String {
        let mut pattern = base.to_string();
        let phases = [ConstraintTraits::BOUNDING, ConstraintTraits::REFINEMENT];
        for phase in phases {
            for constraint in self.iter().filter(|c| c.traits().contains(phase)) {
                pattern = constraint.modify_pattern(&pattern);
            }
        }
        for constraint in self
            .iter()
            .filter(|c| !c.traits().intersects(ConstraintTraits::BOUNDING | ConstraintTraits::REFINEMENT))
        {
            pattern = constraint.modify_pattern(&pattern);
        }
        pattern
    }
}

pub const MIN: &str = "min";
pub const MAX: &str = "max";
pub const MIN_LEN: &str = "minLen";
pub const MAX_LEN: &str = "maxLen";
pub const DEFAULT: &str = "default";
pub const STARTS_WITH: &str = "startsWith";
pub const ENDS_WITH: &str = "endsWith";
pub const CONTAINS: &str = "contains";

fn parse_i64(constraint: &str, raw: &str) -> Result<i64, ConstraintError> {
    unquote(raw)
        .parse::<i64>()
        .map_err(|e| ConstraintError::InvalidConstraintValue {
            constraint: constraint.to_string(),
            value: raw.to_string(),
            reason: e.to_string(),
        })
}

fn parse_usize(constraint: &str, raw: &str) -> Result<usize, ConstraintError> {
    unquote(raw)
        .parse::<usize>()
        .map_err(|e| ConstraintError::InvalidConstraintValue {
            constraint: constraint.to_string(),
            value: raw.to_string(),
            reason: e.to_string(),
        })
}

fn expect_int(value: &Value) -> ValueResult<i64> {
    value.as_int().ok_or(ValueError::TypeMismatch {
        expected: "integer",
        found: value.kind(),
    })
}

fn as_text(value: &Value) -> String {
    value.to_string()
}

#[derive(Debug)]
struct Unset {
    name: String,
}

impl Constraint for Unset {
    fn name(&self) -> &str {
        &self.name
    }

    fn raw(&self) -> &str {
        ""
    }

    fn traits(&self) -> ConstraintTraits {
        ConstraintTraits::empty()
    }

    fn check(&self, value: Value) -> ValueResult<Value> {
        Ok(value)
    }
}

#[derive(Debug)]
pub struct MinConstraint {
    raw: String,
    min: i64,
}

impl MinConstraint {
    pub fn build(raw: &str) -> Result<Box<dyn Constraint>, ConstraintError> {
        Ok(Box::new(Self {
            raw: raw.to_string(),
            min: parse_i64(MIN, raw)?,
        }))
    }
}

impl Constraint for MinConstraint {
    fn name(&self) -> &str {
        MIN
    }

    fn raw(&self) -> &str {
        &self.raw
    }

    fn traits(&self) -> ConstraintTraits {
        ConstraintTraits::BOUNDING
    }

    fn check(&self, value: Value) -> ValueResult<Value> {
        let v = expect_int(&value)?;
        if v < self.min {
            return Err(ValueError::BelowMin {
                value: v,
                min: self.min,
            });
        }
        Ok(value)
    }
}

/// Upper numeric bound, checked after matching. The digit cap that needs both
/// bounds is applied by the integer type.
#[derive(Debug)]
pub struct MaxConstraint {
    raw: String,
    max: i64,
}

impl MaxConstraint {
    pub fn build(raw: &str) -> Result<Box<dyn Constraint>, ConstraintError> {
        Ok(Box::new(Self {
            raw: raw.to_string(),
            max: parse_i64(MAX, raw)?,
        }))
    }
}

impl Constraint for MaxConstraint {
    fn name(&self) -> &str {
        MAX
    }

    fn raw(&self) -> &str {
        &self.raw
    }

    fn traits(&self) -> ConstraintTraits {
        ConstraintTraits::BOUNDING
    }

    fn check(&self, value: Value) -> ValueResult<Value> {
        let v = expect_int(&value)?;
        if v > self.max {
            return Err(ValueError::AboveMax {
                value: v,
                max: self.max,
            });
        }
        Ok(value)
    }
}

#[derive(Debug)]
pub struct MinLengthConstraint {
    raw: String,
    min: usize,
}

impl MinLengthConstraint {
    pub fn build(raw: &str) -> Result<Box<dyn Constraint>, ConstraintError> {
        Ok(Box::new(Self {
            raw: raw.to_string(),
            min: parse_usize(MIN_LEN, raw)?,
        }))
    }
}

impl Constraint for MinLengthConstraint {
    fn name(&self) -> &str {
        MIN_LEN
    }

    fn raw(&self) -> &str {
        &self.raw
    }

    fn traits(&self) -> ConstraintTraits {
        ConstraintTraits::BOUNDING
    }

    fn check(&self, value: Value) -> ValueResult<Value> {
        let len = as_text(&value).chars().count();
        if len < self.min {
            return Err(ValueError::TooShort { len, min: self.min });
        }
        Ok(value)
    }
}

/// Upper length bound in characters. The regex repetition is narrowed to
/// `{1,max}`, so longer input is a regex miss rather than a recorded `TooLong`,
/// and the group stops being greedy.
#[derive(Debug)]
pub struct MaxLengthConstraint {
    raw: String,
    max: usize,
}

impl MaxLengthConstraint {
    pub fn build(raw: &str) -> Result<Box<dyn Constraint>, ConstraintError> {
        let max = parse_usize(MAX_LEN, raw)?;
        if max == 0 {
            return Err(ConstraintError::InvalidConstraintValue {
                constraint: MAX_LEN.to_string(),
                value: raw.to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(Box::new(Self {
            raw: raw.to_string(),
            max,
        }))
    }
}

impl Constraint for MaxLengthConstraint {
    fn name(&self) -> &str {
        MAX_LEN
    }

    fn raw(&self) -> &str {
        &self.raw
    }

    fn traits(&self) -> ConstraintTraits {
        ConstraintTraits::BOUNDING | ConstraintTraits::CAPS_GREEDINESS
    }

    fn check(&self, value: Value) -> ValueResult<Value> {
        let len = as_text(&value).chars().count();
        if len > self.max {
            return Err(ValueError::TooLong { len, max: self.max });
        }
        Ok(value)
    }

    fn modify_pattern(&self, pattern: &str) -> String {
        bound_repetition(pattern, None, Some(self.max))
    }
}

#[derive(Debug)]
pub struct StartsWithConstraint {
    raw: String,
    prefix: String,
}

impl StartsWithConstraint {
    pub fn build(raw: &str) -> Result<Box<dyn Constraint>, ConstraintError> {
        Ok(Box::new(Self {
            raw: raw.to_string(),
            prefix: unquote(raw),
        }))
    }
}

impl Constraint for StartsWithConstraint {
    fn name(&self) -> &str {
        STARTS_WITH
    }

    fn raw(&self) -> &str {
        &self.raw
    }

    fn traits(&self) -> ConstraintTraits {
        ConstraintTraits::REFINEMENT
    }

    fn check(&self, value: Value) -> ValueResult<Value> {
        let text = as_text(&value);
        if !text.starts_with(&self.prefix) {
            return Err(ValueError::MissingPrefix {
                value: text,
                prefix: self.prefix.clone(),
            });
        }
        Ok(value)
    }
}

#[derive(Debug)]
pub struct EndsWithConstraint {
    raw: String,
    suffix: String,
}

impl EndsWithConstraint {
    pub fn build(raw: &str) -> Result<Box<dyn Constraint>, ConstraintError> {
        Ok(Box::new(Self {
            raw: raw.to_string(),
            suffix: unquote(raw),
        }))
    }
}

impl Constraint for EndsWithConstraint {
    fn name(&self) -> &str {
        ENDS_WITH
    }

    fn raw(&self) -> &str {
        &self.raw
    }

    fn traits(&self) -> ConstraintTraits {
        ConstraintTraits::REFINEMENT
    }

    fn check(&self, value: Value) -> ValueResult<Value> {
        let text = as_text(&value);
        if !text.ends_with(&self.suffix) {
            return Err(ValueError::MissingSuffix {
                value: text,
                suffix: self.suffix.clone(),
            });
        }
        Ok(value)
    }
}

#[derive(Debug)]
pub struct ContainsConstraint {
    raw: String,
    needle: String,
}

impl ContainsConstraint {
    pub fn build(raw: &str) -> Result<Box<dyn Constraint>, ConstraintError> {
        Ok(Box::new(Self {
            raw: raw.to_string(),
            needle: unquote(raw),
        }))
    }
}

impl Constraint for ContainsConstraint {
    fn name(&self) -> &str {
        CONTAINS
    }

    fn raw(&self) -> &str {
        &self.raw
    }

    fn traits(&self) -> ConstraintTraits {
        ConstraintTraits::REFINEMENT
    }

    fn check(&self, value: Value) -> ValueResult<Value> {
        let text = as_text(&value);
        if !text.contains(&self.needle) {
            return Err(ValueError::MissingSubstring {
                value: text,
                needle: self.needle.clone(),
            });
        }
        Ok(value)
    }
}

/// Marks the value substituted when a group is absent; the owning type converts it.
#[derive(Debug)]
pub struct DefaultConstraint {
    raw: String,
}

impl DefaultConstraint {
    pub fn build(raw: &str) -> Result<Box<dyn Constraint>, ConstraintError> {
        Ok(Box::new(Self {
            raw: raw.to_string(),
        }))
    }
}

impl Constraint for DefaultConstraint {
    fn name(&self) -> &str {
        DEFAULT
    }

    fn raw(&self) -> &str {
        &self.raw
    }

    fn traits(&self) -> ConstraintTraits {
        ConstraintTraits::FALLBACK
    }

    fn check(&self, value: Value) -> ValueResult<Value> {
        Ok(value)
    }
}

pub const MIN_SPEC: ConstraintSpec = ConstraintSpec {
    name: MIN,
    build: MinConstraint::build,
};
pub const MAX_SPEC: ConstraintSpec = ConstraintSpec {
    name: MAX,
    build: MaxConstraint::build,
};
pub const MIN_LEN_SPEC: ConstraintSpec = ConstraintSpec {
    name: MIN_LEN,
    build: MinLengthConstraint::build,
};
pub const MAX_LEN_SPEC: ConstraintSpec = ConstraintSpec {
    name: MAX_LEN,
    build: MaxLengthConstraint::build,
};
pub const STARTS_WITH_SPEC: ConstraintSpec = ConstraintSpec {
    name: STARTS_WITH,
    build: StartsWithConstraint::build,
};
pub const ENDS_WITH_SPEC: ConstraintSpec = ConstraintSpec {
    name: ENDS_WITH,
    build: EndsWithConstraint::build,
};
pub const CONTAINS_SPEC: ConstraintSpec = ConstraintSpec {
    name: CONTAINS,
    build: ContainsConstraint::build,
};
pub const DEFAULT_SPEC: ConstraintSpec = ConstraintSpec {
    name: DEFAULT,
    build: DefaultConstraint::build,
};
