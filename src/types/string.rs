use super::base::{PatternType, TypeFactory};
use super::constraint::{
    CONTAINS_SPEC, ConstraintArgs, ConstraintSet, ConstraintSpec, DEFAULT_SPEC, ENDS_WITH_SPEC,
    MAX_LEN_SPEC, MIN_LEN_SPEC, STARTS_WITH_SPEC,
};
use super::error::{ConstraintError, ValueError, ValueResult};
use super::fragment::{exclude_from_class, make_lazy};
use super::value::Value;
use std::sync::Arc;

pub const STRING_PATTERN: &str = "[^/]+";
const NAMES: &[&str] = &["str", "string"];
const SUPPORTED: &[ConstraintSpec] = &[
    MIN_LEN_SPEC,
    MAX_LEN_SPEC,
    STARTS_WITH_SPEC,
    ENDS_WITH_SPEC,
    CONTAINS_SPEC,
    DEFAULT_SPEC,
];

/// Any non-empty run of characters other than `/`.
#[derive(Debug)]
pub struct StringType {
    constraints: ConstraintSet,
}

impl StringType {
    pub fn new(args: &ConstraintArgs) -> Result<Self, ConstraintError> {
        Ok(Self {
            constraints: ConstraintSet::build(NAMES[0], SUPPORTED, args)?,
        })
    }
}

impl PatternType for StringType {
    fn name(&self) -> &str {
        NAMES[0]
    }

    fn base_pattern(&self) -> &str {
        STRING_PATTERN
    }

    fn constraints(&self) -> &ConstraintSet {
        &self.constraints
    }

    fn convert(&self, raw: &Value) -> ValueResult<Value> {
        match raw {
            Value::Str(s) if s.is_empty() => Err(ValueError::EmptyString {
                type_name: NAMES[0].to_string(),
            }),
            Value::Str(s) => Ok(Value::Str(s.clone())),
            Value::Int(v) => Ok(Value::Str(v.to_string())),
        }
    }

    fn serialize(&self, value: &Value) -> ValueResult<String> {
        match value {
            Value::Str(s) => Ok(s.clone()),
            other => Err(ValueError::TypeMismatch {
                expected: "string",
                found: other.kind(),
            }),
        }
    }

    fn apply_boundary(&self, pattern: &str, boundary: Option<&str>) -> String {
        let Some(boundary) = boundary else {
            return pattern.to_string();
        };
        let mut chars = boundary.chars();
        match (chars.next(), chars.next()) {
            (Some(single), None) => exclude_from_class(pattern, single),
            (Some(_), Some(_)) => make_lazy(pattern),
            _ => pattern.to_string(),
        }
    }
}

#[derive(Debug, Default)]
pub struct StringTypeFactory;

impl TypeFactory for StringTypeFactory {
    fn names(&self) -> &[&'static str] {
        NAMES
    }

    fn create(&self, args: &ConstraintArgs) -> Result<Arc<dyn PatternType>, ConstraintError> {
        Ok(Arc::new(StringType::new(args)?))
    }
}
