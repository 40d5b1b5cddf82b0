use super::constraint::{Constraint, ConstraintArgs, ConstraintSet};
use super::error::{ConstraintError, ValueError, ValueResult};
use super::value::Value;
use std::fmt;
use std::sync::Arc;

/// A value kind usable in a typed group. Instances are immutable once built.
pub trait PatternType: Send + Sync + fmt::Debug {
    /// Canonical type name.
    fn name(&self) -> &str;

    /// Unconstrained regex fragment.
    fn base_pattern(&self) -> &str;

    fn constraints(&self) -> &ConstraintSet;

    /// Converts a raw or supplied value to this type's value kind, without constraint checks.
    fn convert(&self, raw: &Value) -> ValueResult<Value>;

    fn serialize(&self, value: &Value) -> ValueResult<String>;

    /// Rewrites `pattern` so its capture stops in front of `boundary`.
    fn apply_boundary(&self, pattern: &str, boundary: Option<&str>) -> String;

    fn constrained_pattern(&self) -> String {
        self.constraints().constrained_pattern(self.base_pattern())
    }

    fn is_greedy(&self) -> bool {
        !self.constraints().caps_greediness()
    }

    fn constraint_arguments(&self) -> &ConstraintArgs {
        self.constraints().arguments()
    }

    fn constraint(&self, name: &str) -> Option<&dyn Constraint> {
        self.constraints().get(name)
    }

    fn has_default(&self) -> bool {
        self.constraints().default_raw().is_some()
    }

    /// Declared default converted through this type, if any.
    fn default_value(&self) -> Option<ValueResult<Value>> {
        self.constraints()
            .default_raw()
            .map(|raw| self.convert(&Value::Str(raw)))
    }

    /// Converts and checks a value, substituting the default when it is absent or empty.
    fn parse_value(&self, raw: Option<&Value>) -> ValueResult<Value> {
        let value = match raw {
            Some(v) if !v.is_empty() => self.convert(v)?,
            _ => match self.default_value() {
                Some(default) => default?,
                None => match raw {
                    Some(v) => self.convert(v)?,
                    None => {
                        return Err(ValueError::Missing {
                            type_name: self.name().to_string(),
                        });
                    }
                },
            },
        };
        self.constraints().check(value)
    }

    fn is_default_value(&self, value: &Value) -> bool {
        matches!(self.default_value(), Some(Ok(default)) if default == *value)
    }
}

/// Builds type instances for one or more names; the first name is canonical.
pub trait TypeFactory: Send + Sync {
    fn names(&self) -> &[&'static str];

    fn create(&self, args: &ConstraintArgs) -> Result<Arc<dyn PatternType>, ConstraintError>;
}
