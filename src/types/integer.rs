use super::base::{PatternType, TypeFactory};
use super::constraint::{
    ConstraintArgs, ConstraintSet, ConstraintSpec, DEFAULT_SPEC, MAX, MAX_SPEC, MIN, MIN_SPEC,
};
use super::error::{ConstraintError, ValueError, ValueResult};
use super::fragment::{bound_repetition, decimal_digits, make_lazy};
use super::value::Value;
use std::sync::Arc;

pub const INTEGER_PATTERN: &str = "-?[0-9]+";
const NAMES: &[&str] = &["int", "integer"];
const SUPPORTED: &[ConstraintSpec] = &[MIN_SPEC, MAX_SPEC, DEFAULT_SPEC];

/// Optionally signed decimal integer.
///
/// The digit run is capped to the width of `max` only when `min` is also
/// declared and neither bound is negative. Any other range keeps the open
/// repetition and reports out-of-range values through the constraint checks.
#[derive(Debug)]
pub struct IntegerType {
    constraints: ConstraintSet,
    digit_cap: Option<usize>,
}

impl IntegerType {
    pub fn new(args: &ConstraintArgs) -> Result<Self, ConstraintError> {
        let constraints = ConstraintSet::build(NAMES[0], SUPPORTED, args)?;
        let digit_cap = match (constraints.int_argument(MIN), constraints.int_argument(MAX)) {
            (Some(min), Some(max)) if min >= 0 && max >= 0 => Some(decimal_digits(max)),
            _ => None,
        };
        Ok(Self {
            constraints,
            digit_cap,
        })
    }

    fn parse_text(text: &str) -> ValueResult<i64> {
        let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            if text.contains('.') && text.parse::<f64>().is_ok() {
                return Err(ValueError::Decimal {
                    raw: text.to_string(),
                });
            }
            return Err(ValueError::NotAnInteger {
                raw: text.to_string(),
            });
        }
        text.parse::<i64>().map_err(|_| ValueError::OutOfRange {
            raw: text.to_string(),
        })
    }
}

impl PatternType for IntegerType {
    fn name(&self) -> &str {
        NAMES[0]
    }

    fn base_pattern(&self) -> &str {
        INTEGER_PATTERN
    }

    fn constraints(&self) -> &ConstraintSet {
        &self.constraints
    }

    fn constrained_pattern(&self) -> String {
        let pattern = self.constraints.constrained_pattern(INTEGER_PATTERN);
        match self.digit_cap {
            Some(digits) => bound_repetition(&pattern, None, Some(digits)),
            None => pattern,
        }
    }

    fn is_greedy(&self) -> bool {
        self.digit_cap.is_none() && !self.constraints.caps_greediness()
    }

    fn convert(&self, raw: &Value) -> ValueResult<Value> {
        match raw {
            Value::Int(v) => Ok(Value::Int(*v)),
            Value::Str(s) => Self::parse_text(s).map(Value::Int),
        }
    }

    fn serialize(&self, value: &Value) -> ValueResult<String> {
        match value {
            Value::Int(v) => Ok(v.to_string()),
            other => Err(ValueError::TypeMismatch {
                expected: "integer",
                found: other.kind(),
            }),
        }
    }

    fn apply_boundary(&self, pattern: &str, boundary: Option<&str>) -> String {
        match boundary {
            Some(b) if b.starts_with(|c: char| c.is_ascii_digit()) => make_lazy(pattern),
            _ => pattern.to_string(),
        }
    }
}

#[derive(Debug, Default)]
pub struct IntegerTypeFactory;

impl TypeFactory for IntegerTypeFactory {
    fn names(&self) -> &[&'static str] {
        NAMES
    }

    fn create(&self, args: &ConstraintArgs) -> Result<Arc<dyn PatternType>, ConstraintError> {
        Ok(Arc::new(IntegerType::new(args)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int_type(pairs: &[(&str, &str)]) -> IntegerType {
        let args: ConstraintArgs = pairs.iter().map(|(k, v)| (*k, *v)).collect();
        IntegerType::new(&args).expect("valid int type")
    }

    #[test]
    fn converts_signed_text() {
        let ty = int_type(&[]);
        assert_eq!(ty.parse_value(Some(&Value::from("42"))), Ok(Value::Int(42)));
        assert_eq!(ty.parse_value(Some(&Value::from("-7"))), Ok(Value::Int(-7)));
        assert_eq!(ty.parse_value(Some(&Value::from("+3"))), Ok(Value::Int(3)));
    }

    #[test]
    fn rejects_decimals_and_garbage() {
        let ty = int_type(&[]);
        assert_eq!(
            ty.parse_value(Some(&Value::from("1.5"))),
            Err(ValueError::Decimal { raw: "1.5".into() })
        );
        assert_eq!(
            ty.parse_value(Some(&Value::from("abc"))),
            Err(ValueError::NotAnInteger { raw: "abc".into() })
        );
        assert!(matches!(
            ty.parse_value(Some(&Value::from("99999999999999999999"))),
            Err(ValueError::OutOfRange { .. })
        ));
    }

    #[test]
    fn absent_value_uses_default_or_fails() {
        let plain = int_type(&[]);
        assert!(matches!(
            plain.parse_value(None),
            Err(ValueError::Missing { .. })
        ));

        let with_default = int_type(&[("default", "1")]);
        assert_eq!(with_default.parse_value(None), Ok(Value::Int(1)));
        assert!(with_default.is_default_value(&Value::Int(1)));
        assert!(!with_default.is_default_value(&Value::Int(2)));
    }

    #[test]
    fn non_negative_range_caps_digits_and_greediness() {
        let ty = int_type(&[("min", "0"), ("max", "255")]);
        assert_eq!(ty.constrained_pattern(), "-?[0-9]{1,3}");
        assert!(!ty.is_greedy());
        assert!(int_type(&[("min", "1")]).is_greedy());
    }

    #[test]
    fn max_without_non_negative_min_keeps_the_open_repetition() {
        for pairs in [
            &[("max", "5")][..],
            &[("min", "-500"), ("max", "10")][..],
            &[("max", "-1")][..],
        ] {
            let ty = int_type(pairs);
            assert_eq!(ty.constrained_pattern(), INTEGER_PATTERN, "{pairs:?}");
            assert!(ty.is_greedy(), "{pairs:?}");
        }

        let ty = int_type(&[("max", "5")]);
        assert_eq!(ty.parse_value(Some(&Value::from("-10"))), Ok(Value::Int(-10)));
        assert_eq!(
            ty.parse_value(Some(&Value::from("10"))),
            Err(ValueError::AboveMax { value: 10, max: 5 })
        );
    }

    #[test]
    fn boundary_only_matters_when_it_starts_with_a_digit() {
        let ty = int_type(&[]);
        assert_eq!(ty.apply_boundary(INTEGER_PATTERN, Some("-")), INTEGER_PATTERN);
        assert_eq!(ty.apply_boundary(INTEGER_PATTERN, Some("7x")), "-?[0-9]+?");
        assert_eq!(ty.apply_boundary(INTEGER_PATTERN, None), INTEGER_PATTERN);
    }

    #[test]
    fn serialize_rejects_strings() {
        let ty = int_type(&[]);
        assert_eq!(ty.serialize(&Value::Int(5)), Ok("5".to_string()));
        assert!(matches!(
            ty.serialize(&Value::from("5")),
            Err(ValueError::TypeMismatch { .. })
        ));
    }
}
