mod base;
pub mod constraint;
mod error;
pub(crate) mod fragment;
mod integer;
mod registry;
mod string;
mod value;

pub use base::{PatternType, TypeFactory};
pub use constraint::{Constraint, ConstraintArgs, ConstraintSet, ConstraintSpec, ConstraintTraits};
pub use error::{ConstraintError, TypeSystemError, ValueError, ValueResult};
pub use integer::{INTEGER_PATTERN, IntegerType, IntegerTypeFactory};
pub use registry::{TypeBuildError, TypeRegistry};
pub use string::{STRING_PATTERN, StringType, StringTypeFactory};
pub use value::Value;
