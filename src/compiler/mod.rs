mod compiled;
mod error;
mod match_result;
mod source;

pub use compiled::{CompiledPattern, CompiledPatternRecord};
pub use error::{GenerateError, GenerateResult, HydrationError, HydrationResult};
pub use match_result::{GroupError, GroupMatch, MatchResult};
pub use source::ValueSource;
