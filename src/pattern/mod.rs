mod constraints;
mod counter;
mod error;
mod parser;

pub use counter::GroupCounter;
pub use error::{ParseError, ParseResult, PatternError, PatternResult};
pub use parser::parse_pattern;
