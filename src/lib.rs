pub mod ast;
pub mod compiler;
pub mod errors;
pub mod heuristic;
pub mod options;
pub mod pattern;
pub mod types;
pub mod validation;

pub use compiler::{
    CompiledPattern, CompiledPatternRecord, GenerateError, GroupError, GroupMatch, MatchResult,
    ValueSource,
};
pub use errors::{EngineError, EngineResult};
pub use heuristic::{HeuristicCompiler, HeuristicRecord, PatternHeuristic};
pub use options::{EngineOptions, EngineOptionsBuilder, EngineOptionsError};
pub use pattern::PatternError;
pub use types::{
    ConstraintArgs, ConstraintError, PatternType, TypeFactory, TypeRegistry, TypeSystemError,
    Value, ValueError,
};
pub use validation::{ValidationError, ValidationPipeline};

use std::sync::Arc;

/// Entry point: owns the type registry, the validation rules and the heuristic compiler.
#[derive(Debug)]
pub struct PatternEngine {
    options: EngineOptions,
    registry: TypeRegistry,
    pipeline: ValidationPipeline,
    heuristics: HeuristicCompiler,
}

impl Default for PatternEngine {
    fn default() -> Self {
        Self::from_valid_options(EngineOptions::default())
    }
}

impl PatternEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: EngineOptions) -> EngineResult<Self> {
        options.validate()?;
        Ok(Self::from_valid_options(options))
    }

    fn from_valid_options(options: EngineOptions) -> Self {
        let registry = if options.register_default_types {
            TypeRegistry::with_defaults()
        } else {
            TypeRegistry::new()
        };
        Self {
            heuristics: HeuristicCompiler::new(&options),
            pipeline: ValidationPipeline::default(),
            registry,
            options,
        }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn types_mut(&mut self) -> &mut TypeRegistry {
        &mut self.registry
    }

    pub fn register_type(&mut self, factory: Arc<dyn TypeFactory>) -> EngineResult<()> {
        self.registry.register(factory)?;
        Ok(())
    }

    /// Replaces the rule set applied by [`PatternEngine::compile`].
    pub fn set_validation(&mut self, pipeline: ValidationPipeline) {
        self.pipeline = pipeline;
    }

    /// Parses, validates and compiles one pattern.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn compile(&self, pattern: &str) -> EngineResult<CompiledPattern> {
        let ast = pattern::parse_pattern(pattern, &self.registry)?;
        self.pipeline.validate(&ast)?;
        let compiled = CompiledPattern::create(pattern, ast)?;

        tracing::event!(
            tracing::Level::DEBUG,
            operation = "compile",
            pattern = pattern,
            regex = compiled.regex(),
            groups = compiled.named_groups().len()
        );
        Ok(compiled)
    }

    pub fn dehydrate(&self, compiled: &CompiledPattern) -> CompiledPatternRecord {
        compiled.dehydrate()
    }

    /// Restores a compiled pattern from a record, resolving types against this engine's registry.
    pub fn hydrate(&self, record: &CompiledPatternRecord) -> EngineResult<CompiledPattern> {
        let compiled = CompiledPattern::hydrate(record, &self.registry)?;
        tracing::event!(
            tracing::Level::DEBUG,
            operation = "hydrate",
            pattern = compiled.pattern(),
            groups = compiled.named_groups().len()
        );
        Ok(compiled)
    }

    pub fn heuristic<'p, I>(&self, patterns: I) -> PatternHeuristic
    where
        I: IntoIterator<Item = &'p CompiledPattern>,
    {
        self.heuristics.compile(patterns)
    }

    pub fn heuristic_compiler(&self) -> &HeuristicCompiler {
        &self.heuristics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_match_generate() {
        let engine = PatternEngine::new();
        let compiled = engine.compile("PAGE{id:int}").expect("compiles");
        assert_eq!(compiled.regex(), "^PAGE(?P<g1>-?[0-9]+)$");

        let result = compiled.match_input("PAGE42").expect("matches");
        assert_eq!(result.get("id"), Some(&Value::Int(42)));
        assert_eq!(compiled.generate(&result).expect("generates"), "PAGE42");
    }

    #[test]
    fn engine_without_default_types_knows_nothing() {
        let options = EngineOptions::builder()
            .register_default_types(false)
            .build()
            .expect("valid options");
        let engine = PatternEngine::with_options(options).expect("engine");
        let err = engine.compile("{id:int}").expect_err("no types");
        assert!(matches!(
            err,
            EngineError::TypeSystem(TypeSystemError::UnknownType { .. })
        ));
    }

    #[test]
    fn invalid_options_are_refused() {
        let options = EngineOptions {
            heuristic_max_len_limit: 0,
            ..EngineOptions::default()
        };
        assert!(matches!(
            PatternEngine::with_options(options),
            Err(EngineError::Options(_))
        ));
    }

    #[test]
    fn validation_runs_before_compilation() {
        let err = PatternEngine::new()
            .compile("{a:int}{b:int}")
            .expect_err("adjacent greedy groups");
        assert!(matches!(err, EngineError::Validation(_)));
    }
}
